use super::{Cents, OperationType, Statement};

/// Compute the balance of an account from its statement entries.
/// Balance = sum of deposits - sum of withdrawals
///
/// Pure fold over the ledger contents: calling it twice against the same
/// entries yields the same result, and the order of entries does not
/// change the sum.
pub fn compute_balance(statements: &[Statement]) -> Cents {
    statements
        .iter()
        .fold(0, |balance, statement| match statement.operation {
            OperationType::Deposit => balance + statement.amount_cents,
            OperationType::Withdraw => balance - statement.amount_cents,
        })
}
