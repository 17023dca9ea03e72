use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, UserId};

pub type StatementId = Uuid;

/// The two kinds of operations a statement can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Money entering the account
    Deposit,
    /// Money leaving the account
    Withdraw,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Deposit => "deposit",
            OperationType::Withdraw => "withdraw",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deposit" => Some(OperationType::Deposit),
            "withdraw" => Some(OperationType::Withdraw),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A statement records a single monetary operation against a user's account.
/// Statements are immutable once recorded - the ledger is append-only, so
/// there is no update or delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub id: StatementId,
    /// Monotonically increasing sequence number for insertion ordering
    pub sequence: i64,
    /// Owning account. The ledger references users but does not manage them.
    pub user_id: UserId,
    pub operation: OperationType,
    /// Amount in cents (always positive)
    pub amount_cents: Cents,
    /// Human-readable label
    pub description: String,
    /// When the operation was recorded
    pub created_at: DateTime<Utc>,
}

impl Statement {
    /// Create a new statement. Sequence number must be assigned by the repository.
    pub fn new(
        user_id: UserId,
        operation: OperationType,
        amount_cents: Cents,
        description: impl Into<String>,
    ) -> Self {
        assert!(amount_cents > 0, "Statement amount must be positive");
        Self {
            id: Uuid::new_v4(),
            sequence: 0, // Will be set by repository
            user_id,
            operation,
            amount_cents,
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}
