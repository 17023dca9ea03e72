use crate::domain::{Cents, OperationType, Statement, StatementId, User, UserId, compute_balance};
use crate::storage::{Repository, WithdrawalOutcome};

use super::{AppError, auth};

/// Application service providing high-level operations for the ledger.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct LedgerService {
    repo: Repository,
}

/// Result of a successful authentication
pub struct AuthSession {
    pub user: User,
    /// Opaque session token for the transport layer to hand back to the client
    pub token: String,
}

/// A user's balance together with the statement entries it derives from
pub struct BalanceSummary {
    pub balance: Cents,
    pub statement: Vec<Statement>,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Account operations
    // ========================

    /// Register a new user account.
    pub async fn register_user(
        &self,
        name: String,
        email: String,
        password: &str,
    ) -> Result<User, AppError> {
        // Check if the email is already registered
        if self.repo.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::EmailTaken(email));
        }

        let password_hash = auth::hash_password(password)?;
        let user = User::new(name, email, password_hash);

        self.repo.save_user(&user).await?;
        Ok(user)
    }

    /// Verify credentials and issue an opaque session token.
    /// An unknown email and a wrong password fail identically, so callers
    /// cannot probe which accounts exist.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let user = self
            .repo
            .get_user_by_email(email)
            .await?
            .ok_or(AppError::IncorrectCredentials)?;

        if !auth::verify_password(password, &user.password_hash) {
            return Err(AppError::IncorrectCredentials);
        }

        Ok(AuthSession {
            token: auth::generate_token(),
            user,
        })
    }

    /// Get the profile of a user by id.
    pub async fn get_profile(&self, user_id: UserId) -> Result<User, AppError> {
        self.resolve_user(user_id).await
    }

    /// Get the profile of a user by email.
    pub async fn get_profile_by_email(&self, email: &str) -> Result<User, AppError> {
        self.repo
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(email.to_string()))
    }

    async fn resolve_user(&self, user_id: UserId) -> Result<User, AppError> {
        self.repo
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }

    // ========================
    // Statement operations
    // ========================

    /// Record a new deposit or withdrawal for a user.
    /// Withdrawals are admitted only when the current balance covers the
    /// amount; the check and the append happen atomically per account, so
    /// a rejected withdrawal leaves the ledger untouched.
    pub async fn create_statement(
        &self,
        user_id: UserId,
        operation: OperationType,
        amount_cents: Cents,
        description: String,
    ) -> Result<Statement, AppError> {
        if amount_cents <= 0 {
            return Err(AppError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }

        self.resolve_user(user_id).await?;

        let mut statement = Statement::new(user_id, operation, amount_cents, description);

        match operation {
            OperationType::Deposit => {
                self.repo.save_deposit(&mut statement).await?;
            }
            OperationType::Withdraw => match self.repo.save_withdrawal(&mut statement).await? {
                WithdrawalOutcome::Recorded => {}
                WithdrawalOutcome::InsufficientFunds { balance } => {
                    return Err(AppError::InsufficientFunds {
                        balance,
                        requested: amount_cents,
                    });
                }
            },
        }

        Ok(statement)
    }

    /// Get a user's balance together with the full statement, in insertion order.
    /// A user with no operations has balance 0 and an empty statement.
    pub async fn get_balance(&self, user_id: UserId) -> Result<BalanceSummary, AppError> {
        self.resolve_user(user_id).await?;

        let statement = self.repo.list_statements_for_user(user_id).await?;
        let balance = compute_balance(&statement);

        Ok(BalanceSummary { balance, statement })
    }

    /// Get a single statement operation by id, scoped to its owner.
    /// A statement id that exists under a different user is reported as
    /// not found, same as an id that does not exist at all.
    pub async fn get_statement_operation(
        &self,
        user_id: UserId,
        statement_id: StatementId,
    ) -> Result<Statement, AppError> {
        self.resolve_user(user_id).await?;

        self.repo
            .get_statement(user_id, statement_id)
            .await?
            .ok_or_else(|| AppError::StatementNotFound(statement_id.to_string()))
    }
}
