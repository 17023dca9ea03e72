// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use moneta::application::LedgerService;
use moneta::domain::{OperationType, User};
use tempfile::TempDir;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Register an account with the shared test password
pub async fn register_account(service: &LedgerService, name: &str, email: &str) -> Result<User> {
    Ok(service
        .register_user(name.to_string(), email.to_string(), TEST_PASSWORD)
        .await?)
}

/// Record a deposit for a user
pub async fn deposit(service: &LedgerService, user: &User, amount: i64) -> Result<()> {
    service
        .create_statement(
            user.id,
            OperationType::Deposit,
            amount,
            "deposit".to_string(),
        )
        .await?;
    Ok(())
}

/// Record a withdrawal for a user
pub async fn withdraw(service: &LedgerService, user: &User, amount: i64) -> Result<()> {
    service
        .create_statement(
            user.id,
            OperationType::Withdraw,
            amount,
            "withdraw".to_string(),
        )
        .await?;
    Ok(())
}
