mod common;

use std::sync::Arc;

use anyhow::Result;
use common::{deposit, register_account, test_service};
use moneta::application::AppError;
use moneta::domain::OperationType;

// Two withdrawals that each pass the funds check in isolation but jointly
// exceed the balance: exactly one may land, whichever order the tasks run.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_cannot_both_succeed() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = register_account(&service, "Race", "race@example.com").await?;
    deposit(&service, &user, 10000).await?;

    let service = Arc::new(service);
    let mut handles = Vec::new();
    for i in 0..2 {
        let service = Arc::clone(&service);
        let user_id = user.id;
        handles.push(tokio::spawn(async move {
            service
                .create_statement(
                    user_id,
                    OperationType::Withdraw,
                    6000,
                    format!("claim {}", i),
                )
                .await
        }));
    }

    let mut recorded = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => recorded += 1,
            Err(AppError::InsufficientFunds { .. }) => rejected += 1,
            Err(other) => return Err(other.into()),
        }
    }

    assert_eq!(recorded, 1);
    assert_eq!(rejected, 1);

    let summary = service.get_balance(user.id).await?;
    assert_eq!(summary.balance, 4000);
    assert_eq!(summary.statement.len(), 2);

    Ok(())
}

// A burst of withdrawals against one account never drives the balance
// negative, no matter how the tasks interleave.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_withdrawal_burst_never_overdraws() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = register_account(&service, "Burst", "burst@example.com").await?;
    deposit(&service, &user, 5000).await?;

    let service = Arc::new(service);
    let mut handles = Vec::new();
    for i in 0..8 {
        let service = Arc::clone(&service);
        let user_id = user.id;
        handles.push(tokio::spawn(async move {
            service
                .create_statement(
                    user_id,
                    OperationType::Withdraw,
                    1000,
                    format!("burst {}", i),
                )
                .await
        }));
    }

    let mut recorded = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => recorded += 1,
            Err(AppError::InsufficientFunds { .. }) => {}
            Err(other) => return Err(other.into()),
        }
    }

    // 5000 cents cover exactly five 1000-cent withdrawals
    assert_eq!(recorded, 5);

    let summary = service.get_balance(user.id).await?;
    assert_eq!(summary.balance, 0);

    Ok(())
}

// Operations for different users are independent; concurrent deposits all
// land and each ledger stays isolated.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deposits_across_users() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let mut users = Vec::new();
    for i in 0..4 {
        users.push(register_account(&service, "User", &format!("user{}@example.com", i)).await?);
    }

    let service = Arc::new(service);
    let mut handles = Vec::new();
    for (i, user) in users.iter().enumerate() {
        let service = Arc::clone(&service);
        let user_id = user.id;
        let amount = ((i as i64) + 1) * 100;
        handles.push(tokio::spawn(async move {
            service
                .create_statement(user_id, OperationType::Deposit, amount, "pay".to_string())
                .await
        }));
    }

    for handle in handles {
        handle.await??;
    }

    for (i, user) in users.iter().enumerate() {
        let summary = service.get_balance(user.id).await?;
        assert_eq!(summary.balance, ((i as i64) + 1) * 100);
        assert_eq!(summary.statement.len(), 1);
    }

    Ok(())
}
