mod common;

use anyhow::Result;
use common::{deposit, register_account, test_service, withdraw};
use moneta::io::Exporter;

#[tokio::test]
async fn test_export_statement_csv() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = register_account(&service, "Rebs", "rebs@example.com").await?;

    deposit(&service, &user, 5000).await?;
    withdraw(&service, &user, 1200).await?;

    let mut buf = Vec::new();
    let count = Exporter::new(&service)
        .export_statement_csv(user.id, &mut buf)
        .await?;

    assert_eq!(count, 2);

    let text = String::from_utf8(buf)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3); // header + one row per operation
    assert_eq!(
        lines[0],
        "id,sequence,created_at,operation,amount_cents,description"
    );
    assert!(lines[1].contains("deposit"));
    assert!(lines[1].contains("5000"));
    assert!(lines[2].contains("withdraw"));
    assert!(lines[2].contains("1200"));

    Ok(())
}

#[tokio::test]
async fn test_export_empty_statement_csv() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = register_account(&service, "Rebs", "rebs@example.com").await?;

    let mut buf = Vec::new();
    let count = Exporter::new(&service)
        .export_statement_csv(user.id, &mut buf)
        .await?;

    assert_eq!(count, 0);
    assert_eq!(String::from_utf8(buf)?.lines().count(), 1); // header only

    Ok(())
}

#[tokio::test]
async fn test_export_statement_json() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = register_account(&service, "Rebs", "rebs@example.com").await?;

    deposit(&service, &user, 5000).await?;
    withdraw(&service, &user, 1200).await?;

    let mut buf = Vec::new();
    let snapshot = Exporter::new(&service)
        .export_statement_json(user.id, &mut buf)
        .await?;

    assert_eq!(snapshot.account, "rebs@example.com");
    assert_eq!(snapshot.balance, 3800);
    assert_eq!(snapshot.statement.len(), 2);

    let value: serde_json::Value = serde_json::from_slice(&buf)?;
    assert_eq!(value["account"], "rebs@example.com");
    assert_eq!(value["balance"], 3800);
    assert_eq!(value["statement"].as_array().unwrap().len(), 2);
    assert_eq!(value["statement"][0]["operation"], "deposit");
    assert_eq!(value["statement"][1]["operation"], "withdraw");

    Ok(())
}
