use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{Cents, Statement, UserId};

/// Point-in-time snapshot of a single account for JSON export
#[derive(Debug, Clone, Serialize)]
pub struct AccountSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    /// Email of the exported account
    pub account: String,
    pub balance: Cents,
    pub statement: Vec<Statement>,
}

/// Exporter for converting a user's statement to external formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export a user's statement to CSV format, one row per operation.
    pub async fn export_statement_csv<W: Write>(&self, user_id: UserId, writer: W) -> Result<usize> {
        let summary = self.service.get_balance(user_id).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record([
            "id",
            "sequence",
            "created_at",
            "operation",
            "amount_cents",
            "description",
        ])?;

        let mut count = 0;
        for statement in &summary.statement {
            csv_writer.write_record([
                statement.id.to_string(),
                statement.sequence.to_string(),
                statement.created_at.to_rfc3339(),
                statement.operation.to_string(),
                statement.amount_cents.to_string(),
                statement.description.clone(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export a user's account as a JSON snapshot (balance + statement).
    pub async fn export_statement_json<W: Write>(
        &self,
        user_id: UserId,
        mut writer: W,
    ) -> Result<AccountSnapshot> {
        let user = self.service.get_profile(user_id).await?;
        let summary = self.service.get_balance(user_id).await?;

        let snapshot = AccountSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            account: user.email,
            balance: summary.balance,
            statement: summary.statement,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
