use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::domain::{Cents, OperationType, Statement, StatementId, User, UserId};

use super::MIGRATION_001_INITIAL;

/// Outcome of a guarded withdrawal insert.
#[derive(Debug, Clone, Copy)]
pub enum WithdrawalOutcome {
    Recorded,
    /// The balance observed inside the transaction did not cover the amount;
    /// nothing was written.
    InsufficientFunds { balance: Cents },
}

/// Repository for persisting and querying users and statements.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // User operations
    // ========================

    /// Save a new user to the database.
    pub async fn save_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save user")?;
        Ok(())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by email")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(User {
            id: Uuid::parse_str(&id_str).context("Invalid user ID")?,
            name: row.get("name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Statement operations
    // ========================

    /// Save a new deposit statement.
    /// Automatically assigns the next sequence number.
    pub async fn save_deposit(&self, statement: &mut Statement) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        statement.sequence = Self::next_sequence(&mut tx).await?;
        Self::insert_statement(&mut tx, statement).await?;

        tx.commit().await.context("Failed to commit deposit")?;
        Ok(())
    }

    /// Check funds and append a withdrawal in a single transaction.
    ///
    /// The sequence update is the first operation in the transaction and is
    /// a write, so the transaction holds the database write lock before the
    /// balance is read. Two concurrent withdrawals for the same user
    /// therefore serialize: the second one observes the balance left by the
    /// first, and a withdrawal that would drive the balance negative is
    /// never persisted.
    pub async fn save_withdrawal(&self, statement: &mut Statement) -> Result<WithdrawalOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let sequence = Self::next_sequence(&mut tx).await?;

        let balance = Self::balance_in_tx(&mut tx, statement.user_id).await?;
        if balance < statement.amount_cents {
            tx.rollback()
                .await
                .context("Failed to roll back withdrawal")?;
            return Ok(WithdrawalOutcome::InsufficientFunds { balance });
        }

        statement.sequence = sequence;
        Self::insert_statement(&mut tx, statement).await?;

        tx.commit().await.context("Failed to commit withdrawal")?;
        Ok(WithdrawalOutcome::Recorded)
    }

    /// Get the next sequence number and increment the counter.
    async fn next_sequence(tx: &mut Transaction<'_, Sqlite>) -> Result<i64> {
        let row = sqlx::query(
            r#"
            UPDATE sequence_counter
            SET value = value + 1
            WHERE name = 'statement_sequence'
            RETURNING value
            "#,
        )
        .fetch_one(&mut **tx)
        .await
        .context("Failed to get next sequence number")?;

        Ok(row.get("value"))
    }

    async fn insert_statement(
        tx: &mut Transaction<'_, Sqlite>,
        statement: &Statement,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO statements (id, sequence, user_id, operation, amount_cents, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(statement.id.to_string())
        .bind(statement.sequence)
        .bind(statement.user_id.to_string())
        .bind(statement.operation.as_str())
        .bind(statement.amount_cents)
        .bind(&statement.description)
        .bind(statement.created_at.to_rfc3339())
        .execute(&mut **tx)
        .await
        .context("Failed to save statement")?;

        Ok(())
    }

    async fn balance_in_tx(tx: &mut Transaction<'_, Sqlite>, user_id: UserId) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(CASE operation WHEN 'deposit' THEN amount_cents ELSE -amount_cents END), 0) as balance
            FROM statements
            WHERE user_id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_one(&mut **tx)
        .await
        .context("Failed to compute balance")?;

        Ok(row.get("balance"))
    }

    /// Get a statement by ID, scoped to its owner. A statement belonging to
    /// a different user is not returned.
    pub async fn get_statement(
        &self,
        user_id: UserId,
        id: StatementId,
    ) -> Result<Option<Statement>> {
        let row = sqlx::query(
            r#"
            SELECT id, sequence, user_id, operation, amount_cents, description, created_at
            FROM statements
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch statement")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_statement(&row)?)),
            None => Ok(None),
        }
    }

    /// List all statements for a user, in insertion order.
    pub async fn list_statements_for_user(&self, user_id: UserId) -> Result<Vec<Statement>> {
        let rows = sqlx::query(
            r#"
            SELECT id, sequence, user_id, operation, amount_cents, description, created_at
            FROM statements
            WHERE user_id = ?
            ORDER BY sequence
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list statements")?;

        rows.iter().map(Self::row_to_statement).collect()
    }

    fn row_to_statement(row: &sqlx::sqlite::SqliteRow) -> Result<Statement> {
        let id_str: String = row.get("id");
        let user_id_str: String = row.get("user_id");
        let operation_str: String = row.get("operation");
        let created_at_str: String = row.get("created_at");

        Ok(Statement {
            id: Uuid::parse_str(&id_str).context("Invalid statement ID")?,
            sequence: row.get("sequence"),
            user_id: Uuid::parse_str(&user_id_str).context("Invalid user ID")?,
            operation: OperationType::from_str(&operation_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid operation type: {}", operation_str))?,
            amount_cents: row.get("amount_cents"),
            description: row.get("description"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
