use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::LedgerService;
use crate::domain::{OperationType, User, format_cents, parse_amount};
use crate::io::Exporter;

/// Moneta - Personal Finance Account Ledger
#[derive(Parser)]
#[command(name = "moneta")]
#[command(about = "A personal finance ledger with user accounts, deposits and withdrawals")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "moneta.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Register a new user account
    Register {
        /// Display name
        name: String,

        /// Email address (must be unique)
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Authenticate and print a session token
    Login {
        /// Email address
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Show profile information for an account
    Profile {
        /// Email address
        email: String,
    },

    /// Record a deposit into an account
    Deposit {
        /// Email address of the account
        email: String,

        /// Amount to deposit (e.g., "50.00" or "50")
        amount: String,

        /// Description of the operation
        #[arg(short = 'm', long, default_value = "deposit")]
        description: String,
    },

    /// Record a withdrawal from an account
    Withdraw {
        /// Email address of the account
        email: String,

        /// Amount to withdraw (e.g., "50.00" or "50")
        amount: String,

        /// Description of the operation
        #[arg(short = 'm', long, default_value = "withdraw")]
        description: String,
    },

    /// Show balance and statement for an account
    Balance {
        /// Email address of the account
        email: String,
    },

    /// Show detailed information for a single statement operation
    #[command(name = "show")]
    ShowStatement {
        /// Email address of the account
        email: String,

        /// Statement operation ID
        id: String,
    },

    /// Export an account's statement to CSV or JSON
    Export {
        /// Email address of the account
        email: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Register {
                name,
                email,
                password,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let user = service.register_user(name, email, &password).await?;
                println!("Registered account: {} <{}> ({})", user.name, user.email, user.id);
            }

            Commands::Login { email, password } => {
                let service = LedgerService::connect(&self.database).await?;
                let session = service.authenticate(&email, &password).await?;
                println!("Authenticated: {} <{}>", session.user.name, session.user.email);
                println!("Token: {}", session.token);
            }

            Commands::Profile { email } => {
                let service = LedgerService::connect(&self.database).await?;
                let user = service.get_profile_by_email(&email).await?;
                println!("Name:       {}", user.name);
                println!("Email:      {}", user.email);
                println!("Account ID: {}", user.id);
                println!("Registered: {}", user.created_at.format("%Y-%m-%d %H:%M"));
            }

            Commands::Deposit {
                email,
                amount,
                description,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let user = service.get_profile_by_email(&email).await?;
                let amount_cents =
                    parse_amount(&amount).context("Invalid amount format. Use '50.00' or '50'")?;

                let statement = service
                    .create_statement(
                        user.id,
                        OperationType::Deposit,
                        amount_cents,
                        description,
                    )
                    .await?;

                println!(
                    "Recorded deposit: {} into {} ({})",
                    format_cents(statement.amount_cents),
                    user.email,
                    statement.id
                );
            }

            Commands::Withdraw {
                email,
                amount,
                description,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let user = service.get_profile_by_email(&email).await?;
                let amount_cents =
                    parse_amount(&amount).context("Invalid amount format. Use '50.00' or '50'")?;

                let statement = service
                    .create_statement(
                        user.id,
                        OperationType::Withdraw,
                        amount_cents,
                        description,
                    )
                    .await?;

                println!(
                    "Recorded withdrawal: {} from {} ({})",
                    format_cents(statement.amount_cents),
                    user.email,
                    statement.id
                );
            }

            Commands::Balance { email } => {
                let service = LedgerService::connect(&self.database).await?;
                let user = service.get_profile_by_email(&email).await?;
                run_balance_command(&service, &user).await?;
            }

            Commands::ShowStatement { email, id } => {
                let service = LedgerService::connect(&self.database).await?;
                let user = service.get_profile_by_email(&email).await?;
                let statement_id =
                    Uuid::parse_str(&id).context("Invalid statement ID format (expected UUID)")?;

                let statement = service.get_statement_operation(user.id, statement_id).await?;

                println!("Statement:   {}", statement.id);
                println!("Account:     {}", user.email);
                println!("Operation:   {}", statement.operation);
                println!("Amount:      {}", format_cents(statement.amount_cents));
                println!("Description: {}", statement.description);
                println!(
                    "Recorded:    {}",
                    statement.created_at.format("%Y-%m-%d %H:%M:%S")
                );
            }

            Commands::Export {
                email,
                output,
                format,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let user = service.get_profile_by_email(&email).await?;
                run_export_command(&service, &user, output.as_deref(), &format).await?;
            }
        }

        Ok(())
    }
}

async fn run_balance_command(service: &LedgerService, user: &User) -> Result<()> {
    let summary = service.get_balance(user.id).await?;

    println!("{}: {}", user.email, format_cents(summary.balance));

    if summary.statement.is_empty() {
        println!("No operations recorded.");
    } else {
        println!();
        println!(
            "{:<12} {:<10} {:>10} DESCRIPTION",
            "DATE", "OPERATION", "AMOUNT"
        );
        println!("{}", "-".repeat(60));

        for statement in &summary.statement {
            println!(
                "{:<12} {:<10} {:>10} {}",
                statement.created_at.format("%Y-%m-%d"),
                statement.operation.as_str(),
                format_cents(statement.amount_cents),
                truncate(&statement.description, 30)
            );
        }
    }

    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    user: &User,
    output: Option<&str>,
    format: &str,
) -> Result<()> {
    let exporter = Exporter::new(service);

    let writer: Box<dyn std::io::Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    match format {
        "csv" => {
            let count = exporter.export_statement_csv(user.id, writer).await?;
            if output.is_some() {
                println!("Exported {} operation(s) for {}", count, user.email);
            }
        }
        "json" => {
            let snapshot = exporter.export_statement_json(user.id, writer).await?;
            if output.is_some() {
                println!(
                    "Exported {} operation(s) for {} (balance {})",
                    snapshot.statement.len(),
                    user.email,
                    format_cents(snapshot.balance)
                );
            }
        }
        other => bail!("Unknown export format '{}'. Valid formats: csv, json", other),
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
