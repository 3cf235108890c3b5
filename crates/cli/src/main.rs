//! Energy Maximum CLI - Database migrations and operations tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! em-cli migrate
//!
//! # Create the first superuser
//! em-cli admin create -u root -p 'long passphrase' --superuser
//!
//! # Issue a token for manual API testing
//! em-cli token issue --kind customer --id 42 --ttl-minutes 30
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create admin accounts
//! - `token issue` - Sign an access token with the configured key

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::token::SubjectKind;

#[derive(Parser)]
#[command(name = "em-cli")]
#[command(author, version, about = "Energy Maximum CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Work with access tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Plain-text password (hashed before storage)
        #[arg(short, long, env = "ADMIN_PASSWORD")]
        password: String,

        /// Grant superuser rights
        #[arg(long)]
        superuser: bool,

        /// Role granting capability keys
        #[arg(short, long)]
        role_id: Option<i64>,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a token for a principal
    Issue {
        /// Principal kind
        #[arg(short, long, value_enum)]
        kind: SubjectKind,

        /// Row id of the admin or customer
        #[arg(short, long)]
        id: i64,

        /// Token lifetime in minutes
        #[arg(short, long, default_value_t = 60)]
        ttl_minutes: u64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                password,
                superuser,
                role_id,
            } => {
                commands::admin::create_user(&username, &password, superuser, role_id).await?;
            }
        },
        Commands::Token { action } => match action {
            TokenAction::Issue {
                kind,
                id,
                ttl_minutes,
            } => commands::token::issue(kind, id, ttl_minutes)?,
        },
    }
    Ok(())
}
