//! CLI administration tool for carvo.
//!
//! Provides commands for managing user accounts, viewing booking statistics,
//! and performing database checks without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a staff account (prompts for missing values)
//! cargo run --bin admin -- user create --username alice --email alice@example.com --staff
//!
//! # List all users
//! cargo run --bin admin -- user list
//!
//! # Grant or revoke staff rights
//! cargo run --bin admin -- user promote alice
//! cargo run --bin admin -- user demote alice
//!
//! # Block or unblock an account
//! cargo run --bin admin -- user deactivate alice
//! cargo run --bin admin -- user activate alice
//!
//! # Generate a JWT_SECRET value
//! cargo run --bin admin -- secret
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use carvo::application::services::hash_password;
use carvo::domain::entities::{NewUser, User};
use carvo::domain::repositories::UserRepository;
use carvo::infrastructure::persistence::PgUserRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use regex::Regex;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::{Arc, LazyLock};

/// Same rule as Django usernames: letters, digits and `@.+-_`.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]{1,150}$").expect("valid username regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

const MIN_PASSWORD_LEN: usize = 8;

/// CLI tool for managing carvo.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Print a random value suitable for JWT_SECRET
    Secret,

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        #[arg(short, long)]
        username: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        /// Grant access to the admin API
        #[arg(long)]
        staff: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all users
    List,

    /// Grant staff rights
    Promote { username: String },

    /// Revoke staff rights
    Demote { username: String },

    /// Block login and invalidate outstanding tokens
    Deactivate { username: String },

    /// Re-enable a deactivated account
    Activate { username: String },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::Secret = cli.command {
        println!("{}", generate_secret());
        return Ok(());
    }

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        Commands::Secret => {}
    }

    Ok(())
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgUserRepository::new(Arc::new(pool.clone())));

    match action {
        UserAction::Create {
            username,
            email,
            staff,
            yes,
        } => create_user(repo, username, email, staff, yes).await?,
        UserAction::List => list_users(repo).await?,
        UserAction::Promote { username } => {
            set_flag(repo, &username, Flag::Staff, true).await?;
        }
        UserAction::Demote { username } => {
            set_flag(repo, &username, Flag::Staff, false).await?;
        }
        UserAction::Deactivate { username } => {
            set_flag(repo, &username, Flag::Active, false).await?;
        }
        UserAction::Activate { username } => {
            set_flag(repo, &username, Flag::Active, true).await?;
        }
    }

    Ok(())
}

/// Creates a user with interactive prompts for anything not given as a flag.
///
/// The password is always prompted for (with confirmation) so it never lands
/// in shell history. Only the bcrypt hash is stored.
async fn create_user(
    repo: Arc<PgUserRepository>,
    username: Option<String>,
    email: Option<String>,
    is_staff: bool,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "👤 Create User".bright_blue().bold());
    println!();

    let username = match username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    if !USERNAME_RE.is_match(&username) {
        anyhow::bail!(
            "Invalid username '{}': use up to 150 letters, digits and @/./+/-/_",
            username
        );
    }

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    if !EMAIL_RE.is_match(&email) {
        anyhow::bail!("Invalid email address '{}'", email);
    }

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        anyhow::bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
    }

    println!();
    println!("{}", "User details:".bright_white().bold());
    println!("  Username: {}", username.cyan());
    println!("  Email:    {}", email.cyan());
    println!(
        "  Role:     {}",
        if is_staff { "staff".yellow() } else { "customer".normal() }
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this user?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let password_hash = hash_password(&password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    let user = repo
        .create(NewUser {
            username,
            email,
            password_hash,
            is_staff,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))?;

    println!();
    println!(
        "{} (id {})",
        "✅ User created successfully!".green().bold(),
        user.id.to_string().bright_black()
    );
    println!();
    println!("{}", "Obtain a token with:".bright_white());
    println!(
        "  curl -X POST http://localhost:3000/api/token -H 'Content-Type: application/json' \\\n       -d '{{\"username\": \"{}\", \"password\": \"...\"}}'",
        user.username.bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists all users with role and status.
///
/// ```text
/// 📋 Users
///
///   ID  Username             Email                          Created           Role      Status
///   ─────────────────────────────────────────────────────────────────────────────────────────────
///   1   alice                alice@example.com              2025-01-15 10:30  staff     ACTIVE
///   2   bob                  bob@example.com                2025-01-16 14:20  customer  INACTIVE
/// ```
async fn list_users(repo: Arc<PgUserRepository>) -> Result<()> {
    println!("{}", "📋 Users".bright_blue().bold());
    println!();

    let users = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        println!();
        println!(
            "  Create one with: {} admin user create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<20} {:<30} {:<17} {:<9} {}",
        "ID".bright_white().bold(),
        "Username".bright_white().bold(),
        "Email".bright_white().bold(),
        "Created".bright_white().bold(),
        "Role".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(93).bright_black());

    for user in &users {
        let role = if user.is_staff {
            "staff".yellow()
        } else {
            "customer".normal()
        };
        let status = if user.is_active {
            "ACTIVE".green()
        } else {
            "INACTIVE".red()
        };

        println!(
            "  {:<3} {:<20} {:<30} {:<17} {:<9} {}",
            user.id.to_string().bright_black(),
            user.username.cyan(),
            user.email,
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            role,
            status
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

#[derive(Clone, Copy)]
enum Flag {
    Staff,
    Active,
}

/// Toggles a user flag after confirmation.
async fn set_flag(repo: Arc<PgUserRepository>, username: &str, flag: Flag, value: bool) -> Result<()> {
    let user: User = repo
        .find_by_username(username)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("User not found")?;

    let (current, label) = match flag {
        Flag::Staff => (user.is_staff, if value { "promote to staff" } else { "remove staff rights from" }),
        Flag::Active => (user.is_active, if value { "activate" } else { "deactivate" }),
    };

    if current == value {
        println!("{}", "⚠️  Nothing to change".yellow());
        return Ok(());
    }

    println!("  User: {} ({})", user.username.cyan(), user.email);
    println!();

    let confirmed = Confirm::new()
        .with_prompt(format!("Really {} this user?", label))
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    let updated = match flag {
        Flag::Staff => repo.set_staff(user.id, value).await,
        Flag::Active => repo.set_active(user.id, value).await,
    }
    .map_err(|e| anyhow::anyhow!("Failed to update user: {}", e))?;

    if !updated {
        anyhow::bail!("User disappeared while updating");
    }

    println!("{}", "✅ User updated".green().bold());
    Ok(())
}

/// Displays fleet, booking and payment statistics.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let (cars, available): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_available) FROM cars",
    )
    .fetch_one(pool)
    .await?;

    let by_status: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM rentals GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await?;

    let (collected, outstanding): (Decimal, Decimal) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(amount) FILTER (WHERE is_paid), 0),
               COALESCE(SUM(amount) FILTER (WHERE NOT is_paid), 0)
        FROM payments
        "#,
    )
    .fetch_one(pool)
    .await?;

    println!("  Users:          {}", users.to_string().bright_green().bold());
    println!(
        "  Cars:           {} ({} available)",
        cars.to_string().bright_green().bold(),
        available
    );
    println!("  Rentals:");
    if by_status.is_empty() {
        println!("    {}", "none".bright_black());
    }
    for (status, count) in &by_status {
        println!("    {:<11} {}", status, count.to_string().bright_green());
    }
    println!(
        "  Collected:      {}",
        collected.to_string().bright_green().bold()
    );
    println!(
        "  Cash due:       {}",
        outstanding.to_string().bright_yellow().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}

/// Generates a random 64-character alphanumeric secret.
fn generate_secret() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const SECRET_LEN: usize = 64;

    let mut rng = rand::rng();

    (0..SECRET_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
