//! CLI administration tool for user-registry.
//!
//! Manages users and checks the database without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Register a user interactively
//! cargo run --bin admin -- user create
//!
//! # List all users
//! cargo run --bin admin -- user list
//!
//! # Show one user by id or email
//! cargo run --bin admin -- user show ram@example.com
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` (required): PostgreSQL connection
//! - `PASSWORD_*`: Argon2 work factor, same as the server

use user_registry::application::services::{PasswordHasher, UserService};
use user_registry::config::{self, Config};
use user_registry::domain::entities::{ProfileInput, Role, User, UserDraft};
use user_registry::infrastructure::persistence::PgUserStore;
use user_registry::server::connect_pool;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password, Select};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing user-registry.
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
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Register a new user
    Create {
        /// Email address (prompted if omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Role: super-admin, admin, customer, guest or partner (prompted if omitted)
        #[arg(short, long)]
        role: Option<String>,

        /// Create without a password
        #[arg(long)]
        no_password: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all users
    List,

    /// Show one user
    Show {
        /// User id or email
        id_or_email: String,
    },
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

    let config = config::load_from_env()?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &config, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, config: &Config, pool: &PgPool) -> Result<()> {
    let store = Arc::new(PgUserStore::new(Arc::new(pool.clone())));
    let hasher = PasswordHasher::new(config.password_policy)?;
    let service = UserService::new(store, hasher, config.store_timeout());

    match action {
        UserAction::Create {
            email,
            role,
            no_password,
            yes,
        } => create_user(&service, email, role, no_password, yes).await?,
        UserAction::List => list_users(&service).await?,
        UserAction::Show { id_or_email } => show_user(&service, &id_or_email).await?,
    }

    Ok(())
}

/// Registers a user with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for email and role (or use provided)
/// 2. Prompt for password twice unless `--no-password`
/// 3. Confirm creation (unless `--yes` flag)
/// 4. Validate, hash and store through the user service
async fn create_user(
    service: &UserService<PgUserStore>,
    email: Option<String>,
    role: Option<String>,
    no_password: bool,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "👤 Create User".bright_blue().bold());
    println!();

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };

    let role = match role {
        Some(r) => r,
        None => {
            let labels: Vec<&str> = Role::ALL.iter().map(Role::as_str).collect();
            let selected = Select::new()
                .with_prompt("Role")
                .items(&labels)
                .default(2)
                .interact()?;
            labels[selected].to_string()
        }
    };

    let password = if no_password {
        None
    } else {
        Some(
            Password::new()
                .with_prompt("Password")
                .with_confirmation("Repeat password", "Passwords do not match")
                .interact()?,
        )
    };

    let full_name: String = Input::new()
        .with_prompt("Full name (optional)")
        .allow_empty(true)
        .interact_text()?;

    println!();
    println!("{}", "User details:".bright_white().bold());
    println!("  Email:    {}", email.cyan());
    println!("  Role:     {}", role.cyan());
    println!(
        "  Password: {}",
        if password.is_some() { "set".green() } else { "none".yellow() }
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

    let draft = UserDraft {
        email: Some(email),
        role: Some(role),
        password,
        profile: ProfileInput {
            full_name: Some(full_name).filter(|n| !n.trim().is_empty()),
            ..Default::default()
        },
    };

    let user = service
        .create(draft)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e.normalize().1))?;

    println!();
    println!("{}", "✅ User created successfully!".green().bold());
    println!("  ID: {}", user.id.to_string().bright_yellow());
    println!();

    Ok(())
}

/// Lists all users in registration order.
///
/// # Output Format
///
/// ```text
/// 📋 Users
///
///   ID                                    Email                          Role         Created
///   ──────────────────────────────────────────────────────────────────────────────────────────
///   0b9c2c8e-4c1e-4f0e-9d0b-7f8f0b3e5a11  ram@example.com                customer     2025-01-15 10:30
/// ```
async fn list_users(service: &UserService<PgUserStore>) -> Result<()> {
    println!("{}", "📋 Users".bright_blue().bold());
    println!();

    let users = service
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
        "  {:<37} {:<30} {:<12} {:<16}",
        "ID".bright_white().bold(),
        "Email".bright_white().bold(),
        "Role".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(96).bright_black());

    for user in &users {
        println!(
            "  {:<37} {:<30} {:<12} {}",
            user.id.to_string().bright_black(),
            user.email.cyan(),
            user.role.as_str(),
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Shows one user, looked up by id first and then by email.
async fn show_user(service: &UserService<PgUserStore>, id_or_email: &str) -> Result<()> {
    let user = match service.find_by_id(id_or_email).await {
        Ok(user) => user,
        Err(_) => service
            .find_by_email(id_or_email)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e.normalize().1))?,
    };

    print_user(&user);

    Ok(())
}

fn print_user(user: &User) {
    println!("{}", "👤 User".bright_blue().bold());
    println!();
    println!("  ID:        {}", user.id.to_string().bright_black());
    println!("  Email:     {}", user.email.cyan());
    println!("  Role:      {}", user.role.as_str());
    println!(
        "  Name:      {}",
        user.profile.full_name.as_deref().unwrap_or("-")
    );
    println!(
        "  Verified:  {}",
        if user.profile.verified { "yes".green() } else { "no".yellow() }
    );
    println!(
        "  Password:  {}",
        if user.has_password() { "set".green() } else { "none".yellow() }
    );
    println!(
        "  Created:   {}",
        user.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!();
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

            let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(pool)
                .await
                .context("Users table missing; start the server once to run migrations")?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!(
                "  Users:      {}",
                users_count.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}
