//! CLI administration tool for the marketplace.
//!
//! Provides commands for bootstrapping admin accounts, seeding modules,
//! viewing statistics and performing database checks without HTTP access.
//!
//! # Usage
//!
//! ```bash
//! # Create the first (super) admin
//! cargo run --bin admin -- admin create --super
//!
//! # List admins
//! cargo run --bin admin -- admin list
//!
//! # Deactivate an admin and revoke their sessions
//! cargo run --bin admin -- admin deactivate 3
//!
//! # Create a module
//! cargo run --bin admin -- module create --name Grocery
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

use marketplace::application::services::{AdminRegistration, AdminService};
use marketplace::domain::entities::{NewModule, Role};
use marketplace::domain::repositories::{AdminRepository, ModuleRepository, SessionRepository};
use marketplace::infrastructure::persistence::{
    PgAdminRepository, PgModuleRepository, PgSessionRepository,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing the marketplace.
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
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Manage modules
    Module {
        #[command(subcommand)]
        action: ModuleAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Admin account subcommands.
#[derive(Subcommand)]
enum AdminAction {
    /// Create an admin account
    Create {
        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Login email
        #[arg(short, long)]
        email: Option<String>,

        /// Grant super admin rights (may manage other admins)
        #[arg(long = "super")]
        is_super: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all admins
    List,

    /// Deactivate an admin and revoke their sessions
    Deactivate {
        /// Admin ID
        id: i64,
    },
}

/// Module subcommands.
#[derive(Subcommand)]
enum ModuleAction {
    /// Create a module
    Create {
        /// Module name (e.g., "Grocery", "Pharmacy")
        #[arg(short, long)]
        name: Option<String>,

        /// Short description
        #[arg(short, long)]
        description: Option<String>,

        /// Position in listings (ascending)
        #[arg(short, long, default_value_t = 0)]
        sort_order: i32,
    },

    /// List all modules
    List,
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

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Admin { action } => handle_admin_action(action, &pool).await?,
        Commands::Module { action } => handle_module_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches admin account commands.
async fn handle_admin_action(action: AdminAction, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let repo = Arc::new(PgAdminRepository::new(pool.clone()));

    match action {
        AdminAction::Create {
            name,
            email,
            is_super,
            yes,
        } => {
            create_admin(repo, name, email, is_super, yes).await?;
        }
        AdminAction::List => {
            list_admins(repo).await?;
        }
        AdminAction::Deactivate { id } => {
            let sessions = PgSessionRepository::new(pool);
            deactivate_admin(repo, sessions, id).await?;
        }
    }

    Ok(())
}

/// Creates an admin with interactive prompts.
///
/// The password is always read from the terminal, never from arguments,
/// and is stored as an Argon2 hash.
async fn create_admin(
    repo: Arc<PgAdminRepository>,
    name: Option<String>,
    email: Option<String>,
    is_super: bool,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "👤 Create Admin".bright_blue().bold());
    println!();

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Name").interact_text()?,
    };

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    println!();
    println!("{}", "Admin details:".bright_white().bold());
    println!("  Name:  {}", name.cyan());
    println!("  Email: {}", email.cyan());
    println!(
        "  Super: {}",
        if is_super { "yes".yellow() } else { "no".normal() }
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this admin?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let service = AdminService::new(repo);
    let admin = service
        .register(AdminRegistration {
            name,
            email,
            password,
            is_super,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create admin: {}", e))?;

    println!();
    println!("{}", "✅ Admin created successfully!".green().bold());
    println!("  ID: {}", admin.id.to_string().bright_white().bold());
    println!();
    println!("{}", "Log in with:".bright_white());
    println!(
        "  curl -X POST http://localhost:3000/api/admin/login -H 'Content-Type: application/json' \\\n    -d '{{\"email\": \"{}\", \"password\": \"...\"}}'",
        admin.email.bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists all admins with status indicators.
async fn list_admins(repo: Arc<PgAdminRepository>) -> Result<()> {
    println!("{}", "👥 Admins".bright_blue().bold());
    println!();

    let admins = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list admins: {}", e))?;

    if admins.is_empty() {
        println!("{}", "  No admins found".bright_black());
        println!();
        println!(
            "  Create one with: {}",
            "admin admin create --super".bright_cyan()
        );
        println!();
        return Ok(());
    }

    println!(
        "  {:<5} {:<24} {:<30} {:<7} {}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Email".bright_white().bold(),
        "Super".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for admin in &admins {
        let status = if admin.is_active {
            "ACTIVE".green()
        } else {
            "INACTIVE".red()
        };

        println!(
            "  {:<5} {:<24} {:<30} {:<7} {}",
            admin.id.to_string().bright_black(),
            admin.name.cyan(),
            admin.email,
            if admin.is_super { "yes" } else { "" },
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        admins.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Deactivates an admin after confirmation and revokes every live session.
async fn deactivate_admin(
    repo: Arc<PgAdminRepository>,
    sessions: PgSessionRepository,
    id: i64,
) -> Result<()> {
    println!("{}", "🔒 Deactivate Admin".bright_blue().bold());
    println!();

    let admin = repo
        .find_by_id(id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Admin not found")?;

    if !admin.is_active {
        println!("{}", "⚠️  This admin is already inactive".yellow());
        return Ok(());
    }

    println!("  Admin: {}", admin.name.cyan());
    println!("  Email: {}", admin.email.bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Deactivate this admin?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.set_active(admin.id, false)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to deactivate admin: {}", e))?;

    let revoked = sessions
        .revoke_all(Role::Admin, admin.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke sessions: {}", e))?;

    println!();
    println!("{}", "✅ Admin deactivated".green().bold());
    println!("  Sessions revoked: {}", revoked.to_string().bright_white());
    println!();

    Ok(())
}

/// Dispatches module commands.
async fn handle_module_action(action: ModuleAction, pool: &PgPool) -> Result<()> {
    let repo = PgModuleRepository::new(Arc::new(pool.clone()));

    match action {
        ModuleAction::Create {
            name,
            description,
            sort_order,
        } => {
            let name = match name {
                Some(n) => n,
                None => Input::new().with_prompt("Module name").interact_text()?,
            };

            let module = repo
                .create(NewModule {
                    name: name.trim().to_string(),
                    description,
                    image: None,
                    sort_order,
                })
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create module: {}", e))?;

            println!(
                "{} {} (ID {})",
                "✅ Module created:".green().bold(),
                module.name.cyan(),
                module.id.to_string().bright_white()
            );
        }
        ModuleAction::List => {
            println!("{}", "📦 Modules".bright_blue().bold());
            println!();

            let modules = repo
                .list(false)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list modules: {}", e))?;

            for module in &modules {
                let status = if module.is_active {
                    "ACTIVE".green()
                } else {
                    "INACTIVE".red()
                };
                let vendors = repo
                    .count_vendors(module.id)
                    .await
                    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

                println!(
                    "  {:<5} {:<30} {:<6} vendors: {:<5} {}",
                    module.id.to_string().bright_black(),
                    module.name.cyan(),
                    module.sort_order,
                    vendors,
                    status
                );
            }

            println!();
            println!(
                "  Total: {}",
                modules.len().to_string().bright_white().bold()
            );
            println!();
        }
    }

    Ok(())
}

/// Displays system statistics.
///
/// Shows row counts per account type, products, and orders per status.
/// Carts (`new` orders) are reported separately from placed orders.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let counts = [
        ("Admins", "SELECT COUNT(*) FROM admins"),
        ("Modules", "SELECT COUNT(*) FROM modules"),
        ("Vendors", "SELECT COUNT(*) FROM vendors"),
        ("Products", "SELECT COUNT(*) FROM products WHERE deleted_at IS NULL"),
        ("Users", "SELECT COUNT(*) FROM users"),
    ];

    for (label, query) in counts {
        let count: i64 = sqlx::query_scalar(query).fetch_one(pool).await?;
        println!(
            "  {:<14} {}",
            format!("{label}:"),
            count.to_string().bright_green().bold()
        );
    }

    println!();
    println!("{}", "  Orders by status".bright_white().bold());

    let by_status: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM orders GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await?;

    if by_status.is_empty() {
        println!("{}", "    No orders yet".bright_black());
    }

    for (status, count) in by_status {
        let label = if status == "new" { "cart" } else { status.as_str() };
        println!(
            "    {:<12} {}",
            format!("{label}:"),
            count.to_string().bright_green().bold()
        );
    }
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

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
