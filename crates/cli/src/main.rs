use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "moneta", about = "Local import pipeline for bank and payment CSV exports.")]
struct Cli {
    /// Database file (default: the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and seed the built-in categories and rules.
    Init,
    /// Import one or more statement files.
    Import {
        /// CSV files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Account to import into (default: derived from the detected format)
        #[arg(long)]
        account: Option<String>,
        /// Print each report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage categorization rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
}

#[derive(Subcommand)]
enum AccountsCommands {
    /// List all accounts.
    List,
}

#[derive(Subcommand)]
enum RulesCommands {
    /// List rules in evaluation order.
    List,
    /// Add a categorization rule.
    Add {
        /// Pattern matched case-insensitively against descriptions
        pattern: String,
        /// Category name to assign
        #[arg(long)]
        category: String,
        /// Rule priority (higher wins)
        #[arg(long, default_value = "0")]
        priority: i32,
    },
    /// Delete a rule by ID (shown in `moneta rules list`).
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum CategoriesCommands {
    /// List the category tree.
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_path = match cli.db {
        Some(path) => path,
        None => commands::default_db_path()?,
    };

    match cli.command {
        Commands::Init => commands::init(&db_path).await,
        Commands::Import {
            files,
            account,
            json,
        } => commands::import(&db_path, &files, account.as_deref(), json).await,
        Commands::Accounts { command } => match command {
            AccountsCommands::List => commands::accounts_list(&db_path).await,
        },
        Commands::Rules { command } => match command {
            RulesCommands::List => commands::rules_list(&db_path).await,
            RulesCommands::Add {
                pattern,
                category,
                priority,
            } => commands::rules_add(&db_path, &pattern, &category, priority).await,
            RulesCommands::Delete { id } => commands::rules_delete(&db_path, id).await,
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::List => commands::categories_list(&db_path).await,
        },
    }
}
