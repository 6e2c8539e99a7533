// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modtag - community content tagging for tabletop RPG modules.
//!
//! This is the binary entry point: the API server, database administration,
//! and a small command-line voting client.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod client;
mod serve;
mod taxonomy;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use modtag_config::ModtagConfig;

/// Modtag - community content tagging for tabletop RPG modules.
#[derive(Parser, Debug)]
#[command(name = "modtag", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve,
    /// Create or upgrade the database schema.
    Migrate,
    /// Manage the tag taxonomy.
    Taxonomy {
        #[command(subcommand)]
        action: TaxonomyCommands,
    },
    /// List modules from the server.
    Modules {
        /// Substring filter over name, author, system and description.
        #[arg(long)]
        search: Option<String>,
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Vote on a module's content tags, replacing any earlier vote.
    Vote {
        /// Module id.
        module_id: String,
        /// Subcategory ids that apply to the module.
        #[arg(required = true)]
        subcategory_ids: Vec<String>,
    },
    /// Withdraw this client's vote on a module.
    Revote {
        /// Module id.
        module_id: String,
    },
    /// Show the local vote history.
    History {
        /// Remove records older than the configured retention first.
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand, Debug)]
enum TaxonomyCommands {
    /// Create categories and subcategories from a TOML file.
    Import {
        /// Path to the taxonomy file.
        file: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> ModtagConfig {
    let loaded = match path {
        Some(path) => modtag_config::load_and_validate_path(path),
        None => modtag_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            modtag_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("modtag: use --help for available commands");
        return;
    };
    let config = load_config(cli.config.as_ref());

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Migrate => serve::run_migrate(&config).await,
        Commands::Taxonomy {
            action: TaxonomyCommands::Import { file },
        } => taxonomy::run_import(&config, &file).await,
        Commands::Modules { search, page } => {
            client::run_modules(&config, page, search.as_deref()).await
        }
        Commands::Vote {
            module_id,
            subcategory_ids,
        } => client::run_vote(&config, &module_id, subcategory_ids).await,
        Commands::Revote { module_id } => client::run_revote(&config, &module_id).await,
        Commands::History { cleanup } => client::run_history(&config, cleanup),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
