//! sqlgate CLI - serve the SQL gateway or drive the store from the terminal

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use sqlgate::config::{self, GatewayConfig};
use sqlgate::server::{self, ServerConfig};
use sqlgate::ui::{self, Icons};
use sqlgate::{Database, QueryEngine, QueryResult, SchemaInspector};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sqlgate")]
#[command(version)]
#[command(about = "HTTP gateway to an embedded SQLite store")]
#[command(long_about = r#"
sqlgate exposes a SQLite database over HTTP:
  • POST /query   run SQL, one statement or a script (rows for SELECT, a change count otherwise)
  • GET  /schema  tables, columns, primary and foreign keys
  • POST /reset   delete the database file and start empty
  • GET  /        browser client, from the static directory (./static by default)

Example usage:
  sqlgate serve --port 8080 --database ./mydb.db
  sqlgate query --sql "SELECT * FROM users"
  sqlgate schema --json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./sqlgate.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP gateway
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Directory served for paths that match no route (default ./static, the bundled browser client)
        #[arg(short, long)]
        static_dir: Option<PathBuf>,

        /// Enforce declared foreign keys
        #[arg(long)]
        foreign_keys: bool,
    },

    /// Run SQL (one statement or a script) against the database
    Query {
        /// SQL text
        #[arg(short, long)]
        sql: String,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Enforce declared foreign keys
        #[arg(long)]
        foreign_keys: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the database schema
    Schema {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Delete the database file and reopen it empty
    Reset {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let settings = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Serve { port, database, static_dir, foreign_keys } => {
            let path = settings.database_path(database);
            tracing::info!("Opening database {:?}", path);
            let database = Database::open(path, settings.store_options(foreign_keys))?;

            let server_config = ServerConfig {
                port: settings.port(port),
                static_dir: settings.static_dir(static_dir),
                database,
            };

            tokio::runtime::Runtime::new()?.block_on(server::start_server(server_config))?;
        }

        Commands::Query { sql, database, foreign_keys, json } => {
            let database = Database::open(settings.database_path(database), settings.store_options(foreign_keys))?;
            let result = database.with_store(|store| QueryEngine::new(store).execute(&sql))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                match result {
                    QueryResult::Rows(rows) if rows.is_empty() => {
                        println!("{} No rows returned.", Icons::EMPTY);
                    }
                    QueryResult::Rows(rows) => {
                        println!("{}", ui::rows_table(&rows));
                        println!("{}", ui::dim(&format!("{} row(s)", rows.len())));
                    }
                    QueryResult::Exec(summary) => {
                        ui::success(&format!("{} (rows affected: {})", summary.message, summary.rows_affected));
                    }
                }
            }
        }

        Commands::Schema { database, json } => {
            let path = settings.database_path(database);
            let database = Database::open(&path, settings.store_options(false))?;
            let schema = database.with_store(|store| SchemaInspector::new(store).schema())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&schema)?);
            } else if schema.is_empty() {
                println!("{} No tables in {:?}", Icons::EMPTY, path);
            } else {
                ui::info(&format!("{} Database", Icons::DATABASE), &path.display().to_string());
                for table in &schema.tables {
                    ui::section(&table.name);
                    println!("{}", ui::schema_table(&table.columns));
                }
            }
        }

        Commands::Reset { database } => {
            let database = Database::open(settings.database_path(database), settings.store_options(false))?;
            database.reset()?;
            ui::success(server::routes::RESET_SUCCESS_MESSAGE);
        }

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            config::write_config(&path, &GatewayConfig::with_defaults(), force)?;
            println!("{} Wrote {:?}", Icons::ROCKET, path);
        }
    }

    Ok(())
}
