use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doable::{api, db};

#[derive(Parser)]
#[command(name = "doable")]
#[command(about = "Small todo-list REST service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the doable server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3001")]
        port: u16,

        /// Path to the SQLite database (defaults to the platform data dir,
        /// or DOABLE_DB if set)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "doable=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(path: Option<PathBuf>) -> anyhow::Result<db::Database> {
    let path = path.or_else(|| std::env::var("DOABLE_DB").ok().map(PathBuf::from));
    match path {
        Some(path) => db::Database::open(path),
        None => db::Database::open_default(),
    }
}

async fn serve(port: u16, db_path: Option<PathBuf>) -> anyhow::Result<()> {
    let db = open_database(db_path)?;
    db.migrate()?;

    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("doable server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port, db }) => serve(port, db).await,
        // Default: start server on the documented local defaults
        None => serve(3001, None).await,
    }
}
