mod seed;

use clap::{Parser, Subcommand, ValueEnum};
use sf_events::bus::EventBus;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "sf")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve,
    /// Upsert the embedded content sets into the database.
    Seed {
        /// Restrict to a single content set.
        #[arg(long)]
        only: Option<SeedSet>,
        /// Database path override.
        #[arg(long)]
        db: Option<String>,
    },
    /// Print the OpenAPI document.
    Openapi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SeedSet {
    Categories,
    Tips,
    Packages,
    Activities,
    Templates,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("SKILLFORGE_LOG")
                .unwrap_or_else(|_| "sf=info,sf_serve=info,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve => {
            sf_serve::openapi::ensure_initialized();
            let db_path = db_path();
            if let Some(parent) = Path::new(&db_path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let port = std::env::var("SKILLFORGE_PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(4870);
            let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
            let state = sf_serve::AppState {
                db_path: db_path.clone(),
                event_bus: EventBus::new(1024),
                idempotency: sf_serve::IdempotencyLocks::new(),
            };
            if let Err(err) = purge_idempotency(&db_path) {
                tracing::warn!(error = %err, "idempotency cleanup failed");
            }
            if let Err(err) = sf_serve::serve(state, addr).await {
                eprintln!("serve error: {err}");
            }
        }
        Command::Seed { only, db } => {
            let db_path = db.unwrap_or_else(db_path);
            if let Some(parent) = Path::new(&db_path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(err) = seed::run(&db_path, only) {
                eprintln!("seed error: {err}");
                std::process::exit(1);
            }
        }
        Command::Openapi => {
            println!("{}", sf_serve::openapi::generate_spec());
        }
    }
}

fn db_path() -> String {
    std::env::var("SKILLFORGE_DB_PATH").unwrap_or_else(|_| ".skillforge/skillforge.db".to_string())
}

fn purge_idempotency(path: &str) -> Result<(), String> {
    let conn = sf_db::schema::open_and_migrate(path).map_err(|err| err.to_string())?;
    let store = sf_db::idempotency::IdempotencyStore::new(&conn);
    store
        .purge_expired(chrono::Utc::now())
        .map_err(|err| err.to_string())?;
    Ok(())
}
