use bitnun_payments::config::{Backend, RawSettings, Settings};
use bitnun_payments::interfaces::http::serve_with_shutdown;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about = "BitnunEco payment intake service", long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    bind_addr: String,

    /// Public site URL, used for processor redirects.
    #[arg(long, env = "NEXT_PUBLIC_SITE_URL", default_value = "http://localhost:3000")]
    site_url: String,

    /// Supabase project URL.
    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: Option<String>,

    /// Supabase service-role key.
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    supabase_key: Option<String>,

    /// Stripe secret key.
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    stripe_secret_key: Option<String>,

    /// Upper bound for each call to the ledger or the processor, in milliseconds.
    #[arg(long, env = "EXTERNAL_CALL_TIMEOUT_MS", default_value_t = 10_000)]
    call_timeout_ms: u64,

    /// Use the in-memory ledger and processor instead of the hosted services.
    #[arg(long)]
    in_memory: bool,

    /// Initial balance for the in-memory ledger, as user=amount (repeatable).
    #[arg(long = "seed-balance", value_name = "USER=AMOUNT")]
    seed_balances: Vec<String>,

    /// Load environment variables from this file before reading configuration.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON log output.
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,
}

impl From<Cli> for RawSettings {
    fn from(cli: Cli) -> Self {
        Self {
            bind_addr: cli.bind_addr,
            site_url: cli.site_url,
            call_timeout_ms: cli.call_timeout_ms,
            in_memory: cli.in_memory,
            supabase_url: cli.supabase_url,
            supabase_key: cli.supabase_key,
            stripe_secret_key: cli.stripe_secret_key,
            seed_balances: cli.seed_balances,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let mut cli = Cli::parse();
    if let Some(path) = &cli.env_file {
        dotenvy::from_path(path).into_diagnostic()?;
        // Parse again so env-backed flags pick up the file's values.
        cli = Cli::parse();
    }
    init_tracing(&cli.log_level, cli.json_logs);

    let settings = Settings::validate(cli.into()).into_diagnostic()?;
    if matches!(settings.backend, Backend::InMemory { .. }) {
        warn!("Running with the in-memory ledger and processor; nothing is persisted");
    }
    let state = settings.build_state().into_diagnostic()?;

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .into_diagnostic()?;
    serve_with_shutdown(listener, state, shutdown_signal())
        .await
        .into_diagnostic()?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }
}
