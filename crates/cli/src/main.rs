use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecoenergy_cli::cli::Cli;
use ecoenergy_cli::commands;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(error) = run().await {
        eprintln!("ecoenergy error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let database_url = cli
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set (or pass --database-url)")?;
    let pool = ecoenergy_db::create_pool(database_url)
        .await
        .context("failed to connect to database")?;

    if !cli.skip_migrations {
        ecoenergy_db::run_migrations(&pool)
            .await
            .context("failed to run database migrations")?;
    }

    let result = commands::dispatch(&cli.command, &pool).await;
    pool.close().await;
    result
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "ecoenergy_cli=debug"
    } else {
        "ecoenergy_cli=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
