use clap::{Parser, Subcommand};

/// Top-level CLI parser for the `ecoenergy` binary.
#[derive(Debug, Parser)]
#[command(name = "ecoenergy", version, about = "EcoEnergy operator tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// PostgreSQL connection string
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Skip applying pending migrations before running the command
    #[arg(long, global = true)]
    pub skip_migrations: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the demo organizations and one user per role
    SeedUsers(SeedUsersArgs),
    /// Create demo zones, devices and readings for the seeded organizations
    SeedData(SeedDataArgs),
    /// Print tenancy counts and users missing an organization
    Diagnose,
    /// Attach orphaned users to a default organization
    Repair,
}

#[derive(Debug, clap::Args)]
pub struct SeedUsersArgs {
    /// Password for the manager and client admin accounts
    #[arg(long, env = "ADMIN_PASSWORD", default_value = "Changeme123!", hide_env_values = true)]
    pub admin_password: String,

    /// Password for the technician account
    #[arg(long, env = "USER_PASSWORD", default_value = "Changeme456!", hide_env_values = true)]
    pub user_password: String,
}

#[derive(Debug, clap::Args)]
pub struct SeedDataArgs {
    /// Days of daily readings to create for each new device
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=365))]
    pub days: u32,
}
