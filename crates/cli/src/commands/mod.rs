//! Command handlers. Each takes a pool and returns a report the binary prints.

pub mod diagnose;
pub mod repair;
pub mod seed_data;
pub mod seed_users;

use ecoenergy_db::DbPool;

use crate::cli::Commands;

/// Organizations created by `seed-users` and populated by `seed-data`.
pub const TECHCORP: &str = "TechCorp S.A.";
pub const GREENENERGY: &str = "GreenEnergy Ltda.";

/// Dispatch a parsed command to its handler.
pub async fn dispatch(command: &Commands, pool: &DbPool) -> anyhow::Result<()> {
    match command {
        Commands::SeedUsers(args) => {
            let report = seed_users::run(pool, &args.admin_password, &args.user_password).await?;
            print!("{report}");
        }
        Commands::SeedData(args) => {
            let report = seed_data::run(pool, args.days).await?;
            print!("{report}");
        }
        Commands::Diagnose => {
            let report = diagnose::run(pool).await?;
            print!("{report}");
        }
        Commands::Repair => {
            let report = repair::run(pool).await?;
            print!("{report}");
        }
    }
    Ok(())
}
