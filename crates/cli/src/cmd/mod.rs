pub(crate) mod bench;
mod delete;
pub(crate) mod helpers;
mod last;
mod migrate;
mod next;
mod version;

use anyhow::Result;
use clap::Subcommand;

use helpers::Source;

#[derive(Subcommand)]
pub enum Commands {
    /// Apply pending schema migrations
    Migrate(migrate::MigrateArgs),
    /// Allocate the next value (or batch) of a sequence
    Next(next::NextArgs),
    /// Show the last allocated value without locking
    Last(last::LastArgs),
    /// Remove a sequence so it restarts from its initial value
    Delete(delete::DeleteArgs),
    /// Concurrent allocation benchmark
    Bench(bench::BenchArgs),
    Version,
}

pub async fn run(opts: crate::Opts) -> Result<()> {
    let mode = opts.output_mode();
    let source = Source {
        config: opts.config,
        database_url: opts.database_url,
    };
    match opts.cmd {
        Commands::Migrate(args) => migrate::execute(args, mode, &source).await,
        Commands::Next(args) => next::execute(args, mode, &source).await,
        Commands::Last(args) => last::execute(args, mode, &source).await,
        Commands::Delete(args) => delete::execute(args, mode, &source).await,
        Commands::Bench(args) => bench::execute(args, mode, &source).await,
        Commands::Version => {
            version::execute(mode);
            Ok(())
        }
    }
}
