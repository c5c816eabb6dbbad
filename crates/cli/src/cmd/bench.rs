use std::time::Instant;

use anyhow::{bail, Result};
use clap::Args;
use futures::future::try_join_all;
use gapless_sequences::{Databases, SequenceOptions, DEFAULT_NAME};
use indicatif::ProgressBar;

use super::helpers::{self, Source};
use crate::output::{print_info, print_json, print_success, progress, OutputMode};

#[derive(Args)]
pub struct BenchArgs {
    #[arg(long, default_value_t = 500, help = "Values allocated per task")]
    pub(crate) loops: u32,

    #[arg(long, default_value_t = 20, help = "Concurrent tasks")]
    pub(crate) tasks: u32,

    #[arg(long, default_value = DEFAULT_NAME, help = "Sequence name")]
    pub(crate) name: String,

    #[arg(long, help = "Use the wrapping code path; must exceed loops x tasks")]
    pub(crate) reset_value: Option<i64>,

    #[arg(long, help = "Database alias")]
    pub(crate) using: Option<String>,
}

impl BenchArgs {
    pub(crate) fn total(&self) -> i64 {
        i64::from(self.loops) * i64::from(self.tasks)
    }

    pub(crate) fn options(&self) -> Result<SequenceOptions> {
        let mut options = SequenceOptions::new();
        if let Some(reset) = self.reset_value {
            if reset <= self.total() {
                bail!("--reset-value must be greater than loops x tasks ({})", self.total());
            }
            options = options.reset_value(reset);
        }
        Ok(options)
    }
}

pub async fn execute(args: BenchArgs, mode: OutputMode, source: &Source) -> Result<()> {
    let options = args.options()?;
    let databases = helpers::connect(source).await?;
    let using = args.using.as_deref();

    // Restart the row at 0 whatever it held before, so the run yields 1..=total.
    databases.delete(&args.name, using).await?;
    databases
        .get_next_value(&args.name, &SequenceOptions::new().initial_value(0), using)
        .await?;

    let pb = match mode {
        OutputMode::Human => Some(progress::create(args.total() as u64, "allocating")),
        OutputMode::Json => None,
    };

    let started = Instant::now();
    let workers = (0..args.tasks).map(|_| {
        allocate_loop(&databases, &args.name, &options, using, args.loops, pb.as_ref())
    });
    let mut values: Vec<i64> = try_join_all(workers).await?.into_iter().flatten().collect();
    let elapsed = started.elapsed();
    databases.close().await;

    values.sort_unstable();
    let expected: Vec<i64> = (1..=args.total()).collect();
    if values != expected {
        bail!(
            "sequence {} produced {} values that are not exactly 1..={}",
            args.name,
            values.len(),
            args.total()
        );
    }

    let seconds = elapsed.as_secs_f64();
    let rate = args.total() as f64 / seconds;
    tracing::info!(sequence = %args.name, values = args.total(), seconds, "benchmark finished");

    if let Some(pb) = &pb {
        progress::finish(pb, "values verified gapless");
    }

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "name": args.name,
            "loops": args.loops,
            "tasks": args.tasks,
            "seconds": seconds,
            "values_per_second": rate,
        }))?,
        OutputMode::Human => {
            print_success(&format!(
                "{} loops x {} tasks in {:.2} seconds",
                args.loops, args.tasks, seconds
            ));
            print_info("Throughput", &format!("{rate:.0} values / second"));
        }
    }

    Ok(())
}

async fn allocate_loop(
    databases: &Databases,
    name: &str,
    options: &SequenceOptions,
    using: Option<&str>,
    loops: u32,
    pb: Option<&ProgressBar>,
) -> Result<Vec<i64>> {
    let mut values = Vec::with_capacity(loops as usize);
    for _ in 0..loops {
        values.push(databases.get_next_value(name, options, using).await?);
        if let Some(pb) = pb {
            pb.inc(1);
        }
    }
    Ok(values)
}
