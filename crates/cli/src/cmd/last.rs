use anyhow::Result;
use clap::Args;
use gapless_sequences::DEFAULT_NAME;

use super::helpers::{self, Source};
use crate::output::{print_json, print_sequence, OutputMode};

#[derive(Args)]
pub struct LastArgs {
    #[arg(default_value = DEFAULT_NAME, help = "Sequence name")]
    pub(crate) name: String,

    #[arg(long, help = "Database alias")]
    pub(crate) using: Option<String>,
}

pub async fn execute(args: LastArgs, mode: OutputMode, source: &Source) -> Result<()> {
    let databases = helpers::connect(source).await?;
    let last = databases
        .get_last_value(&args.name, args.using.as_deref())
        .await?;
    databases.close().await;

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "name": args.name,
            "last": last,
        }))?,
        OutputMode::Human => print_sequence(&args.name, last),
    }

    Ok(())
}
