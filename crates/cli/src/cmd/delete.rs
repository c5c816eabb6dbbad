use anyhow::Result;
use clap::Args;

use super::helpers::{self, Source};
use crate::output::{print_error, print_json, print_success, OutputMode};

#[derive(Args)]
pub struct DeleteArgs {
    #[arg(help = "Sequence name")]
    pub(crate) name: String,

    #[arg(long, help = "Database alias")]
    pub(crate) using: Option<String>,
}

pub async fn execute(args: DeleteArgs, mode: OutputMode, source: &Source) -> Result<()> {
    let databases = helpers::connect(source).await?;
    let deleted = databases.delete(&args.name, args.using.as_deref()).await?;
    databases.close().await;

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "name": args.name,
            "deleted": deleted,
        }))?,
        OutputMode::Human => {
            if deleted {
                print_success(&format!("Deleted sequence {}", args.name));
            } else {
                print_error(&format!("No sequence named {}", args.name));
            }
        }
    }

    Ok(())
}
