use anyhow::Result;
use clap::Args;
use gapless_sequences::{SequenceOptions, DEFAULT_NAME};

use super::helpers::{self, Source};
use crate::output::{print_batch, print_json, print_sequence, print_success, OutputMode};

#[derive(Args)]
pub struct NextArgs {
    #[arg(default_value = DEFAULT_NAME, help = "Sequence name")]
    pub(crate) name: String,

    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub(crate) initial_value: i64,

    #[arg(long, allow_negative_numbers = true, help = "Wrap back to the initial value on reaching this")]
    pub(crate) reset_value: Option<i64>,

    #[arg(long, help = "Allocate this many consecutive values")]
    pub(crate) batch: Option<i64>,

    #[arg(long, help = "Fail instead of waiting when the sequence is locked")]
    pub(crate) nowait: bool,

    #[arg(long, help = "Database alias")]
    pub(crate) using: Option<String>,
}

impl NextArgs {
    pub(crate) fn options(&self) -> SequenceOptions {
        let mut options = SequenceOptions::new()
            .initial_value(self.initial_value)
            .nowait(self.nowait);
        options.reset_value = self.reset_value;
        options
    }
}

pub async fn execute(args: NextArgs, mode: OutputMode, source: &Source) -> Result<()> {
    let databases = helpers::connect(source).await?;
    let options = args.options();
    let using = args.using.as_deref();

    let values: Vec<i64> = match args.batch {
        Some(batch) => databases
            .get_next_values(batch, &args.name, &options, using)
            .await?
            .collect(),
        None => vec![databases.get_next_value(&args.name, &options, using).await?],
    };
    databases.close().await;

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "name": args.name,
            "values": values,
        }))?,
        OutputMode::Human => match values.as_slice() {
            [] => print_success(&format!("No values allocated from {}", args.name)),
            [value] => print_sequence(&args.name, Some(*value)),
            [first, .., last] => print_batch(&args.name, &(*first..=*last)),
        },
    }

    Ok(())
}
