use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::helpers::{self, Source};
use crate::output::{build_table, print_json, print_success, theme, OutputMode};

#[derive(Args)]
pub struct MigrateArgs {
    #[arg(long, help = "Database alias (defaults to every configured database)")]
    using: Option<String>,

    #[arg(long, help = "List pending migrations without applying them")]
    dry_run: bool,
}

#[derive(Serialize)]
struct MigrationReport {
    database: String,
    dialect: &'static str,
    migrations: Vec<String>,
}

pub async fn execute(args: MigrateArgs, mode: OutputMode, source: &Source) -> Result<()> {
    let databases = helpers::connect(source).await?;

    let aliases: Vec<String> = match &args.using {
        Some(alias) => vec![alias.clone()],
        None => databases.aliases().into_iter().map(String::from).collect(),
    };

    let mut reports = Vec::with_capacity(aliases.len());
    for alias in &aliases {
        let db = databases.get(Some(alias.as_str()))?;
        let migrations = if args.dry_run {
            db.pending_migrations().await?
        } else {
            db.run_migrations().await?
        };
        reports.push(MigrationReport {
            database: alias.clone(),
            dialect: db.dialect().name(),
            migrations,
        });
    }
    databases.close().await;

    match mode {
        OutputMode::Json => print_json(&reports)?,
        OutputMode::Human => {
            let verb = if args.dry_run { "pending" } else { "applied" };
            if reports.iter().all(|r| r.migrations.is_empty()) {
                print_success(&format!("Schema up to date, nothing {verb}"));
                return Ok(());
            }
            theme::print_header(if args.dry_run { "Pending migrations" } else { "Applied migrations" });
            let mut table = build_table(&["Database", "Dialect", "Migration"]);
            for report in &reports {
                for migration in &report.migrations {
                    table.add_row(vec![report.database.as_str(), report.dialect, migration.as_str()]);
                }
            }
            println!("{table}");
        }
    }

    Ok(())
}
