use std::ops::RangeInclusive;

use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

pub fn print_info(label: &str, value: &str) {
    println!("  {}: {}", label.bold(), value);
}

/// `name = value`, or a dimmed marker for a sequence that has no row yet.
pub fn sequence_line(name: &str, value: Option<i64>) -> String {
    match value {
        Some(v) => format!("{} = {}", name.cyan().bold(), v.to_string().bright_white().bold()),
        None => format!("{} = {}", name.cyan().bold(), "unused".dimmed()),
    }
}

pub fn batch_line(name: &str, values: &RangeInclusive<i64>) -> String {
    let count = values.end() - values.start() + 1;
    format!(
        "{} = {}..={} ({count} values)",
        name.cyan().bold(),
        values.start().to_string().bright_white().bold(),
        values.end().to_string().bright_white().bold(),
    )
}

pub fn print_sequence(name: &str, value: Option<i64>) {
    println!("  {}", sequence_line(name, value));
}

pub fn print_batch(name: &str, values: &RangeInclusive<i64>) {
    println!("  {}", batch_line(name, values));
}
