use indicatif::{ProgressBar, ProgressStyle};

pub fn create(total: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::with_template("  {spinner:.cyan} [{bar:40.cyan/dim}] {pos}/{len} {per_sec} {msg}")
    {
        pb.set_style(style.progress_chars("━╸─"));
    }
    pb.set_message(msg.to_string());
    pb
}

pub fn finish(pb: &ProgressBar, msg: &str) {
    if let Ok(style) = ProgressStyle::with_template("  {msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(format!("\x1b[32;1m✓\x1b[0m {msg}"));
}
