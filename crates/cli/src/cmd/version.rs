use crate::output::{print_info, print_json, theme, OutputMode};
use serde::Serialize;

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
    arch: &'static str,
    os: &'static str,
    backends: [&'static str; 3],
}

pub fn execute(mode: OutputMode) {
    let info = VersionInfo {
        name: "gapless",
        version: env!("CARGO_PKG_VERSION"),
        arch: std::env::consts::ARCH,
        os: std::env::consts::OS,
        backends: ["postgres", "mysql", "sqlite"],
    };

    match mode {
        OutputMode::Json => {
            let _ = print_json(&info);
        }
        OutputMode::Human => {
            theme::print_header(&format!("{} v{}", info.name, info.version));
            print_info("Target", &format!("{}/{}", info.os, info.arch));
            print_info("Backends", &info.backends.join(", "));
        }
    }
}
