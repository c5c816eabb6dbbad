use anyhow::{Context, Result};
use gapless_sequences::config::{self, DatabaseConfig, SequencesConfig};
use gapless_sequences::Databases;
use std::path::PathBuf;

/// Where the CLI finds its databases, from the global flags.
#[derive(Debug, Default, Clone)]
pub struct Source {
    pub config: Option<String>,
    pub database_url: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        return dir.join("gapless").join("sequences.yml");
    }
    PathBuf::from("/etc/gapless/sequences.yml")
}

pub fn load_config(config_path: Option<&str>) -> Result<SequencesConfig> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    config::load_from_file(&path).with_context(|| format!("loading config from {}", path.display()))
}

/// `--database-url`, then `--config`, then `DATABASE_URL`, then the default config file.
pub fn resolve_config(source: &Source) -> Result<SequencesConfig> {
    if let Some(url) = &source.database_url {
        let cfg = SequencesConfig::single("default", DatabaseConfig::new(url.as_str()));
        config::validate(&cfg).context("invalid --database-url")?;
        tracing::debug!("using database from --database-url");
        return Ok(cfg);
    }
    if let Some(path) = &source.config {
        return load_config(Some(path));
    }
    if std::env::var_os("DATABASE_URL").is_some() {
        tracing::debug!("using database from DATABASE_URL");
        return config::from_env().context("reading DATABASE_URL");
    }
    load_config(None)
}

pub async fn connect(source: &Source) -> Result<Databases> {
    let cfg = resolve_config(source)?;
    Databases::connect(&cfg)
        .await
        .context("connecting to configured databases")
}
