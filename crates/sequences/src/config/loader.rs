use std::path::Path;

use super::schema::{default_database, DatabaseConfig, SequencesConfig};
use crate::dialect::Dialect;

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Validation(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

pub fn load_from_file(path: &Path) -> Result<SequencesConfig, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}

pub fn load_from_str(yaml: &str) -> Result<SequencesConfig, LoadError> {
    let cfg: SequencesConfig = serde_yaml::from_str(yaml)?;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn from_env() -> Result<SequencesConfig, LoadError> {
    from_lookup(|key| std::env::var(key).ok())
}

pub(crate) fn from_lookup<F>(lookup: F) -> Result<SequencesConfig, LoadError>
where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup("DATABASE_URL")
        .ok_or_else(|| LoadError::Validation("DATABASE_URL is not set".into()))?;

    let mut database = DatabaseConfig::new(url);
    if let Some(raw) = lookup("GAPLESS_MAX_CONNECTIONS") {
        database.max_connections = raw.parse().map_err(|_| {
            LoadError::Validation(format!("GAPLESS_MAX_CONNECTIONS must be a number, got {raw:?}"))
        })?;
    }

    let cfg = SequencesConfig::single(&default_database(), database);
    validate(&cfg)?;
    Ok(cfg)
}

pub fn validate(cfg: &SequencesConfig) -> Result<(), LoadError> {
    if cfg.databases.is_empty() {
        return Err(LoadError::Validation("at least one database must be configured".into()));
    }
    if !cfg.databases.contains_key(&cfg.default_database) {
        return Err(LoadError::Validation(format!(
            "default_database {:?} is not a configured database",
            cfg.default_database
        )));
    }
    for (alias, db) in &cfg.databases {
        if db.url.is_empty() {
            return Err(LoadError::Validation(format!("databases.{alias}.url must not be empty")));
        }
        if Dialect::from_url(&db.url).is_err() {
            return Err(LoadError::Validation(format!(
                "databases.{alias}.url has an unsupported scheme"
            )));
        }
        if db.max_connections == 0 {
            return Err(LoadError::Validation(format!(
                "databases.{alias}.max_connections must be > 0"
            )));
        }
        if db.lock_timeout_ms == Some(0) {
            return Err(LoadError::Validation(format!(
                "databases.{alias}.lock_timeout_ms must be > 0 when set"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn valid_config() {
        let yaml = r#"
databases:
  default:
    url: postgres://localhost/app
  archive:
    url: mysql://localhost/archive
    max_connections: 2
"#;
        let cfg = load_from_str(yaml).unwrap();
        assert_eq!(cfg.databases.len(), 2);
        assert_eq!(cfg.databases["archive"].max_connections, 2);
    }

    #[test]
    fn empty_databases_rejected() {
        let err = load_from_str("databases: {}\n").unwrap_err();
        assert!(err.to_string().contains("at least one database"));
    }

    #[test]
    fn unknown_default_rejected() {
        let yaml = r#"
default_database: ledger
databases:
  default:
    url: postgres://localhost/app
"#;
        let err = load_from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("ledger"));
    }

    #[test]
    fn unsupported_scheme_rejected() {
        let yaml = r#"
databases:
  default:
    url: redis://localhost
"#;
        let err = load_from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn zero_connections_rejected() {
        let yaml = r#"
databases:
  default:
    url: "sqlite::memory:"
    max_connections: 0
"#;
        let err = load_from_str(yaml).unwrap_err();
        assert!(matches!(err, LoadError::Validation(_)));
        assert!(err.to_string().contains("max_connections"));
    }

    #[test]
    fn zero_lock_timeout_rejected() {
        let yaml = r#"
databases:
  default:
    url: sqlite://seq.db
    lock_timeout_ms: 0
"#;
        let err = load_from_str(yaml).unwrap_err();
        assert!(matches!(err, LoadError::Validation(_)));
        assert!(err.to_string().contains("lock_timeout_ms"));

        let yaml = r#"
databases:
  default:
    url: sqlite://seq.db
    lock_timeout_ms: 250
"#;
        let cfg = load_from_str(yaml).unwrap();
        assert_eq!(cfg.databases["default"].lock_timeout_ms, Some(250));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = load_from_str("databases: [").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn load_from_file_works() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sequences.yml");
        std::fs::write(&path, "databases:\n  default:\n    url: sqlite://seq.db\n").unwrap();
        let cfg = load_from_file(&path).unwrap();
        assert_eq!(cfg.databases["default"].url, "sqlite://seq.db");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_from_file(Path::new("/nonexistent/sequences.yml")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn env_lookup() {
        let vars: HashMap<&str, &str> = [
            ("DATABASE_URL", "postgres://localhost/app"),
            ("GAPLESS_MAX_CONNECTIONS", "12"),
        ]
        .into_iter()
        .collect();
        let cfg = from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.default_database, "default");
        assert_eq!(cfg.databases["default"].max_connections, 12);
    }

    #[test]
    fn env_lookup_requires_url() {
        let err = from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn env_lookup_rejects_bad_number() {
        let err = from_lookup(|k| match k {
            "DATABASE_URL" => Some("sqlite::memory:".into()),
            _ => Some("many".into()),
        })
        .unwrap_err();
        assert!(err.to_string().contains("GAPLESS_MAX_CONNECTIONS"));
    }
}
