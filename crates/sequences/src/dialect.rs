use std::time::Duration;

use sqlx::AnyConnection;

use crate::error::{Result, SequenceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    LockUnavailable,
    Serialization,
    DuplicateRow,
    OutOfRange,
}

impl Dialect {
    pub fn of(conn: &AnyConnection) -> Result<Self> {
        Self::from_backend_name(conn.backend_name())
    }

    pub fn from_backend_name(backend: &str) -> Result<Self> {
        match backend {
            "PostgreSQL" => Ok(Self::Postgres),
            "MySQL" => Ok(Self::MySql),
            "SQLite" => Ok(Self::Sqlite),
            other => Err(SequenceError::UnsupportedBackend(other.to_string())),
        }
    }

    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(SequenceError::UnsupportedBackend(format!("url scheme {other:?}"))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    // SQLite has no row locks; the whole database is claimed for writing instead.
    pub(crate) fn locks_database(self) -> bool {
        self == Self::Sqlite
    }

    pub(crate) fn select_last(self) -> &'static str {
        match self {
            Self::Postgres => "SELECT last FROM sequences WHERE name = $1",
            Self::MySql | Self::Sqlite => "SELECT last FROM sequences WHERE name = ?",
        }
    }

    pub(crate) fn lock_row(self, nowait: bool) -> &'static str {
        match (self, nowait) {
            (Self::Postgres, false) => "SELECT last FROM sequences WHERE name = $1 FOR UPDATE",
            (Self::Postgres, true) => "SELECT last FROM sequences WHERE name = $1 FOR UPDATE NOWAIT",
            (Self::MySql, false) => "SELECT last FROM sequences WHERE name = ? FOR UPDATE",
            (Self::MySql, true) => "SELECT last FROM sequences WHERE name = ? FOR UPDATE NOWAIT",
            (Self::Sqlite, _) => "UPDATE sequences SET last = last WHERE name = ?",
        }
    }

    pub(crate) fn insert(self) -> &'static str {
        match self {
            Self::Postgres => "INSERT INTO sequences (name, last) VALUES ($1, $2)",
            Self::MySql | Self::Sqlite => "INSERT INTO sequences (name, last) VALUES (?, ?)",
        }
    }

    pub(crate) fn update(self) -> &'static str {
        match self {
            Self::Postgres => "UPDATE sequences SET last = $1 WHERE name = $2",
            Self::MySql | Self::Sqlite => "UPDATE sequences SET last = ? WHERE name = ?",
        }
    }

    pub(crate) fn delete(self) -> &'static str {
        match self {
            Self::Postgres => "DELETE FROM sequences WHERE name = $1",
            Self::MySql | Self::Sqlite => "DELETE FROM sequences WHERE name = ?",
        }
    }

    // Binds: name, value on insert, increment on conflict, then (RETURNING dialects) the
    // highest value the row may reach. Past it the conflict update is skipped and
    // RETURNING yields no row.
    pub(crate) fn upsert(self) -> &'static str {
        match self {
            Self::Postgres => {
                r#"INSERT INTO sequences (name, last)
                   VALUES ($1, $2)
                   ON CONFLICT (name)
                   DO UPDATE SET last = sequences.last + $3
                   WHERE sequences.last <= CAST($4 AS BIGINT) - $3
                   RETURNING last"#
            }
            // BIGINT overflow is an error (SQLSTATE 22003) on MySQL, never a silent wrap.
            Self::MySql => {
                r#"INSERT INTO sequences (name, last)
                   VALUES (?, ?)
                   ON DUPLICATE KEY UPDATE last = last + ?"#
            }
            // SQLite would turn an overflowing sum into a REAL and store it.
            Self::Sqlite => {
                r#"INSERT INTO sequences (name, last)
                   VALUES (?1, ?2)
                   ON CONFLICT (name)
                   DO UPDATE SET last = sequences.last + ?3
                   WHERE sequences.last <= ?4 - ?3
                   RETURNING last"#
            }
        }
    }

    pub(crate) fn upsert_returns_value(self) -> bool {
        self != Self::MySql
    }

    /// Per-connection statement bounding how long a blocked lock request waits.
    pub(crate) fn lock_timeout_statement(self, timeout: Duration) -> String {
        let millis = timeout.as_millis().max(1);
        match self {
            Self::Postgres => format!("SET lock_timeout = {millis}"),
            Self::MySql => {
                let seconds = millis.div_ceil(1000);
                format!("SET SESSION innodb_lock_wait_timeout = {seconds}")
            }
            Self::Sqlite => format!("PRAGMA busy_timeout = {}", millis.min(i32::MAX as u128)),
        }
    }

    pub(crate) fn record_migration(self) -> &'static str {
        match self {
            Self::Postgres => "INSERT INTO _sequence_migrations (filename) VALUES ($1)",
            Self::MySql | Self::Sqlite => "INSERT INTO _sequence_migrations (filename) VALUES (?)",
        }
    }

    /// Maps a database error onto the sequence taxonomy. `nowait` tells a refused lock
    /// request apart from a blocking wait that ran out of time.
    pub(crate) fn classify(self, err: sqlx::Error, name: &str, nowait: bool) -> SequenceError {
        let failure = match &err {
            sqlx::Error::Database(db) => {
                let code = db.code();
                self.failure_of(code.as_deref(), db.message(), db.is_unique_violation())
            }
            _ => None,
        };

        match failure {
            Some(Failure::LockUnavailable) => lock_error(name, nowait),
            Some(Failure::Serialization) => SequenceError::SerializationFailure {
                name: name.to_string(),
                message: err.to_string(),
            },
            Some(Failure::DuplicateRow) => {
                SequenceError::DuplicateInitialization { name: name.to_string() }
            }
            Some(Failure::OutOfRange) => SequenceError::Exhausted { name: name.to_string() },
            None => SequenceError::Sql(err),
        }
    }

    pub(crate) fn failure_of(self, code: Option<&str>, message: &str, unique: bool) -> Option<Failure> {
        if unique {
            return Some(Failure::DuplicateRow);
        }
        match self {
            Self::Postgres => match code? {
                "55P03" => Some(Failure::LockUnavailable),
                "40001" | "40P01" => Some(Failure::Serialization),
                "23505" => Some(Failure::DuplicateRow),
                "22003" => Some(Failure::OutOfRange),
                _ => None,
            },
            Self::MySql => {
                if code == Some("40001") {
                    Some(Failure::Serialization)
                } else if code == Some("22003") {
                    Some(Failure::OutOfRange)
                } else if message.contains("NOWAIT") || message.contains("Lock wait timeout") {
                    Some(Failure::LockUnavailable)
                } else if message.starts_with("Duplicate entry") {
                    Some(Failure::DuplicateRow)
                } else {
                    None
                }
            }
            Self::Sqlite => {
                let code: i32 = code?.parse().ok()?;
                match code {
                    // SQLITE_BUSY_SNAPSHOT: the read snapshot went stale before the write.
                    517 => Some(Failure::Serialization),
                    1555 | 2067 => Some(Failure::DuplicateRow),
                    _ if matches!(code & 0xff, 5 | 6) => Some(Failure::LockUnavailable),
                    _ => None,
                }
            }
        }
    }
}

fn lock_error(name: &str, nowait: bool) -> SequenceError {
    let name = name.to_string();
    if nowait {
        SequenceError::LockUnavailable { name }
    } else {
        SequenceError::LockTimeout { name }
    }
}
