use std::ops::Range;

use sqlx::{AnyConnection, Connection};

use crate::dialect::Dialect;
use crate::error::{Result, SequenceError};

pub const DEFAULT_NAME: &str = "default";
pub const MAX_NAME_LEN: usize = 100;

/// Per-call allocation settings.
///
/// `initial_value` only matters the first time a name is allocated. `reset_value` is not
/// persisted, so every caller of a wrapping sequence must pass the same pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceOptions {
    pub initial_value: i64,
    pub reset_value: Option<i64>,
    pub nowait: bool,
    pub upsert: bool,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            initial_value: 1,
            reset_value: None,
            nowait: false,
            upsert: false,
        }
    }
}

impl SequenceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_value(mut self, value: i64) -> Self {
        self.initial_value = value;
        self
    }

    pub fn reset_value(mut self, value: i64) -> Self {
        self.reset_value = Some(value);
        self
    }

    pub fn nowait(mut self, nowait: bool) -> Self {
        self.nowait = nowait;
        self
    }

    pub fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(reset) = self.reset_value {
            if reset <= self.initial_value {
                return Err(SequenceError::InvalidConfiguration(
                    "reset_value must be greater than initial_value".into(),
                ));
            }
        }
        Ok(())
    }
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SequenceError::InvalidConfiguration(
            "sequence name must not be empty".into(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(SequenceError::InvalidConfiguration(format!(
            "sequence name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Allocates the next value of `name` inside the transaction `conn` is in.
///
/// The value is only spent if the caller's transaction commits. Outside a transaction the
/// allocation commits on its own.
pub async fn get_next_value(
    conn: &mut AnyConnection,
    name: &str,
    options: &SequenceOptions,
) -> Result<i64> {
    validate_name(name)?;
    options.validate()?;
    allocate(conn, name, options, 1, i64::MAX).await
}

/// Allocates `batch_size` consecutive values in one locked update.
pub async fn get_next_values(
    conn: &mut AnyConnection,
    batch_size: i64,
    name: &str,
    options: &SequenceOptions,
) -> Result<Range<i64>> {
    validate_name(name)?;
    options.validate()?;
    if options.reset_value.is_some() {
        return Err(SequenceError::InvalidConfiguration(
            "reset_value and batch are incompatible".into(),
        ));
    }
    if batch_size < 0 {
        return Err(SequenceError::InvalidConfiguration(
            "batch size must not be negative".into(),
        ));
    }

    // A half-open range cannot end past i64::MAX, so a batch may not use the last value.
    let last = allocate(conn, name, options, batch_size, i64::MAX - 1).await?;
    let end = last + 1;
    Ok(end - batch_size..end)
}

/// Non-locking read of the last allocated value. Concurrent allocations may move it at any time.
pub async fn get_last_value(conn: &mut AnyConnection, name: &str) -> Result<Option<i64>> {
    validate_name(name)?;
    let dialect = Dialect::of(conn)?;

    sqlx::query_scalar::<_, i64>(dialect.select_last())
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| dialect.classify(e, name, false))
}

pub async fn delete(conn: &mut AnyConnection, name: &str) -> Result<bool> {
    validate_name(name)?;
    let dialect = Dialect::of(conn)?;

    let result = sqlx::query(dialect.delete())
        .bind(name)
        .execute(&mut *conn)
        .await
        .map_err(|e| dialect.classify(e, name, false))?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::info!(sequence = %name, "sequence deleted");
    }
    Ok(deleted)
}

async fn allocate(
    conn: &mut AnyConnection,
    name: &str,
    options: &SequenceOptions,
    increment: i64,
    ceiling: i64,
) -> Result<i64> {
    let dialect = Dialect::of(conn)?;
    let classify = |e: sqlx::Error| dialect.classify(e, name, options.nowait);

    // On first use the row stores the end of the first batch.
    let first = options
        .initial_value
        .checked_add(increment - 1)
        .filter(|first| *first <= ceiling)
        .ok_or_else(|| exhausted(name))?;

    // MySQL's upsert relies on BIGINT overflow errors, which only guard i64::MAX itself.
    let upsert_bounded = dialect.upsert_returns_value() || ceiling == i64::MAX;
    if options.upsert && options.reset_value.is_none() && !options.nowait && upsert_bounded {
        return upsert(conn, dialect, name, first, increment, ceiling).await;
    }

    let mut tx = conn.begin().await.map_err(classify)?;

    let next = match lock_row(&mut tx, dialect, name, options.nowait).await? {
        None => {
            sqlx::query(dialect.insert())
                .bind(name)
                .bind(first)
                .execute(&mut *tx)
                .await
                .map_err(classify)?;
            tracing::debug!(sequence = %name, initial = first, "sequence created");
            first
        }
        Some(last) => {
            let mut next = last.checked_add(increment).ok_or_else(|| exhausted(name))?;
            if let Some(reset) = options.reset_value {
                if next >= reset {
                    next = options.initial_value;
                }
            }
            if next > ceiling {
                return Err(exhausted(name));
            }
            sqlx::query(dialect.update())
                .bind(next)
                .bind(name)
                .execute(&mut *tx)
                .await
                .map_err(classify)?;
            next
        }
    };

    tx.commit().await.map_err(classify)?;

    tracing::debug!(sequence = %name, value = next, dialect = dialect.name(), "allocated sequence value");
    Ok(next)
}

async fn lock_row(
    conn: &mut AnyConnection,
    dialect: Dialect,
    name: &str,
    nowait: bool,
) -> Result<Option<i64>> {
    let classify = |e: sqlx::Error| dialect.classify(e, name, nowait);

    if dialect.locks_database() {
        claim_database(conn, dialect, name, nowait).await?;
        return sqlx::query_scalar::<_, i64>(dialect.select_last())
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
            .map_err(classify);
    }

    sqlx::query_scalar::<_, i64>(dialect.lock_row(nowait))
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(classify)
}

// A write statement takes SQLite's database-wide write lock even when it matches no row.
async fn claim_database(
    conn: &mut AnyConnection,
    dialect: Dialect,
    name: &str,
    nowait: bool,
) -> Result<()> {
    let classify = |e: sqlx::Error| dialect.classify(e, name, nowait);

    if !nowait {
        sqlx::query(dialect.lock_row(false))
            .bind(name)
            .execute(&mut *conn)
            .await
            .map_err(classify)?;
        return Ok(());
    }

    let timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
        .fetch_one(&mut *conn)
        .await
        .map_err(classify)?;
    sqlx::query("PRAGMA busy_timeout = 0")
        .execute(&mut *conn)
        .await
        .map_err(classify)?;

    let claimed = sqlx::query(dialect.lock_row(true))
        .bind(name)
        .execute(&mut *conn)
        .await;

    let restore = format!("PRAGMA busy_timeout = {timeout}");
    sqlx::query(&restore)
        .execute(&mut *conn)
        .await
        .map_err(classify)?;

    claimed.map_err(classify)?;
    Ok(())
}

async fn upsert(
    conn: &mut AnyConnection,
    dialect: Dialect,
    name: &str,
    first: i64,
    increment: i64,
    ceiling: i64,
) -> Result<i64> {
    let classify = |e: sqlx::Error| dialect.classify(e, name, false);

    let last = if dialect.upsert_returns_value() {
        // No row back means the conflict update was skipped at the ceiling.
        sqlx::query_scalar::<_, i64>(dialect.upsert())
            .bind(name)
            .bind(first)
            .bind(increment)
            .bind(ceiling)
            .fetch_optional(&mut *conn)
            .await
            .map_err(classify)?
            .ok_or_else(|| exhausted(name))?
    } else {
        let mut tx = conn.begin().await.map_err(classify)?;
        sqlx::query(dialect.upsert())
            .bind(name)
            .bind(first)
            .bind(increment)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        let last = sqlx::query_scalar::<_, i64>(dialect.select_last())
            .bind(name)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify)?;
        tx.commit().await.map_err(classify)?;
        last
    };

    tracing::debug!(sequence = %name, value = last, dialect = dialect.name(), "allocated sequence value via upsert");
    Ok(last)
}

fn exhausted(name: &str) -> SequenceError {
    SequenceError::Exhausted {
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = SequenceOptions::default();
        assert_eq!(options.initial_value, 1);
        assert_eq!(options.reset_value, None);
        assert!(!options.nowait);
        assert!(!options.upsert);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn reset_must_exceed_initial() {
        let err = SequenceOptions::new().reset_value(1).validate().unwrap_err();
        assert!(matches!(err, SequenceError::InvalidConfiguration(_)));

        let err = SequenceOptions::new()
            .initial_value(10)
            .reset_value(5)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("reset_value"));

        assert!(SequenceOptions::new()
            .initial_value(0)
            .reset_value(60)
            .validate()
            .is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let options = SequenceOptions::new()
            .initial_value(0)
            .reset_value(60)
            .nowait(true)
            .upsert(true);
        assert_eq!(options.initial_value, 0);
        assert_eq!(options.reset_value, Some(60));
        assert!(options.nowait);
        assert!(options.upsert);
    }

    #[test]
    fn names_are_validated() {
        assert!(validate_name(DEFAULT_NAME).is_ok());
        assert!(matches!(
            validate_name(""),
            Err(SequenceError::InvalidConfiguration(_))
        ));
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }
}
