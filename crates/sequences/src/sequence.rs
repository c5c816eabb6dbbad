use std::ops::Range;

use futures::stream::{self, Stream};
use sqlx::{Any, AnyConnection, Transaction};

use crate::allocator::{self, SequenceOptions};
use crate::error::Result;
use crate::registry::{Database, Databases};

/// A sequence bound to its name, range settings and database.
///
/// Configuration is validated and `using` resolved when the handle is built, so a bad
/// `reset_value` or unknown alias fails before any query runs.
#[derive(Debug, Clone)]
pub struct Sequence {
    name: String,
    options: SequenceOptions,
    database: Database,
}

impl Sequence {
    pub fn new(databases: &Databases, name: &str) -> Result<Self> {
        Self::with_options(databases, name, SequenceOptions::default(), None)
    }

    pub fn with_options(
        databases: &Databases,
        name: &str,
        options: SequenceOptions,
        using: Option<&str>,
    ) -> Result<Self> {
        allocator::validate_name(name)?;
        options.validate()?;
        let database = databases.get(using)?.clone();
        let options = database.apply_defaults(&options.nowait(false));
        Ok(Self {
            name: name.to_string(),
            options,
            database,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &SequenceOptions {
        &self.options
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Opens a transaction on the bound database for use with [`Sequence::get_next_value_in`].
    pub async fn begin(&self) -> Result<Transaction<'static, Any>> {
        self.database.begin().await
    }

    /// Allocates and commits a value in a transaction of its own.
    pub async fn get_next_value(&self, nowait: bool) -> Result<i64> {
        self.database
            .get_next_value(&self.name, &self.options.nowait(nowait))
            .await
    }

    pub async fn get_next_value_in(&self, conn: &mut AnyConnection, nowait: bool) -> Result<i64> {
        allocator::get_next_value(conn, &self.name, &self.options.nowait(nowait)).await
    }

    pub async fn get_next_values(&self, batch_size: i64) -> Result<Range<i64>> {
        self.database
            .get_next_values(batch_size, &self.name, &self.options)
            .await
    }

    pub async fn get_last_value(&self) -> Result<Option<i64>> {
        self.database.get_last_value(&self.name).await
    }

    pub async fn delete(&self) -> Result<bool> {
        self.database.delete(&self.name).await
    }

    /// Endless stream of freshly allocated values. Every poll commits one allocation.
    pub fn values(&self) -> impl Stream<Item = Result<i64>> {
        stream::unfold(self.clone(), |seq| async move {
            let value = seq.get_next_value(false).await;
            Some((value, seq))
        })
    }
}
