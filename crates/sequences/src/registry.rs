use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use sqlx::{Any, AnyPool, Transaction};

use crate::allocator::{self, SequenceOptions};
use crate::config::{DatabaseConfig, SequencesConfig};
use crate::dialect::Dialect;
use crate::error::{Result, SequenceError};
use crate::storage;

/// One configured database: an independent sequence namespace.
#[derive(Debug, Clone)]
pub struct Database {
    alias: String,
    pool: AnyPool,
    dialect: Dialect,
    upsert: bool,
}

impl Database {
    pub async fn connect(alias: &str, config: &DatabaseConfig) -> Result<Self> {
        let dialect = Dialect::from_url(&config.url)?;
        let session_setup = config
            .lock_timeout()
            .map(|timeout| dialect.lock_timeout_statement(timeout));
        let pool = storage::create_pool(
            &config.url,
            config.max_connections,
            config.acquire_timeout(),
            session_setup,
        )
        .await?;
        tracing::info!(database = %alias, dialect = dialect.name(), "database connected");
        Ok(Self::from_pool(alias, pool, dialect).with_upsert(config.upsert))
    }

    pub fn from_pool(alias: &str, pool: AnyPool, dialect: Dialect) -> Self {
        Self {
            alias: alias.to_string(),
            pool,
            dialect,
            upsert: false,
        }
    }

    pub fn with_upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Any>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn run_migrations(&self) -> Result<Vec<String>> {
        Ok(storage::run_migrations(&self.pool, self.dialect).await?)
    }

    pub async fn pending_migrations(&self) -> Result<Vec<String>> {
        Ok(storage::pending_migrations(&self.pool, self.dialect).await?)
    }

    pub(crate) fn apply_defaults(&self, options: &SequenceOptions) -> SequenceOptions {
        let mut options = *options;
        options.upsert |= self.upsert;
        options
    }

    pub async fn get_next_value(&self, name: &str, options: &SequenceOptions) -> Result<i64> {
        let options = self.apply_defaults(options);
        let mut conn = self.pool.acquire().await?;
        allocator::get_next_value(&mut conn, name, &options).await
    }

    pub async fn get_next_values(
        &self,
        batch_size: i64,
        name: &str,
        options: &SequenceOptions,
    ) -> Result<Range<i64>> {
        let options = self.apply_defaults(options);
        let mut conn = self.pool.acquire().await?;
        allocator::get_next_values(&mut conn, batch_size, name, &options).await
    }

    pub async fn get_last_value(&self, name: &str) -> Result<Option<i64>> {
        let mut conn = self.pool.acquire().await?;
        allocator::get_last_value(&mut conn, name).await
    }

    pub async fn delete(&self, name: &str) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        allocator::delete(&mut conn, name).await
    }
}

/// The `using` registry: database aliases mapped to pools, plus the alias used when none is given.
#[derive(Debug, Clone)]
pub struct Databases {
    default_alias: String,
    databases: Arc<HashMap<String, Database>>,
}

impl Databases {
    pub async fn connect(config: &SequencesConfig) -> Result<Self> {
        let mut databases = Vec::with_capacity(config.databases.len());
        for (alias, db_config) in &config.databases {
            databases.push(Database::connect(alias, db_config).await?);
        }
        Self::new(&config.default_database, databases)
    }

    pub fn new(default_alias: &str, databases: Vec<Database>) -> Result<Self> {
        let databases: HashMap<String, Database> = databases
            .into_iter()
            .map(|db| (db.alias.clone(), db))
            .collect();
        if !databases.contains_key(default_alias) {
            return Err(SequenceError::UnknownDatabase(default_alias.to_string()));
        }
        Ok(Self {
            default_alias: default_alias.to_string(),
            databases: Arc::new(databases),
        })
    }

    pub fn default_alias(&self) -> &str {
        &self.default_alias
    }

    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.databases.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }

    pub fn get(&self, using: Option<&str>) -> Result<&Database> {
        let alias = using.unwrap_or(self.default_alias.as_str());
        self.databases
            .get(alias)
            .ok_or_else(|| SequenceError::UnknownDatabase(alias.to_string()))
    }

    pub async fn get_next_value(
        &self,
        name: &str,
        options: &SequenceOptions,
        using: Option<&str>,
    ) -> Result<i64> {
        self.get(using)?.get_next_value(name, options).await
    }

    pub async fn get_next_values(
        &self,
        batch_size: i64,
        name: &str,
        options: &SequenceOptions,
        using: Option<&str>,
    ) -> Result<Range<i64>> {
        self.get(using)?.get_next_values(batch_size, name, options).await
    }

    pub async fn get_last_value(&self, name: &str, using: Option<&str>) -> Result<Option<i64>> {
        self.get(using)?.get_last_value(name).await
    }

    pub async fn delete(&self, name: &str, using: Option<&str>) -> Result<bool> {
        self.get(using)?.delete(name).await
    }

    pub async fn close(&self) {
        for db in self.databases.values() {
            db.pool.close().await;
        }
    }
}
