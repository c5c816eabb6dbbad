use sqlx::AnyPool;

use crate::dialect::Dialect;

type Migration = (&'static str, &'static str);

const POSTGRES: &[Migration] = &[
    (
        "000_migration_tracking.sql",
        include_str!("../../../../migrations/postgres/000_migration_tracking.sql"),
    ),
    (
        "001_create_sequences.sql",
        include_str!("../../../../migrations/postgres/001_create_sequences.sql"),
    ),
    (
        "002_widen_last.sql",
        include_str!("../../../../migrations/postgres/002_widen_last.sql"),
    ),
];

const MYSQL: &[Migration] = &[
    (
        "000_migration_tracking.sql",
        include_str!("../../../../migrations/mysql/000_migration_tracking.sql"),
    ),
    (
        "001_create_sequences.sql",
        include_str!("../../../../migrations/mysql/001_create_sequences.sql"),
    ),
    (
        "002_widen_last.sql",
        include_str!("../../../../migrations/mysql/002_widen_last.sql"),
    ),
];

const SQLITE: &[Migration] = &[
    (
        "000_migration_tracking.sql",
        include_str!("../../../../migrations/sqlite/000_migration_tracking.sql"),
    ),
    (
        "001_create_sequences.sql",
        include_str!("../../../../migrations/sqlite/001_create_sequences.sql"),
    ),
];

fn migrations(dialect: Dialect) -> &'static [Migration] {
    match dialect {
        Dialect::Postgres => POSTGRES,
        Dialect::MySql => MYSQL,
        Dialect::Sqlite => SQLITE,
    }
}

async fn applied(pool: &AnyPool, dialect: Dialect) -> Result<Vec<String>, sqlx::Error> {
    let bootstrap = migrations(dialect)[0].1;
    sqlx::raw_sql(bootstrap).execute(pool).await?;

    sqlx::query_scalar("SELECT filename FROM _sequence_migrations")
        .fetch_all(pool)
        .await
}

pub async fn run_migrations(pool: &AnyPool, dialect: Dialect) -> Result<Vec<String>, sqlx::Error> {
    let applied = applied(pool, dialect).await?;
    let mut newly_applied = Vec::new();

    for (filename, sql) in &migrations(dialect)[1..] {
        if applied.iter().any(|a| a == filename) {
            continue;
        }
        sqlx::raw_sql(sql).execute(pool).await?;
        sqlx::query(dialect.record_migration())
            .bind(*filename)
            .execute(pool)
            .await?;
        tracing::info!(migration = %filename, dialect = dialect.name(), "migration applied");
        newly_applied.push(filename.to_string());
    }

    Ok(newly_applied)
}

pub async fn pending_migrations(pool: &AnyPool, dialect: Dialect) -> Result<Vec<String>, sqlx::Error> {
    let applied = applied(pool, dialect).await?;

    let pending: Vec<String> = migrations(dialect)[1..]
        .iter()
        .filter(|(name, _)| !applied.iter().any(|a| a == name))
        .map(|(name, _)| name.to_string())
        .collect();

    Ok(pending)
}
