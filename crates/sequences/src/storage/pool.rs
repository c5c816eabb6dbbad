use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

/// `session_setup` runs once on every new connection, before it is handed out.
pub async fn create_pool(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
    session_setup: Option<String>,
) -> Result<AnyPool, sqlx::Error> {
    sqlx::any::install_default_drivers();

    let mut options = AnyPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout);

    if let Some(sql) = session_setup {
        options = options.after_connect(move |conn, _meta| {
            let sql = sql.clone();
            Box::pin(async move {
                sqlx::Executor::execute(&mut *conn, sqlx::raw_sql(&sql)).await?;
                Ok(())
            })
        });
    }

    options.connect(url).await
}
