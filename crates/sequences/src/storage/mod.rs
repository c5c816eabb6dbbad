pub mod migrator;
mod pool;

pub use migrator::{pending_migrations, run_migrations};
pub use pool::create_pool;
