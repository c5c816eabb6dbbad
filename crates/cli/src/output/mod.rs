pub(crate) mod format;
pub mod progress;
mod table;
pub mod theme;

pub use format::{
    print_batch, print_error, print_info, print_json, print_sequence, print_success, OutputMode,
};
pub use table::build_table;
