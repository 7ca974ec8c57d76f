pub mod format;

pub use format::{format_badge, format_flag, format_preview, truncate_string};
