mod listing;

pub use listing::{unlisted_artifacts, write_catalog, write_check_report};
