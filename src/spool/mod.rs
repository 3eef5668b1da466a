pub mod cache;
pub mod format;

pub use cache::{Snapshot, SpoolCache, Stage};
pub use format::{compact_json, JsonLayout};
