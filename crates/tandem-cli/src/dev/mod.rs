//! Development mode support: file watching and incremental state.

pub mod watcher;

pub use watcher::{FileChange, FileWatcher};
