// src/watch/mod.rs

//! Watching config dependencies.
//!
//! Turns filesystem changes to the files a configuration was derived from
//! into reload requests. It does **not** watch the templates or data sources
//! that the resolved configuration itself describes; that is the job of the
//! engine consuming the document.

pub mod matching;
pub mod watcher;

pub use matching::{absolutize, dependency_matches, watch_dirs};
pub use watcher::{WatcherHandle, spawn_dependency_watcher};
