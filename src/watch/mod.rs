// src/watch/mod.rs

//! Per-package source watching.
//!
//! Each package gets one [`SourceWatcher`] that turns filesystem events under
//! the package root into "this package changed" callbacks. It does **not**
//! batch or de-duplicate; the scheduling queue takes care of that.

pub mod path_utils;
pub mod watcher;

pub use watcher::{ChangeCallback, SourceWatcher};
