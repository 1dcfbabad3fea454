// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs the shell commands that plugins and hooks are made of,
//! using `tokio::process::Command`.
//!
//! - [`process`] runs one-shot commands to completion.
//! - [`long_lived`] spawns commands that keep running (dev servers, watch
//!   compilers) and waits for them to become ready.
//! - [`hooks`] runs the `pre` / `post` hooks of a top-level command.

pub mod hooks;
pub mod long_lived;
pub mod process;

pub use hooks::{HookStage, run_hook};
pub use long_lived::{ChildInstance, Readiness, spawn_long_lived};
pub use process::{run_to_completion, shell_command};
