//! # Fibu Framework
//!
//! The command dispatcher of the fibubot chat bot.
//!
//! This layer provides:
//! - [`CommandLine`] tokenizing and the [`Builtin`] command table
//! - The [`Dispatcher`], which turns one chat message into [`Action`]s
//! - Reply formatting helpers for run times and relative durations
//!
//! The dispatcher has no side effects of its own beyond channel store writes;
//! sending replies, timing users out and attaching channels is left to the
//! runtime.

pub mod action;
pub mod command;
pub mod dispatcher;
pub mod format;

mod handler;

pub use action::{Action, SPAM_TIMEOUT_SECS};
pub use command::{AdminCommand, Builtin, CommandLine};
pub use dispatcher::Dispatcher;
pub use format::{format_run_time, humanize_duration};
