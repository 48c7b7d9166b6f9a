//! Systemd mount-unit reconciliation.
//!
//! Installs `mnt-*.mount`, `mnt-*.automount` and `mnt-*.swap` templates into
//! the system unit directory: templates whose backing device is missing are
//! left out, paths are rewritten for immutable-root systems, previously
//! installed units are removed, and the surviving set is enabled as one
//! batch. Network-share units get a shared credentials file first.
//!
//! The public API is organised into layers:
//!
//! - **[`units`]**: discovery, device validation, OS path rules and planning (pure)
//! - **[`credentials`]**, **[`service`]**, **[`operations`]**: side-effecting collaborators behind traits
//! - **[`tasks`]**: the removal and installation phases
//! - **[`commands`]**: top-level subcommand orchestration (`apply`, `plan`, `remove`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod exec;
pub mod lock;
pub mod logging;
pub mod operations;
pub mod platform;
pub mod service;
pub mod tasks;
pub mod units;
