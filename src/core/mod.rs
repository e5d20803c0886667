//! Core infrastructure shared by the installer and the CLI.

pub mod config;
pub mod context;
pub mod deps;
pub mod error;
pub mod logging;
pub mod output;
