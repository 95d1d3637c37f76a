//! Subcommand implementations.

pub mod config;
pub mod evaluate;
pub mod extract;
pub mod inspect;
