//! Command implementations.

pub mod config;
pub mod evaluate;
pub mod matching;
pub mod types;
