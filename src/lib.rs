pub mod commands;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod fs;
pub mod metadata;
pub mod parser;
pub mod repair;
pub mod report;
pub mod tags;
