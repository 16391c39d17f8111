//! Command implementations for Tool Probe CLI

pub mod config;
pub mod import;
