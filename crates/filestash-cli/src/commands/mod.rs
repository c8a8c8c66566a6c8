//! Command handlers

pub mod config;
pub mod file;
pub mod settings;
pub mod status;
