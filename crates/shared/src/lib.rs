//! Shared types and configuration for Ledgerd.
//!
//! This crate provides common types used across all other crates:
//! - Pagination types for list endpoints
//! - Sort-key parsing for list endpoints
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
