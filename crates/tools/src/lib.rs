//! Devkit Tools Library
//!
//! Provides network profiles, the compiler pin, project paths and the task
//! runner for a Solidity smart-contract project.

pub mod accounts;
pub mod config;
pub mod logging;
pub mod tasks;

pub use accounts::{AccountProvider, Address, NetworkAccounts, ProviderError};
pub use config::{Config, ConfigError, LoadOptions, NetworkProfile};
pub use tasks::{RuntimeEnvironment, TaskError, TaskHandler, TaskRegistry};
