//! segrules CLI library
//!
//! This library provides the command-line interface for running compiled
//! segmentation rule tables over text files.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use error::CliError;
