//! Command-line front end for the stockshot pipeline.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
