//! Operator tooling for an EcoEnergy deployment.
//!
//! The `ecoenergy` binary wraps these commands; they are exposed as a library
//! so they can be exercised against a test database.

pub mod cli;
pub mod commands;
