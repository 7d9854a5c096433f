//! chronoschema CLI - Command-line interface for SQL Server schema files.
//!
//! This crate provides the `chronoschema` tool: scripting databases into a
//! schema tree, running migration scripts, deploying the schema tree to
//! databases, and housekeeping of the scripted files.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
