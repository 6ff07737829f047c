//! CLI subcommand implementations for the tagprobe binary.

pub mod audit_cmd;
pub mod doctor;
pub mod output;
