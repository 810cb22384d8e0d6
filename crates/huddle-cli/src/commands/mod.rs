//! CLI subcommands

pub mod navigate;
pub mod notify;
pub mod routes;
