//! CLI command modules

pub mod activation;
pub mod hostnames;
pub mod property;
pub mod rules;
