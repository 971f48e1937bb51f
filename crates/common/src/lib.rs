//! Shared building blocks for the workspace binaries: logging setup,
//! startup environment checks and small wire types.

pub mod types;
pub mod utils;
pub mod env;
