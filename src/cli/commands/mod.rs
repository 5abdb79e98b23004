//! CLI command implementations

pub mod check;
pub mod delete;
pub mod import;
pub mod init;
pub mod list;
pub mod publish;
pub mod show;
pub mod sign;
