//! Data models shared by the conversion stages.

pub mod config;
pub mod page;
