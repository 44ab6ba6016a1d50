pub mod bracket;
pub mod config;
