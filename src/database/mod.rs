pub mod bracket_repo;
pub mod match_repo;
pub mod models;
pub mod settings_repo;
