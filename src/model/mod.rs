pub mod config;
pub mod prompt;
pub mod request;
pub mod stage;
