pub mod bridge;
pub mod config;
pub mod logger;
pub mod soap;
pub mod state;
