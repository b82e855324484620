pub mod auth;
pub mod error;
pub mod playlist;
pub mod types;
