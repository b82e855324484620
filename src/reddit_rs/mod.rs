pub mod feed;
pub mod types;
