pub mod auth;
pub mod clock;
pub mod feed;
pub mod youtube;
