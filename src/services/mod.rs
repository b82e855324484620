pub mod extract;
pub mod reddit;
pub mod sync;
pub mod youtube;
