pub mod common;
pub mod diagnosis;
pub mod image;
