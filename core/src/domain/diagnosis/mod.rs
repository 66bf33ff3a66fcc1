pub mod entities;
pub mod extractor;
pub mod mapper;
pub mod ports;
pub mod prompts;
pub mod schema;
pub mod services;
pub mod session;
pub mod value_objects;

pub use entities::*;
pub use ports::*;
pub use value_objects::*;
