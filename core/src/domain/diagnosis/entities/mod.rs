pub mod analysis_request;
pub mod diagnosis;
pub mod pipeline;

pub use analysis_request::*;
pub use diagnosis::*;
pub use pipeline::*;
