pub mod image;
pub mod llm;
