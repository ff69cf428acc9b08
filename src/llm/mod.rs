pub mod client;
pub mod models;
pub mod prompts;

pub use client::{LlmClient, LlmResponse};
pub use models::{Model, Usage};
