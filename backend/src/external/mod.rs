//! External API integrations

pub mod gemini;

pub use gemini::GeminiClient;
