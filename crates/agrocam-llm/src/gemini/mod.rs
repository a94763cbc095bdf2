//! Gemini - Google Gemini API provider
//!
//! Plain API-key access to `generativelanguage.googleapis.com` using reqwest.

mod config;
mod convert;
mod provider;
mod security;
mod types;


pub use config::{GeminiConfig, DEFAULT_MODEL, MODELS};
pub use provider::GeminiProvider;
