//! LLM integration - OpenRouter API
//!
//! This module provides:
//! - OpenRouter HTTP client for chat completions
//! - Request/response types matching the OpenAI-compatible API
//! - Helpers for pulling JSON out of model replies

mod client;
mod parse;
mod types;

pub use client::{LlmClient, LlmClientBuilder};
pub use parse::extract_json_from_response;
pub use types::{
    ChatRequest, ChatResponse, Choice, FinishReason, LlmResponse, Message, MessageRole, Usage,
};
