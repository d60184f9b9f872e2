//! Travel Agent Library
//!
//! Core of the Viagens dos Sonhos terminal assistant: session transcripts,
//! prompt assembly and the provider client. Used by the binary and the
//! integration tests.

/// Configuration management module
pub mod config;

/// Error types shared across modules
pub mod errors;

/// Credential lookup and secret scrubbing
pub mod secrets;

/// LLM provider abstraction layer
pub mod llm;

/// Per-session conversation transcripts
pub mod session;

/// Prompt assembly and provider invocation per turn
pub mod conversation;

/// Interactive read-eval-print loop
pub mod repl;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
