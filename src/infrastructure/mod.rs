pub mod config;
pub mod memory;
pub mod ollama_api;
pub mod ollama_cli;
