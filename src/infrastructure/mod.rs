pub mod bootstrap;
pub mod config;
pub mod csv;
pub mod llm_clients;
pub mod security;
