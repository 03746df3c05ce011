// API module - REST calls against the same backend
pub mod client;

pub use client::ApiClient;
