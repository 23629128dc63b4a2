pub mod client;
pub mod signal;

pub use client::ApiClient;
