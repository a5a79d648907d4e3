mod client;
pub mod types;

pub use client::{Client, Config, ConfigBuilder, ServerRx, VapiClient, connect, connect_with_config};
