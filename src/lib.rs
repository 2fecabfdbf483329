pub mod config;
pub mod demo_feed;
pub mod errors;
pub mod http_client;
pub mod provider;
pub mod render;
pub mod snapshot_fetch;
pub mod state;
