pub mod config;
mod http_layers;
pub mod metrics;
pub mod server;
pub mod state;
mod stream_routes;
mod tool_routes;

pub use config::{ServerConfig, DEFAULT_PORT};
pub use http_layers::*;
pub use server::{make_app, make_metrics_app, run_metrics_server, run_server};
pub(self) use stream_routes::make_stream_routes;
pub(self) use tool_routes::make_tool_routes;
