use axum::extract::FromRef;
use std::time::Instant;

use super::ServerConfig;
use crate::dispatch::Dispatcher;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub dispatcher: Dispatcher,
}

impl ServerState {
    pub fn new(config: ServerConfig, dispatcher: Dispatcher) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            dispatcher,
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for Dispatcher {
    fn from_ref(input: &ServerState) -> Self {
        input.dispatcher.clone()
    }
}
