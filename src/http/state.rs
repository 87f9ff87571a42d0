use std::sync::Arc;

use crate::command::CommandBroker;

#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<CommandBroker>,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn new(broker: Arc<CommandBroker>, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            broker,
            api_key: api_key.into(),
        }
    }
}
