use std::sync::Arc;

use crate::infrastructure::{Config, Resources};

#[derive(Clone)]
pub struct AppState {
    pub resources: Arc<Resources>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::from_resources(Resources::new(config))
    }

    pub fn from_resources(resources: Resources) -> Self {
        let config = Arc::new(resources.config().clone());
        Self {
            resources: Arc::new(resources),
            config,
        }
    }
}
