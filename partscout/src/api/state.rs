use std::sync::Arc;

use crate::config::Config;
use crate::db::DatabaseBackend;
use crate::intelligence::HardwareAssistant;
use crate::services::HardwareService;
use crate::storage::MediaStorage;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn DatabaseBackend>,
    pub assistant: HardwareAssistant,
    pub hardware: HardwareService,
}

impl AppState {
    pub fn new(config: Config, db: Arc<dyn DatabaseBackend>, assistant: HardwareAssistant) -> Self {
        let config = Arc::new(config);
        let storage = MediaStorage::new(&config.storage);
        let hardware =
            HardwareService::new(db.clone(), storage, assistant.clone(), &config.hardware);

        Self {
            config,
            db,
            assistant,
            hardware,
        }
    }
}
