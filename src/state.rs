use std::sync::Arc;

use crate::application::services::EventRouter;
use crate::domain::classifier::Thresholds;
use crate::domain::repositories::CounterStore;
use crate::shutdown::ShutdownCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventRouter>,
    pub shutdown: ShutdownCoordinator,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CounterStore>,
        thresholds: Thresholds,
        shutdown: ShutdownCoordinator,
    ) -> Self {
        Self {
            events: Arc::new(EventRouter::new(store, thresholds)),
            shutdown,
        }
    }
}
