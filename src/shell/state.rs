use crate::modules::time_tracking::adapters::outbound::in_memory_calendar::InMemoryCalendarWidget;
use crate::modules::time_tracking::application::controller::AppController;
use crate::modules::time_tracking::application::event_store::EventStore;
use crate::modules::time_tracking::application::persistence::{PersistenceQueue, PersistenceWriter, load_state};
use crate::shared::infrastructure::debounce::Debouncer;
use crate::shared::infrastructure::key_value_store::KeyValueStore;
use crate::shell::config::Config;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type Controller = AppController<InMemoryCalendarWidget>;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Mutex<Controller>>,
    pub search: Arc<std::sync::Mutex<Debouncer>>,
}

impl AppState {
    pub fn new(controller: Controller, config: &Config) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            search: Arc::new(std::sync::Mutex::new(Debouncer::new(config.search_debounce))),
        }
    }
}

/// Loads persisted state and wires the controller. The returned writer must be spawned.
pub async fn build_state(store: Arc<dyn KeyValueStore>, config: &Config) -> (AppState, PersistenceWriter) {
    let loaded = load_state(store.as_ref(), Utc::now()).await;
    let settings = loaded.settings.clone();
    let (queue, receiver) = PersistenceQueue::channel();
    let event_store = EventStore::from_loaded(loaded, config.tracker, queue.clone());
    let controller = AppController::new(event_store, InMemoryCalendarWidget::new(), settings, queue);
    (AppState::new(controller, config), PersistenceWriter::new(store, receiver))
}
