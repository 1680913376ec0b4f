use std::sync::{Arc, Mutex, MutexGuard};

use crate::location::LocationResolver;
use crate::provider::{DataSource, Dataset};
use crate::store::Store;

pub struct AppState {
    pub store: Mutex<Store>,
    pub resolver: Arc<LocationResolver>,
    pub source: DataSource,
}

impl AppState {
    pub fn new(dataset: Dataset, source: DataSource) -> Self {
        let resolver = Arc::new(LocationResolver::builtin());
        Self {
            store: Mutex::new(Store::new(dataset, Arc::clone(&resolver))),
            resolver,
            source,
        }
    }

    /// Lock the store. `None` if a previous holder panicked.
    pub fn store(&self) -> Option<MutexGuard<'_, Store>> {
        self.store.lock().ok()
    }
}
