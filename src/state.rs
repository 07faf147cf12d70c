use crate::{config::PayRules, store::RecordStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub rules: Arc<PayRules>,
    pub max_workers: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, rules: PayRules, max_workers: usize) -> Self {
        Self {
            store,
            rules: Arc::new(rules),
            max_workers: max_workers.max(1),
        }
    }
}
