use crate::tracker::Tracker;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Tracker>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(tracker: Tracker, max_body_bytes: usize) -> Self {
        Self {
            tracker: Arc::new(tracker),
            max_body_bytes,
        }
    }
}
