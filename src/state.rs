use crate::sync::Tracker;

pub struct AppState<R> {
    pub tracker: Tracker<R>,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            tracker: self.tracker.clone(),
        }
    }
}

impl<R> AppState<R> {
    pub fn new(tracker: Tracker<R>) -> Self {
        Self { tracker }
    }
}
