use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;

use super::{FetchOutcome, FetchRequest, ViewController};
use crate::models::event::CalendarEvent;
use crate::services::event_store::EventStore;

/// A finished background fetch, still tagged with its window.
pub struct FetchReply {
    pub request: FetchRequest,
    pub result: Result<Vec<CalendarEvent>>,
}

/// Runs list requests off the calling thread.
///
/// Requests may overlap; replies arrive in completion order and the
/// controller decides which of them still matter.
pub struct FetchWorker<S> {
    store: Arc<S>,
    tx: Sender<FetchReply>,
    rx: Receiver<FetchReply>,
}

impl<S: EventStore + Sync + 'static> FetchWorker<S> {
    pub fn new(store: Arc<S>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { store, tx, rx }
    }

    pub fn submit(&self, request: FetchRequest) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();

        thread::spawn(move || {
            let result = store.list(request.window.start, request.window.end);
            let _ = tx.send(FetchReply { request, result });
        })
    }

    pub fn try_recv(&self) -> Option<FetchReply> {
        match self.rx.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            // The worker holds a sender itself, so this cannot happen.
            Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<FetchReply> {
        match self.rx.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Hand every reply received so far to `controller`.
    ///
    /// Should be called once per frame, before rendering.
    pub fn poll<T: EventStore>(&self, controller: &mut ViewController<T>) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::new();
        while let Some(reply) = self.try_recv() {
            outcomes.push(controller.complete_fetch(reply.request, reply.result));
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::GridMetrics;
    use crate::models::view::{Navigation, ViewKind, ViewState};
    use crate::services::event_store::InMemoryEventStore;
    use crate::utils::date::CalendarFrame;
    use chrono::{DateTime, TimeZone, Utc, Weekday};

    fn at(m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_background_fetch_applies_current_window_only() {
        let store = Arc::new(InMemoryEventStore::with_events(vec![
            CalendarEvent::new("june", "June", at(6, 11, 9), at(6, 11, 10)).unwrap(),
            CalendarEvent::new("july", "July", at(7, 16, 9), at(7, 16, 10)).unwrap(),
        ]));
        let worker = FetchWorker::new(Arc::clone(&store));
        let mut controller = ViewController::with_state(
            Arc::clone(&store),
            CalendarFrame::utc(Weekday::Sun),
            GridMetrics::default(),
            ViewState::new(at(6, 11, 0), ViewKind::Month),
        );

        let june = worker.submit(controller.begin_fetch());
        let july_request = controller
            .navigate(Navigation::Next, at(6, 11, 0))
            .expect("window changed");
        let july = worker.submit(july_request);
        june.join().unwrap();
        july.join().unwrap();

        let mut outcomes = worker.poll(&mut controller);
        outcomes.sort_by_key(|o| matches!(o, FetchOutcome::Stale));

        assert_eq!(outcomes, vec![FetchOutcome::Applied { count: 1 }, FetchOutcome::Stale]);
        assert_eq!(controller.events()[0].id, "july");
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_poll_without_replies() {
        let store = Arc::new(InMemoryEventStore::new());
        let worker = FetchWorker::new(Arc::clone(&store));
        let mut controller = ViewController::with_state(
            store,
            CalendarFrame::default(),
            GridMetrics::default(),
            ViewState::new(at(6, 11, 0), ViewKind::Day),
        );

        assert!(worker.poll(&mut controller).is_empty());
        assert!(worker.recv_timeout(Duration::from_millis(10)).is_none());
        assert!(controller.is_loading());
    }
}
