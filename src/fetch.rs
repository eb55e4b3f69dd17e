//! Background availability fetches with a request-sequence guard.
//!
//! Availability checks fire on every change of provider, date or
//! duration, and the responses can come back out of order. Each request
//! is stamped with a sequence number; only the response matching the most
//! recently issued request is applied, everything else is dropped. The UI
//! drains results on its tick events, so a page that has been torn down
//! simply stops polling and its receiver dies with it.

use crate::api::{ApiClient, ApiResult};
use crate::models::{AvailabilityQuery, AvailabilitySlot};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

/// Tracks which availability request is current. A response is admitted
/// only when it carries the latest issued sequence number and has not
/// been applied already.
#[derive(Debug, Default)]
pub struct SequenceGuard {
    issued: u64,
    applied: u64,
}

impl SequenceGuard {
    /// Stamps a new request, making every in-flight response stale.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether a response with this stamp may be applied.
    pub fn admit(&mut self, seq: u64) -> bool {
        if seq == self.issued && seq > self.applied {
            self.applied = seq;
            true
        } else {
            false
        }
    }

    pub fn has_pending(&self) -> bool {
        self.issued > self.applied
    }
}

struct SlotResponse {
    seq: u64,
    outcome: ApiResult<Vec<AvailabilitySlot>>,
}

/// Issues availability checks on background threads and hands back only
/// the freshest result.
pub struct SlotFetcher {
    guard: SequenceGuard,
    tx: Sender<SlotResponse>,
    rx: Receiver<SlotResponse>,
}

impl SlotFetcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            guard: SequenceGuard::default(),
            tx,
            rx,
        }
    }

    /// Fires a new availability check. Any response still in flight from
    /// an earlier request becomes stale immediately.
    pub fn request(&mut self, api: ApiClient, query: AvailabilityQuery) {
        let seq = self.guard.issue();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = api.check_availability(&query);
            // Send fails when the owning page is gone; nothing to do.
            let _ = tx.send(SlotResponse { seq, outcome });
        });
    }

    /// Drains completed responses, returning the freshest admissible one.
    /// Called from the page's tick handler.
    pub fn poll(&mut self) -> Option<ApiResult<Vec<AvailabilitySlot>>> {
        let mut latest = None;
        while let Ok(response) = self.rx.try_recv() {
            if self.guard.admit(response.seq) {
                latest = Some(response.outcome);
            }
        }
        latest
    }

    /// True while the latest request has not answered yet.
    pub fn in_flight(&self) -> bool {
        self.guard.has_pending()
    }

    #[cfg(test)]
    fn inject(&mut self, seq: u64, outcome: ApiResult<Vec<AvailabilitySlot>>) {
        self.tx.send(SlotResponse { seq, outcome }).unwrap();
    }

    #[cfg(test)]
    fn issue(&mut self) -> u64 {
        self.guard.issue()
    }
}

impl Default for SlotFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: &str) -> AvailabilitySlot {
        AvailabilitySlot {
            start_time: start.into(),
            end_time: String::new(),
        }
    }

    #[test]
    fn guard_admits_only_the_latest_request() {
        let mut guard = SequenceGuard::default();
        let first = guard.issue();
        let second = guard.issue();
        assert!(!guard.admit(first), "stale response must be dropped");
        assert!(guard.admit(second));
        assert!(!guard.admit(second), "a response is applied at most once");
    }

    #[test]
    fn out_of_order_completion_cannot_overwrite_newer_result() {
        let mut fetcher = SlotFetcher::new();
        let first = fetcher.issue();
        let second = fetcher.issue();

        // The newer request answers first, the older one later.
        fetcher.inject(second, Ok(vec![slot("10:00")]));
        fetcher.inject(first, Ok(vec![slot("09:00")]));

        let applied = fetcher.poll().unwrap().unwrap();
        assert_eq!(applied, vec![slot("10:00")]);
        // The stale response must not surface on a later poll either.
        assert!(fetcher.poll().is_none());
    }

    #[test]
    fn poll_keeps_only_freshest_when_both_arrive_in_order() {
        let mut fetcher = SlotFetcher::new();
        let first = fetcher.issue();
        let second = fetcher.issue();
        fetcher.inject(first, Ok(vec![slot("09:00")]));
        fetcher.inject(second, Ok(vec![slot("10:00")]));

        let applied = fetcher.poll().unwrap().unwrap();
        assert_eq!(applied, vec![slot("10:00")]);
    }

    #[test]
    fn in_flight_tracks_pending_requests() {
        let mut fetcher = SlotFetcher::new();
        assert!(!fetcher.in_flight());
        let seq = fetcher.issue();
        assert!(fetcher.in_flight());
        fetcher.inject(seq, Ok(Vec::new()));
        fetcher.poll();
        assert!(!fetcher.in_flight());
    }
}
