//! Two-lane, deduplicating dispatch queue with a concurrency cap.
//!
//! The scheduler only tracks which handles are queued and which are
//! resolving; the resolution service runs the actual lookups for whatever
//! [`FetchScheduler::next_dispatch`] hands out and reports back through
//! [`FetchScheduler::complete`].
//!
//! A handle is present in at most one of the high lane, the normal lane and
//! the in-flight set. Within a lane order is FIFO; the high lane always
//! drains first, so sustained high-priority load can starve the normal lane.

use std::collections::{HashSet, VecDeque};
use tracing::trace;

use crate::domain::models::{Priority, SchedulerState};

#[derive(Debug)]
pub struct FetchScheduler {
    high: VecDeque<String>,
    normal: VecDeque<String>,
    queued: HashSet<String>,
    in_flight: HashSet<String>,
    max_concurrent: usize,
}

impl FetchScheduler {
    /// A cap of zero would never dispatch anything and is raised to one.
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            high: VecDeque::new(),
            normal: VecDeque::new(),
            queued: HashSet::new(),
            in_flight: HashSet::new(),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Queue `handle` unless it is already queued or resolving.
    ///
    /// Returns whether the handle was added. A duplicate keeps its original
    /// lane; it is not promoted by a later high-priority request.
    pub fn request(&mut self, handle: &str, priority: Priority) -> bool {
        if self.contains(handle) {
            trace!(handle, %priority, "duplicate request suppressed");
            return false;
        }

        self.queued.insert(handle.to_string());
        match priority {
            Priority::High => self.high.push_back(handle.to_string()),
            Priority::Normal => self.normal.push_back(handle.to_string()),
        }
        true
    }

    /// Next handle to resolve, if a slot is free and work is queued.
    ///
    /// The returned handle is moved into the in-flight set.
    pub fn next_dispatch(&mut self) -> Option<String> {
        if self.in_flight.len() >= self.max_concurrent {
            return None;
        }

        let handle = self.high.pop_front().or_else(|| self.normal.pop_front())?;
        self.queued.remove(&handle);
        self.in_flight.insert(handle.clone());
        Some(handle)
    }

    /// Release the in-flight slot held by `handle`.
    pub fn complete(&mut self, handle: &str) -> bool {
        self.in_flight.remove(handle)
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.in_flight.contains(handle) || self.queued.contains(handle)
    }

    pub fn is_in_flight(&self, handle: &str) -> bool {
        self.in_flight.contains(handle)
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty() && self.queued.is_empty()
    }

    pub fn state(&self) -> SchedulerState {
        SchedulerState {
            high_queued: self.high.len(),
            normal_queued: self.normal.len(),
            in_flight: self.in_flight.len(),
        }
    }
}
