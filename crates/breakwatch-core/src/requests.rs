//! Request tickets
//!
//! Backend calls are not cancellable. Every call gets a ticket carrying a
//! per-transition sequence number, and a reply is applied only while its
//! ticket is still the latest one issued for that transition.

use breakwatch_util::EpochMillis;
use std::fmt;

/// Kind of backend call a ticket belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Status query (on load or after a conflict)
    Reconcile,
    Start,
    End,
}

impl Transition {
    fn index(self) -> usize {
        match self {
            Self::Reconcile => 0,
            Self::Start => 1,
            Self::End => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reconcile => "reconcile",
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one issued backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub transition: Transition,
    pub seq: u64,
    pub issued_at: EpochMillis,
}

#[derive(Debug, Default, Clone, Copy)]
struct Slot {
    latest: u64,
    in_flight: bool,
}

/// Tracks the latest ticket per transition
#[derive(Debug, Default)]
pub struct RequestTracker {
    slots: [Slot; 3],
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, making every older ticket of the transition stale
    pub fn issue(&mut self, transition: Transition, now: EpochMillis) -> Ticket {
        let slot = &mut self.slots[transition.index()];
        slot.latest += 1;
        slot.in_flight = true;
        Ticket {
            transition,
            seq: slot.latest,
            issued_at: now,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let slot = &self.slots[ticket.transition.index()];
        slot.in_flight && slot.latest == ticket.seq
    }

    /// Accept a reply. Returns false for stale or already-completed tickets.
    pub fn complete(&mut self, ticket: &Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.slots[ticket.transition.index()].in_flight = false;
        true
    }

    /// Whether the latest ticket of the transition is still awaiting a reply
    pub fn in_flight(&self, transition: Transition) -> bool {
        self.slots[transition.index()].in_flight
    }

    /// Make any outstanding ticket of the transition stale without issuing
    pub fn supersede(&mut self, transition: Transition) {
        let slot = &mut self.slots[transition.index()];
        if slot.in_flight {
            slot.latest += 1;
            slot.in_flight = false;
        }
    }
}
