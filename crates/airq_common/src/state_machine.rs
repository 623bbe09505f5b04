//! Query state machine
//!
//! Single source of truth for what the UI shows:
//!
//! ```text
//!   Idle ──submit──▶ Submitting ──resolve──▶ Succeeded | Failed
//!                      ▲   │                     │
//!                      │   └──abandon──▶ Idle    │
//!                      └────────submit───────────┘
//! ```
//!
//! - blank input is ignored (no transition, no request)
//! - input while `Submitting` is ignored, never queued
//! - every accepted submission gets a fresh id; a result is applied only if
//!   its id is still the current one, so a late answer for an abandoned
//!   request can never overwrite newer state
//!
//! If the future returned by `submit` is dropped mid-flight (timeout,
//! `select!`, aborted task) its submission is abandoned, so the machine never
//! stays `Submitting` with nobody left to resolve it.
//!
//! Transitions happen under one mutex and are published on a `watch`
//! channel before the lock is released, so observers see them in order.

use airq_shared::{Query, QueryOutcome, RequestState};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::QueryClient;

/// Why a submission was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// Nothing left after trimming
    Empty,
    /// A request is already in flight
    Busy,
}

impl fmt::Display for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ignored::Empty => write!(f, "empty query"),
            Ignored::Busy => write!(f, "a query is already in progress"),
        }
    }
}

/// Handle for one accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    id: u64,
    query: Query,
}

impl Ticket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

/// What `submit` ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Ignored(Ignored),
    /// The terminal state that was applied
    Applied(RequestState),
    /// The result arrived after the submission was abandoned
    Discarded,
}

struct Cell {
    state: RequestState,
    current: u64,
}

pub struct QueryStateMachine {
    client: QueryClient,
    cell: Mutex<Cell>,
    publisher: watch::Sender<RequestState>,
}

impl QueryStateMachine {
    pub fn new(client: QueryClient) -> Self {
        let (publisher, _) = watch::channel(RequestState::Idle);
        Self {
            client,
            cell: Mutex::new(Cell {
                state: RequestState::Idle,
                current: 0,
            }),
            publisher,
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> RequestState {
        self.lock().state.clone()
    }

    /// Observer that sees every transition
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.publisher.subscribe()
    }

    /// Validate, request, resolve.
    pub async fn submit(&self, raw_text: &str) -> SubmitOutcome {
        let ticket = match self.begin(raw_text) {
            Ok(ticket) => ticket,
            Err(reason) => return SubmitOutcome::Ignored(reason),
        };

        let in_flight = InFlight {
            machine: self,
            id: ticket.id,
        };
        let outcome = self.client.execute(ticket.query()).await;
        in_flight.resolved();

        match self.complete(ticket, outcome) {
            Some(state) => SubmitOutcome::Applied(state),
            None => SubmitOutcome::Discarded,
        }
    }

    /// Synchronous half of `submit`: guard checks and `Idle|terminal → Submitting`.
    pub fn begin(&self, raw_text: &str) -> Result<Ticket, Ignored> {
        let Some(query) = Query::parse(raw_text) else {
            debug!("Ignoring blank submission");
            return Err(Ignored::Empty);
        };

        let mut cell = self.lock();
        if cell.state.is_submitting() {
            debug!(query = %query, "Ignoring submission while busy");
            return Err(Ignored::Busy);
        }

        cell.current += 1;
        let ticket = Ticket {
            id: cell.current,
            query: query.clone(),
        };
        info!(submission = ticket.id, query = %query, "Query submitted");
        self.transition(&mut cell, RequestState::Submitting { query });
        Ok(ticket)
    }

    /// Apply the outcome of `ticket`. Returns the new state, or `None` if the
    /// ticket is stale and the outcome was dropped.
    pub fn complete(&self, ticket: Ticket, outcome: QueryOutcome) -> Option<RequestState> {
        let mut cell = self.lock();
        if cell.current != ticket.id || !cell.state.is_submitting() {
            warn!(
                submission = ticket.id,
                current = cell.current,
                "Discarding result of abandoned submission"
            );
            return None;
        }

        let next = RequestState::resolved(ticket.query, outcome);
        info!(submission = ticket.id, state = next.label(), "Query resolved");
        self.transition(&mut cell, next.clone());
        Some(next)
    }

    /// Give up on the in-flight submission. `false` if nothing was in flight.
    pub fn abandon(&self) -> bool {
        let mut cell = self.lock();
        if !cell.state.is_submitting() {
            return false;
        }
        self.abandon_current(&mut cell);
        true
    }

    /// Abandon only if `id` is still the submission in flight
    fn abandon_submission(&self, id: u64) {
        let mut cell = self.lock();
        if cell.current == id && cell.state.is_submitting() {
            self.abandon_current(&mut cell);
        }
    }

    fn abandon_current(&self, cell: &mut Cell) {
        info!(submission = cell.current, "Submission abandoned");
        cell.current += 1;
        self.transition(cell, RequestState::Idle);
    }

    fn transition(&self, cell: &mut Cell, next: RequestState) {
        cell.state = next.clone();
        self.publisher.send_replace(next);
    }

    fn lock(&self) -> MutexGuard<'_, Cell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Abandons its submission when dropped; forgotten once the request resolves
struct InFlight<'a> {
    machine: &'a QueryStateMachine,
    id: u64,
}

impl InFlight<'_> {
    /// The outcome is in hand; `complete` decides what happens to it
    fn resolved(self) {
        std::mem::forget(self);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        debug!(submission = self.id, "Submit future dropped before resolution");
        self.machine.abandon_submission(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FakeTransport;
    use airq_shared::{AirQualityReport, FailureCause, FailureInfo};
    use std::sync::Arc;

    fn machine() -> (QueryStateMachine, Arc<FakeTransport>) {
        let transport = Arc::new(FakeTransport::always_json(serde_json::json!({"summary": "ok"})));
        (
            QueryStateMachine::new(QueryClient::new(transport.clone())),
            transport,
        )
    }

    #[test]
    fn test_starts_idle() {
        let (machine, _) = machine();
        assert_eq!(machine.state(), RequestState::Idle);
        assert_eq!(*machine.subscribe().borrow(), RequestState::Idle);
    }

    #[test]
    fn test_begin_blank_is_ignored() {
        let (machine, _) = machine();
        assert_eq!(machine.begin("   "), Err(Ignored::Empty));
        assert_eq!(machine.state(), RequestState::Idle);
    }

    #[test]
    fn test_begin_transitions_to_submitting() {
        let (machine, _) = machine();
        let ticket = machine.begin("  test ").unwrap();
        assert_eq!(ticket.query().as_str(), "test");
        assert_eq!(
            machine.state(),
            RequestState::Submitting {
                query: Query::parse("test").unwrap()
            }
        );
    }

    #[test]
    fn test_begin_while_submitting_is_busy() {
        let (machine, _) = machine();
        let first = machine.begin("first").unwrap();
        assert_eq!(machine.begin("second"), Err(Ignored::Busy));
        assert_eq!(machine.state().query(), Some(first.query()));
    }

    #[test]
    fn test_complete_applies_terminal_state() {
        let (machine, _) = machine();
        let ticket = machine.begin("test").unwrap();

        let state = machine
            .complete(ticket, Err(FailureInfo::http(503, "service unavailable")))
            .unwrap();
        assert_eq!(state.failure().unwrap().cause, FailureCause::Http { status: 503 });
        assert_eq!(machine.state(), state);

        // Terminal → Submitting again
        assert!(machine.begin("again").is_ok());
    }

    #[test]
    fn test_abandon_then_late_result_discarded() {
        let (machine, _) = machine();
        let stale = machine.begin("slow question").unwrap();
        assert!(machine.abandon());
        assert_eq!(machine.state(), RequestState::Idle);

        let fresh = machine.begin("new question").unwrap();
        assert_ne!(stale.id(), fresh.id());

        assert!(machine
            .complete(stale, Ok(AirQualityReport::new("old answer")))
            .is_none());
        assert!(machine.state().is_submitting());
        assert_eq!(machine.state().query().unwrap().as_str(), "new question");

        let applied = machine
            .complete(fresh, Ok(AirQualityReport::new("new answer")))
            .unwrap();
        assert_eq!(applied.report().unwrap().summary, "new answer");
    }

    #[test]
    fn test_abandon_when_idle_is_noop() {
        let (machine, _) = machine();
        assert!(!machine.abandon());
        assert_eq!(machine.state(), RequestState::Idle);
    }

    #[test]
    fn test_ticket_cannot_complete_twice() {
        let (machine, _) = machine();
        let ticket = machine.begin("test").unwrap();
        let copy = ticket.clone();
        assert!(machine.complete(ticket, Ok(AirQualityReport::new("a"))).is_some());
        assert!(machine.complete(copy, Ok(AirQualityReport::new("b"))).is_none());
        assert_eq!(machine.state().report().unwrap().summary, "a");
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let (machine, transport) = machine();
        let outcome = machine.submit("test").await;

        let SubmitOutcome::Applied(state) = outcome else {
            panic!("expected applied, got {:?}", outcome);
        };
        assert_eq!(state.report().unwrap().summary, "ok");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_submit_frees_the_machine() {
        let transport = Arc::new(
            FakeTransport::always_json(serde_json::json!({"summary": "ok"}))
                .with_latency(std::time::Duration::from_secs(10)),
        );
        let machine = QueryStateMachine::new(QueryClient::new(transport.clone()));

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_secs(1), machine.submit("first")).await;
        assert!(timed_out.is_err());
        assert_eq!(machine.state(), RequestState::Idle);

        let SubmitOutcome::Applied(state) = machine.submit("second").await else {
            panic!("second submission should be accepted");
        };
        assert_eq!(state.query().unwrap().as_str(), "second");
        assert_eq!(transport.call_count(), 2);
    }

    #[test]
    fn test_stale_guard_leaves_newer_submission_alone() {
        let (machine, _) = machine();
        let stale = machine.begin("first").unwrap();
        assert!(machine.abandon());
        let fresh = machine.begin("second").unwrap();

        drop(InFlight {
            machine: &machine,
            id: stale.id(),
        });
        assert_eq!(machine.state().query(), Some(fresh.query()));
    }

    #[tokio::test]
    async fn test_submit_blank_issues_no_request() {
        let (machine, transport) = machine();
        assert_eq!(machine.submit(" \t ").await, SubmitOutcome::Ignored(Ignored::Empty));
        assert_eq!(transport.call_count(), 0);
        assert_eq!(machine.state(), RequestState::Idle);
    }
}
