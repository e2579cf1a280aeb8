//! Test doubles for the engine and capability traits.

use super::instrumentation::{QueryContext, StoreLogger, StoreMetrics};
use super::traits::{Connector, EngineConnection, EngineFailure};
use crate::models::Row;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// One captured logger event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedEvent {
    pub message: String,
    pub query: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<LoggedEvent>>,
}

impl RecordingLogger {
    pub fn events(&self) -> Vec<LoggedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, message: &str) -> usize {
        self.events().iter().filter(|e| e.message == message).count()
    }
}

impl StoreLogger for RecordingLogger {
    fn info(&self, message: &str, context: &QueryContext<'_>) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LoggedEvent {
                message: message.to_string(),
                query: context.query.to_string(),
                error: context.error.to_string(),
            });
    }
}

#[derive(Debug, Default)]
pub struct RecordingMetrics {
    calls: Mutex<Vec<(String, &'static str, Duration)>>,
}

impl RecordingMetrics {
    pub fn calls(&self) -> Vec<(String, &'static str)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(op, status, _)| (op.clone(), *status))
            .collect()
    }

    pub fn last_elapsed(&self) -> Option<Duration> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map(|(_, _, elapsed)| *elapsed)
    }
}

impl StoreMetrics for RecordingMetrics {
    fn record(&self, operation: &str, status: &'static str, elapsed: Duration) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((operation.to_string(), status, elapsed));
    }
}

/// Shared bookkeeping between a [`ScriptedConnector`] and its connections.
#[derive(Debug, Default)]
pub struct EngineState {
    pub connects: AtomicUsize,
    pub attempts: AtomicUsize,
    pub closes: AtomicUsize,
    pub rowid_calls: AtomicUsize,
    script: Mutex<VecDeque<Result<Option<Row>, EngineFailure>>>,
}

impl EngineState {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn rowid_calls(&self) -> usize {
        self.rowid_calls.load(Ordering::SeqCst)
    }
}

/// Connector whose statements replay a queued script of outcomes.
///
/// Once the script runs out every statement succeeds with no rows.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    pub state: Arc<EngineState>,
    pub fail_connect: Option<EngineFailure>,
    pub fail_close: Option<EngineFailure>,
}

impl ScriptedConnector {
    pub fn push(&self, outcome: Result<Option<Row>, EngineFailure>) {
        self.state
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    pub fn push_locked(&self, times: usize) {
        for _ in 0..times {
            self.push(Err(EngineFailure::locked("database is locked")));
        }
    }
}

impl Connector for ScriptedConnector {
    type Connection = ScriptedConnection;

    fn connect(&self, _location: &Path) -> Result<Self::Connection, EngineFailure> {
        if let Some(failure) = &self.fail_connect {
            return Err(failure.clone());
        }
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedConnection {
            state: Arc::clone(&self.state),
            fail_close: self.fail_close.clone(),
        })
    }
}

#[derive(Debug)]
pub struct ScriptedConnection {
    state: Arc<EngineState>,
    fail_close: Option<EngineFailure>,
}

impl ScriptedConnection {
    fn next_outcome(&self) -> Result<Option<Row>, EngineFailure> {
        self.state.attempts.fetch_add(1, Ordering::SeqCst);
        self.state
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

impl EngineConnection for ScriptedConnection {
    fn query_first(&mut self, _sql: &str) -> Result<Option<Row>, EngineFailure> {
        self.next_outcome()
    }

    fn execute(&mut self, _sql: &str) -> Result<(), EngineFailure> {
        self.next_outcome().map(|_| ())
    }

    fn last_insert_rowid(&self) -> i64 {
        self.state.rowid_calls.fetch_add(1, Ordering::SeqCst);
        99
    }

    fn close(self) -> Result<(), EngineFailure> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        self.fail_close.map_or(Ok(()), Err)
    }
}
