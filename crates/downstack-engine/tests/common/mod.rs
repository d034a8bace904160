//! Shared test doubles: a scripted control plane and a clock that never
//! actually sleeps.

use async_trait::async_trait;
use downstack_core::{
    ControlPlane, Error, LifecycleStatus, ResourceHandle, Result, SweepKind,
};
use downstack_engine::{CancelToken, Clock};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// A scripted sequence: yields entries in order, then keeps repeating the
/// last one. Lifecycle statuses in the real world behave the same way —
/// once a stack settles, further describes keep returning the same state.
struct Script<T: Clone> {
    entries: Vec<T>,
    next: usize,
}

impl<T: Clone> Script<T> {
    fn new(entries: Vec<T>) -> Self {
        assert!(!entries.is_empty(), "script must have at least one entry");
        Self { entries, next: 0 }
    }

    fn next(&mut self) -> T {
        let idx = self.next.min(self.entries.len() - 1);
        self.next += 1;
        self.entries[idx].clone()
    }
}

/// Scripted response to one delete request.
#[derive(Debug, Clone)]
pub enum DeleteStep {
    Accept,
    Reject(&'static str),
    Transport(&'static str),
}

#[derive(Default)]
struct MockState {
    statuses: HashMap<String, Script<LifecycleStatus>>,
    exists: HashMap<String, Script<bool>>,
    deletes: HashMap<String, Vec<DeleteStep>>,
    delete_calls: HashMap<String, u32>,
    lists: HashMap<String, std::result::Result<Vec<String>, String>>,
    events: Vec<String>,
}

/// Control plane whose every answer is scripted per resource key
/// (`stack:name`, `log-group:name`, ...). Unscripted resources read as
/// absent; unscripted delete requests are accepted.
#[derive(Default)]
pub struct MockControlPlane {
    state: Mutex<MockState>,
}

impl MockControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_status(&self, key: &str, statuses: Vec<LifecycleStatus>) {
        let mut state = self.state.lock().unwrap();
        state.statuses.insert(key.to_string(), Script::new(statuses));
    }

    /// Override existence re-checks. Without a script, existence derives
    /// from the status script.
    pub fn script_exists(&self, key: &str, answers: Vec<bool>) {
        let mut state = self.state.lock().unwrap();
        state.exists.insert(key.to_string(), Script::new(answers));
    }

    pub fn script_delete(&self, key: &str, steps: Vec<DeleteStep>) {
        let mut state = self.state.lock().unwrap();
        state.deletes.insert(key.to_string(), steps);
    }

    pub fn script_list(&self, kind: SweepKind, prefix: &str, names: Vec<&str>) {
        let mut state = self.state.lock().unwrap();
        state.lists.insert(
            format!("{kind}:{prefix}"),
            Ok(names.into_iter().map(String::from).collect()),
        );
    }

    pub fn script_list_error(&self, kind: SweepKind, prefix: &str, message: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .lists
            .insert(format!("{kind}:{prefix}"), Err(message.to_string()));
    }

    pub fn delete_count(&self, key: &str) -> u32 {
        let state = self.state.lock().unwrap();
        state.delete_calls.get(key).copied().unwrap_or(0)
    }

    pub fn total_delete_count(&self) -> u32 {
        let state = self.state.lock().unwrap();
        state.delete_calls.values().sum()
    }

    /// Ordered log of every call, as "op:key" strings.
    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().events.clone()
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    fn name(&self) -> &str {
        "mock"
    }

    async fn status(&self, handle: &ResourceHandle) -> Result<LifecycleStatus> {
        let mut state = self.state.lock().unwrap();
        let key = handle.key();
        state.events.push(format!("status:{key}"));
        Ok(state
            .statuses
            .get_mut(&key)
            .map(|s| s.next())
            .unwrap_or(LifecycleStatus::Absent))
    }

    async fn exists(&self, handle: &ResourceHandle) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let key = handle.key();
        state.events.push(format!("exists:{key}"));
        if let Some(script) = state.exists.get_mut(&key) {
            return Ok(script.next());
        }
        Ok(state
            .statuses
            .get_mut(&key)
            .map(|s| s.next() != LifecycleStatus::Absent)
            .unwrap_or(false))
    }

    async fn request_delete(&self, handle: &ResourceHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let key = handle.key();
        state.events.push(format!("delete:{key}"));
        *state.delete_calls.entry(key.clone()).or_insert(0) += 1;

        let step = state
            .deletes
            .get_mut(&key)
            .and_then(|steps| if steps.is_empty() { None } else { Some(steps.remove(0)) })
            .unwrap_or(DeleteStep::Accept);

        match step {
            DeleteStep::Accept => Ok(()),
            DeleteStep::Reject(reason) => Err(Error::DeleteRejected {
                name: handle.name.clone(),
                reason: reason.to_string(),
            }),
            DeleteStep::Transport(message) => Err(Error::Transport(message.to_string())),
        }
    }

    async fn list(&self, kind: SweepKind, prefix: &str) -> Result<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        state.events.push(format!("list:{kind}:{prefix}"));
        match state.lists.get(&format!("{kind}:{prefix}")) {
            Some(Ok(names)) => Ok(names.clone()),
            Some(Err(message)) => Err(Error::Transport(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// Clock that requests cancellation instead of sleeping, for driving a
/// mid-run shutdown deterministically.
pub struct CancellingClock {
    cancel: CancelToken,
}

impl CancellingClock {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }
}

#[async_trait]
impl Clock for CancellingClock {
    async fn sleep(&self, _duration: Duration) {
        self.cancel.cancel();
    }
}

/// Clock that never actually waits.
#[derive(Default)]
pub struct InstantClock;

impl InstantClock {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, _duration: Duration) {}
}
