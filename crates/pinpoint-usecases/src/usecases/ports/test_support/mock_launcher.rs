use std::sync::Arc;
use std::sync::Mutex;

use pinpoint_common::mutex_lock_or_recover;
use pinpoint_domain::AgentInvocation;
use tokio::sync::Semaphore;
use tokio::sync::mpsc;

use crate::usecases::ports::AgentEvent;
use crate::usecases::ports::AgentEvents;
use crate::usecases::ports::AgentLauncher;

/// Replays a scripted event sequence for every launch.
///
/// With `hold_until_released`, nothing is sent until `release()` is
/// called, which keeps a request in flight.
#[derive(Clone)]
pub struct MockAgentLauncher {
    script: Vec<AgentEvent>,
    invocations: Arc<Mutex<Vec<AgentInvocation>>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockAgentLauncher {
    pub fn new(script: Vec<AgentEvent>) -> Self {
        Self {
            script,
            invocations: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Spawns, then exits with `code`.
    pub fn exiting(code: i32) -> Self {
        Self::new(vec![
            AgentEvent::Spawned { pid: Some(4242) },
            AgentEvent::Exited { code: Some(code) },
        ])
    }

    pub fn hold_until_released(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Lets one held launch play its script.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn invocations(&self) -> Vec<AgentInvocation> {
        mutex_lock_or_recover(&self.invocations).clone()
    }

    pub fn launch_count(&self) -> usize {
        mutex_lock_or_recover(&self.invocations).len()
    }
}

impl AgentLauncher for MockAgentLauncher {
    fn launch(&self, invocation: AgentInvocation) -> AgentEvents {
        mutex_lock_or_recover(&self.invocations).push(invocation);
        let (tx, rx) = mpsc::unbounded_channel();
        match self.gate.clone() {
            None => {
                for event in &self.script {
                    let _ = tx.send(event.clone());
                }
            }
            Some(gate) => {
                let script = self.script.clone();
                tokio::spawn(async move {
                    if let Ok(permit) = gate.acquire().await {
                        permit.forget();
                    }
                    for event in script {
                        let _ = tx.send(event);
                    }
                });
            }
        }
        rx
    }
}
