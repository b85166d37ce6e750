//! Agent process port.

use pinpoint_domain::AgentInvocation;
use pinpoint_domain::SpawnFailureKind;
use tokio::sync::mpsc;

/// Lifecycle events of one agent process, in the order they occur.
///
/// A launcher may report more than one terminal event (an exit and an
/// error); the correlator answers the first and ignores the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    Spawned { pid: Option<u32> },
    Exited { code: Option<i32> },
    Failed { kind: SpawnFailureKind, message: String },
}

pub type AgentEvents = mpsc::UnboundedReceiver<AgentEvent>;

pub trait AgentLauncher: Send + Sync {
    /// Starts the process and returns its event stream.
    ///
    /// The stream closes once the process is gone; it must be called from
    /// inside a tokio runtime.
    fn launch(&self, invocation: AgentInvocation) -> AgentEvents;
}
