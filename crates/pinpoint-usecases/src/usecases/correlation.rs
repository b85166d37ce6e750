//! Correlates agent lifecycle events with the single response owed to the
//! caller.

use pinpoint_domain::BridgeError;
use pinpoint_domain::SpawnFailureKind;
use tokio::sync::oneshot;
use tracing::debug;

use crate::usecases::ports::AgentEvent;
use crate::usecases::ports::AgentEvents;

/// `Ok` is a success reply; `Err` carries the failure for both the reply
/// and the host log.
pub type DispatchOutcome = Result<(), BridgeError>;

pub const NO_STATUS_MESSAGE: &str = "Agent ended without reporting a status";

/// Write-once handle to the caller's response.
#[derive(Debug)]
pub struct Responder {
    tx: Option<oneshot::Sender<DispatchOutcome>>,
}

impl Responder {
    pub fn channel() -> (Self, oneshot::Receiver<DispatchOutcome>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn is_ended(&self) -> bool {
        self.tx.is_none()
    }

    /// Sends `outcome` if nothing has been sent yet.
    ///
    /// Returns `false` when a response was already written; a caller that
    /// went away still counts as written.
    pub fn respond(&mut self, outcome: DispatchOutcome) -> bool {
        let Some(tx) = self.tx.take() else {
            return false;
        };
        if tx.send(outcome).is_err() {
            debug!("Caller disconnected before the response was written");
        }
        true
    }
}

fn terminal_outcome(event: AgentEvent, program: &str) -> Option<DispatchOutcome> {
    match event {
        AgentEvent::Spawned { pid } => {
            debug!(pid = ?pid, program = %program, "Agent process started");
            None
        }
        AgentEvent::Exited { code: Some(0) } => Some(Ok(())),
        AgentEvent::Exited { code } => Some(Err(BridgeError::AgentFailure { code })),
        AgentEvent::Failed { kind, message } => Some(Err(BridgeError::Spawn {
            program: program.to_string(),
            kind,
            reason: message,
        })),
    }
}

/// Drains `events` until the launcher closes the stream.
///
/// The first terminal event (exit or failure) is answered through
/// `responder`; anything after it is logged and dropped. Returns the
/// outcome that was answered.
pub async fn correlate(
    mut events: AgentEvents,
    program: &str,
    responder: &mut Responder,
) -> DispatchOutcome {
    let mut answered: Option<DispatchOutcome> = None;

    while let Some(event) = events.recv().await {
        let Some(outcome) = terminal_outcome(event, program) else {
            continue;
        };
        if answered.is_some() {
            debug!(outcome = ?outcome, "Ignoring agent event after response was written");
            continue;
        }
        responder.respond(outcome.clone());
        answered = Some(outcome);
    }

    match answered {
        Some(outcome) => outcome,
        None => {
            let outcome = Err(BridgeError::Spawn {
                program: program.to_string(),
                kind: SpawnFailureKind::Other,
                reason: NO_STATUS_MESSAGE.to_string(),
            });
            responder.respond(outcome.clone());
            outcome
        }
    }
}
