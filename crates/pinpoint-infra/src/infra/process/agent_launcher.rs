use std::process::Stdio;

use pinpoint_domain::AgentInvocation;
use pinpoint_domain::SpawnFailureKind;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::debug;

use crate::usecases::ports::AgentEvent;
use crate::usecases::ports::AgentEvents;
use crate::usecases::ports::AgentLauncher;

/// Spawns the agent with the bridge's own stdio so its output streams to
/// the terminal running `pinpoint serve`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessAgentLauncher;

impl ProcessAgentLauncher {
    pub fn new() -> Self {
        Self
    }
}

fn spawn_failure(program: &str, err: &std::io::Error) -> AgentEvent {
    AgentEvent::Failed {
        kind: SpawnFailureKind::from_io(err.kind()),
        message: format!("failed to spawn '{}': {}", program, err),
    }
}

impl AgentLauncher for ProcessAgentLauncher {
    fn launch(&self, invocation: AgentInvocation) -> AgentEvents {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                let _ = tx.send(spawn_failure(&invocation.program, &e));
                return rx;
            }
        };
        let _ = tx.send(AgentEvent::Spawned { pid: child.id() });

        let program = invocation.program;
        tokio::spawn(async move {
            let event = match child.wait().await {
                Ok(status) => {
                    debug!(program = %program, status = %status, "Agent process exited");
                    AgentEvent::Exited {
                        code: status.code(),
                    }
                }
                Err(e) => spawn_failure(&program, &e),
            };
            let _ = tx.send(event);
        });
        rx
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    async fn collect(mut events: AgentEvents) -> Vec<AgentEvent> {
        let mut seen = Vec::new();
        while let Some(event) = events.recv().await {
            seen.push(event);
        }
        seen
    }

    #[tokio::test]
    async fn test_exit_code_reported() {
        let invocation =
            AgentInvocation::new("sh", vec!["-c".to_string(), "exit 3".to_string()]);
        let events = collect(ProcessAgentLauncher::new().launch(invocation)).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], AgentEvent::Spawned { pid: Some(_) }));
        assert_eq!(events[1], AgentEvent::Exited { code: Some(3) });
    }

    #[tokio::test]
    async fn test_signal_has_no_code() {
        let invocation =
            AgentInvocation::new("sh", vec!["-c".to_string(), "kill -9 $$".to_string()]);
        let events = collect(ProcessAgentLauncher::new().launch(invocation)).await;
        assert_eq!(events.last(), Some(&AgentEvent::Exited { code: None }));
    }

    #[tokio::test]
    async fn test_missing_program_fails_without_spawn() {
        let invocation = AgentInvocation::new("pinpoint-no-such-shell", Vec::new());
        let events = collect(ProcessAgentLauncher::new().launch(invocation)).await;
        assert_eq!(events.len(), 1);
        let AgentEvent::Failed { kind, message } = &events[0] else {
            panic!("expected spawn failure, got {:?}", events[0]);
        };
        assert_eq!(*kind, SpawnFailureKind::NotFound);
        assert!(message.contains("pinpoint-no-such-shell"));
    }
}
