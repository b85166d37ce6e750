//! Edit request dispatch: parse, admit, translate, launch, correlate.
//!
//! Each step runs only after the previous one succeeded. The response is
//! written exactly once, either by the first failing step or by the
//! correlator once the agent reports a terminal status.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use pinpoint_domain::AgentInvocation;
use pinpoint_domain::BridgeError;
use pinpoint_domain::EditRequest;
use tracing::Instrument;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::info_span;
use tracing::warn;

use crate::usecases::correlation::DispatchOutcome;
use crate::usecases::correlation::Responder;
use crate::usecases::correlation::correlate;
use crate::usecases::host::HostProfile;
use crate::usecases::inflight::Admission;
use crate::usecases::ports::AgentLauncher;
use crate::usecases::ports::PathTranslator;
use crate::usecases::quoting::AgentCommand;

/// Path handling fixed at startup from the host profile.
#[derive(Clone)]
pub enum PathStrategy {
    Verbatim,
    Translate(Arc<dyn PathTranslator>),
}

impl PathStrategy {
    pub fn for_host(profile: &HostProfile, translator: Arc<dyn PathTranslator>) -> Self {
        if profile.needs_path_translation() {
            PathStrategy::Translate(translator)
        } else {
            PathStrategy::Verbatim
        }
    }

    async fn resolve(&self, profile: &HostProfile, file: &str) -> Result<String, BridgeError> {
        match self {
            PathStrategy::Verbatim => Ok(file.to_string()),
            PathStrategy::Translate(translator) => {
                let normalized = profile.normalize_path(file);
                translator
                    .translate(&normalized)
                    .await
                    .map_err(|e| BridgeError::PathTranslation {
                        path: normalized,
                        reason: e.message,
                    })
            }
        }
    }
}

impl std::fmt::Debug for PathStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathStrategy::Verbatim => f.write_str("Verbatim"),
            PathStrategy::Translate(_) => f.write_str("Translate"),
        }
    }
}

#[async_trait]
pub trait DispatchEditUseCase: Send + Sync {
    /// Handles one request body; `responder` is written exactly once.
    ///
    /// Resolves only after the agent process is gone, so callers that must
    /// answer early should run this in its own task and await the responder.
    async fn execute(&self, body: &[u8], responder: Responder) -> DispatchOutcome;
}

pub struct DispatchEditUseCaseImpl {
    profile: HostProfile,
    paths: PathStrategy,
    command: AgentCommand,
    launcher: Arc<dyn AgentLauncher>,
    admission: Admission,
}

impl DispatchEditUseCaseImpl {
    pub fn new(
        profile: HostProfile,
        paths: PathStrategy,
        command: AgentCommand,
        launcher: Arc<dyn AgentLauncher>,
        admission: Admission,
    ) -> Self {
        Self {
            profile,
            paths,
            command,
            launcher,
            admission,
        }
    }

    pub fn profile(&self) -> &HostProfile {
        &self.profile
    }

    /// Resolves the path and builds the exact argv for `request` without
    /// launching anything.
    pub async fn plan(&self, request: &EditRequest) -> Result<AgentInvocation, BridgeError> {
        let path = self.paths.resolve(&self.profile, &request.file).await?;
        let instruction = AgentCommand::instruction(request, &path);
        Ok(self
            .profile
            .invocation(self.command.command_line(&instruction)))
    }

    async fn run(&self, body: &[u8], responder: &mut Responder) -> DispatchOutcome {
        let request = EditRequest::from_json(body)?;
        let location = request.location();
        let _slot = self.admission.admit(location.as_str())?;

        let invocation = self.plan(&request).await?;
        let program = invocation.program.clone();

        info!(
            location = %location,
            element = %request.element_kind,
            program = %program,
            "Launching agent"
        );
        debug!(command = %invocation.display_line(), "Agent invocation");

        let events = self.launcher.launch(invocation);
        correlate(events, &program, responder).await
    }
}

fn log_failure(err: &BridgeError, elapsed_ms: u128) {
    let category = err.category();
    if category.is_client_fault() {
        warn!(
            stage = %err.stage(),
            category = %category,
            context = %err.context(),
            elapsed_ms,
            "Edit request rejected: {}",
            err
        );
    } else {
        error!(
            stage = %err.stage(),
            category = %category,
            context = %err.context(),
            suggestion = %err.suggestion(),
            elapsed_ms,
            "Edit request failed: {}",
            err
        );
    }
}

#[async_trait]
impl DispatchEditUseCase for DispatchEditUseCaseImpl {
    async fn execute(&self, body: &[u8], mut responder: Responder) -> DispatchOutcome {
        let span = info_span!("edit_request", host = %self.profile.kind(), bytes = body.len());
        async move {
            let started = Instant::now();
            let outcome = self.run(body, &mut responder).await;
            let elapsed_ms = started.elapsed().as_millis();
            match &outcome {
                Ok(()) => info!(elapsed_ms, "Agent finished successfully"),
                Err(err) => log_failure(err, elapsed_ms),
            }
            if !responder.is_ended() {
                responder.respond(outcome.clone());
            }
            outcome
        }
        .instrument(span)
        .await
    }
}
