//! Edit bridge HTTP surface.
//!
//! The bridge is a middleware: it answers `POST /__ai-cli` and hands every
//! other request to the next handler, so it can sit in front of a dev
//! server's own router. The standalone server's next handler is a 404.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::Request;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::response::Response;
use tokio::net::TcpListener;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::common::ErrorCategory;
use crate::domain::BridgeError;
use crate::domain::BridgeResult;
use crate::infra::BridgeConfig;
use crate::infra::CommandPathTranslator;
use crate::infra::ProcessAgentLauncher;
use crate::usecases::Admission;
use crate::usecases::DispatchEditUseCase;
use crate::usecases::DispatchEditUseCaseImpl;
use crate::usecases::DispatchOutcome;
use crate::usecases::PathStrategy;
use crate::usecases::Responder;

mod error;
pub use error::ServerError;

pub const BRIDGE_PATH: &str = "/__ai-cli";

#[derive(Clone)]
pub struct BridgeState {
    dispatcher: Arc<dyn DispatchEditUseCase>,
    max_request_bytes: usize,
}

impl BridgeState {
    pub fn new(dispatcher: Arc<dyn DispatchEditUseCase>, max_request_bytes: usize) -> Self {
        Self {
            dispatcher,
            max_request_bytes,
        }
    }

    /// Wires the process-backed adapters for `config`.
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(
            Arc::new(build_dispatcher(config)),
            config.max_request_bytes(),
        )
    }
}

pub fn build_dispatcher(config: &BridgeConfig) -> DispatchEditUseCaseImpl {
    let profile = config.host_profile();
    let translator = Arc::new(CommandPathTranslator::wslpath(config.path_helper()));
    let paths = PathStrategy::for_host(&profile, translator);
    DispatchEditUseCaseImpl::new(
        profile,
        paths,
        config.agent_command(),
        Arc::new(ProcessAgentLauncher::new()),
        Admission::from_flag(config.single_flight()),
    )
}

fn status_for(err: &BridgeError) -> StatusCode {
    match err.category() {
        ErrorCategory::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCategory::Busy => StatusCode::CONFLICT,
        ErrorCategory::External => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn bridge_response(outcome: &DispatchOutcome) -> Response {
    match outcome {
        Ok(()) => (StatusCode::OK, Json(BridgeResult::success())).into_response(),
        Err(err) => (status_for(err), Json(BridgeResult::from(err))).into_response(),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(BridgeResult::error(message))).into_response()
}

/// Intercepts `POST /__ai-cli`; everything else goes to `next`.
///
/// Dispatch runs in its own task so the agent keeps running, and the
/// in-flight slot stays held, even if the caller disconnects.
pub async fn bridge_middleware(
    State(state): State<BridgeState>,
    request: Request,
    next: Next,
) -> Response {
    // Matched on path only: a cache-busting query string still reaches the bridge.
    if request.method() != Method::POST || request.uri().path() != BRIDGE_PATH {
        return next.run(request).await;
    }

    let body = match axum::body::to_bytes(request.into_body(), state.max_request_bytes).await {
        Ok(body) => body,
        Err(e) => {
            let err = BridgeError::MalformedBody {
                reason: e.to_string(),
            };
            warn!(
                stage = %err.stage(),
                limit = state.max_request_bytes,
                context = %err.context(),
                "Edit request rejected: unreadable body"
            );
            return bridge_response(&Err(err));
        }
    };

    let (responder, answer) = Responder::channel();
    let dispatcher = Arc::clone(&state.dispatcher);
    tokio::spawn(async move {
        let _ = dispatcher.execute(&body, responder).await;
    });

    match answer.await {
        Ok(outcome) => bridge_response(&outcome),
        Err(_) => {
            error!("Dispatch task ended without writing a response");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Bridge ended without a response",
            )
        }
    }
}

/// Layers the bridge in front of an existing router.
pub fn with_bridge(router: Router, state: BridgeState) -> Router {
    router.layer(from_fn_with_state(state, bridge_middleware))
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

pub fn build_router(state: BridgeState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    with_bridge(Router::new().fallback(not_found), state).layer(cors)
}

pub fn bind_listener(
    config: &BridgeConfig,
) -> Result<(std::net::TcpListener, SocketAddr), ServerError> {
    config.validate()?;
    let listener = std::net::TcpListener::bind(config.listen()).map_err(|e| ServerError::Io {
        operation: "bind",
        source: e,
    })?;
    listener
        .set_nonblocking(true)
        .map_err(|e| ServerError::Io {
            operation: "set non-blocking",
            source: e,
        })?;
    let local_addr = listener.local_addr().map_err(|e| ServerError::Io {
        operation: "read local address",
        source: e,
    })?;
    Ok((listener, local_addr))
}

/// Serves until `shutdown` resolves.
pub async fn serve(
    listener: std::net::TcpListener,
    state: BridgeState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let listener = TcpListener::from_std(listener).map_err(|e| ServerError::Io {
        operation: "create async listener",
        source: e,
    })?;
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Io {
            operation: "serve",
            source: e,
        })
}

/// Binds, then blocks on a dedicated runtime until Ctrl-C.
pub fn run_server(config: &BridgeConfig) -> Result<(), ServerError> {
    let (listener, local_addr) = bind_listener(config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ServerError::Io {
            operation: "build runtime",
            source: e,
        })?;

    let state = BridgeState::from_config(config);
    info!(
        url = %format!("http://{}{}", local_addr, BRIDGE_PATH),
        host = %config.host_kind(),
        single_flight = config.single_flight(),
        "Edit bridge listening"
    );

    runtime.block_on(serve(listener, state, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C; stopping");
        }
        info!("Shutting down edit bridge");
    }))
}
