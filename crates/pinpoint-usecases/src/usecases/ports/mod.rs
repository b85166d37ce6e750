//! Port interfaces owned by use cases.

pub mod agent_launcher;
pub mod input_capture;
pub mod path_translator;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent_launcher::AgentEvent;
pub use agent_launcher::AgentEvents;
pub use agent_launcher::AgentLauncher;
pub use input_capture::CaptureSubscription;
pub use input_capture::InputCapture;
pub use path_translator::PathTranslator;
pub use path_translator::TranslateError;
