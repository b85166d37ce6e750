mod mock_capture;
mod mock_launcher;
mod mock_translator;

pub use mock_capture::MockInputCapture;
pub use mock_launcher::MockAgentLauncher;
pub use mock_translator::MockPathTranslator;
