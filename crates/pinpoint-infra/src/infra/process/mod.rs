//! Child-process adapters for path translation and the agent.

mod agent_launcher;
mod path_translator;

pub use agent_launcher::ProcessAgentLauncher;
pub use path_translator::CommandPathTranslator;
