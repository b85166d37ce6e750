pub mod correlation;
pub mod dispatch;
pub mod host;
pub mod inflight;
pub mod picker;
pub mod ports;
pub mod quoting;
pub mod tagger;

pub use correlation::DispatchOutcome;
pub use correlation::Responder;
pub use dispatch::DispatchEditUseCase;
pub use dispatch::DispatchEditUseCaseImpl;
pub use dispatch::PathStrategy;
pub use host::HostKind;
pub use host::HostProfile;
pub use host::HostSelection;
pub use inflight::Admission;
pub use inflight::InFlightSlot;
pub use picker::Picker;
pub use picker::PickerState;
pub use picker::PickerView;
pub use quoting::AgentCommand;
pub use quoting::quote_single;
pub use tagger::SourceTagger;
pub use tagger::TaggerError;
