pub mod dom;
pub mod errors;
pub mod invocation;
pub mod request;
pub mod source_tag;
pub mod syntax;

pub use dom::Document;
pub use dom::NodeId;
pub use errors::BridgeError;
pub use errors::BridgeStage;
pub use errors::SpawnFailureKind;
pub use invocation::AgentInvocation;
pub use request::BridgeResult;
pub use request::BridgeStatus;
pub use request::EditRequest;
pub use source_tag::PROVENANCE_ATTRS;
pub use source_tag::SOURCE_COLUMN_ATTR;
pub use source_tag::SOURCE_FILE_ATTR;
pub use source_tag::SOURCE_LINE_ATTR;
pub use source_tag::SourceTag;
pub use syntax::AttributeValue;
pub use syntax::JsxAttribute;
pub use syntax::SourcePosition;
pub use syntax::SyntaxElement;
pub use syntax::SyntaxNode;
