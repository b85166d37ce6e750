//! Runtime element picker.
//!
//! A sans-IO state machine: the host feeds it pointer events resolved to
//! [`NodeId`]s and bridge outcomes, and renders [`view::PickerView`]. The
//! only side effect it owns is the global input capture, held exactly while
//! the picker is looking for a target.

pub mod view;

use pinpoint_domain::BridgeResult;
use pinpoint_domain::Document;
use pinpoint_domain::EditRequest;
use pinpoint_domain::NodeId;
use pinpoint_domain::SourceTag;
use thiserror::Error;
use tracing::debug;

use crate::usecases::ports::CaptureSubscription;
use crate::usecases::ports::InputCapture;

pub use view::ComposerView;
pub use view::CursorMode;
pub use view::Highlight;
pub use view::PickerView;

/// Marks the picker's own root; clicks under it are never intercepted.
pub const PICKER_ROOT_ATTR: &str = "data-pinpoint-ui";

pub const SUCCESS_NOTICE: &str = "Task sent to agent!";
pub const FAILURE_NOTICE: &str = "Failed to send task.";
pub const CONNECTION_NOTICE: &str = "Connection error.";

/// An element chosen for editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub node: NodeId,
    pub tag: SourceTag,
    /// Lowercased tag name, e.g. `button`.
    pub element_kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerState {
    Inactive,
    Idle,
    Hovering { node: NodeId, tag: SourceTag },
    Composing { selection: Selection },
    Submitting {
        selection: Selection,
        submission: SubmissionId,
    },
}

impl PickerState {
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            PickerState::Composing { selection } | PickerState::Submitting { selection, .. } => {
                Some(selection)
            }
            _ => None,
        }
    }

    fn is_capturing(&self) -> bool {
        matches!(self, PickerState::Idle | PickerState::Hovering { .. })
    }
}

/// What the host must do with a click it routed to the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDisposition {
    /// Let the click reach the application.
    PassThrough,
    /// Prevent the default action and stop propagation.
    Consumed,
    /// As `Consumed`; a selection was made and the prompt should take focus.
    Selected,
}

impl ClickDisposition {
    pub fn suppresses(&self) -> bool {
        !matches!(self, ClickDisposition::PassThrough)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub id: SubmissionId,
    pub request: EditRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Responded(BridgeResult),
    /// The request never produced a readable response.
    ConnectionFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(message) | Notice::Failure(message) => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Success(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("no element is selected")]
    NoSelection,
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("a submission is already outstanding")]
    AlreadySubmitting,
}

pub struct Picker<C: InputCapture> {
    capture: C,
    subscription: Option<CaptureSubscription>,
    state: PickerState,
    prompt: String,
    next_submission: u64,
}

impl<C: InputCapture> Picker<C> {
    pub fn new(capture: C) -> Self {
        Self {
            capture,
            subscription: None,
            state: PickerState::Inactive,
            prompt: String::new(),
            next_submission: 0,
        }
    }

    pub fn state(&self) -> &PickerState {
        &self.state
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn is_active(&self) -> bool {
        self.state != PickerState::Inactive
    }

    pub fn is_capturing(&self) -> bool {
        self.subscription.is_some()
    }

    fn enter(&mut self, next: PickerState) {
        if next.is_capturing() {
            if self.subscription.is_none() {
                self.subscription = Some(self.capture.acquire());
            }
        } else {
            self.subscription = None;
        }
        if next.selection().is_none() {
            self.prompt.clear();
        }
        self.state = next;
    }

    /// Switches picking on or off; returns whether the picker is now active.
    ///
    /// Turning off discards any selection. A submission still outstanding
    /// keeps running but its outcome is ignored.
    pub fn toggle(&mut self) -> bool {
        if self.is_active() {
            self.enter(PickerState::Inactive);
            false
        } else {
            self.enter(PickerState::Idle);
            true
        }
    }

    fn is_picker_ui(document: &Document, target: NodeId) -> bool {
        document
            .closest(target, |doc, id| doc.has_attribute(id, PICKER_ROOT_ATTR))
            .is_some()
    }

    pub fn pointer_move(&mut self, document: &Document, target: NodeId) {
        if !self.state.is_capturing() {
            return;
        }
        let hovered = if Self::is_picker_ui(document, target) {
            None
        } else {
            document.closest_tagged(target)
        };
        let next = match hovered {
            Some((node, tag)) => PickerState::Hovering { node, tag },
            None => PickerState::Idle,
        };
        if next != self.state {
            self.enter(next);
        }
    }

    pub fn click(&mut self, document: &Document, target: NodeId) -> ClickDisposition {
        if !self.state.is_capturing() || Self::is_picker_ui(document, target) {
            return ClickDisposition::PassThrough;
        }
        let Some((node, tag)) = document.closest_tagged(target) else {
            return ClickDisposition::Consumed;
        };
        let element_kind = document.tag_name(node).unwrap_or("element").to_string();
        debug!(location = %tag, element = %element_kind, "Element selected");
        self.enter(PickerState::Composing {
            selection: Selection {
                node,
                tag,
                element_kind,
            },
        });
        ClickDisposition::Selected
    }

    /// Ignored unless a selection is being composed.
    pub fn set_prompt(&mut self, text: impl Into<String>) -> bool {
        if !matches!(self.state, PickerState::Composing { .. }) {
            return false;
        }
        self.prompt = text.into();
        true
    }

    /// Drops the selection being composed and resumes picking.
    pub fn cancel(&mut self) -> bool {
        if !matches!(self.state, PickerState::Composing { .. }) {
            return false;
        }
        self.enter(PickerState::Idle);
        true
    }

    pub fn submit(&mut self) -> Result<PendingSubmission, SubmitRejected> {
        let selection = match &self.state {
            PickerState::Composing { selection } => selection.clone(),
            PickerState::Submitting { .. } => return Err(SubmitRejected::AlreadySubmitting),
            _ => return Err(SubmitRejected::NoSelection),
        };
        if self.prompt.trim().is_empty() {
            return Err(SubmitRejected::EmptyPrompt);
        }

        let id = SubmissionId(self.next_submission);
        self.next_submission += 1;
        let request = EditRequest {
            prompt: self.prompt.clone(),
            file: selection.tag.file.clone(),
            line: selection.tag.line.to_string(),
            element_kind: selection.element_kind.clone(),
        };
        self.enter(PickerState::Submitting {
            selection,
            submission: id,
        });
        Ok(PendingSubmission { id, request })
    }

    /// Applies the bridge's answer to submission `id`.
    ///
    /// Success and failure both discard the selection and resume picking.
    /// Returns `None` for an outcome that no longer matches the open
    /// submission.
    pub fn resolve(&mut self, id: SubmissionId, outcome: SubmissionOutcome) -> Option<Notice> {
        match &self.state {
            PickerState::Submitting { submission, .. } if *submission == id => {}
            _ => {
                debug!(submission = id.0, "Ignoring outcome of abandoned submission");
                return None;
            }
        }
        self.enter(PickerState::Idle);
        Some(match outcome {
            SubmissionOutcome::Responded(result) if result.is_success() => {
                Notice::Success(SUCCESS_NOTICE.to_string())
            }
            SubmissionOutcome::Responded(result) => match result.message {
                Some(message) => Notice::Failure(format!("{} {}", FAILURE_NOTICE, message)),
                None => Notice::Failure(FAILURE_NOTICE.to_string()),
            },
            SubmissionOutcome::ConnectionFailed => Notice::Failure(CONNECTION_NOTICE.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockInputCapture;

    struct Page {
        doc: Document,
        body: NodeId,
        button: NodeId,
        icon: NodeId,
        plain: NodeId,
        picker_button: NodeId,
    }

    fn page() -> Page {
        let mut doc = Document::new();
        let body = doc.append(None, "body");
        let button = doc.append(Some(body), "BUTTON");
        doc.set_source_tag(button, &SourceTag::new("/app/src/Button.tsx", 12, 4));
        let icon = doc.append(Some(button), "svg");
        let plain = doc.append(Some(body), "div");
        let ui = doc.append(Some(body), "div");
        doc.set_attribute(ui, PICKER_ROOT_ATTR, "");
        let picker_button = doc.append(Some(ui), "button");
        doc.set_source_tag(picker_button, &SourceTag::new("/app/src/Inspector.tsx", 80, 8));
        Page {
            doc,
            body,
            button,
            icon,
            plain,
            picker_button,
        }
    }

    fn active_picker() -> (Picker<MockInputCapture>, MockInputCapture) {
        let capture = MockInputCapture::new();
        let mut picker = Picker::new(capture.clone());
        assert!(picker.toggle());
        (picker, capture)
    }

    #[test]
    fn test_toggle_attaches_and_detaches_capture() {
        let (mut picker, capture) = active_picker();
        assert_eq!(capture.active(), 1);
        assert!(!picker.toggle());
        assert_eq!(capture.active(), 0);
        assert_eq!(picker.state(), &PickerState::Inactive);
    }

    #[test]
    fn test_hover_resolves_nearest_tagged_ancestor() {
        let page = page();
        let (mut picker, _) = active_picker();

        picker.pointer_move(&page.doc, page.icon);
        assert_eq!(
            picker.state(),
            &PickerState::Hovering {
                node: page.button,
                tag: SourceTag::new("/app/src/Button.tsx", 12, 4),
            }
        );

        picker.pointer_move(&page.doc, page.plain);
        assert_eq!(picker.state(), &PickerState::Idle);
    }

    #[test]
    fn test_deeply_nested_untagged_resolves_to_tagged_div() {
        let mut doc = Document::new();
        let div = doc.append(None, "div");
        doc.set_source_tag(div, &SourceTag::new("/app/src/Card.tsx", 8, 2));
        let mut leaf = div;
        for tag in ["section", "ul", "li", "p", "span"] {
            leaf = doc.append(Some(leaf), tag);
        }
        let (mut picker, _) = active_picker();

        picker.pointer_move(&doc, leaf);

        let PickerState::Hovering { node, tag } = picker.state() else {
            panic!("expected hovering, got {:?}", picker.state());
        };
        assert_eq!(*node, div);
        assert_eq!(tag.line, 8);
    }

    #[test]
    fn test_hover_over_picker_ui_highlights_nothing() {
        let page = page();
        let (mut picker, _) = active_picker();
        picker.pointer_move(&page.doc, page.picker_button);
        assert_eq!(picker.state(), &PickerState::Idle);
    }

    #[test]
    fn test_click_selects_and_releases_capture() {
        let page = page();
        let (mut picker, capture) = active_picker();

        let disposition = picker.click(&page.doc, page.icon);

        assert_eq!(disposition, ClickDisposition::Selected);
        assert!(disposition.suppresses());
        assert_eq!(capture.active(), 0);
        let selection = picker.state().selection().unwrap();
        assert_eq!(selection.node, page.button);
        assert_eq!(selection.element_kind, "button");
    }

    #[test]
    fn test_click_on_untagged_is_consumed_without_selection() {
        let page = page();
        let (mut picker, capture) = active_picker();
        assert_eq!(picker.click(&page.doc, page.body), ClickDisposition::Consumed);
        assert_eq!(picker.state(), &PickerState::Idle);
        assert_eq!(capture.active(), 1);
    }

    #[test]
    fn test_click_inside_picker_passes_through() {
        let page = page();
        let (mut picker, _) = active_picker();
        assert_eq!(
            picker.click(&page.doc, page.picker_button),
            ClickDisposition::PassThrough
        );
        assert!(picker.state().selection().is_none());
    }

    #[test]
    fn test_inactive_picker_ignores_pointer() {
        let page = page();
        let mut picker = Picker::new(MockInputCapture::new());
        picker.pointer_move(&page.doc, page.button);
        assert_eq!(
            picker.click(&page.doc, page.button),
            ClickDisposition::PassThrough
        );
        assert_eq!(picker.state(), &PickerState::Inactive);
    }

    #[test]
    fn test_pointer_move_suppressed_while_selected() {
        let page = page();
        let (mut picker, _) = active_picker();
        picker.click(&page.doc, page.button);
        picker.pointer_move(&page.doc, page.plain);
        assert!(matches!(picker.state(), PickerState::Composing { .. }));
    }

    #[test]
    fn test_submit_requires_prompt() {
        let page = page();
        let (mut picker, _) = active_picker();
        assert_eq!(picker.submit(), Err(SubmitRejected::NoSelection));
        picker.click(&page.doc, page.button);
        picker.set_prompt("   ");
        assert_eq!(picker.submit(), Err(SubmitRejected::EmptyPrompt));
    }

    #[test]
    fn test_submit_builds_request_and_success_resumes_picking() {
        let page = page();
        let (mut picker, capture) = active_picker();
        picker.click(&page.doc, page.icon);
        assert!(picker.set_prompt("make this blue"));

        let pending = picker.submit().unwrap();
        assert_eq!(
            pending.request,
            EditRequest {
                prompt: "make this blue".into(),
                file: "/app/src/Button.tsx".into(),
                line: "12".into(),
                element_kind: "button".into(),
            }
        );
        assert_eq!(picker.submit(), Err(SubmitRejected::AlreadySubmitting));
        assert!(!picker.set_prompt("changed"));

        let notice = picker
            .resolve(pending.id, SubmissionOutcome::Responded(BridgeResult::success()))
            .unwrap();
        assert_eq!(notice, Notice::Success(SUCCESS_NOTICE.to_string()));
        assert_eq!(picker.state(), &PickerState::Idle);
        assert_eq!(picker.prompt(), "");
        assert_eq!(capture.active(), 1);
        assert_eq!(capture.acquired(), 2);
    }

    #[test]
    fn test_error_result_also_discards_selection() {
        let page = page();
        let (mut picker, _) = active_picker();
        picker.click(&page.doc, page.button);
        picker.set_prompt("x");
        let pending = picker.submit().unwrap();

        let notice = picker
            .resolve(
                pending.id,
                SubmissionOutcome::Responded(BridgeResult::error("Exit code 2")),
            )
            .unwrap();

        assert!(!notice.is_success());
        assert_eq!(notice.message(), "Failed to send task. Exit code 2");
        assert_eq!(picker.state(), &PickerState::Idle);
    }

    #[test]
    fn test_connection_failure_notice() {
        let page = page();
        let (mut picker, _) = active_picker();
        picker.click(&page.doc, page.button);
        picker.set_prompt("x");
        let pending = picker.submit().unwrap();
        let notice = picker
            .resolve(pending.id, SubmissionOutcome::ConnectionFailed)
            .unwrap();
        assert_eq!(notice, Notice::Failure(CONNECTION_NOTICE.to_string()));
    }

    #[test]
    fn test_cancel_resumes_picking() {
        let page = page();
        let (mut picker, capture) = active_picker();
        picker.click(&page.doc, page.button);
        picker.set_prompt("draft");
        assert!(picker.cancel());
        assert_eq!(picker.state(), &PickerState::Idle);
        assert_eq!(picker.prompt(), "");
        assert_eq!(capture.active(), 1);
        assert!(!picker.cancel());
    }

    #[test]
    fn test_toggle_off_during_submission_ignores_late_outcome() {
        let page = page();
        let (mut picker, capture) = active_picker();
        picker.click(&page.doc, page.button);
        picker.set_prompt("x");
        let pending = picker.submit().unwrap();

        picker.toggle();
        picker.toggle();

        let late = picker.resolve(pending.id, SubmissionOutcome::Responded(BridgeResult::success()));
        assert_eq!(late, None);
        assert_eq!(picker.state(), &PickerState::Idle);
        assert_eq!(capture.active(), 1);
    }
}
