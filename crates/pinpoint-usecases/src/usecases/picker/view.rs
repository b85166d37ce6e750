//! Render model for the picker overlay.

use pinpoint_domain::NodeId;

use crate::usecases::picker::Picker;
use crate::usecases::picker::PickerState;
use crate::usecases::ports::InputCapture;

pub const TOGGLE_ON_LABEL: &str = "DEV INSPECTOR";
pub const TOGGLE_OFF_LABEL: &str = "EXIT INSPECTOR";
pub const SUBMIT_LABEL: &str = "Send to agent";
pub const SUBMITTING_LABEL: &str = "Sending...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    Default,
    Crosshair,
}

/// Outline drawn around an element; `selected` switches to the solid style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub node: NodeId,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerView {
    /// `Button.tsx:12`
    pub location: String,
    pub prompt: String,
    pub input_enabled: bool,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    pub cancel_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerView {
    pub toggle_label: &'static str,
    pub cursor: CursorMode,
    pub highlight: Option<Highlight>,
    pub composer: Option<ComposerView>,
}

impl<C: InputCapture> Picker<C> {
    pub fn view(&self) -> PickerView {
        let toggle_label = if self.is_active() {
            TOGGLE_OFF_LABEL
        } else {
            TOGGLE_ON_LABEL
        };
        let cursor = if self.is_capturing() {
            CursorMode::Crosshair
        } else {
            CursorMode::Default
        };

        let (highlight, composer) = match self.state() {
            PickerState::Inactive | PickerState::Idle => (None, None),
            PickerState::Hovering { node, .. } => (
                Some(Highlight {
                    node: *node,
                    selected: false,
                }),
                None,
            ),
            PickerState::Composing { selection } | PickerState::Submitting { selection, .. } => {
                let submitting = matches!(self.state(), PickerState::Submitting { .. });
                let composer = ComposerView {
                    location: selection.tag.location_label(),
                    prompt: self.prompt().to_string(),
                    input_enabled: !submitting,
                    submit_enabled: !submitting && !self.prompt().trim().is_empty(),
                    submit_label: if submitting {
                        SUBMITTING_LABEL
                    } else {
                        SUBMIT_LABEL
                    },
                    cancel_enabled: !submitting,
                };
                (
                    Some(Highlight {
                        node: selection.node,
                        selected: true,
                    }),
                    Some(composer),
                )
            }
        };

        PickerView {
            toggle_label,
            cursor,
            highlight,
            composer,
        }
    }
}
