//! Display surface seam: everything the workflow shows to the user goes through [`Surface`].

use crate::{flow::FlowKind, preview::PreviewImage, presentation::ResultView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Preview,
    GenerateControl,
    Loading,
    Result,
    ShareControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Generate,
    Share,
}

impl Control {
    pub fn idle_label(self) -> &'static str {
        match self {
            Control::Generate => "Generate passage",
            Control::Share => "Save as story image",
        }
    }

    pub fn busy_label(self) -> &'static str {
        match self {
            Control::Generate => "Generating...",
            Control::Share => "Creating image...",
        }
    }
}

/// A blocking, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub flow: FlowKind,
    pub message: String,
}

impl Notice {
    pub fn new(flow: FlowKind, message: impl Into<String>) -> Self {
        Self {
            flow,
            message: message.into(),
        }
    }
}

/// Calls arrive between suspension points and from guard drops, so they must not block
/// on async work.
pub trait Surface: Send + Sync {
    fn set_visible(&self, element: Element, visible: bool);
    fn set_control(&self, control: Control, enabled: bool, label: &str);
    fn set_loading_message(&self, message: &str);
    fn show_preview(&self, preview: &PreviewImage);
    fn show_result(&self, view: &ResultView);
    fn notify(&self, notice: &Notice);
}
