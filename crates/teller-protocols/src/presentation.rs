//! Presentation contract between the engine and the shell.
//!
//! Workflows never talk to the shell directly. They issue [`PresentationUpdate`]s
//! through their context; the manager forwards them to the attached
//! [`PresentationSurface`] only while the workflow is focused, and buffers them
//! otherwise.

use serde::{Deserialize, Serialize};

/// Preferred modal size hint for the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalWidth {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
    /// Explicit width in pixels.
    Custom(u32),
}

/// One outbound presentation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresentationUpdate {
    Title {
        text: String,
    },
    Footer {
        visible: bool,
        primary_label: Option<String>,
    },
    Validation {
        is_valid: bool,
        message: Option<String>,
    },
    Width {
        width: ModalWidth,
    },
}

impl PresentationUpdate {
    /// Deliver this update to a surface.
    pub fn deliver(&self, surface: &dyn PresentationSurface) {
        match self {
            PresentationUpdate::Title { text } => surface.set_title(text),
            PresentationUpdate::Footer {
                visible,
                primary_label,
            } => surface.set_footer(*visible, primary_label.as_deref()),
            PresentationUpdate::Validation { is_valid, message } => {
                surface.set_validation(*is_valid, message.as_deref())
            }
            PresentationUpdate::Width { width } => surface.set_preferred_width(*width),
        }
    }
}

/// UI-facing state of one workflow entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationState {
    pub title: String,
    pub footer_visible: bool,
    pub footer_label: Option<String>,
    pub is_valid: bool,
    pub validation_message: Option<String>,
    pub modal_width: ModalWidth,
}

impl Default for PresentationState {
    fn default() -> Self {
        Self {
            title: String::new(),
            footer_visible: true,
            footer_label: None,
            is_valid: true,
            validation_message: None,
            modal_width: ModalWidth::default(),
        }
    }
}

impl PresentationState {
    /// Fold one update into the state.
    pub fn apply(&mut self, update: &PresentationUpdate) {
        match update {
            PresentationUpdate::Title { text } => self.title = text.clone(),
            PresentationUpdate::Footer {
                visible,
                primary_label,
            } => {
                self.footer_visible = *visible;
                self.footer_label = primary_label.clone();
            }
            PresentationUpdate::Validation { is_valid, message } => {
                self.is_valid = *is_valid;
                self.validation_message = message.clone();
            }
            PresentationUpdate::Width { width } => self.modal_width = *width,
        }
    }

    /// Express the whole state as the calls that reproduce it on a fresh surface.
    pub fn to_updates(&self) -> Vec<PresentationUpdate> {
        vec![
            PresentationUpdate::Title {
                text: self.title.clone(),
            },
            PresentationUpdate::Footer {
                visible: self.footer_visible,
                primary_label: self.footer_label.clone(),
            },
            PresentationUpdate::Validation {
                is_valid: self.is_valid,
                message: self.validation_message.clone(),
            },
            PresentationUpdate::Width {
                width: self.modal_width,
            },
        ]
    }
}

/// The shell rendering the focused workflow.
///
/// Calls arrive while the manager holds its stack lock, so implementations must
/// not call back into the manager synchronously.
pub trait PresentationSurface: Send + Sync {
    fn set_title(&self, title: &str);

    fn set_footer(&self, visible: bool, primary_label: Option<&str>);

    /// Gates whether the shell enables its primary action.
    fn set_validation(&self, is_valid: bool, message: Option<&str>);

    fn set_preferred_width(&self, width: ModalWidth);

    /// Called when the last workflow leaves the stack.
    fn clear(&self) {}
}

#[cfg(test)]
#[path = "presentation_tests.rs"]
mod tests;
