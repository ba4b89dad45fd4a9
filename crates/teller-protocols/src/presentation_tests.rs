use super::*;
use parking_lot::Mutex;

#[derive(Default)]
struct RecordingSurface {
    calls: Mutex<Vec<String>>,
}

impl PresentationSurface for RecordingSurface {
    fn set_title(&self, title: &str) {
        self.calls.lock().push(format!("title:{}", title));
    }

    fn set_footer(&self, visible: bool, primary_label: Option<&str>) {
        self.calls
            .lock()
            .push(format!("footer:{}:{}", visible, primary_label.unwrap_or("-")));
    }

    fn set_validation(&self, is_valid: bool, message: Option<&str>) {
        self.calls
            .lock()
            .push(format!("validation:{}:{}", is_valid, message.unwrap_or("-")));
    }

    fn set_preferred_width(&self, width: ModalWidth) {
        self.calls.lock().push(format!("width:{:?}", width));
    }
}

#[test]
fn test_default_state() {
    let state = PresentationState::default();
    assert!(state.title.is_empty());
    assert!(state.footer_visible);
    assert!(state.is_valid);
    assert_eq!(state.modal_width, ModalWidth::Medium);
}

#[test]
fn test_apply_updates() {
    let mut state = PresentationState::default();
    state.apply(&PresentationUpdate::Title {
        text: "Loan application".to_string(),
    });
    state.apply(&PresentationUpdate::Validation {
        is_valid: false,
        message: Some("Amount required".to_string()),
    });
    state.apply(&PresentationUpdate::Footer {
        visible: true,
        primary_label: Some("Submit".to_string()),
    });
    state.apply(&PresentationUpdate::Width {
        width: ModalWidth::Custom(720),
    });

    assert_eq!(state.title, "Loan application");
    assert!(!state.is_valid);
    assert_eq!(state.validation_message.as_deref(), Some("Amount required"));
    assert_eq!(state.footer_label.as_deref(), Some("Submit"));
    assert_eq!(state.modal_width, ModalWidth::Custom(720));
}

#[test]
fn test_to_updates_reproduces_state() {
    let mut state = PresentationState::default();
    state.apply(&PresentationUpdate::Title {
        text: "Sign agreement".to_string(),
    });
    state.apply(&PresentationUpdate::Width {
        width: ModalWidth::Large,
    });

    let mut rebuilt = PresentationState::default();
    for update in state.to_updates() {
        rebuilt.apply(&update);
    }
    assert_eq!(rebuilt, state);
}

#[test]
fn test_deliver_to_surface() {
    let surface = RecordingSurface::default();
    PresentationUpdate::Title {
        text: "KYC".to_string(),
    }
    .deliver(&surface);
    PresentationUpdate::Footer {
        visible: false,
        primary_label: None,
    }
    .deliver(&surface);
    PresentationUpdate::Validation {
        is_valid: false,
        message: Some("Missing document".to_string()),
    }
    .deliver(&surface);
    PresentationUpdate::Width {
        width: ModalWidth::Small,
    }
    .deliver(&surface);

    let calls = surface.calls.lock();
    assert_eq!(
        *calls,
        vec![
            "title:KYC".to_string(),
            "footer:false:-".to_string(),
            "validation:false:Missing document".to_string(),
            "width:Small".to_string(),
        ]
    );
}

#[test]
fn test_update_serialization() {
    let update = PresentationUpdate::Title {
        text: "Hello".to_string(),
    };
    let json = serde_json::to_value(&update).unwrap();
    assert_eq!(json["kind"], "title");
    assert_eq!(json["text"], "Hello");
}
