//! Console presentation shell.

use std::io::Write;

use parking_lot::Mutex;
use tracing::warn;

use teller_protocols::{ModalWidth, PresentationSurface};

/// Renders the focused workflow's presentation calls as text lines.
pub(crate) struct ConsoleSurface<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleSurface<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn line(&self, text: &str) {
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            warn!("Failed to write to console: {}", e);
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

fn width_label(width: ModalWidth) -> String {
    match width {
        ModalWidth::Small => "small".to_string(),
        ModalWidth::Medium => "medium".to_string(),
        ModalWidth::Large => "large".to_string(),
        ModalWidth::ExtraLarge => "extra large".to_string(),
        ModalWidth::Custom(px) => format!("{}px", px),
    }
}

impl<W: Write + Send> PresentationSurface for ConsoleSurface<W> {
    fn set_title(&self, title: &str) {
        if !title.is_empty() {
            self.line(&format!("== {} ==", title));
        }
    }

    fn set_footer(&self, visible: bool, primary_label: Option<&str>) {
        if visible {
            self.line(&format!(
                "   [next] {}   [dismiss]",
                primary_label.unwrap_or("Continue")
            ));
        }
    }

    fn set_validation(&self, is_valid: bool, message: Option<&str>) {
        match (is_valid, message) {
            (false, Some(message)) => self.line(&format!("   ! {}", message)),
            (false, None) => self.line("   ! This step is incomplete"),
            (true, Some(message)) => self.line(&format!("   i {}", message)),
            (true, None) => {}
        }
    }

    fn set_preferred_width(&self, width: ModalWidth) {
        tracing::debug!("Preferred width: {}", width_label(width));
    }

    fn clear(&self) {
        self.line("(no workflow running)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(draw: impl FnOnce(&ConsoleSurface<Vec<u8>>)) -> String {
        let surface = ConsoleSurface::new(Vec::new());
        draw(&surface);
        String::from_utf8(surface.into_inner()).unwrap()
    }

    #[test]
    fn test_title_and_footer() {
        let output = render(|s| {
            s.set_title("Loan application");
            s.set_footer(true, Some("Sign agreement"));
        });
        assert_eq!(
            output,
            "== Loan application ==\n   [next] Sign agreement   [dismiss]\n"
        );
    }

    #[test]
    fn test_hidden_footer_and_empty_title() {
        let output = render(|s| {
            s.set_title("");
            s.set_footer(false, Some("Sign"));
        });
        assert!(output.is_empty());
    }

    #[test]
    fn test_validation_lines() {
        let output = render(|s| {
            s.set_validation(false, Some("Amount required"));
            s.set_validation(true, None);
            s.set_validation(false, None);
        });
        assert_eq!(output, "   ! Amount required\n   ! This step is incomplete\n");
    }

    #[test]
    fn test_width_label() {
        assert_eq!(width_label(ModalWidth::Custom(720)), "720px");
        assert_eq!(width_label(ModalWidth::ExtraLarge), "extra large");
    }

    #[test]
    fn test_clear() {
        assert_eq!(render(|s| s.clear()), "(no workflow running)\n");
    }
}
