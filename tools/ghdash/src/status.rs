const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Display state for the startup status bar. Mutated only from the event
/// loop thread; background checks report through messages instead of
/// touching these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReporter {
    pub error_message: Option<String>,
    pub progress_message: Option<String>,
    pub success_message: Option<String>,
    pub busy: bool,
    last_error: Option<String>,
    spinner_enabled: bool,
    spinner_frame: usize,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Machine-level error. Callers pair this with `set_error_message` for
    /// the human display layer.
    pub fn set_error(&mut self, error: impl std::fmt::Display) {
        self.last_error = Some(error.to_string());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_error_message(&mut self, text: impl Into<String>) {
        self.error_message = Some(text.into());
        self.success_message = None;
        self.progress_message = None;
        self.busy = false;
    }

    pub fn set_progress_message(&mut self, text: impl Into<String>) {
        self.progress_message = Some(text.into());
        self.busy = true;
    }

    pub fn set_success_message(&mut self, text: impl Into<String>) {
        self.success_message = Some(text.into());
        self.error_message = None;
        self.progress_message = None;
        self.busy = false;
    }

    /// Clears all text and the busy flag. Spinner enablement survives so a
    /// later progress message animates without re-arming.
    pub fn reset(&mut self) {
        self.error_message = None;
        self.progress_message = None;
        self.success_message = None;
        self.last_error = None;
        self.busy = false;
    }

    pub fn enable_spinner(&mut self) {
        self.spinner_enabled = true;
    }

    pub fn spinner_enabled(&self) -> bool {
        self.spinner_enabled
    }

    /// Advances the spinner animation; driven by the event loop tick so the
    /// bar keeps moving while a check is in flight.
    pub fn tick(&mut self) {
        if self.spinner_enabled && self.busy {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    pub fn spinner_glyph(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame]
    }

    pub fn status_line(&self) -> String {
        if let Some(error) = &self.error_message {
            return format!("error: {error}");
        }
        if let Some(success) = &self.success_message {
            return success.clone();
        }
        if let Some(progress) = &self.progress_message {
            if self.spinner_enabled {
                return format!("{} {progress}", self.spinner_glyph());
            }
            return progress.clone();
        }
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::StatusReporter;

    #[test]
    fn reset_then_success_leaves_only_the_success_text() {
        let mut reporter = StatusReporter::new();
        reporter.enable_spinner();
        reporter.set_error("boom");
        reporter.set_error_message("something failed");
        reporter.set_progress_message("working...");

        reporter.reset();
        reporter.set_success_message("Welcome!");

        assert_eq!(reporter.error_message, None);
        assert_eq!(reporter.progress_message, None);
        assert_eq!(reporter.success_message.as_deref(), Some("Welcome!"));
        assert!(reporter.spinner_enabled());
        assert!(reporter.last_error().is_none());
    }

    #[test]
    fn error_and_success_never_coexist() {
        let mut reporter = StatusReporter::new();
        reporter.set_error_message("bad");
        reporter.set_success_message("good");
        assert_eq!(reporter.error_message, None);

        reporter.set_error_message("bad again");
        assert_eq!(reporter.success_message, None);
        assert!(!reporter.busy);
    }

    #[test]
    fn spinner_only_advances_while_busy() {
        let mut reporter = StatusReporter::new();
        reporter.enable_spinner();
        let idle_glyph = reporter.spinner_glyph();
        reporter.tick();
        assert_eq!(reporter.spinner_glyph(), idle_glyph);

        reporter.set_progress_message("checking...");
        reporter.tick();
        assert_ne!(reporter.spinner_glyph(), idle_glyph);
        assert!(reporter.status_line().contains("checking..."));
    }

    #[test]
    fn progress_is_cleared_on_resolution() {
        let mut reporter = StatusReporter::new();
        reporter.set_progress_message("checking...");
        assert!(reporter.busy);

        reporter.set_success_message("done");
        assert_eq!(reporter.progress_message, None);
        assert!(!reporter.busy);
    }
}
