//! Search dialog state
//!
//! Mirrors the event wiring in `assets/search.js`: a button or the
//! Ctrl/Cmd+K shortcut opens the dialog; the close button, Escape or a click
//! on the backdrop closes it.

/// UI events the search dialog reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent {
    ButtonClick,
    KeyDown { key: String, ctrl: bool, meta: bool },
    CloseClick,
    /// A click inside the dialog element; `on_backdrop` is true when the
    /// target is the dialog itself rather than its content
    DialogClick { on_backdrop: bool },
    Input(String),
}

/// Open/closed state of the search dialog plus the current query
#[derive(Debug, Clone)]
pub struct SearchModal {
    open: bool,
    query: String,
    shortcut_key: String,
}

impl SearchModal {
    pub fn new(shortcut_key: &str) -> Self {
        Self {
            open: false,
            query: String::new(),
            shortcut_key: shortcut_key.to_string(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Apply an event; returns true when the default browser action should
    /// be suppressed
    pub fn handle(&mut self, event: ModalEvent) -> bool {
        match event {
            ModalEvent::ButtonClick => {
                self.show();
                false
            }
            ModalEvent::KeyDown { key, ctrl, meta } => {
                if is_open_shortcut(&key, ctrl, meta, &self.shortcut_key) {
                    if !self.open {
                        self.show();
                    }
                    true
                } else {
                    if key == "Escape" {
                        self.open = false;
                    }
                    false
                }
            }
            ModalEvent::CloseClick => {
                self.open = false;
                false
            }
            ModalEvent::DialogClick { on_backdrop } => {
                if on_backdrop {
                    self.open = false;
                }
                false
            }
            ModalEvent::Input(value) => {
                if self.open {
                    self.query = value;
                }
                false
            }
        }
    }

    fn show(&mut self) {
        self.open = true;
        self.query.clear();
    }
}

/// Whether a keydown opens the search dialog
///
/// Either Ctrl or Cmd (meta) must be held; the key compares
/// case-insensitively so Shift does not matter.
pub fn is_open_shortcut(key: &str, ctrl: bool, meta: bool, shortcut_key: &str) -> bool {
    (ctrl || meta) && key.eq_ignore_ascii_case(shortcut_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str, ctrl: bool, meta: bool) -> ModalEvent {
        ModalEvent::KeyDown {
            key: k.to_string(),
            ctrl,
            meta,
        }
    }

    #[test]
    fn test_shortcut_detection() {
        assert!(is_open_shortcut("k", true, false, "k"));
        assert!(is_open_shortcut("K", false, true, "k"));
        assert!(!is_open_shortcut("k", false, false, "k"));
        assert!(!is_open_shortcut("j", true, false, "k"));
    }

    #[test]
    fn test_button_and_close() {
        let mut modal = SearchModal::new("k");
        assert!(!modal.is_open());
        modal.handle(ModalEvent::ButtonClick);
        assert!(modal.is_open());
        modal.handle(ModalEvent::CloseClick);
        assert!(!modal.is_open());
    }

    #[test]
    fn test_shortcut_opens_and_suppresses_default() {
        let mut modal = SearchModal::new("k");
        assert!(modal.handle(key("k", true, false)));
        assert!(modal.is_open());
        // Pressing again keeps it open
        assert!(modal.handle(key("k", false, true)));
        assert!(modal.is_open());
        // Plain typing is not intercepted
        assert!(!modal.handle(key("k", false, false)));
    }

    #[test]
    fn test_backdrop_click_closes_content_click_does_not() {
        let mut modal = SearchModal::new("k");
        modal.handle(ModalEvent::ButtonClick);
        modal.handle(ModalEvent::DialogClick { on_backdrop: false });
        assert!(modal.is_open());
        modal.handle(ModalEvent::DialogClick { on_backdrop: true });
        assert!(!modal.is_open());
    }

    #[test]
    fn test_escape_closes() {
        let mut modal = SearchModal::new("k");
        modal.handle(ModalEvent::ButtonClick);
        modal.handle(key("Escape", false, false));
        assert!(!modal.is_open());
    }

    #[test]
    fn test_reopening_clears_query() {
        let mut modal = SearchModal::new("k");
        modal.handle(ModalEvent::ButtonClick);
        modal.handle(ModalEvent::Input("rust".to_string()));
        assert_eq!(modal.query(), "rust");
        modal.handle(ModalEvent::CloseClick);
        modal.handle(ModalEvent::ButtonClick);
        assert_eq!(modal.query(), "");
    }
}
