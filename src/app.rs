//! Application state and core logic.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyModifiers};
use tracing::{debug, info, trace, warn};

use crate::clipboard::{Clipboard, CopyFeedback};
use crate::config::LoadedConfig;
use crate::derive::{Derived, derive};
use crate::form::{FormState, Stage, TextCursor};

/// Which part of the screen receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Typing into the current stage's field (default).
    #[default]
    Editor,
    /// Moving between keyword chips and toggling them.
    Keywords,
}

/// Main application state.
pub struct App {
    /// The single form for this session.
    pub form: FormState,
    /// Cursor within the current stage's field.
    pub cursor: TextCursor,
    pub focus: Focus,
    /// Keywords offered for toggling, from config.
    pub suggestions: Vec<String>,
    /// Highlighted chip while in keyword focus.
    pub keyword_index: usize,
    pub copy_feedback: CopyFeedback,
    /// Reason the last copy failed, cleared by the next key press.
    pub copy_error: Option<String>,
    clipboard: Box<dyn Clipboard>,
    /// Session ID from logging, if logging initialized.
    pub session_id: Option<String>,
    /// Directory where logs are written.
    pub log_directory: Option<PathBuf>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
    /// Whether the key help overlay is visible.
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        loaded_config: &LoadedConfig,
        clipboard: Box<dyn Clipboard>,
        session_id: Option<String>,
        log_directory: Option<PathBuf>,
    ) -> Self {
        Self {
            form: FormState::new(),
            cursor: TextCursor::default(),
            focus: Focus::default(),
            suggestions: loaded_config.config.keywords.suggestions.clone(),
            keyword_index: 0,
            copy_feedback: CopyFeedback::default(),
            copy_error: None,
            clipboard,
            session_id,
            log_directory,
            config_path: loaded_config.config_path.clone(),
            show_help: false,
            should_quit: false,
        }
    }

    /// Fresh derived values for the current form.
    pub fn derived(&self) -> Derived {
        derive(&self.form)
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copy_feedback.is_copied(now)
    }

    /// Expire the copied flag. Called on every loop iteration.
    pub fn tick(&mut self, now: Instant) {
        if self.copy_feedback.tick(now) {
            debug!("copied_flag_reset");
        }
    }

    pub fn set_stage(&mut self, stage: Stage) {
        if stage == self.form.stage {
            return;
        }
        debug!(from = ?self.form.stage, to = ?stage, "stage_changed");
        self.form.set_stage(stage);
        self.cursor = TextCursor::at_end(self.form.field(stage));
    }

    pub fn next_stage(&mut self) {
        self.set_stage(self.form.stage.next());
    }

    pub fn prev_stage(&mut self) {
        self.set_stage(self.form.stage.prev());
    }

    /// Toggle the keyword chip under the selection.
    pub fn toggle_selected_keyword(&mut self) {
        let Some(keyword) = self.suggestions.get(self.keyword_index) else {
            return;
        };
        let active = self.form.toggle_keyword(keyword);
        debug!(keyword = %keyword, active, "keyword_toggled");
    }

    pub fn select_prev_keyword(&mut self) {
        if self.keyword_index > 0 {
            self.keyword_index -= 1;
        } else {
            self.keyword_index = self.suggestions.len().saturating_sub(1);
        }
    }

    pub fn select_next_keyword(&mut self) {
        if self.keyword_index + 1 < self.suggestions.len() {
            self.keyword_index += 1;
        } else {
            self.keyword_index = 0;
        }
    }

    /// Copy the current summary to the clipboard.
    ///
    /// Failures are logged and remembered for the footer; they never propagate.
    pub fn copy_summary(&mut self, now: Instant) {
        let summary = self.derived().summary;
        match self.clipboard.write(&summary) {
            Ok(()) => {
                self.copy_feedback.mark_copied(now);
                self.copy_error = None;
                info!(chars = summary.chars().count(), "copy_succeeded");
            }
            Err(e) => {
                warn!(error = %e, "copy_failed");
                self.copy_error = Some(e.to_string());
            }
        }
    }

    /// Clear the form and return to the first stage.
    pub fn reset(&mut self) {
        self.form.reset();
        self.cursor = TextCursor::default();
        self.focus = Focus::Editor;
        self.keyword_index = 0;
        self.copy_feedback.clear();
        self.copy_error = None;
        info!("form_reset");
    }

    fn field_edited(&self) {
        trace!(
            stage = ?self.form.stage,
            chars = self.form.field(self.form.stage).chars().count(),
            "field_edited"
        );
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key_code: KeyCode, modifiers: KeyModifiers, now: Instant) {
        // Clear any previous copy error when user takes action
        self.copy_error = None;

        if self.show_help {
            if matches!(key_code, KeyCode::Esc | KeyCode::F(1)) {
                self.show_help = false;
            }
            return;
        }

        // AltGr arrives as Ctrl+Alt on some platforms and should still type
        if modifiers.contains(KeyModifiers::CONTROL) && !modifiers.contains(KeyModifiers::ALT) {
            match key_code {
                KeyCode::Char('q') | KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('y') => self.copy_summary(now),
                KeyCode::Char('r') => self.reset(),
                KeyCode::Char('k') => {
                    self.focus = match self.focus {
                        Focus::Editor => Focus::Keywords,
                        Focus::Keywords => Focus::Editor,
                    };
                }
                _ => {}
            }
            return;
        }

        match key_code {
            KeyCode::F(1) => self.show_help = true,
            KeyCode::Tab => self.next_stage(),
            KeyCode::BackTab => self.prev_stage(),
            _ => match self.focus {
                Focus::Editor => self.handle_editor_key(key_code),
                Focus::Keywords => self.handle_keywords_key(key_code),
            },
        }
    }

    fn handle_editor_key(&mut self, key_code: KeyCode) {
        match key_code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.next_stage(),
            KeyCode::Char(c) => {
                self.cursor.insert_char(&mut self.form, c);
                self.field_edited();
            }
            KeyCode::Backspace => {
                self.cursor.delete_before(&mut self.form);
                self.field_edited();
            }
            KeyCode::Delete => {
                self.cursor.delete_at(&mut self.form);
                self.field_edited();
            }
            KeyCode::Left => self.cursor.left(),
            KeyCode::Right => self.cursor.right(&self.form),
            KeyCode::Home => self.cursor.home(),
            KeyCode::End => self.cursor.end(&self.form),
            _ => {}
        }
    }

    fn handle_keywords_key(&mut self, key_code: KeyCode) {
        match key_code {
            KeyCode::Esc => self.focus = Focus::Editor,
            KeyCode::Left | KeyCode::Char('h') => self.select_prev_keyword(),
            KeyCode::Right | KeyCode::Char('l') => self.select_next_keyword(),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected_keyword(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use crate::clipboard::{COPIED_FLASH_DURATION, ClipboardError};
    use crate::config::{Config, ConfigLoadStatus};

    /// Records writes, or fails every write when `fail` is set.
    struct FakeClipboard {
        fail: bool,
        writes: Rc<RefCell<Vec<String>>>,
    }

    impl Clipboard for FakeClipboard {
        fn write(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Unavailable("permission denied".to_string()));
            }
            self.writes.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    fn test_app(fail: bool) -> (App, Rc<RefCell<Vec<String>>>) {
        let writes = Rc::new(RefCell::new(Vec::new()));
        let loaded = LoadedConfig {
            config: Config::default(),
            config_path: PathBuf::from("config.toml"),
            status: ConfigLoadStatus::Loaded,
        };
        let clipboard = FakeClipboard {
            fail,
            writes: Rc::clone(&writes),
        };
        let app = App::new(&loaded, Box::new(clipboard), None, None);
        (app, writes)
    }

    fn type_text(app: &mut App, text: &str, now: Instant) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE, now);
        }
    }

    #[test]
    fn test_new_app_initial_state() {
        let (app, _) = test_app(false);
        assert_eq!(app.form, FormState::new());
        assert_eq!(app.focus, Focus::Editor);
        assert!(!app.is_copied(Instant::now()));
        assert_eq!(app.suggestions.len(), 6);
    }

    #[test]
    fn test_typing_edits_current_stage() {
        let (mut app, _) = test_app(false);
        let now = Instant::now();
        type_text(&mut app, "Why?", now);
        app.handle_key(KeyCode::Tab, KeyModifiers::NONE, now);
        type_text(&mut app, "context", now);
        app.handle_key(KeyCode::Backspace, KeyModifiers::NONE, now);

        assert_eq!(app.form.question, "Why?");
        assert_eq!(app.form.background, "contex");
        assert_eq!(app.form.stage, Stage::Background);
    }

    #[test]
    fn test_stage_change_moves_cursor_to_end_of_field() {
        let (mut app, _) = test_app(false);
        let now = Instant::now();
        type_text(&mut app, "abc", now);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE, now);
        app.handle_key(KeyCode::BackTab, KeyModifiers::NONE, now);
        assert_eq!(app.form.stage, Stage::Question);
        assert_eq!(app.cursor.position(), 3);
        type_text(&mut app, "d", now);
        assert_eq!(app.form.question, "abcd");
    }

    #[test]
    fn test_copy_success_sets_flag_and_writes_summary() {
        let (mut app, writes) = test_app(false);
        let now = Instant::now();
        type_text(&mut app, "X", now);
        app.handle_key(KeyCode::Char('y'), KeyModifiers::CONTROL, now);

        assert!(app.is_copied(now));
        assert!(app.copy_error.is_none());
        assert_eq!(
            writes.borrow().as_slice(),
            ["🧠 Question: X\n📚 Background: —\n🎯 Desired outcome: —\n⏱️ Constraints: —"]
        );
    }

    #[test]
    fn test_copy_failure_leaves_flag_off() {
        let (mut app, writes) = test_app(true);
        let now = Instant::now();
        app.copy_summary(now);

        assert!(!app.is_copied(now));
        assert!(writes.borrow().is_empty());
        assert!(
            app.copy_error
                .as_deref()
                .is_some_and(|e| e.contains("permission denied"))
        );
    }

    #[test]
    fn test_copied_flag_resets_on_tick() {
        let (mut app, _) = test_app(false);
        let now = Instant::now();
        app.copy_summary(now);

        app.tick(now + Duration::from_millis(100));
        assert!(app.is_copied(now + Duration::from_millis(100)));

        let later = now + COPIED_FLASH_DURATION;
        app.tick(later);
        assert!(!app.is_copied(later));
    }

    #[test]
    fn test_keyword_focus_toggles_chips() {
        let (mut app, _) = test_app(false);
        let now = Instant::now();
        app.handle_key(KeyCode::Char('k'), KeyModifiers::CONTROL, now);
        assert_eq!(app.focus, Focus::Keywords);

        // frontend
        app.handle_key(KeyCode::Char(' '), KeyModifiers::NONE, now);
        // product
        app.handle_key(KeyCode::Right, KeyModifiers::NONE, now);
        app.handle_key(KeyCode::Right, KeyModifiers::NONE, now);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE, now);

        assert_eq!(
            app.form.keywords.iter().collect::<Vec<_>>(),
            vec!["frontend", "product"]
        );
        assert!(
            app.derived()
                .summary
                .ends_with("🏷️ Keywords: frontend, product")
        );

        // Typing in keyword focus does not edit the field
        app.handle_key(KeyCode::Char('x'), KeyModifiers::NONE, now);
        assert_eq!(app.form.question, "");

        app.handle_key(KeyCode::Esc, KeyModifiers::NONE, now);
        assert_eq!(app.focus, Focus::Editor);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_keyword_selection_wraps() {
        let (mut app, _) = test_app(false);
        app.select_prev_keyword();
        assert_eq!(app.keyword_index, app.suggestions.len() - 1);
        app.select_next_keyword();
        assert_eq!(app.keyword_index, 0);
    }

    #[test]
    fn test_toggle_with_no_suggestions_is_noop() {
        let (mut app, _) = test_app(false);
        app.suggestions.clear();
        app.toggle_selected_keyword();
        app.select_next_keyword();
        app.select_prev_keyword();
        assert!(app.form.keywords.is_empty());
        assert_eq!(app.keyword_index, 0);
    }

    #[test]
    fn test_reset_clears_form_and_copied_flag() {
        let (mut app, _) = test_app(false);
        let now = Instant::now();
        type_text(&mut app, "question", now);
        app.copy_summary(now);
        app.handle_key(KeyCode::Char('r'), KeyModifiers::CONTROL, now);

        assert_eq!(app.form, FormState::new());
        assert_eq!(app.cursor.position(), 0);
        assert!(!app.is_copied(now));
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let (mut app, _) = test_app(false);
        let now = Instant::now();
        app.handle_key(KeyCode::F(1), KeyModifiers::NONE, now);
        assert!(app.show_help);

        type_text(&mut app, "ignored", now);
        assert_eq!(app.form.question, "");

        app.handle_key(KeyCode::Esc, KeyModifiers::NONE, now);
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _) = test_app(false);
        app.handle_key(KeyCode::Esc, KeyModifiers::NONE, Instant::now());
        assert!(app.should_quit);

        let (mut app, _) = test_app(false);
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL, Instant::now());
        assert!(app.should_quit);
    }
}
