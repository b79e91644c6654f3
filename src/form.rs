//! Form state: the four question fields, the current stage, and selected keywords.
//!
//! `FormState` is the only owner of raw input. Everything shown to the user is
//! derived from it by [`crate::derive`].

/// One of the four wizard steps. Each step edits exactly one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Question,
    Background,
    Goal,
    Constraints,
}

impl Stage {
    /// All stages in display order.
    pub const ALL: [Stage; 4] = [
        Stage::Question,
        Stage::Background,
        Stage::Goal,
        Stage::Constraints,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Question => 0,
            Self::Background => 1,
            Self::Goal => 2,
            Self::Constraints => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Question => "Question",
            Self::Background => "Background",
            Self::Goal => "Goal",
            Self::Constraints => "Constraints",
        }
    }

    /// The prompt shown above the editor for this stage.
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Question => "What do you want to ask?",
            Self::Background => "What context does someone need to help?",
            Self::Goal => "What outcome are you hoping for?",
            Self::Constraints => "What limits or requirements apply?",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Question => Self::Background,
            Self::Background => Self::Goal,
            Self::Goal => Self::Constraints,
            Self::Constraints => Self::Question,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Question => Self::Constraints,
            Self::Background => Self::Question,
            Self::Goal => Self::Background,
            Self::Constraints => Self::Goal,
        }
    }
}

/// Selected keyword tags, kept in the order they were switched on.
///
/// Membership is all that matters for toggling; the order is only used when
/// listing active keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    items: Vec<String>,
}

impl KeywordSet {
    /// Remove the keyword if present, otherwise append it.
    /// Returns whether the keyword is active afterwards.
    pub fn toggle(&mut self, keyword: &str) -> bool {
        if let Some(pos) = self.items.iter().position(|k| k == keyword) {
            self.items.remove(pos);
            false
        } else {
            self.items.push(keyword.to_string());
            true
        }
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.items.iter().any(|k| k == keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Raw user input for one session. Empty string means "not filled in".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub question: String,
    pub background: String,
    pub goal: String,
    pub constraints: String,
    /// Which field is on screen. Has no effect on derived values.
    pub stage: Stage,
    pub keywords: KeywordSet,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_question(&mut self, text: impl Into<String>) {
        self.question = text.into();
    }

    pub fn set_background(&mut self, text: impl Into<String>) {
        self.background = text.into();
    }

    pub fn set_goal(&mut self, text: impl Into<String>) {
        self.goal = text.into();
    }

    pub fn set_constraints(&mut self, text: impl Into<String>) {
        self.constraints = text.into();
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub fn toggle_keyword(&mut self, keyword: &str) -> bool {
        self.keywords.toggle(keyword)
    }

    /// The field edited at the given stage.
    pub fn field(&self, stage: Stage) -> &str {
        match stage {
            Stage::Question => &self.question,
            Stage::Background => &self.background,
            Stage::Goal => &self.goal,
            Stage::Constraints => &self.constraints,
        }
    }

    pub fn set_field(&mut self, stage: Stage, text: impl Into<String>) {
        match stage {
            Stage::Question => self.set_question(text),
            Stage::Background => self.set_background(text),
            Stage::Goal => self.set_goal(text),
            Stage::Constraints => self.set_constraints(text),
        }
    }

    /// Back to the freshly loaded state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Cursor into the field of the current stage, counted in chars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCursor {
    pos: usize,
}

impl TextCursor {
    /// A cursor placed after the last char of `text`.
    pub fn at_end(text: &str) -> Self {
        Self {
            pos: text.chars().count(),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Insert a character at the cursor in the current stage's field.
    pub fn insert_char(&mut self, form: &mut FormState, c: char) {
        let stage = form.stage;
        let mut text = form.field(stage).to_string();
        self.clamp(&text);
        text.insert(byte_index(&text, self.pos), c);
        self.pos += 1;
        form.set_field(stage, text);
    }

    /// Backspace.
    pub fn delete_before(&mut self, form: &mut FormState) {
        let stage = form.stage;
        let mut text = form.field(stage).to_string();
        self.clamp(&text);
        if self.pos == 0 {
            return;
        }
        self.pos -= 1;
        text.remove(byte_index(&text, self.pos));
        form.set_field(stage, text);
    }

    /// Delete key.
    pub fn delete_at(&mut self, form: &mut FormState) {
        let stage = form.stage;
        let mut text = form.field(stage).to_string();
        self.clamp(&text);
        if self.pos >= text.chars().count() {
            return;
        }
        text.remove(byte_index(&text, self.pos));
        form.set_field(stage, text);
    }

    pub fn left(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    pub fn right(&mut self, form: &FormState) {
        if self.pos < form.field(form.stage).chars().count() {
            self.pos += 1;
        }
    }

    pub fn home(&mut self) {
        self.pos = 0;
    }

    pub fn end(&mut self, form: &FormState) {
        *self = Self::at_end(form.field(form.stage));
    }

    fn clamp(&mut self, text: &str) {
        self.pos = self.pos.min(text.chars().count());
    }
}

/// Byte offset of the char at `char_pos`, or the end of the string.
fn byte_index(text: &str, char_pos: usize) -> usize {
    text.char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
