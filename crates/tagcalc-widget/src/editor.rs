//! Turns keystrokes and clicks into formula mutations.

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::WidgetConfig;
use crate::fallback::{FallbackSource, RandomFallback};
use crate::model::{Formula, FormulaToken, Tag};
use crate::number::is_valid_number;
use crate::store::FormulaStore;
use crate::suggest::{Candidate, SuggestError, SuggestionRequest, SuggestionView, Suggestions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Plus,
        Operator::Minus,
        Operator::Star,
        Operator::Slash,
        Operator::Caret,
        Operator::LParen,
        Operator::RParen,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Plus),
            '-' => Some(Operator::Minus),
            '*' => Some(Operator::Star),
            '/' => Some(Operator::Slash),
            '^' => Some(Operator::Caret),
            '(' => Some(Operator::LParen),
            ')' => Some(Operator::RParen),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Operator::Plus => '+',
            Operator::Minus => '-',
            Operator::Star => '*',
            Operator::Slash => '/',
            Operator::Caret => '^',
            Operator::LParen => '(',
            Operator::RParen => ')',
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Enter,
    Operator(Operator),
    /// Anything else; it reaches the editor as text input instead.
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` name.
    pub fn parse(name: &str) -> Key {
        match name {
            "Backspace" => Key::Backspace,
            "Enter" => Key::Enter,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Operator::from_char(c).map_or(Key::Other, Key::Operator),
                    _ => Key::Other,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyOutcome {
    /// The text field must not apply its own handling of the key.
    pub prevent_default: bool,
    /// A suggestion fetch the host should start.
    pub request: Option<SuggestionRequest>,
}

impl KeyOutcome {
    fn handled(request: Option<SuggestionRequest>) -> Self {
        Self {
            prevent_default: true,
            request,
        }
    }
}

pub struct Editor {
    store: FormulaStore,
    buffer: String,
    suggestions: Suggestions,
    result: Option<f64>,
    config: WidgetConfig,
    fallback: Box<dyn FallbackSource>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("store", &self.store)
            .field("buffer", &self.buffer)
            .field("suggestions", &self.suggestions)
            .field("result", &self.result)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// An editor using the wall clock and a randomly seeded fallback source.
    pub fn new(config: WidgetConfig) -> Self {
        let seed = SystemClock.now_ms() as u64;
        let fallback = RandomFallback::new(seed, config.fallback_max);
        Self::with_sources(config, fallback, SystemClock)
    }

    pub fn with_sources(
        config: WidgetConfig,
        fallback: impl FallbackSource + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            store: FormulaStore::new(),
            buffer: String::new(),
            suggestions: Suggestions::new(config.cache_ttl_ms),
            result: None,
            config,
            fallback: Box::new(fallback),
            clock: Box::new(clock),
        }
    }

    pub fn formula(&self) -> &Formula {
        self.store.formula()
    }

    /// Access for subscribing to formula changes.
    pub fn store_mut(&mut self) -> &mut FormulaStore {
        &mut self.store
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn suggestions(&self) -> &SuggestionView {
        self.suggestions.view()
    }

    pub fn result(&self) -> Option<f64> {
        self.result
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    fn set_buffer(&mut self, value: String) -> Option<SuggestionRequest> {
        self.buffer = value;
        let now = self.clock.now_ms();
        self.suggestions.query_changed(&self.buffer, now)
    }

    /// Appends typed text to the pending input.
    pub fn input(&mut self, text: &str) -> Option<SuggestionRequest> {
        if text.is_empty() {
            return None;
        }
        let value = format!("{}{}", self.buffer, text);
        self.set_buffer(value)
    }

    /// Replaces the pending input, as when the text field reports its value.
    pub fn set_input(&mut self, value: &str) -> Option<SuggestionRequest> {
        if value == self.buffer {
            return None;
        }
        self.set_buffer(value.to_string())
    }

    pub fn key(&mut self, key: Key) -> KeyOutcome {
        match key {
            Key::Backspace if self.buffer.is_empty() => {
                self.delete_last_token();
                KeyOutcome::default()
            }
            Key::Backspace => {
                let mut value = self.buffer.clone();
                value.pop();
                KeyOutcome::handled(self.set_buffer(value))
            }
            Key::Operator(op) => {
                let request = if self.buffer.is_empty() {
                    None
                } else {
                    if is_valid_number(&self.buffer) {
                        self.store.append(FormulaToken::literal(self.buffer.clone()));
                    } else {
                        debug!(
                            buffer = %self.buffer,
                            "discarding non-numeric input before operator"
                        );
                    }
                    self.set_buffer(String::new())
                };
                self.store.append(FormulaToken::literal(op.as_char().to_string()));
                KeyOutcome::handled(request)
            }
            Key::Enter if self.buffer.is_empty() => KeyOutcome::default(),
            Key::Enter => {
                let request = if is_valid_number(&self.buffer) {
                    self.store.append(FormulaToken::literal(self.buffer.clone()));
                    self.set_buffer(String::new())
                } else {
                    None
                };
                KeyOutcome::handled(request)
            }
            Key::Other => KeyOutcome::default(),
        }
    }

    // The only path that deletes committed tokens from the keyboard
    fn delete_last_token(&mut self) {
        let last_tag = match self.store.formula().last() {
            Some(FormulaToken::TagRef(tag)) => Some(tag.id().to_string()),
            Some(FormulaToken::Literal(_)) => None,
            None => return,
        };
        match last_tag {
            Some(id) => {
                self.store.remove_tag(&id);
            }
            None => {
                self.store.pop_last();
            }
        }
    }

    /// Hands a fetch result back. Returns whether it was current enough to
    /// be displayed.
    pub fn receive_suggestions(
        &mut self,
        request: &SuggestionRequest,
        result: Result<Vec<Candidate>, SuggestError>,
    ) -> bool {
        let now = self.clock.now_ms();
        self.suggestions.deliver(request, result, &self.buffer, now)
    }

    /// Inserts a tag for `candidate` and clears the pending search text.
    pub fn accept_suggestion(&mut self, candidate: &Candidate) -> Tag {
        let value = match candidate.value {
            Some(value) => value,
            None => {
                let value = self.fallback.next_value();
                debug!(id = %candidate.id, value, "candidate has no value, using fallback");
                value
            }
        };
        let tag = Tag::new(self.unique_tag_id(&candidate.id), candidate.name.clone(), value)
            .with_options(self.config.tag_options.clone());

        self.store.append(FormulaToken::tag(tag.clone()));
        self.set_buffer(String::new());
        self.suggestions.dismiss();
        tag
    }

    fn unique_tag_id(&self, id: &str) -> String {
        let formula = self.store.formula();
        if !formula.contains_tag(id) {
            return id.to_string();
        }
        (2..)
            .map(|n| format!("{id}#{n}"))
            .find(|candidate| !formula.contains_tag(candidate))
            .unwrap_or_else(|| id.to_string())
    }

    pub fn select_option(&mut self, tag_id: &str, option: &str) -> bool {
        self.store.map_tag_option(tag_id, option)
    }

    pub fn remove_tag(&mut self, tag_id: &str) -> Option<Tag> {
        self.store.remove_tag(tag_id)
    }

    /// Evaluates the formula. A failure clears the previous result.
    pub fn calculate(&mut self) -> Option<f64> {
        self.result = self.store.formula().calculate();
        self.result
    }

    pub fn clear(&mut self) {
        self.store.replace_all(Vec::new());
        self.set_buffer(String::new());
        self.result = None;
    }
}
