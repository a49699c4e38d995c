use serde::Serialize;
use tagcalc_expr::ParseError;
use tracing::{trace, warn};

/// A named numeric value placed into a formula from a suggestion.
///
/// The value is fixed at creation. The name only changes through
/// [`Tag::with_option`], which appends the chosen option as a suffix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    id: String,
    name: String,
    value: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<String>,
}

impl Tag {
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value,
            options: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Returns a copy named `"{name} ({option})"`.
    ///
    /// Repeated calls keep appending, so `Revenue` becomes `Revenue (Q1)` and
    /// then `Revenue (Q1) (USD)`.
    pub fn with_option(&self, option: &str) -> Self {
        Self {
            name: format!("{} ({})", self.name, option),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FormulaToken {
    /// A number literal or a single operator character, kept verbatim.
    Literal(String),
    TagRef(Tag),
}

impl FormulaToken {
    pub fn literal(text: impl Into<String>) -> Self {
        FormulaToken::Literal(text.into())
    }

    pub fn tag(tag: Tag) -> Self {
        FormulaToken::TagRef(tag)
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            FormulaToken::TagRef(tag) => Some(tag),
            FormulaToken::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            FormulaToken::Literal(text) => Some(text),
            FormulaToken::TagRef(_) => None,
        }
    }

    fn is_tag(&self, id: &str) -> bool {
        self.as_tag().is_some_and(|tag| tag.id == id)
    }

    fn write_expression(&self, out: &mut String) {
        match self {
            FormulaToken::Literal(text) => out.push_str(text),
            FormulaToken::TagRef(tag) => out.push_str(&format_value(tag.value)),
        }
    }
}

/// Decimal text for a tag value as it appears in the serialized expression.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        value.to_string()
    }
}

/// Ordered token sequence. Reading order equals insertion order.
///
/// No syntactic constraint is enforced at rest; consecutive operators and
/// unmatched parentheses only surface as failures in [`Formula::calculate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Formula {
    tokens: Vec<FormulaToken>,
}

impl Formula {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[FormulaToken] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FormulaToken> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn last(&self) -> Option<&FormulaToken> {
        self.tokens.last()
    }

    pub fn contains_tag(&self, id: &str) -> bool {
        self.tokens.iter().any(|token| token.is_tag(id))
    }

    pub fn append(&mut self, token: FormulaToken) {
        trace!(?token, "append token");
        self.tokens.push(token);
    }

    /// Removes the tag token with `id`. Literals are never matched.
    pub fn remove_tag(&mut self, id: &str) -> Option<Tag> {
        let index = self.tokens.iter().position(|token| token.is_tag(id))?;
        trace!(id, index, "remove tag");
        match self.tokens.remove(index) {
            FormulaToken::TagRef(tag) => Some(tag),
            FormulaToken::Literal(_) => None,
        }
    }

    pub fn pop_last(&mut self) -> Option<FormulaToken> {
        let token = self.tokens.pop();
        if let Some(ref token) = token {
            trace!(?token, "pop token");
        }
        token
    }

    /// Swaps in `tokens`, returning the previous sequence.
    pub fn replace_all(&mut self, tokens: Vec<FormulaToken>) -> Vec<FormulaToken> {
        trace!(len = tokens.len(), "replace formula");
        std::mem::replace(&mut self.tokens, tokens)
    }

    /// Renames the tag with `id` to carry `option` as a suffix.
    ///
    /// Returns whether a tag was found.
    pub fn map_tag_option(&mut self, id: &str, option: &str) -> bool {
        let mut found = false;
        for token in &mut self.tokens {
            if let FormulaToken::TagRef(tag) = token {
                if tag.id == id {
                    *tag = tag.with_option(option);
                    found = true;
                }
            }
        }
        if found {
            trace!(id, option, "select tag option");
        }
        found
    }

    /// Concatenates token text without separators. Tags contribute their
    /// value, never their name.
    pub fn expression(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            token.write_expression(&mut out);
        }
        out
    }

    pub fn evaluate(&self) -> Result<f64, ParseError> {
        tagcalc_expr::calculate(&self.expression())
    }

    /// Evaluates the formula, logging and swallowing any failure.
    pub fn calculate(&self) -> Option<f64> {
        match self.evaluate() {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(%error, expression = %self.expression(), "formula evaluation failed");
                None
            }
        }
    }
}

impl FromIterator<FormulaToken> for Formula {
    fn from_iter<I: IntoIterator<Item = FormulaToken>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Formula {
    type Item = &'a FormulaToken;
    type IntoIter = std::slice::Iter<'a, FormulaToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
