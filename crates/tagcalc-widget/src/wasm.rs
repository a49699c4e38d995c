//! WASM bindings for the formula input
//!
//! The page renders from `tokens()` and `suggestions()`, forwards DOM events,
//! and performs each returned suggestion request itself, handing the outcome
//! back through `receiveSuggestions` or `failSuggestions`.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::WidgetConfig;
use crate::editor::{Editor, Key, KeyOutcome};
use crate::store::Subscription;
use crate::suggest::{Candidate, SuggestError, SuggestionRequest};

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Key handling result for JavaScript
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyResult {
    prevent_default: bool,
    request: Option<SuggestionRequest>,
}

impl From<KeyOutcome> for KeyResult {
    fn from(outcome: KeyOutcome) -> Self {
        Self {
            prevent_default: outcome.prevent_default,
            request: outcome.request,
        }
    }
}

#[wasm_bindgen]
pub struct FormulaWidget {
    editor: Editor,
    subscriptions: Vec<Option<Subscription>>,
}

#[wasm_bindgen]
impl FormulaWidget {
    /// Creates a widget. `config` may be `undefined` or a partial settings object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<FormulaWidget, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            WidgetConfig::default()
        } else {
            from_js(config)?
        };
        Ok(FormulaWidget {
            editor: Editor::new(config),
            subscriptions: Vec::new(),
        })
    }

    /// Build from TOML settings text
    #[wasm_bindgen(js_name = fromToml)]
    pub fn from_toml(source: &str) -> Result<FormulaWidget, JsValue> {
        let config =
            WidgetConfig::from_toml_str(source).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(FormulaWidget {
            editor: Editor::new(config),
            subscriptions: Vec::new(),
        })
    }

    /// Append typed text; returns a suggestion request or `undefined`
    pub fn input(&mut self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.editor.input(text))
    }

    /// Mirror the text field's value after an `input` event
    #[wasm_bindgen(js_name = setInput)]
    pub fn set_input(&mut self, value: &str) -> Result<JsValue, JsValue> {
        to_js(&self.editor.set_input(value))
    }

    /// Handle a `keydown`; returns `{ preventDefault, request }`
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, key: &str) -> Result<JsValue, JsValue> {
        let outcome = self.editor.key(Key::parse(key));
        to_js(&KeyResult::from(outcome))
    }

    /// Deliver fetched candidates for a request; returns whether they are shown
    #[wasm_bindgen(js_name = receiveSuggestions)]
    pub fn receive_suggestions(
        &mut self,
        request: JsValue,
        candidates: JsValue,
    ) -> Result<bool, JsValue> {
        let request: SuggestionRequest = from_js(request)?;
        let result = serde_wasm_bindgen::from_value::<Vec<Candidate>>(candidates)
            .map_err(|e| SuggestError::Decode(e.to_string()));
        Ok(self.editor.receive_suggestions(&request, result))
    }

    /// Report a failed fetch for a request
    #[wasm_bindgen(js_name = failSuggestions)]
    pub fn fail_suggestions(
        &mut self,
        request: JsValue,
        status: Option<u16>,
        message: Option<String>,
    ) -> Result<bool, JsValue> {
        let request: SuggestionRequest = from_js(request)?;
        let error = match status {
            Some(status) => SuggestError::Status(status),
            None => SuggestError::Transport(message.unwrap_or_default()),
        };
        Ok(self.editor.receive_suggestions(&request, Err(error)))
    }

    /// Insert a tag for a clicked suggestion; returns the created tag
    #[wasm_bindgen(js_name = acceptSuggestion)]
    pub fn accept_suggestion(&mut self, candidate: JsValue) -> Result<JsValue, JsValue> {
        let candidate: Candidate = from_js(candidate)?;
        let tag = self.editor.accept_suggestion(&candidate);
        to_js(&tag)
    }

    #[wasm_bindgen(js_name = selectOption)]
    pub fn select_option(&mut self, tag_id: &str, option: &str) -> bool {
        self.editor.select_option(tag_id, option)
    }

    #[wasm_bindgen(js_name = removeTag)]
    pub fn remove_tag(&mut self, tag_id: &str) -> bool {
        self.editor.remove_tag(tag_id).is_some()
    }

    /// Evaluate the formula; `undefined` when it is malformed
    pub fn calculate(&mut self) -> Option<f64> {
        self.editor.calculate()
    }

    pub fn clear(&mut self) {
        self.editor.clear();
    }

    /// Current tokens as `{ kind, value }` objects
    pub fn tokens(&self) -> Result<JsValue, JsValue> {
        to_js(self.editor.formula())
    }

    /// Current suggestion list state as `{ state, candidates? }`
    pub fn suggestions(&self) -> Result<JsValue, JsValue> {
        to_js(self.editor.suggestions())
    }

    #[wasm_bindgen(getter)]
    pub fn buffer(&self) -> String {
        self.editor.buffer().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn result(&self) -> Option<f64> {
        self.editor.result()
    }

    #[wasm_bindgen(getter)]
    pub fn expression(&self) -> String {
        self.editor.formula().expression()
    }

    /// Call `callback(tokens)` after every formula change; returns a handle
    pub fn subscribe(&mut self, callback: js_sys::Function) -> usize {
        let subscription = self.editor.store_mut().subscribe(move |formula| {
            if let Ok(tokens) = serde_wasm_bindgen::to_value(formula) {
                let _ = callback.call1(&JsValue::NULL, &tokens);
            }
        });
        self.subscriptions.push(Some(subscription));
        self.subscriptions.len() - 1
    }

    pub fn unsubscribe(&mut self, handle: usize) -> bool {
        match self.subscriptions.get_mut(handle).and_then(Option::take) {
            Some(subscription) => self.editor.store_mut().unsubscribe(subscription),
            None => false,
        }
    }
}
