pub mod clock;
pub mod config;
pub mod editor;
pub mod fallback;
pub mod model;
pub mod number;
pub mod store;
pub mod suggest;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, WidgetConfig};
pub use editor::{Editor, Key, KeyOutcome, Operator};
pub use fallback::{FallbackSource, RandomFallback, SequenceFallback};
pub use model::{Formula, FormulaToken, Tag, format_value};
pub use number::{is_valid_number, to_number};
pub use store::{FormulaStore, Listener, Subscription};
pub use suggest::{
    Candidate, SuggestError, SuggestionCache, SuggestionRequest, SuggestionView, Suggestions,
};

#[cfg(feature = "http")]
pub use http::HttpSuggestionClient;
