use serde::{Deserialize, Serialize};

/// Raw content change from the text input: the full current text and when it
/// changed, in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEvent {
    pub text: String,
    pub timestamp: i64,
}

impl InputEvent {
    pub fn new(text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            text: text.into(),
            timestamp,
        }
    }
}
