use serde::{Deserialize, Serialize};

/// Color scheme of an inline keyboard button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    Primary,
    Attention,
    #[default]
    Base,
}

/// Anything that isn't a known style name becomes [`ButtonStyle::Base`].
/// The API would reject an unknown style, so it's normalized here instead
/// of being reported as an error.
impl From<&str> for ButtonStyle {
    fn from(value: &str) -> Self {
        match value {
            "primary" => ButtonStyle::Primary,
            "attention" => ButtonStyle::Attention,
            _ => ButtonStyle::Base,
        }
    }
}

/// A single inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    pub text: String,
    pub callback_data: String,
    pub style: ButtonStyle,
}

impl Button {
    /// A button with the [`ButtonStyle::Base`] style.
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        btn(text, callback_data, ButtonStyle::Base)
    }

    pub fn with_style(mut self, style: impl Into<ButtonStyle>) -> Self {
        self.style = style.into();
        self
    }
}

/// Make a button. `style` is one of `primary`, `attention` or `base`;
/// anything else silently becomes `base`.
pub fn btn(
    text: impl Into<String>,
    callback_data: impl Into<String>,
    style: impl Into<ButtonStyle>,
) -> Button {
    Button {
        text: text.into(),
        callback_data: callback_data.into(),
        style: style.into(),
    }
}

/// Rows of buttons, top to bottom. Rows can only be appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyboard {
    rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_row(&mut self, buttons: Vec<Button>) {
        self.rows.push(buttons);
    }

    pub fn rows(&self) -> &[Vec<Button>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Wire format for `inlineKeyboardMarkup`: a JSON array of arrays of
    /// buttons. Non-ASCII text is left as is rather than `\u` escaped.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
