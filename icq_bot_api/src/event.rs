use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single inbound event from `events/get`.
///
/// The `payload` is kept as raw JSON since its shape depends on
/// the event type. The accessors below cover the fields bots look at most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Ordering key. The dispatcher's cursor is made of these.
    pub event_id: i64,
    /// Type discriminator, like `newMessage` or `callbackQuery`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl Event {
    fn payload_str(&self, path: &[&str]) -> Option<&str> {
        path.iter()
            .try_fold(&self.payload, |value, key| value.get(key))
            .and_then(Value::as_str)
    }

    /// The chat this event happened in. For button presses this is the chat
    /// of the message the button is attached to.
    pub fn chat_id(&self) -> Option<&str> {
        self.payload_str(&["chat", "chatId"])
            .or_else(|| self.payload_str(&["message", "chat", "chatId"]))
    }

    /// Text of the message, if this is a message event.
    pub fn text(&self) -> Option<&str> {
        self.payload_str(&["text"])
    }

    /// ID that has to be passed to `messages/answerCallbackQuery`.
    pub fn query_id(&self) -> Option<&str> {
        self.payload_str(&["queryId"])
    }

    /// The `callbackData` of the pressed button.
    pub fn callback_data(&self) -> Option<&str> {
        self.payload_str(&["callbackData"])
    }

    pub fn from_user_id(&self) -> Option<&str> {
        self.payload_str(&["from", "userId"])
    }
}
