use std::{sync::Arc, time::Duration};

use serde_json::Value;
use url::Url;

use crate::{
    keyboard::{Button, Keyboard},
    transport::{HttpTransport, Params, Transport},
    Error, Event, Result,
};

/// Default `pollTime` for `events/get`.
pub const DEFAULT_POLL_TIME: Duration = Duration::from_secs(20);

/// A handle to the bot API, authenticated with a bot token.
///
/// Cloning is cheap: the transport is shared, while the token and the
/// keyboard are copied, so each clone builds its own keyboard.
#[derive(Debug)]
pub struct Bot<T = HttpTransport> {
    transport: Arc<T>,
    token: String,
    poll_time: Duration,
    keyboard: Keyboard,
}

impl<T> Clone for Bot<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            token: self.token.clone(),
            poll_time: self.poll_time,
            keyboard: self.keyboard.clone(),
        }
    }
}

impl Bot<HttpTransport> {
    /// Create a bot talking to the public API with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_transport(token, HttpTransport::new())
    }

    /// Point the bot at a different API server.
    pub fn set_api_url(self, api_url: Url) -> Self {
        let transport = HttpTransport::clone(&self.transport).with_api_url(api_url);
        Self {
            transport: Arc::new(transport),
            ..self
        }
    }
}

impl<T: Transport> Bot<T> {
    pub fn with_transport(token: impl Into<String>, transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            token: token.into(),
            poll_time: DEFAULT_POLL_TIME,
            keyboard: Keyboard::new(),
        }
    }

    /// How long the server may hold a long poll open. Sent as whole seconds.
    pub fn set_poll_time(mut self, poll_time: Duration) -> Self {
        self.poll_time = poll_time;
        self
    }

    pub fn poll_time(&self) -> Duration {
        self.poll_time
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Call any API method. The bot token is added to `params`
    /// unless a `token` is already in there.
    pub async fn api(&self, method: &str, mut params: Params) -> Result<Value> {
        if !params.iter().any(|(key, _)| key == "token") {
            params.push(("token".to_string(), self.token.clone()));
        }

        self.transport.call(method, &params).await
    }

    /// Long-poll `events/get` for events after `last_event_id`. Returns the
    /// raw response; see [`Bot::poll`] for the checked version.
    pub async fn get_events(&self, last_event_id: i64) -> Result<Value> {
        let params = vec![
            ("lastEventId".to_string(), last_event_id.to_string()),
            ("pollTime".to_string(), self.poll_time.as_secs().to_string()),
        ];

        self.api("events/get", params).await
    }

    /// Long-poll for events after `cursor`.
    ///
    /// Returns `Ok(None)` if the response has no `events` array.
    /// Entries of the array that aren't valid events are skipped.
    pub async fn poll(&self, cursor: i64) -> Result<Option<Vec<Event>>> {
        let response = self.get_events(cursor).await?;
        Ok(parse_events(response))
    }

    /// Send a text message with the bot's current keyboard attached.
    ///
    /// `chat_id` is a nick, a chat ID or a user ID.
    pub async fn send_text(&self, chat_id: &str, text: &str) -> Result<Value> {
        let params = vec![
            ("chatId".to_string(), chat_id.to_string()),
            ("text".to_string(), text.to_string()),
            ("inlineKeyboardMarkup".to_string(), self.keyboard()?),
        ];

        self.api("messages/sendText", params).await
    }

    /// Acknowledge a button press. The server expects this for every
    /// `callbackQuery` event.
    pub async fn accept_click(&self, event: &Event) -> Result<Value> {
        let query_id = event.query_id().ok_or(Error::NoQueryId)?;
        self.answer_callback_query(query_id, None, false).await
    }

    /// Acknowledge a button press, optionally showing `text` to the user,
    /// as an alert if `show_alert` is set.
    pub async fn answer_callback_query(
        &self,
        query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<Value> {
        let mut params = vec![("queryId".to_string(), query_id.to_string())];
        if let Some(text) = text {
            params.push(("text".to_string(), text.to_string()));
        }
        if show_alert {
            params.push(("showAlert".to_string(), "true".to_string()));
        }

        self.api("messages/answerCallbackQuery", params).await
    }

    /// Append a row of buttons to this bot's keyboard.
    pub fn set_key_row(&mut self, buttons: Vec<Button>) -> &mut Self {
        self.keyboard.push_row(buttons);
        self
    }

    /// The keyboard in its wire format, `[]` if no rows were added.
    pub fn keyboard(&self) -> Result<String> {
        Ok(self.keyboard.to_json()?)
    }
}

fn parse_events(response: Value) -> Option<Vec<Event>> {
    let Value::Object(mut response) = response else {
        return None;
    };
    let Some(Value::Array(events)) = response.remove("events") else {
        return None;
    };

    let events = events
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<Event>(raw) {
            Ok(event) => Some(event),
            Err(e) => {
                log::warn!("Skipping an event that failed to decode: {e}");
                None
            }
        })
        .collect();

    Some(events)
}
