//! A fake transport for tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use serde_json::{json, Value};

use crate::{transport::Params, Result, ShutdownToken, Transport};

#[derive(Debug, Default)]
struct Inner {
    script: VecDeque<Result<Value>>,
    calls: Vec<(String, Params)>,
    on_exhausted: Option<ShutdownToken>,
}

/// Answers calls with canned responses, in order, and remembers every call.
///
/// Once the responses run out, every further call gets an empty event
/// batch and trips the token given to [`ScriptedTransport::stop_when_exhausted`].
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedTransport {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: impl IntoIterator<Item = Result<Value>>) -> Self {
        let inner = Inner {
            script: script.into_iter().collect(),
            ..Default::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Queue one more response after the ones already scripted.
    pub(crate) fn push(&self, response: Result<Value>) {
        self.inner.lock().unwrap().script.push_back(response);
    }

    pub(crate) fn stop_when_exhausted(&self, token: ShutdownToken) {
        self.inner.lock().unwrap().on_exhausted = Some(token);
    }

    pub(crate) fn calls(&self) -> Vec<(String, Params)> {
        self.inner.lock().unwrap().calls.clone()
    }
}

impl Transport for ScriptedTransport {
    async fn call(&self, method: &str, params: &[(String, String)]) -> Result<Value> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push((method.to_string(), params.to_vec()));

        match inner.script.pop_front() {
            Some(response) => response,
            None => {
                if let Some(token) = &inner.on_exhausted {
                    token.shutdown();
                }
                Ok(json!({ "events": [] }))
            }
        }
    }
}
