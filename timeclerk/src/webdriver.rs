//! Lightweight W3C WebDriver wire-protocol client.
//!
//! Implements [`RemoteUiAdapter`] against a chromedriver-compatible endpoint
//! without pulling in a full browser-automation framework: session
//! create/delete, element lookup, the handful of interactions the protocols
//! need, and scripted activation for controls the driver refuses to click.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::adapter::{ElementRef, Probe, RemoteUiAdapter};
use crate::errors::TimecardError;
use crate::selector::Selector;

/// W3C element identifier key in wire payloads.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Poll interval for bounded waits.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Wire-level failure, split so lookups can treat "no such element" as a
/// plain miss instead of an error.
enum WireFailure {
    NoSuchElement,
    Other(String),
}

impl From<WireFailure> for TimecardError {
    fn from(failure: WireFailure) -> Self {
        match failure {
            WireFailure::NoSuchElement => {
                TimecardError::Adapter("unexpected no-such-element response".into())
            }
            WireFailure::Other(msg) => TimecardError::Adapter(msg),
        }
    }
}

/// [`RemoteUiAdapter`] over the WebDriver wire protocol.
pub struct WebDriverAdapter {
    base_url: String,
    http: reqwest::Client,
    session: Mutex<Option<String>>,
}

impl WebDriverAdapter {
    /// Create a client for a WebDriver endpoint, e.g. `http://localhost:9515`.
    pub fn new(webdriver_url: &str) -> Self {
        Self {
            base_url: webdriver_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            session: Mutex::new(None),
        }
    }

    fn session_id(&self) -> Result<String, TimecardError> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or_else(|| TimecardError::Adapter("no active webdriver session".into()))
    }

    fn set_session_id(&self, id: Option<String>) {
        *self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = id;
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, WireFailure> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| WireFailure::Other(format!("webdriver request failed: {e}")))?;
        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| WireFailure::Other(format!("malformed webdriver response: {e}")))?;
        if status.is_success() {
            return Ok(payload.get("value").cloned().unwrap_or(Value::Null));
        }
        let error = payload["value"]["error"].as_str().unwrap_or("unknown error");
        let message = payload["value"]["message"].as_str().unwrap_or("");
        if error == "no such element" {
            return Err(WireFailure::NoSuchElement);
        }
        Err(WireFailure::Other(format!("webdriver {error}: {message}")))
    }

    fn element_from_value(value: &Value) -> Result<ElementRef, WireFailure> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(ElementRef::new)
            .ok_or_else(|| {
                WireFailure::Other(format!("response carries no element reference: {value}"))
            })
    }

    fn wire_strategy(selector: &Selector) -> Result<(&'static str, String), TimecardError> {
        match selector {
            Selector::Id(id) => Ok(("css selector", format!("[id='{id}']"))),
            Selector::Css(css) => Ok(("css selector", css.clone())),
            Selector::XPath(xpath) => Ok(("xpath", xpath.clone())),
            Selector::LinkText(text) => Ok(("link text", text.clone())),
            Selector::PartialLinkText(text) => Ok(("partial link text", text.clone())),
            Selector::Invalid(reason) => Err(TimecardError::Adapter(format!(
                "invalid selector: {reason}"
            ))),
        }
    }

    async fn find(
        &self,
        path: &str,
        selector: &Selector,
    ) -> Result<Option<ElementRef>, TimecardError> {
        let (using, value) = Self::wire_strategy(selector)?;
        let body = json!({ "using": using, "value": value });
        match self.send(Method::POST, path, Some(body)).await {
            Ok(payload) => Ok(Some(Self::element_from_value(&payload)?)),
            Err(WireFailure::NoSuchElement) => Ok(None),
            Err(failure) => Err(failure.into()),
        }
    }
}

#[async_trait]
impl RemoteUiAdapter for WebDriverAdapter {
    async fn connect(&self) -> Result<(), TimecardError> {
        if self.session_id().is_ok() {
            debug!("webdriver session already active");
            return Ok(());
        }
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": ["--headless=new", "--window-size=1280,1024"]
                    }
                }
            }
        });
        let value = self
            .send(Method::POST, "/session", Some(body))
            .await
            .map_err(TimecardError::from)?;
        let session_id = value["sessionId"]
            .as_str()
            .ok_or_else(|| {
                TimecardError::Adapter("webdriver did not return a session id".into())
            })?
            .to_string();
        debug!(%session_id, "webdriver session started");
        self.set_session_id(Some(session_id));
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TimecardError> {
        let Ok(session_id) = self.session_id() else {
            return Ok(());
        };
        self.set_session_id(None);
        if let Err(failure) = self
            .send(Method::DELETE, &format!("/session/{session_id}"), None)
            .await
        {
            // The browser may already be gone; teardown stays best-effort.
            warn!(error = %TimecardError::from(failure), "webdriver session delete failed");
        }
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), TimecardError> {
        let session_id = self.session_id()?;
        self.send(
            Method::POST,
            &format!("/session/{session_id}/url"),
            Some(json!({ "url": url })),
        )
        .await
        .map_err(TimecardError::from)?;
        Ok(())
    }

    async fn current_location(&self) -> Result<String, TimecardError> {
        let session_id = self.session_id()?;
        let value = self
            .send(Method::GET, &format!("/session/{session_id}/url"), None)
            .await
            .map_err(TimecardError::from)?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn locate(&self, selector: &Selector) -> Result<Option<ElementRef>, TimecardError> {
        let session_id = self.session_id()?;
        self.find(&format!("/session/{session_id}/element"), selector)
            .await
    }

    async fn locate_all(&self, selector: &Selector) -> Result<Vec<ElementRef>, TimecardError> {
        let session_id = self.session_id()?;
        let (using, value) = Self::wire_strategy(selector)?;
        let body = json!({ "using": using, "value": value });
        let payload = self
            .send(
                Method::POST,
                &format!("/session/{session_id}/elements"),
                Some(body),
            )
            .await
            .map_err(TimecardError::from)?;
        let Some(items) = payload.as_array() else {
            return Ok(Vec::new());
        };
        items
            .iter()
            .map(|item| Self::element_from_value(item).map_err(TimecardError::from))
            .collect()
    }

    async fn locate_within(
        &self,
        root: &ElementRef,
        selector: &Selector,
    ) -> Result<Option<ElementRef>, TimecardError> {
        let session_id = self.session_id()?;
        self.find(
            &format!("/session/{session_id}/element/{}/element", root.id()),
            selector,
        )
        .await
    }

    async fn wait_for(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Probe, TimecardError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(el) = self.locate(selector).await? {
                return Ok(Probe::Found(el));
            }
            if Instant::now() >= deadline {
                return Ok(Probe::Absent);
            }
            sleep(POLL_INTERVAL.min(timeout)).await;
        }
    }

    async fn wait_within(
        &self,
        root: &ElementRef,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Probe, TimecardError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(el) = self.locate_within(root, selector).await? {
                return Ok(Probe::Found(el));
            }
            if Instant::now() >= deadline {
                return Ok(Probe::Absent);
            }
            sleep(POLL_INTERVAL.min(timeout)).await;
        }
    }

    async fn click(&self, el: &ElementRef) -> Result<(), TimecardError> {
        let session_id = self.session_id()?;
        self.send(
            Method::POST,
            &format!("/session/{session_id}/element/{}/click", el.id()),
            Some(json!({})),
        )
        .await
        .map_err(TimecardError::from)?;
        Ok(())
    }

    async fn force_click(&self, el: &ElementRef) -> Result<(), TimecardError> {
        let session_id = self.session_id()?;
        let mut element = serde_json::Map::new();
        element.insert(ELEMENT_KEY.to_string(), Value::String(el.id().to_string()));
        let body = json!({
            "script": "arguments[0].scrollIntoView({block: 'center'}); arguments[0].click();",
            "args": [element]
        });
        self.send(
            Method::POST,
            &format!("/session/{session_id}/execute/sync"),
            Some(body),
        )
        .await
        .map_err(TimecardError::from)?;
        Ok(())
    }

    async fn clear(&self, el: &ElementRef) -> Result<(), TimecardError> {
        let session_id = self.session_id()?;
        self.send(
            Method::POST,
            &format!("/session/{session_id}/element/{}/clear", el.id()),
            Some(json!({})),
        )
        .await
        .map_err(TimecardError::from)?;
        Ok(())
    }

    async fn type_text(&self, el: &ElementRef, text: &str) -> Result<(), TimecardError> {
        let session_id = self.session_id()?;
        self.send(
            Method::POST,
            &format!("/session/{session_id}/element/{}/value", el.id()),
            Some(json!({ "text": text })),
        )
        .await
        .map_err(TimecardError::from)?;
        Ok(())
    }

    async fn read_text(&self, el: &ElementRef) -> Result<String, TimecardError> {
        let session_id = self.session_id()?;
        let value = self
            .send(
                Method::GET,
                &format!("/session/{session_id}/element/{}/text", el.id()),
                None,
            )
            .await
            .map_err(TimecardError::from)?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}
