//! Purpose: The Pushover client: fluent configuration, validation, requests.
//! Exports: `Pushover`, `ApiResult`.
//! Role: Owns all request state and the last decoded response.
//! Invariants: Parameter validation always precedes network I/O.
//! Invariants: `retry`/`expire` range checks happen at set time, not send time.
//! Invariants: Every network operation overwrites `last_response`.

use super::coerce::IntArg;
use super::transport::{Transport, UreqTransport};
use crate::core::error::{Error, ErrorKind};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

pub type ApiResult<T> = Result<T, Error>;

const DEFAULT_BASE_URL: &str = "https://api.pushover.net";

/// Client for one sender configuration.
///
/// Setters chain; network operations block until the API responds and store
/// the decoded JSON body for inspection via [`Pushover::response`] and
/// [`Pushover::status`]. One instance supports one operation at a time:
/// sequential calls overwrite the stored response, and concurrent use from
/// multiple threads must be serialized by the caller.
pub struct Pushover {
    app_token: String,
    recipient_keys: Vec<String>,
    title: Option<String>,
    message: Option<String>,
    device: Option<String>,
    url: Option<String>,
    url_title: Option<String>,
    priority: Option<i64>,
    retry: Option<i64>,
    expire: Option<i64>,
    sound: Option<String>,
    timestamp: Option<i64>,
    html: i64,
    callback: Option<String>,
    last_response: Option<Value>,
    base_url: Url,
    transport: Box<dyn Transport>,
}

#[derive(Deserialize)]
struct StatusEnvelope {
    status: i64,
}

impl Pushover {
    pub const PRIORITY_LOWEST: i64 = -2;
    pub const PRIORITY_LOW: i64 = -1;
    pub const PRIORITY_NORMAL: i64 = 0;
    pub const PRIORITY_HIGH: i64 = 1;
    pub const PRIORITY_EMERGENCY: i64 = 2;

    /// Minimum seconds between emergency re-deliveries accepted by the API.
    pub const RETRY_MIN_SECS: i64 = 30;
    /// Maximum seconds an emergency notification may keep re-delivering.
    pub const EXPIRE_MAX_SECS: i64 = 10800;

    pub fn new(app_token: impl Into<String>) -> Self {
        Self {
            app_token: app_token.into(),
            recipient_keys: Vec::new(),
            title: None,
            message: None,
            device: None,
            url: None,
            url_title: None,
            priority: None,
            retry: None,
            expire: None,
            sound: None,
            timestamp: None,
            html: 0,
            callback: None,
            last_response: None,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("static base url"),
            transport: Box::new(UreqTransport::new()),
        }
    }

    pub fn new_with_recipient(
        app_token: impl Into<String>,
        recipient_key: impl Into<String>,
    ) -> Self {
        let mut client = Self::new(app_token);
        client.add_recipient_key(recipient_key);
        client
    }

    /// Replace the HTTP collaborator. Used by tests and embedders that need
    /// custom transport policy (timeouts, TLS trust, instrumentation).
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Point the client at a different API host (self-hosted gateway, test
    /// server). The URL must be a bare http/https origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> ApiResult<Self> {
        self.base_url = normalize_base_url(base_url.into())?;
        Ok(self)
    }

    pub fn set_app_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.app_token = token.into();
        self
    }

    /// Replace all configured recipients with this single key.
    pub fn set_recipient_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.recipient_keys.clear();
        self.add_recipient_key(key)
    }

    /// Append a recipient without clearing the existing ones.
    pub fn add_recipient_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.recipient_keys.push(key.into());
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    pub fn set_device(&mut self, device: impl Into<String>) -> &mut Self {
        self.device = Some(device.into());
        self
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = Some(url.into());
        self
    }

    pub fn set_url_title(&mut self, url_title: impl Into<String>) -> &mut Self {
        self.url_title = Some(url_title.into());
        self
    }

    pub fn set_sound(&mut self, sound: impl Into<String>) -> &mut Self {
        self.sound = Some(sound.into());
        self
    }

    /// Webhook URL the API calls when an emergency notification is
    /// acknowledged.
    pub fn set_callback(&mut self, callback: impl Into<String>) -> &mut Self {
        self.callback = Some(callback.into());
        self
    }

    /// One of the `PRIORITY_*` constants (-2 lowest .. 2 emergency).
    pub fn set_priority(&mut self, priority: impl IntArg) -> &mut Self {
        self.priority = Some(priority.into_int());
        self
    }

    /// Seconds between emergency re-deliveries; rejected below
    /// [`Pushover::RETRY_MIN_SECS`].
    pub fn set_retry(&mut self, retry: impl IntArg) -> ApiResult<&mut Self> {
        let retry = retry.into_int();
        if retry < Self::RETRY_MIN_SECS {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("retry interval must be at least 30 seconds")
                .with_field("retry"));
        }
        self.retry = Some(retry);
        Ok(self)
    }

    /// Seconds until emergency re-delivery stops; rejected above
    /// [`Pushover::EXPIRE_MAX_SECS`] (3 hours).
    pub fn set_expire(&mut self, expire: impl IntArg) -> ApiResult<&mut Self> {
        let expire = expire.into_int();
        if expire > Self::EXPIRE_MAX_SECS {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("expire must be at most 10800 seconds (3 hours)")
                .with_field("expire"));
        }
        self.expire = Some(expire);
        Ok(self)
    }

    /// Epoch seconds shown as the message time; defaults to the wall clock
    /// at first send when unset.
    pub fn set_timestamp(&mut self, timestamp: impl IntArg) -> &mut Self {
        self.timestamp = Some(timestamp.into_int());
        self
    }

    /// 1 enables HTML rendering of the message body, 0 disables (default).
    pub fn set_html_mode(&mut self, html: impl IntArg) -> &mut Self {
        self.html = html.into_int();
        self
    }

    pub fn recipient_keys(&self) -> &[String] {
        &self.recipient_keys
    }

    pub fn priority(&self) -> Option<i64> {
        self.priority
    }

    pub fn retry(&self) -> Option<i64> {
        self.retry
    }

    pub fn expire(&self) -> Option<i64> {
        self.expire
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    /// Send the configured message.
    ///
    /// Fails with a Usage error before any network I/O when the token,
    /// recipients, or message are missing, or when emergency priority lacks
    /// a non-zero `retry`/`expire` pair. Returns the client so the result
    /// chains into [`Pushover::status`] / [`Pushover::response`].
    pub fn send(&mut self) -> ApiResult<&mut Self> {
        if self.app_token.is_empty() || self.recipient_keys.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("missing application token or recipient key"));
        }
        if self.message.as_deref().unwrap_or_default().is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("message is required")
                .with_field("message"));
        }
        if self.priority == Some(Self::PRIORITY_EMERGENCY)
            && (self.retry.unwrap_or(0) == 0 || self.expire.unwrap_or(0) == 0)
        {
            return Err(Error::new(ErrorKind::Usage).with_message(
                "emergency priority requires both retry and expire to be set",
            ));
        }
        if self.timestamp.is_none() {
            self.timestamp = Some(unix_now());
        }

        let url = build_url(&self.base_url, &["1", "messages.json"])?;
        let form = self.message_form();
        tracing::debug!(endpoint = %url, recipients = self.recipient_keys.len(), "sending message");
        let body = self.transport.request("POST", &url, &form)?;
        self.capture(&body);
        Ok(self)
    }

    /// Check whether the first configured recipient key is valid for this
    /// application. Additional keys are ignored; validation is a
    /// single-recipient call.
    pub fn validate_recipient(&mut self) -> ApiResult<bool> {
        if self.app_token.is_empty() || self.recipient_keys.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("missing application token or recipient key"));
        }
        let url = build_url(&self.base_url, &["1", "users", "validate.json"])?;
        let form = vec![
            ("token", self.app_token.clone()),
            ("user", self.recipient_keys[0].clone()),
        ];
        tracing::debug!(endpoint = %url, "validating recipient");
        let body = self.transport.request("POST", &url, &form)?;
        self.capture(&body);
        Ok(self.status()? == 1)
    }

    /// Fetch the sounds available as notification tones. A response without
    /// a `sounds` field yields `None` rather than an error.
    pub fn list_sounds(&mut self) -> ApiResult<Option<Value>> {
        self.require_token()?;
        let mut url = build_url(&self.base_url, &["1", "sounds.json"])?;
        url.query_pairs_mut().append_pair("token", &self.app_token);
        tracing::debug!(endpoint = %url, "listing sounds");
        let body = self.transport.request("GET", &url, &[])?;
        self.capture(&body);
        Ok(self
            .last_response
            .as_ref()
            .and_then(|resp| resp.get("sounds"))
            .cloned())
    }

    /// Fetch delivery/acknowledgement details for an emergency receipt.
    /// Returns the full decoded body; the caller inspects fields per the
    /// remote API contract. `None` means the body was not valid JSON.
    pub fn receipt_details(&mut self, receipt: &str) -> ApiResult<Option<Value>> {
        self.require_token()?;
        let mut url = build_url(
            &self.base_url,
            &["1", "receipts", &format!("{receipt}.json")],
        )?;
        url.query_pairs_mut().append_pair("token", &self.app_token);
        tracing::debug!(endpoint = %url, "fetching receipt details");
        let body = self.transport.request("GET", &url, &[])?;
        self.capture(&body);
        Ok(self.last_response.clone())
    }

    /// Stop further re-delivery of an emergency notification.
    pub fn cancel_emergency_priority(&mut self, receipt: &str) -> ApiResult<bool> {
        self.require_token()?;
        let url = build_url(
            &self.base_url,
            &["1", "receipts", receipt, "cancel.json"],
        )?;
        let form = vec![("token", self.app_token.clone())];
        tracing::debug!(endpoint = %url, "cancelling emergency notification");
        let body = self.transport.request("POST", &url, &form)?;
        self.capture(&body);
        Ok(self.status()? == 1)
    }

    /// Last decoded response, `None` before the first network call or after
    /// a body that was not valid JSON.
    pub fn response(&self) -> Option<&Value> {
        self.last_response.as_ref()
    }

    /// Integer `status` field of the last response. Fails with a State
    /// error when no response has been captured and a Decode error when the
    /// captured response has no integer `status`.
    pub fn status(&self) -> ApiResult<i64> {
        let Some(response) = &self.last_response else {
            return Err(Error::new(ErrorKind::State)
                .with_message("no response available; issue a request first"));
        };
        let envelope: StatusEnvelope =
            serde_json::from_value(response.clone()).map_err(|err| {
                Error::new(ErrorKind::Decode)
                    .with_message("response has no integer status field")
                    .with_source(err)
            })?;
        Ok(envelope.status)
    }

    fn require_token(&self) -> ApiResult<()> {
        if self.app_token.is_empty() {
            return Err(Error::new(ErrorKind::Usage).with_message("missing application token"));
        }
        Ok(())
    }

    fn capture(&mut self, body: &str) {
        self.last_response = serde_json::from_str::<Value>(body).ok();
    }

    // Field order mirrors the remote API documentation; unset optionals are
    // sent as empty values.
    fn message_form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("token", self.app_token.clone()),
            ("user", self.recipient_keys.join(",")),
            ("title", self.title.clone().unwrap_or_default()),
            ("message", self.message.clone().unwrap_or_default()),
            ("html", self.html.to_string()),
            ("device", self.device.clone().unwrap_or_default()),
            ("priority", opt_int(self.priority)),
            ("timestamp", opt_int(self.timestamp)),
            ("expire", opt_int(self.expire)),
            ("retry", opt_int(self.retry)),
            ("callback", self.callback.clone().unwrap_or_default()),
            ("url", self.url.clone().unwrap_or_default()),
            ("url_title", self.url_title.clone().unwrap_or_default()),
            ("sound", self.sound.clone().unwrap_or_default()),
        ]
    }
}

// The application token is a credential; keep it out of Debug output.
impl fmt::Debug for Pushover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pushover")
            .field("app_token", &"<redacted>")
            .field("recipient_keys", &self.recipient_keys.len())
            .field("priority", &self.priority)
            .field("has_response", &self.last_response.is_some())
            .finish_non_exhaustive()
    }
}

fn opt_int(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() as i64)
}

fn normalize_base_url(raw: String) -> ApiResult<Url> {
    let mut url = Url::parse(&raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("base url must use http or https scheme"));
    }
    if url.path() != "/" && !url.path().is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message("base url must not include a path"));
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn build_url(base_url: &Url, segments: &[&str]) -> ApiResult<Url> {
    let mut url = base_url.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            Error::new(ErrorKind::Internal).with_message("base url cannot be a base")
        })?;
        path.clear();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::{Pushover, build_url, normalize_base_url};
    use crate::api::transport::Transport;
    use crate::core::error::{Error, ErrorKind};
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use url::Url;

    #[derive(Debug)]
    struct CapturedRequest {
        method: String,
        url: String,
        form: Vec<(String, String)>,
    }

    impl CapturedRequest {
        fn field(&self, name: &str) -> Option<&str> {
            self.form
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value.as_str())
        }

        fn field_count(&self, name: &str) -> usize {
            self.form.iter().filter(|(field, _)| field == name).count()
        }
    }

    #[derive(Default)]
    struct MockTransport {
        requests: Rc<RefCell<Vec<CapturedRequest>>>,
        responses: RefCell<VecDeque<String>>,
    }

    impl MockTransport {
        fn replying(body: &str) -> Self {
            let transport = Self::default();
            transport.responses.borrow_mut().push_back(body.to_string());
            transport
        }

        fn requests(&self) -> Rc<RefCell<Vec<CapturedRequest>>> {
            Rc::clone(&self.requests)
        }
    }

    impl Transport for MockTransport {
        fn request(
            &self,
            method: &str,
            url: &Url,
            form: &[(&'static str, String)],
        ) -> Result<String, Error> {
            self.requests.borrow_mut().push(CapturedRequest {
                method: method.to_string(),
                url: url.to_string(),
                form: form
                    .iter()
                    .map(|(field, value)| (field.to_string(), value.clone()))
                    .collect(),
            });
            Ok(self
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| r#"{"status":1}"#.to_string()))
        }
    }

    fn client_with(transport: MockTransport) -> Pushover {
        Pushover::new_with_recipient("app-token", "user-key")
            .with_transport(Box::new(transport))
    }

    #[test]
    fn send_requires_message() {
        let transport = MockTransport::default();
        let requests = transport.requests();
        let mut client = client_with(transport);
        let err = client.send().expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(requests.borrow().is_empty());
    }

    #[test]
    fn send_requires_token_and_recipient() {
        let mut client = Pushover::new("").with_transport(Box::new(MockTransport::default()));
        client.set_message("hello");
        assert_eq!(client.send().expect_err("err").kind(), ErrorKind::Usage);

        let mut client = Pushover::new("app-token")
            .with_transport(Box::new(MockTransport::default()));
        client.set_message("hello");
        assert_eq!(client.send().expect_err("err").kind(), ErrorKind::Usage);
    }

    #[test]
    fn non_emergency_priorities_send_without_retry_expire() {
        for priority in [-2i64, -1, 0, 1] {
            let mut client = client_with(MockTransport::default());
            client.set_message("hello").set_priority(priority);
            client.send().expect("send");
        }
    }

    #[test]
    fn emergency_priority_requires_retry_and_expire() {
        let transport = MockTransport::default();
        let requests = transport.requests();
        let mut client = client_with(transport);
        client
            .set_message("alarm")
            .set_priority(Pushover::PRIORITY_EMERGENCY);
        client.set_retry(60).expect("retry");
        let err = client.send().expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(requests.borrow().is_empty());
    }

    #[test]
    fn emergency_priority_rejects_zero_expire() {
        let mut client = client_with(MockTransport::default());
        client
            .set_message("alarm")
            .set_priority(Pushover::PRIORITY_EMERGENCY);
        client.set_retry(60).expect("retry");
        client.set_expire(0).expect("expire in range");
        assert_eq!(client.send().expect_err("err").kind(), ErrorKind::Usage);
    }

    #[test]
    fn emergency_priority_sends_with_full_pair() {
        let transport = MockTransport::default();
        let requests = transport.requests();
        let mut client = client_with(transport);
        client
            .set_message("alarm")
            .set_priority(Pushover::PRIORITY_EMERGENCY);
        client.set_retry(60).expect("retry");
        client.set_expire(3600).expect("expire");
        client.send().expect("send");

        let requests = requests.borrow();
        let request = &requests[0];
        assert_eq!(request.field("retry"), Some("60"));
        assert_eq!(request.field("expire"), Some("3600"));
        assert_eq!(request.field("priority"), Some("2"));
    }

    #[test]
    fn retry_boundary_is_enforced_at_set_time() {
        let mut client = client_with(MockTransport::default());
        let err = client.set_retry(29).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(err.field(), Some("retry"));
        assert_eq!(client.retry(), None);

        client.set_retry(30).expect("retry");
        assert_eq!(client.retry(), Some(30));
    }

    #[test]
    fn expire_boundary_is_enforced_at_set_time() {
        let mut client = client_with(MockTransport::default());
        let err = client.set_expire(10801).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(err.field(), Some("expire"));
        assert_eq!(client.expire(), None);

        client.set_expire(10800).expect("expire");
        assert_eq!(client.expire(), Some(10800));
    }

    #[test]
    fn set_recipient_key_replaces_and_add_appends() {
        let mut client = Pushover::new("app-token");
        client.add_recipient_key("A");
        client.set_recipient_key("B");
        assert_eq!(client.recipient_keys().join(","), "B");

        client.add_recipient_key("C");
        assert_eq!(client.recipient_keys().join(","), "B,C");
    }

    #[test]
    fn status_before_any_call_is_a_state_error() {
        let client = Pushover::new("app-token");
        assert_eq!(client.status().expect_err("err").kind(), ErrorKind::State);
    }

    #[test]
    fn validate_recipient_sends_only_first_key() {
        let transport = MockTransport::default();
        let requests = transport.requests();
        let mut client = client_with(transport);
        client.add_recipient_key("second-key");

        assert!(client.validate_recipient().expect("validate"));

        let requests = requests.borrow();
        let request = &requests[0];
        assert_eq!(request.method, "POST");
        assert!(request.url.ends_with("/1/users/validate.json"));
        assert_eq!(request.field_count("user"), 1);
        assert_eq!(request.field("user"), Some("user-key"));
    }

    #[test]
    fn validate_recipient_false_on_status_zero() {
        let mut client = client_with(MockTransport::replying(r#"{"status":0}"#));
        assert!(!client.validate_recipient().expect("validate"));
    }

    #[test]
    fn list_sounds_returns_sounds_field() {
        let body = r#"{"status":1,"sounds":{"pushover":"Pushover"}}"#;
        let mut client = client_with(MockTransport::replying(body));
        let sounds = client.list_sounds().expect("sounds").expect("present");
        assert_eq!(sounds, json!({"pushover": "Pushover"}));
    }

    #[test]
    fn list_sounds_missing_field_is_none() {
        let mut client = client_with(MockTransport::replying(r#"{"status":1}"#));
        assert!(client.list_sounds().expect("sounds").is_none());
        assert_eq!(client.status().expect("status"), 1);
    }

    #[test]
    fn list_sounds_uses_get_with_token_query() {
        let transport = MockTransport::default();
        let requests = transport.requests();
        let mut client = client_with(transport);
        let _ = client.list_sounds().expect("sounds");

        let requests = requests.borrow();
        let request = &requests[0];
        assert_eq!(request.method, "GET");
        assert!(request.url.contains("/1/sounds.json?token=app-token"));
    }

    #[test]
    fn send_body_carries_every_configured_field() {
        let transport = MockTransport::default();
        let requests = transport.requests();
        let mut client = Pushover::new("app-token").with_transport(Box::new(transport));
        client
            .add_recipient_key("k1")
            .add_recipient_key("k2")
            .set_title("Title")
            .set_message("Body")
            .set_device("phone")
            .set_url("https://example.com")
            .set_url_title("Example")
            .set_sound("pushover")
            .set_callback("https://example.com/hook")
            .set_priority(1)
            .set_timestamp(1700000000)
            .set_html_mode(1);
        client.send().expect("send");

        let requests = requests.borrow();
        let request = &requests[0];
        assert_eq!(request.method, "POST");
        assert!(request.url.ends_with("/1/messages.json"));
        assert_eq!(request.field("token"), Some("app-token"));
        assert_eq!(request.field("user"), Some("k1,k2"));
        assert_eq!(request.field("title"), Some("Title"));
        assert_eq!(request.field("message"), Some("Body"));
        assert_eq!(request.field("html"), Some("1"));
        assert_eq!(request.field("device"), Some("phone"));
        assert_eq!(request.field("priority"), Some("1"));
        assert_eq!(request.field("timestamp"), Some("1700000000"));
        assert_eq!(request.field("callback"), Some("https://example.com/hook"));
        assert_eq!(request.field("url"), Some("https://example.com"));
        assert_eq!(request.field("url_title"), Some("Example"));
        assert_eq!(request.field("sound"), Some("pushover"));
        // Unset emergency fields ride along as empty values.
        assert_eq!(request.field("retry"), Some(""));
        assert_eq!(request.field("expire"), Some(""));
    }

    #[test]
    fn send_populates_timestamp_when_unset() {
        let mut client = client_with(MockTransport::default());
        client.set_message("hello");
        assert_eq!(client.timestamp(), None);
        client.send().expect("send");
        assert!(client.timestamp().is_some_and(|ts| ts > 0));
    }

    #[test]
    fn send_chains_into_status() {
        let mut client = client_with(MockTransport::replying(r#"{"status":1,"request":"r1"}"#));
        client.set_message("hello");
        let status = client.send().expect("send").status().expect("status");
        assert_eq!(status, 1);
    }

    #[test]
    fn cancel_emergency_priority_maps_status() {
        let transport = MockTransport::replying(r#"{"status":1}"#);
        let requests = transport.requests();
        let mut client = client_with(transport);
        assert!(client.cancel_emergency_priority("abc").expect("cancel"));
        {
            let requests = requests.borrow();
            let request = &requests[0];
            assert!(request.url.ends_with("/1/receipts/abc/cancel.json"));
            assert_eq!(request.form.len(), 1);
            assert_eq!(request.field("token"), Some("app-token"));
        }

        let mut client = client_with(MockTransport::replying(r#"{"status":0}"#));
        assert!(!client.cancel_emergency_priority("abc").expect("cancel"));
    }

    #[test]
    fn receipt_details_returns_full_body() {
        let body = r#"{"status":1,"acknowledged":0,"expired":1}"#;
        let transport = MockTransport::replying(body);
        let requests = transport.requests();
        let mut client = client_with(transport);
        let details = client.receipt_details("r123").expect("details").expect("body");
        assert_eq!(details["acknowledged"], 0);
        assert_eq!(details["expired"], 1);

        let requests = requests.borrow();
        let request = &requests[0];
        assert_eq!(request.method, "GET");
        assert!(request.url.contains("/1/receipts/r123.json?token=app-token"));
    }

    #[test]
    fn malformed_body_leaves_no_response() {
        let mut client = client_with(MockTransport::replying("<html>not json</html>"));
        client.set_message("hello");
        client.send().expect("send");
        assert!(client.response().is_none());
        assert_eq!(client.status().expect_err("err").kind(), ErrorKind::State);
    }

    #[test]
    fn status_without_integer_field_is_a_decode_error() {
        let mut client = client_with(MockTransport::replying(r#"{"status":"ok"}"#));
        client.set_message("hello");
        client.send().expect("send");
        assert_eq!(client.status().expect_err("err").kind(), ErrorKind::Decode);
    }

    #[test]
    fn string_coercion_flows_through_setters() {
        let mut client = Pushover::new("app-token");
        client.set_priority("abc");
        assert_eq!(client.priority(), Some(0));
        client.set_retry("60s").expect("retry");
        assert_eq!(client.retry(), Some(60));
        assert_eq!(
            client.set_retry("nope").expect_err("err").kind(),
            ErrorKind::Usage
        );
    }

    #[test]
    fn normalize_base_url_strips_query_and_requires_http() {
        let url = normalize_base_url("http://localhost:8080".to_string()).expect("url");
        assert_eq!(url.as_str(), "http://localhost:8080/");

        let err = normalize_base_url("ftp://example.com".to_string()).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);

        let err = normalize_base_url("https://example.com/v1".to_string()).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn build_url_joins_segments() {
        let base = Url::parse("https://api.pushover.net/").expect("url");
        let url = build_url(&base, &["1", "receipts", "r1", "cancel.json"]).expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.pushover.net/1/receipts/r1/cancel.json"
        );
    }
}
