//! # hubpanel-adapter-http-reqwest
//!
//! HTTP adapter: implements the [`StateClient`] port over the hub's REST API.
//!
//! ## Responsibilities
//! - Read entity state: `GET {base_url}/api/states/{entity_id}`
//! - Write command text: `POST {base_url}/api/services/text/set_value`
//! - Present the bearer token from the [`SessionStore`] on every request
//! - Bound every request with the configured timeout
//! - Map reqwest failures into `FetchError` / `DispatchError`
//!
//! ## Dependency rule
//! Depends on `hubpanel-app` (for the port trait and the session store) and
//! `hubpanel-domain`. Never retries: retry policy belongs to the caller.

pub mod config;
pub mod error;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use hubpanel_app::ports::StateClient;
use hubpanel_app::session::SessionStore;
use hubpanel_domain::credentials::Credentials;
use hubpanel_domain::entity::StateValue;
use hubpanel_domain::error::{DispatchError, FetchError, ProtocolError};

pub use config::HttpClientConfig;
pub use error::HttpClientError;

const JSON: &str = "application/json";

#[derive(Debug, Deserialize)]
struct StateBody {
    state: String,
    #[serde(default)]
    attributes: Attributes,
}

#[derive(Debug, Default, Deserialize)]
struct Attributes {
    #[serde(default)]
    unit_of_measurement: Option<String>,
}

impl From<StateBody> for StateValue {
    fn from(body: StateBody) -> Self {
        StateValue::new(
            body.state,
            body.attributes.unit_of_measurement.unwrap_or_default(),
        )
    }
}

#[derive(Debug, Serialize)]
struct CommandBody<'a> {
    entity_id: &'a str,
    value: &'a str,
}

/// [`StateClient`] backed by a shared `reqwest` connection pool.
///
/// Reads the current credentials from the session store on every call, so a
/// login or logout takes effect for the very next request.
#[derive(Debug, Clone)]
pub struct HttpStateClient {
    http: reqwest::Client,
    session: SessionStore,
    state_path: String,
    command_path: String,
}

impl HttpStateClient {
    /// Build a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError::ZeroTimeout`] for a zero timeout, or
    /// [`HttpClientError::Build`] if reqwest cannot initialise.
    pub fn new(session: SessionStore, config: &HttpClientConfig) -> Result<Self, HttpClientError> {
        if config.timeout_ms == 0 {
            return Err(HttpClientError::ZeroTimeout);
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(HttpClientError::Build)?;
        Ok(Self {
            http,
            session,
            state_path: config.state_path.trim_matches('/').to_string(),
            command_path: config.command_path.trim_matches('/').to_string(),
        })
    }

    fn state_url(&self, credentials: &Credentials, entity_id: &str) -> String {
        format!(
            "{}/api/{}/{entity_id}",
            credentials.base_url(),
            self.state_path
        )
    }

    fn command_url(&self, credentials: &Credentials) -> String {
        format!("{}/api/{}", credentials.base_url(), self.command_path)
    }
}

impl StateClient for HttpStateClient {
    async fn fetch_state(&self, entity_id: &str) -> Result<StateValue, FetchError> {
        let Some(credentials) = self.session.get() else {
            return Err(FetchError::Unconfigured);
        };

        let response = self
            .http
            .get(self.state_url(&credentials, entity_id))
            .header(AUTHORIZATION, credentials.bearer())
            .header(CONTENT_TYPE, JSON)
            .send()
            .await
            .map_err(error::fetch_transport)?;

        let status = response.status();
        tracing::debug!(entity_id, status = status.as_u16(), "state read");
        if !status.is_success() {
            return Err(ProtocolError::Status(status.as_u16()).into());
        }

        let bytes = response.bytes().await.map_err(error::fetch_transport)?;
        let body: StateBody = serde_json::from_slice(&bytes).map_err(error::malformed)?;
        Ok(body.into())
    }

    async fn send_command(&self, entity_id: &str, text: &str) -> Result<(), DispatchError> {
        let Some(credentials) = self.session.get() else {
            return Err(DispatchError::Unconfigured);
        };

        let response = self
            .http
            .post(self.command_url(&credentials))
            .header(AUTHORIZATION, credentials.bearer())
            .header(CONTENT_TYPE, JSON)
            .json(&CommandBody {
                entity_id,
                value: text,
            })
            .send()
            .await
            .map_err(error::dispatch_transport)?;

        let status = response.status();
        tracing::debug!(entity_id, status = status.as_u16(), "command written");
        if status.is_success() {
            Ok(())
        } else {
            Err(ProtocolError::Status(status.as_u16()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HttpStateClient {
        client_with(server, HttpClientConfig::default())
    }

    fn client_with(server: &MockServer, config: HttpClientConfig) -> HttpStateClient {
        let session = SessionStore::default();
        session.provide(&server.uri(), "secret-token");
        HttpStateClient::new(session, &config).unwrap()
    }

    #[test]
    fn should_reject_zero_timeout() {
        let config = HttpClientConfig {
            timeout_ms: 0,
            ..HttpClientConfig::default()
        };
        let err = HttpStateClient::new(SessionStore::default(), &config).unwrap_err();
        assert!(matches!(err, HttpClientError::ZeroTimeout));
    }

    #[tokio::test]
    async fn should_return_state_and_unit_when_hub_answers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/states/sensor.temp"))
            .and(header("authorization", "Bearer secret-token"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "entity_id": "sensor.temp",
                "state": "21.5",
                "attributes": {"unit_of_measurement": "°C", "friendly_name": "Temp"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = client(&server).fetch_state("sensor.temp").await.unwrap();

        assert_eq!(state, StateValue::new("21.5", "°C"));
    }

    #[tokio::test]
    async fn should_default_unit_to_empty_when_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/states/sensor.battery"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"state": "17", "attributes": {}})),
            )
            .mount(&server)
            .await;

        let state = client(&server).fetch_state("sensor.battery").await.unwrap();

        assert_eq!(state, StateValue::new("17", ""));
    }

    #[tokio::test]
    async fn should_default_unit_to_empty_when_attributes_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"state": "on"})))
            .mount(&server)
            .await;

        let state = client(&server).fetch_state("switch.x").await.unwrap();

        assert_eq!(state, StateValue::new("on", ""));
    }

    #[tokio::test]
    async fn should_fail_with_protocol_status_when_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server).fetch_state("sensor.temp").await.unwrap_err();

        assert!(matches!(
            err,
            FetchError::Protocol(ProtocolError::Status(401))
        ));
    }

    #[tokio::test]
    async fn should_fail_with_protocol_body_when_state_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"attributes": {}})))
            .mount(&server)
            .await;

        let err = client(&server).fetch_state("sensor.temp").await.unwrap_err();

        assert!(matches!(err, FetchError::Protocol(ProtocolError::Body(_))));
    }

    #[tokio::test]
    async fn should_fail_with_protocol_body_when_not_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
            .mount(&server)
            .await;

        let err = client(&server).fetch_state("sensor.temp").await.unwrap_err();

        assert!(matches!(err, FetchError::Protocol(ProtocolError::Body(_))));
    }

    #[tokio::test]
    async fn should_fail_with_transport_when_hub_is_too_slow() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"state": "1"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;
        let config = HttpClientConfig {
            timeout_ms: 100,
            ..HttpClientConfig::default()
        };

        let err = client_with(&server, config)
            .fetch_state("sensor.temp")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn should_fail_with_transport_when_hub_unreachable() {
        let session = SessionStore::default();
        session.provide("http://127.0.0.1:1", "t");
        let client = HttpStateClient::new(session, &HttpClientConfig::default()).unwrap();

        let err = client.fetch_state("sensor.temp").await.unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn should_make_no_request_when_unconfigured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = HttpStateClient::new(SessionStore::default(), &HttpClientConfig::default())
            .unwrap();

        let fetch = client.fetch_state("sensor.temp").await;
        let send = client.send_command("text.x", "hello").await;

        assert!(matches!(fetch, Err(FetchError::Unconfigured)));
        assert!(matches!(send, Err(DispatchError::Unconfigured)));
    }

    #[tokio::test]
    async fn should_use_new_credentials_on_next_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer rotated"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"state": "1"})))
            .expect(1)
            .mount(&server)
            .await;
        let session = SessionStore::default();
        let client = HttpStateClient::new(session.clone(), &HttpClientConfig::default()).unwrap();

        session.provide(&server.uri(), "rotated");

        assert!(client.fetch_state("sensor.temp").await.is_ok());
    }

    #[tokio::test]
    async fn should_post_text_verbatim_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/services/text/set_value"))
            .and(header("authorization", "Bearer secret-token"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"entity_id": "X", "value": "play music"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).send_command("X", "play music").await.unwrap();
    }

    #[tokio::test]
    async fn should_not_retry_when_command_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).send_command("X", "play music").await.unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Protocol(ProtocolError::Status(503))
        ));
    }

    #[tokio::test]
    async fn should_honour_configured_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/states/sensor.temp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"state": "1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/services/input_text/set_value"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let config = HttpClientConfig {
            state_path: "/v2/states/".to_string(),
            command_path: "services/input_text/set_value".to_string(),
            ..HttpClientConfig::default()
        };
        let client = client_with(&server, config);

        client.fetch_state("sensor.temp").await.unwrap();
        client.send_command("text.x", "hi").await.unwrap();
    }
}
