//! Docs service transport
//!
//! Three calls, all against `{api_url}?key={key}&function={name}`:
//!
//! | Function         | Method | Body                          | Response              |
//! |------------------|--------|-------------------------------|-----------------------|
//! | `checkKey`       | GET    | -                             | `{"response": ...}`   |
//! | `getAddonSyntax` | GET    | -                             | `{"result": [...]}`   |
//! | `massCreate`     | POST   | `data=<url-encoded JSON array>` | ignored             |

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::{form_urlencoded, Url};

use super::error::{SyncError, SyncResult};

/// Sent with every request
pub const USER_AGENT: &str = "skUnity API Documentation/1.0";

const FUNCTION_CHECK_KEY: &str = "checkKey";
const FUNCTION_GET_ADDON_SYNTAX: &str = "getAddonSyntax";
const FUNCTION_MASS_CREATE: &str = "massCreate";

/// The remote documentation service
pub trait DocsApi: Send + Sync {
    /// Returns whether the service accepts `key`
    fn check_key(&self, key: &str) -> SyncResult<bool>;

    /// Fetches every published payload of `addon`
    fn addon_syntax(&self, key: &str, addon: &str) -> SyncResult<Vec<Value>>;

    /// Creates or edits records in one batch
    fn mass_create(&self, key: &str, payloads: &Value) -> SyncResult<()>;
}

#[derive(Debug, Deserialize)]
struct CheckKeyResponse {
    #[serde(default)]
    response: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AddonSyntaxResponse {
    #[serde(default)]
    result: Option<Vec<Value>>,
}

/// [`DocsApi`] over HTTP
pub struct HttpDocsApi {
    client: Client,
    base_url: Url,
}

impl HttpDocsApi {
    /// Creates a client for `api_url`
    pub fn new(api_url: &str, timeout: Duration) -> SyncResult<Self> {
        let base_url = Url::parse(api_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// URL of `function`, with the key and any extra query pairs
    fn endpoint(&self, key: &str, function: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", key).append_pair("function", function);
            for (name, value) in extra {
                query.append_pair(name, value);
            }
        }
        url
    }

    fn get(&self, url: Url) -> SyncResult<Response> {
        debug!(function = ?function_of(&url), "GET docs service");
        Ok(self.client.get(url).send()?)
    }
}

impl DocsApi for HttpDocsApi {
    fn check_key(&self, key: &str) -> SyncResult<bool> {
        let response = self.get(self.endpoint(key, FUNCTION_CHECK_KEY, &[]))?;
        let status = response.status();

        if status == StatusCode::OK {
            return Ok(true);
        }
        if status.is_server_error() {
            return Err(SyncError::Protocol(format!("key check returned {}", status)));
        }

        let body = response.text()?;
        let accepted = serde_json::from_str::<CheckKeyResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.response)
            .is_some_and(|value| value.as_str() == Some("success"));
        Ok(accepted)
    }

    fn addon_syntax(&self, key: &str, addon: &str) -> SyncResult<Vec<Value>> {
        let url = self.endpoint(key, FUNCTION_GET_ADDON_SYNTAX, &[("addon", addon)]);
        let response = self.get(url)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Protocol(format!(
                "syntax download returned {}",
                status
            )));
        }

        let body: AddonSyntaxResponse = serde_json::from_str(&response.text()?)?;
        body.result
            .ok_or_else(|| SyncError::Protocol("response has no 'result' array".to_string()))
    }

    fn mass_create(&self, key: &str, payloads: &Value) -> SyncResult<()> {
        let url = self.endpoint(key, FUNCTION_MASS_CREATE, &[("arrayReturn", "true")]);
        let body = encode_form_body(payloads)?;

        debug!(bytes = body.len(), "POST docs service");
        let response = self
            .client
            .post(url)
            .header(header::CONTENT_LENGTH, body.len())
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Protocol(format!("upload returned {}", status)));
        }
        Ok(())
    }
}

/// `data=` followed by the URL-encoded JSON text
pub fn encode_form_body(payloads: &Value) -> SyncResult<String> {
    let json = serde_json::to_string(payloads)?;
    let encoded: String = form_urlencoded::byte_serialize(json.as_bytes()).collect();
    Ok(format!("data={}", encoded))
}

fn function_of(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == "function")
        .map(|(_, value)| value.into_owned())
}
