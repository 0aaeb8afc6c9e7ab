//! Gateway contract and HTTP implementation
//!
//! The gateway signs and sends exactly one request. It never retries and
//! never interprets status codes; classification happens in the endpoint
//! layer so the same transport can serve list-aggregation paths (which skip
//! 403s) and single-entity paths (which surface them).

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::context::CallContext;
use crate::error::{TransportError, TransportResult};

/// HTTP method subset used by the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// One request to the remote API
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// One response from the remote API
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body, `Value::Null` when empty or not JSON
    pub body: Value,
}

impl ApiResponse {
    /// True for the `[200,400)` success range
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

/// The gateway contract: sign and send one request
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request, returning the response or a definitive failure.
    ///
    /// `Err(TransportError::NoResponse)` means nothing came back at all;
    /// every received response, whatever its status, is `Ok`.
    async fn send(&self, request: &ApiRequest, ctx: &CallContext) -> TransportResult<ApiResponse>;
}

/// Request-signing seam
///
/// Signing internals are outside this system; implementations produce the
/// `Authorization` header for one request.
pub trait Signer: Send + Sync {
    /// Authorization header value for the given request
    fn authorization(&self, method: Method, url: &Url) -> String;
}

/// Signer that presents a fixed bearer token
pub struct StaticTokenSigner {
    token: String,
}

impl StaticTokenSigner {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Signer for StaticTokenSigner {
    fn authorization(&self, _method: Method, _url: &Url) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Gateway over reqwest
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    signer: Box<dyn Signer>,
}

impl HttpTransport {
    /// Build a transport against a base URL
    pub fn new(base_url: &str, signer: Box<dyn Signer>) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            signer,
        })
    }

    fn build_url(&self, request: &ApiRequest, ctx: &CallContext) -> TransportResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, request.path))
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
            if let Some(key) = &ctx.account_switch_key {
                pairs.append_pair("accountSwitchKey", key);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest, ctx: &CallContext) -> TransportResult<ApiResponse> {
        let url = self.build_url(request, ctx)?;
        let authorization = self.signer.authorization(request.method, &url);

        debug!(method = request.method.as_str(), url = %url, "Sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
        };
        builder = builder.header(reqwest::header::AUTHORIZATION, authorization);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        // Any error out of send() means no usable response arrived
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::NoResponse(e.to_string()))?;

        let status = response.status().as_u16();
        let body = match response.bytes().await {
            Ok(bytes) if bytes.is_empty() => Value::Null,
            Ok(bytes) => serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) => return Err(TransportError::NoResponse(e.to_string())),
        };

        debug!(status, "Received response");
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let transport =
            HttpTransport::new("https://api.example.net/", Box::new(StaticTokenSigner::new("t")))
                .unwrap();
        assert_eq!(transport.base_url, "https://api.example.net");
    }

    #[test]
    fn test_switch_key_lands_in_query() {
        let transport =
            HttpTransport::new("https://api.example.net", Box::new(StaticTokenSigner::new("t")))
                .unwrap();
        let request = ApiRequest::get("/papi/v1/groups").query("contractId", "ctr_1");
        let ctx = CallContext::with_switch_key("act_9:1");
        let url = transport.build_url(&request, &ctx).unwrap();
        let query: Vec<_> = url.query_pairs().collect();
        assert!(query.iter().any(|(k, v)| k == "contractId" && v == "ctr_1"));
        assert!(query.iter().any(|(k, v)| k == "accountSwitchKey" && v == "act_9:1"));
    }

    #[test]
    fn test_success_range() {
        assert!(ApiResponse { status: 200, body: Value::Null }.is_success());
        assert!(ApiResponse { status: 399, body: Value::Null }.is_success());
        assert!(!ApiResponse { status: 400, body: Value::Null }.is_success());
        assert!(!ApiResponse { status: 199, body: Value::Null }.is_success());
    }
}
