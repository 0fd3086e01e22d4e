use crate::core::client::config::ClientConfig;
use crate::core::error::{BuildError, ControlPlaneError, Result};
use crate::core::protocol::constants::{headers, media_types};
use crate::core::traits::Transport;
use crate::core::types::{Method, WireRequest, WireResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;

/// [`Transport`] over a pooled `reqwest` client.
pub struct ReqwestTransport {
    client: Client,
    endpoint: String,
}

impl ReqwestTransport {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        let mut endpoint = endpoint.into();
        while endpoint.ends_with('/') {
            endpoint.pop();
        }
        Self { client, endpoint }
    }

    /// Build the underlying client from timeouts, pool size and proxy settings.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_secs(config.connection_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(config.max_idle_connections as usize)
            .user_agent(config.user_agent.clone());

        if !config.proxy_url.is_empty() {
            let proxy = reqwest::Proxy::all(&config.proxy_url)
                .map_err(|e| ControlPlaneError::Config(format!("invalid proxy_url: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ControlPlaneError::Config(e.to_string()))?;
        Ok(Self::new(client, config.endpoint.clone()))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Absolute URL of a rendered request.
    pub fn url_for(&self, request: &WireRequest) -> String {
        format!("{}{}", self.endpoint, request.target())
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Local request construction failures are build errors and never retried.
fn transport_error(e: reqwest::Error) -> ControlPlaneError {
    if e.is_builder() {
        ControlPlaneError::Build(BuildError::Encoding(e.to_string()))
    } else if e.is_timeout() {
        ControlPlaneError::Timeout
    } else {
        ControlPlaneError::Transport(e.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &WireRequest) -> Result<WireResponse> {
        let mut req_builder = self
            .client
            .request(to_reqwest_method(request.method), self.url_for(request))
            .header(headers::ACCEPT, media_types::JSON);

        for (k, v) in &request.headers {
            req_builder = req_builder.header(k, v);
        }
        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        let response = req_builder.send().await.map_err(transport_error)?;

        let status = response.status().as_u16();
        let mut headers = BTreeMap::new();
        for (k, v) in response.headers() {
            if let Ok(val) = v.to_str() {
                headers.insert(k.as_str().to_string(), val.to_string());
            }
        }

        let body = response.bytes().await.map_err(transport_error)?;

        Ok(WireResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let transport = ReqwestTransport::new(Client::new(), "https://identity.example.test/20160918/");
        let mut request = WireRequest::new(Method::Get, "/policies");
        request.query.push(("compartmentId".into(), "c 1".into()));
        assert_eq!(
            transport.url_for(&request),
            "https://identity.example.test/20160918/policies?compartmentId=c%201"
        );
    }

    #[test]
    fn test_invalid_proxy_is_config_error() {
        let config = ClientConfig {
            proxy_url: "::not a proxy::".into(),
            ..Default::default()
        };
        assert!(matches!(
            ReqwestTransport::from_config(&config),
            Err(ControlPlaneError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unencodable_header_is_build_error() {
        let transport = ReqwestTransport::new(Client::new(), "http://127.0.0.1:9");
        let request = WireRequest::new(Method::Get, "/policies").with_header("x-bad", "a\r\nb");
        let err = transport.send(&request).await.unwrap_err();
        assert!(matches!(err, ControlPlaneError::Build(BuildError::Encoding(_))));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(to_reqwest_method(Method::Delete), reqwest::Method::DELETE);
        assert_eq!(to_reqwest_method(Method::Patch), reqwest::Method::PATCH);
    }
}
