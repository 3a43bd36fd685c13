use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::data::ResponseHead;
use crate::error::Result;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

pub type BodyStream = BoxStream<'static, Result<Bytes>>;

/// A response whose body has not been read yet.
pub struct Response {
    pub head: ResponseHead,
    pub body: BodyStream,
}

/// Asynchronous HTTP client abstraction.
///
/// Implementations follow redirects and report every status as a
/// [`ResponseHead`]; only transport failures are errors. Callers decide what
/// a status means.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Scripted clients in tests
pub trait HttpClient: Send + Sync {
    /// Send a HEAD request.
    fn head(&self, url: &str) -> impl Future<Output = Result<ResponseHead>> + Send;

    /// Send a GET request with extra `headers` and return the body as a stream.
    fn get(&self, url: &str, headers: &[(String, String)]) -> impl Future<Output = Result<Response>> + Send;

    /// POST `body` as JSON and return the response status.
    fn post_json(&self, url: &str, body: &serde_json::Value) -> impl Future<Output = Result<u16>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use futures_util::StreamExt;
    use reqwest::RequestBuilder;
    use reqwest::header::{AUTHORIZATION, HeaderValue};

    use super::*;
    use crate::core::accepts_token;
    use crate::data::ClientSettings;
    use crate::error::FetchError;

    /// Production HTTP client implementation using reqwest.
    ///
    /// The User-Agent from [`ClientSettings`] goes with every request; the
    /// bearer token only with requests [`accepts_token`] allows.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client:        reqwest::Client,
        probe_timeout: Duration,
        auth:          Option<HeaderValue>,
    }

    impl ReqwestClient {
        pub fn new(settings: &ClientSettings) -> Result<Self> {
            let auth = settings.auth_token.as_deref().map(bearer).transpose()?;

            let mut builder = reqwest::Client::builder()
                .user_agent(settings.user_agent.as_str())
                .connect_timeout(settings.probe_timeout)
                .read_timeout(settings.read_timeout);

            if let Some(proxy) = &settings.proxy {
                let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(|e| FetchError::Client(e.to_string()))?;
                builder = builder.proxy(proxy);
            }

            let client = builder.build().map_err(|e| FetchError::Client(e.to_string()))?;
            Ok(Self {
                client,
                probe_timeout: settings.probe_timeout,
                auth,
            })
        }

        fn authorize(&self, request: RequestBuilder, url: &str) -> RequestBuilder {
            match &self.auth {
                Some(value) if accepts_token(url) => request.header(AUTHORIZATION, value.clone()),
                _ => request,
            }
        }
    }

    fn bearer(token: &str) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| FetchError::Client("auth token is not a valid header value".into()))?;
        value.set_sensitive(true);
        Ok(value)
    }

    fn map_err(e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_builder() {
            FetchError::InvalidUrl(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }

    fn head_of(response: &reqwest::Response) -> ResponseHead {
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        ResponseHead {
            status: response.status().as_u16(),
            headers,
        }
    }

    impl HttpClient for ReqwestClient {
        async fn head(&self, url: &str) -> Result<ResponseHead> {
            let response = self
                .authorize(self.client.head(url), url)
                .timeout(self.probe_timeout)
                .send()
                .await
                .map_err(map_err)?;
            Ok(head_of(&response))
        }

        async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<Response> {
            let mut request = self.authorize(self.client.get(url), url);
            for (key, value) in headers {
                request = request.header(key.as_str(), value.as_str());
            }

            let response = request.send().await.map_err(map_err)?;
            let head = head_of(&response);
            let body = response.bytes_stream().map(|chunk| chunk.map_err(map_err));
            Ok(Response {
                head,
                body: Box::pin(body),
            })
        }

        async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<u16> {
            let response = self
                .client
                .post(url)
                .json(body)
                .timeout(self.probe_timeout)
                .send()
                .await
                .map_err(map_err)?;
            Ok(response.status().as_u16())
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
