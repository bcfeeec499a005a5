//! HTTP client implementation

use futures::StreamExt;
use reqwest::{header, Client, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, error};
use url::Url;

use crate::app::options::ClientOptions;
use crate::authn::session::{Credential, Session, SESSION_COOKIE};
use crate::errors::{CircleError, Result};

const ACCEPT: &str = "application/json, text/plain, */*";

/// HTTP client for the Circle API
///
/// Every request carries the headers the Circle web app sends. Non-2xx
/// responses are handed back to the caller, who decides what the status
/// means for the resource it asked for.
pub struct HttpClient {
    client: Client,
    base_url: Url,
    origin: String,
    node_scheme: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| CircleError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = Url::parse(&options.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(CircleError::Config(format!(
                "Base URL cannot carry a path: {}",
                options.base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            origin: options.origin.clone(),
            node_scheme: options.node_scheme.clone(),
        })
    }

    /// Build `{base}/api/{segments...}`, escaping each segment
    pub fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        push_segments(&mut url, std::iter::once("api").chain(segments.iter().copied()))?;
        Ok(url)
    }

    /// Build `{scheme}://{node}/api/{segments...}` for an accessory node
    pub fn node_url(&self, node_id: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}://{}/", self.node_scheme, node_id))?;
        push_segments(&mut url, std::iter::once("api").chain(segments.iter().copied()))?;
        Ok(url)
    }

    fn with_headers(&self, request: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
        let request = request
            .header(header::ACCEPT, ACCEPT)
            .header(header::ORIGIN, &self.origin);

        match session.map(Session::credential) {
            Some(Credential::Cookie(value)) => request.header(
                header::COOKIE,
                format!("{}={}", SESSION_COOKIE, value.expose_secret()),
            ),
            Some(Credential::Bearer(token)) => {
                request.header(header::AUTHORIZATION, token.expose_secret())
            }
            None => request,
        }
    }

    /// Make an authenticated GET request
    pub async fn get(&self, session: &Session, url: &Url) -> Result<Response> {
        let request = self.with_headers(self.client.get(url.clone()), Some(session));
        send("GET", url, request).await
    }

    /// Make an authenticated POST request with a JSON body
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        session: &Session,
        url: &Url,
        body: &B,
    ) -> Result<Response> {
        let request = self
            .with_headers(self.client.post(url.clone()), Some(session))
            .json(body);
        send("POST", url, request).await
    }

    /// Make an unauthenticated POST request with a JSON body
    pub async fn post_anonymous<B: Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<Response> {
        let request = self.with_headers(self.client.post(url.clone()), None).json(body);
        send("POST", url, request).await
    }
}

async fn send(method: &str, url: &Url, request: RequestBuilder) -> Result<Response> {
    match request.send().await {
        Ok(response) => {
            debug!("{} {} -> {}", method, url, response.status());
            Ok(response)
        }
        Err(e) => {
            debug!("{} {} -> {}", method, url, e);
            Err(CircleError::transport(url.as_str(), e))
        }
    }
}

fn push_segments<'a>(url: &mut Url, segments: impl Iterator<Item = &'a str>) -> Result<()> {
    let display = url.to_string();
    url.path_segments_mut()
        .map_err(|_| CircleError::Config(format!("URL cannot carry a path: {}", display)))?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}

/// Fail with [`CircleError::Status`] unless the response is 2xx
pub async fn ensure_success(url: &Url, response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error!("HTTP request to {} failed: {} - {}", url, status, body);
    Err(CircleError::Status {
        url: url.to_string(),
        status,
        body,
    })
}

/// Read the whole body and decode it as JSON
pub async fn decode_json<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| CircleError::transport(url.as_str(), e))?;
    serde_json::from_slice(&bytes).map_err(|e| CircleError::decode(url.as_str(), e))
}

/// Stream a response body into `writer`, returning the number of bytes copied
pub async fn copy_body<W>(response: Response, writer: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let url = response.url().to_string();
    let mut stream = response.bytes_stream();
    let mut copied = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| CircleError::transport(url.as_str(), e))?;
        writer.write_all(&chunk).await?;
        copied += chunk.len() as u64;
    }
    writer.flush().await?;

    Ok(copied)
}
