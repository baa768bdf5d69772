//! This module contains the basic HTTP client used in this library.
//!
//! Errors are left as `reqwest::Error` here - the operation that made the
//! call decides whether a failure counts against the metadata provider or
//! the byte transfer.
use bytes::Bytes;
use futures::Stream;
use reqwest::redirect;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Basic HTTP client using TLS wrapping a `reqwest::Client`,
/// with the minimum required features to call the Data API and stream video
/// content. Clone is low cost, internals of `reqwest::Client` are wrapped in
/// an Arc.
#[derive(Debug, Clone)]
pub struct Client {
    inner: reqwest::Client,
    // Redirect-free twin used for URL expansion - we want the Location
    // header itself, not the page it points at.
    probe: reqwest::Client,
}

impl Client {
    /// Utilises reqwest's default tls choice for the enabled set of options.
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            inner: reqwest::Client::builder().build()?,
            probe: reqwest::Client::builder()
                .redirect(redirect::Policy::none())
                .build()?,
        })
    }
    #[cfg(feature = "rustls-tls")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rustls-tls")))]
    /// Force the use of rustls-tls
    pub fn new_rustls_tls() -> Result<Self, reqwest::Error> {
        Ok(Self {
            inner: reqwest::Client::builder().use_rustls_tls().build()?,
            probe: reqwest::Client::builder()
                .use_rustls_tls()
                .redirect(redirect::Policy::none())
                .build()?,
        })
    }
    #[cfg(feature = "native-tls")]
    #[cfg_attr(docsrs, doc(cfg(feature = "native-tls")))]
    /// Force the use of native-tls
    pub fn new_native_tls() -> Result<Self, reqwest::Error> {
        Ok(Self {
            inner: reqwest::Client::builder().use_native_tls().build()?,
            probe: reqwest::Client::builder()
                .use_native_tls()
                .redirect(redirect::Policy::none())
                .build()?,
        })
    }
    /// Run a GET query with url and key/value params, deserializing the json
    /// response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: impl AsRef<str>,
        params: &(impl Serialize + ?Sized),
    ) -> Result<T, reqwest::Error> {
        self.inner
            .get(url.as_ref())
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
    /// Open a streaming GET, returning the declared content length alongside
    /// the chunk stream.
    pub async fn get_stream(
        &self,
        url: impl AsRef<str>,
    ) -> Result<
        (
            Option<u64>,
            impl Stream<Item = Result<Bytes, reqwest::Error>> + Send,
        ),
        reqwest::Error,
    > {
        let response = self
            .inner
            .get(url.as_ref())
            .send()
            .await?
            .error_for_status()?;
        let total = response.content_length();
        Ok((total, response.bytes_stream()))
    }
    /// Request a URL without following redirects, returning the redirect
    /// target when the response carries one.
    pub async fn resolve_redirect(&self, url: &str) -> Result<Option<String>, reqwest::Error> {
        let response = self.probe.get(url).send().await?;
        let target = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        Ok(target)
    }
}
