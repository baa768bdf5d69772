//! Module containing the builder to create a [`YtFetch`] handle, and the
//! related options for the HTTP client it constructs.
use crate::catalog::{CatalogProvider, DataApi};
use crate::client::Client;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::source::{HttpSource, MediaSource};
use crate::transcode::{Ffmpeg, TranscodeEngine};
use crate::YtFetch;

/// Options used when creating the HTTP client for the API.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub enum ClientOptions {
    /// Client with reqwest's default TLS.
    #[default]
    Default,
    /// Client that uses rustls.
    #[cfg(feature = "rustls-tls")]
    Rustls,
    /// Client that uses native-tls.
    #[cfg(feature = "native-tls")]
    Native,
}

/// Builder state before any pipeline components have been supplied - the
/// stock Data API provider, HTTP source and ffmpeg engine are assembled at
/// build time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockComponents;

/// The component set a fully-injected builder assembles into the handle.
#[derive(Debug, Clone)]
pub struct Components<P, S, E> {
    catalog: P,
    source: S,
    engine: E,
}

/// Builder to create a [`YtFetch`] handle. Allows the caller to choose the
/// TLS implementation of the internal HTTP client, and to swap the pipeline
/// components for their own implementations.
#[derive(Debug, Clone)]
pub struct YtFetchBuilder<C> {
    client_options: ClientOptions,
    config: Config,
    components: C,
}

impl YtFetchBuilder<StockComponents> {
    /// Create a new builder using the default TLS.
    pub fn new(config: Config) -> Self {
        Self {
            client_options: ClientOptions::default(),
            config,
            components: StockComponents,
        }
    }
    /// Create a new builder using rustls.
    #[cfg(feature = "rustls-tls")]
    pub fn new_rustls_tls(config: Config) -> Self {
        Self {
            client_options: ClientOptions::Rustls,
            config,
            components: StockComponents,
        }
    }
    /// Create a new builder using native-tls.
    #[cfg(feature = "native-tls")]
    pub fn new_native_tls(config: Config) -> Self {
        Self {
            client_options: ClientOptions::Native,
            config,
            components: StockComponents,
        }
    }
    /// Build the handle with the stock components: the Data API catalog
    /// provider, the HTTP media source and the ffmpeg transcoding engine.
    pub fn build(self) -> Result<YtFetch> {
        let YtFetchBuilder {
            client_options,
            config,
            components: StockComponents,
        } = self;
        let client = build_client(&client_options)?;
        let temp_dir = config.resolved_temp_dir();
        let catalog = DataApi::new(client.clone(), config.api_key.clone());
        let source = HttpSource::new(client.clone());
        let engine = Ffmpeg::new(config.ffmpeg.resolve());
        Ok(YtFetch {
            catalog,
            source,
            engine,
            client,
            config,
            temp_dir,
        })
    }
}

impl<C> YtFetchBuilder<C> {
    /// Use rustls for the internal HTTP client.
    #[cfg(feature = "rustls-tls")]
    pub fn with_rustls_tls(mut self) -> Self {
        self.client_options = ClientOptions::Rustls;
        self
    }
    /// Use native-tls for the internal HTTP client.
    #[cfg(feature = "native-tls")]
    pub fn with_native_tls(mut self) -> Self {
        self.client_options = ClientOptions::Native;
        self
    }
    pub fn with_client_options(mut self, client_options: ClientOptions) -> Self {
        self.client_options = client_options;
        self
    }
    /// Replace the full pipeline component set - catalog provider, media
    /// source and transcoding engine - with the caller's own
    /// implementations. Intended for alternative backends and for tests
    /// that should run without a network or an ffmpeg install.
    pub fn with_components<P, S, E>(
        self,
        catalog: P,
        source: S,
        engine: E,
    ) -> YtFetchBuilder<Components<P, S, E>> {
        let YtFetchBuilder {
            client_options,
            config,
            components: _,
        } = self;
        YtFetchBuilder {
            client_options,
            config,
            components: Components {
                catalog,
                source,
                engine,
            },
        }
    }
}

impl<P, S, E> YtFetchBuilder<Components<P, S, E>>
where
    P: CatalogProvider,
    S: MediaSource,
    E: TranscodeEngine,
{
    /// Build the handle with the supplied components.
    pub fn build(self) -> Result<YtFetch<P, S, E>> {
        let YtFetchBuilder {
            client_options,
            config,
            components:
                Components {
                    catalog,
                    source,
                    engine,
                },
        } = self;
        let client = build_client(&client_options)?;
        let temp_dir = config.resolved_temp_dir();
        Ok(YtFetch {
            catalog,
            source,
            engine,
            client,
            config,
            temp_dir,
        })
    }
}

fn build_client(options: &ClientOptions) -> Result<Client> {
    match options {
        ClientOptions::Default => Client::new().map_err(Error::web),
        #[cfg(feature = "rustls-tls")]
        ClientOptions::Rustls => Client::new_rustls_tls().map_err(Error::web),
        #[cfg(feature = "native-tls")]
        ClientOptions::Native => Client::new_native_tls().map_err(Error::web),
    }
}
