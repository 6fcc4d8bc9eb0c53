//! Téléchargement d'une couche via une requête WFS GetFeature

use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::FetchConfig;

/// Erreurs de téléchargement
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid server URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch data for layer '{layer}': HTTP {status}")]
    Status { layer: String, status: StatusCode },
}

/// Construit l'URL GetFeature (WFS 2.0.0) d'une couche
pub fn get_feature_url(base: &str, layer: &str, output_format: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(base.trim()).map_err(|e| FetchError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;

    url.query_pairs_mut()
        .append_pair("service", "WFS")
        .append_pair("version", "2.0.0")
        .append_pair("request", "GetFeature")
        .append_pair("typeName", layer)
        .append_pair("outputFormat", output_format);

    Ok(url)
}

/// Télécharge le corps de la réponse GetFeature
pub async fn fetch_layer(
    config: &FetchConfig,
    url: &Url,
    layer: &str,
) -> Result<Vec<u8>, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .build()?;

    info!(layer = layer, url = %url, "Fetching layer");
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status {
            layer: layer.to_string(),
            status,
        });
    }

    let body = response.bytes().await?;
    debug!(layer = layer, bytes = body.len(), "Layer downloaded");

    Ok(body.to_vec())
}
