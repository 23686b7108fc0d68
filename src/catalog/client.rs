use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::catalog::models::{SearchQuery, Track};
use crate::config::Config;
use crate::error::{AppError, Result};

/// Anything that can answer a catalog search.
///
/// The HTTP client is the production implementation; tests swap in fakes.
pub trait CatalogSource {
    fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<Vec<Track>>> + Send;
}

#[derive(Debug, Deserialize)]
struct CatalogSearchResponse {
    #[serde(rename = "resultCount", default)]
    result_count: usize,
    #[serde(default)]
    results: Vec<CatalogApiTrack>,
}

#[derive(Debug, Deserialize)]
struct CatalogApiTrack {
    #[serde(rename = "trackId")]
    track_id: Option<u64>,
    #[serde(rename = "trackName")]
    track_name: Option<String>,
    #[serde(rename = "artistName")]
    artist_name: Option<String>,
    #[serde(rename = "collectionName")]
    collection_name: Option<String>,
    #[serde(rename = "artworkUrl100")]
    artwork_url_100: Option<String>,
    #[serde(rename = "trackTimeMillis")]
    track_time_millis: Option<serde_json::Value>,
    #[serde(rename = "previewUrl")]
    preview_url: Option<String>,
    #[serde(rename = "trackViewUrl")]
    track_view_url: Option<String>,
}

/// Parses a raw search response body, keeping the server's ordering.
///
/// Entries without a `trackId` can't be selected or favourited, so they are
/// dropped here.
pub fn parse_search_response(body: &str) -> Result<Vec<Track>> {
    let response: CatalogSearchResponse = serde_json::from_str(body)?;

    debug!(
        "Catalog reported {} results, received {}",
        response.result_count,
        response.results.len()
    );

    Ok(response
        .results
        .into_iter()
        .filter_map(|t| {
            let Some(id) = t.track_id else {
                debug!(
                    "Skipping result without trackId: {}",
                    t.track_name.as_deref().unwrap_or("<unnamed>")
                );
                return None;
            };

            Some(Track {
                id,
                name: t.track_name,
                artist: t.artist_name,
                collection: t.collection_name,
                artwork_url: t.artwork_url_100,
                duration_ms: t.track_time_millis.as_ref().and_then(millis_from_json),
                preview_url: t.preview_url,
                view_url: t.track_view_url,
            })
        })
        .collect())
}

/// Reads a duration leniently: fractions are rounded, anything negative or
/// non-numeric is treated as unknown rather than failing the whole response.
fn millis_from_json(value: &serde_json::Value) -> Option<u64> {
    if let Some(ms) = value.as_u64() {
        return Some(ms);
    }

    match value.as_f64() {
        Some(ms) if ms.is_finite() && ms >= 0.0 => Some(ms.round() as u64),
        _ => {
            debug!("Ignoring unusable trackTimeMillis: {}", value);
            None
        }
    }
}

pub struct CatalogClient {
    http_client: Client,
    search_url: url::Url,
}

impl CatalogClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout);

        // A local endpoint is never reached through a proxy.
        if is_loopback(&config.search_url) {
            builder = builder.no_proxy();
        }

        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            search_url: config.search_url.clone(),
        })
    }

    pub async fn search_tracks(&self, query: &SearchQuery) -> Result<Vec<Track>> {
        debug!("Searching catalog for {:?}", query.term);

        let response = self
            .http_client
            .get(self.search_url.clone())
            .query(&query.as_params())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Catalog search failed ({}): {}", status, error_text);
            return Err(AppError::CatalogApi {
                status: status.as_u16(),
                body: error_text,
            });
        }

        // The iTunes endpoint labels its JSON as text/javascript, so decode
        // the body ourselves instead of relying on the content type.
        let body = response.text().await?;
        let tracks = parse_search_response(&body)?;

        info!("Catalog returned {} tracks for {:?}", tracks.len(), query.term);

        Ok(tracks)
    }
}

fn is_loopback(url: &url::Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

impl CatalogSource for CatalogClient {
    fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<Vec<Track>>> + Send {
        self.search_tracks(query)
    }
}
