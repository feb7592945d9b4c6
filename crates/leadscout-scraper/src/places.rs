//! Google Places lookup, used as a structured lead source ahead of web
//! scraping when an API key is configured.
//!
//! Text search results are paged with `next_page_token`, which only becomes
//! valid a couple of seconds after it is issued.

use std::time::Duration;

use leadscout_core::{canonicalize, LeadRecord, Region, SearchQuery};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ScraperError;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";
const TEXT_SEARCH_PATH: &str = "maps/api/place/textsearch/json";
const DETAILS_PATH: &str = "maps/api/place/details/json";
const DETAIL_FIELDS: &str =
    "name,formatted_address,international_phone_number,formatted_phone_number,website";
const MAPS_PLACE_URL: &str = "https://www.google.com/maps/place/?q=place_id:";
const MAX_SEARCH_PAGES: usize = 3;
const PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceSummary>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceSummary {
    #[serde(default)]
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    result: Option<PlaceDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub international_phone_number: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl PlaceDetails {
    fn phone(&self) -> Option<&str> {
        self.international_phone_number
            .as_deref()
            .or(self.formatted_phone_number.as_deref())
    }
}

pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    page_token_delay: Duration,
}

impl PlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] only if the built-in base URL is
    /// rejected, which does not happen in practice.
    pub fn new(client: Client, api_key: &str) -> Result<Self, ScraperError> {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client: Client,
        api_key: &str,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ScraperError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            page_token_delay: PAGE_TOKEN_DELAY,
        })
    }

    /// Override the pause before following `next_page_token`.
    #[must_use]
    pub fn with_page_token_delay(mut self, delay: Duration) -> Self {
        self.page_token_delay = delay;
        self
    }

    /// Place ids matching `query`, following up to three result pages.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Api`] if the envelope status is neither `OK` nor
    ///   `ZERO_RESULTS`.
    /// - [`ScraperError::Http`] / [`ScraperError::UnexpectedStatus`] on
    ///   transport failures.
    /// - [`ScraperError::Deserialize`] if the body is not the expected JSON.
    pub async fn text_search(&self, query: &str) -> Result<Vec<String>, ScraperError> {
        let mut place_ids = Vec::new();
        let mut url = self.build_url(
            TEXT_SEARCH_PATH,
            &[("query", query), ("region", "br"), ("language", "pt-BR")],
        )?;

        for page in 0..MAX_SEARCH_PAGES {
            let body: TextSearchResponse = self.get_json(&url, "textsearch").await?;
            if body.status != "OK" && body.status != "ZERO_RESULTS" {
                return Err(ScraperError::Api {
                    status: body.status,
                    message: body.error_message.unwrap_or_default(),
                });
            }
            place_ids.extend(body.results.into_iter().filter_map(|r| r.place_id));

            let Some(token) = body.next_page_token else {
                break;
            };
            if page + 1 == MAX_SEARCH_PAGES {
                break;
            }
            tokio::time::sleep(self.page_token_delay).await;
            url = self.build_url(TEXT_SEARCH_PATH, &[("pagetoken", token.as_str())])?;
        }

        Ok(place_ids)
    }

    /// Contact details for one place. `None` when the API reports anything
    /// other than `OK`.
    ///
    /// # Errors
    ///
    /// Transport and deserialization failures, as for [`Self::text_search`].
    pub async fn details(&self, place_id: &str) -> Result<Option<PlaceDetails>, ScraperError> {
        let url = self.build_url(
            DETAILS_PATH,
            &[
                ("place_id", place_id),
                ("fields", DETAIL_FIELDS),
                ("language", "pt-BR"),
            ],
        )?;
        let body: DetailsResponse = self.get_json(&url, "details").await?;
        if body.status != "OK" {
            tracing::debug!(
                place_id,
                status = body.status.as_str(),
                "place details unavailable"
            );
            return Ok(None);
        }
        Ok(Some(body.result.unwrap_or_default()))
    }

    /// Lead records for `query`, up to `limit` places with a usable phone.
    ///
    /// Search failures are logged and yield an empty list; a failing detail
    /// lookup skips that place.
    pub async fn lookup_leads(
        &self,
        query: &SearchQuery,
        limit: usize,
        region: Region,
    ) -> Vec<LeadRecord> {
        let label = query.label();
        let place_ids = match self.text_search(&label).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(query = label.as_str(), error = %e, "places text search failed");
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        for place_id in place_ids {
            if records.len() >= limit {
                break;
            }
            let details = match self.details(&place_id).await {
                Ok(Some(details)) => details,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(
                        place_id = place_id.as_str(),
                        error = %e,
                        "place details failed"
                    );
                    continue;
                }
            };
            let Some(phone) = details.phone().and_then(|p| canonicalize(p, region)) else {
                continue;
            };
            let source = details
                .website
                .clone()
                .unwrap_or_else(|| format!("{MAPS_PLACE_URL}{place_id}"));
            let name = details.name.clone().unwrap_or_else(|| label.clone());
            let address = details.formatted_address.unwrap_or_default();
            records.push(LeadRecord::new(name, phone, source).with_address(address));
        }

        tracing::info!(
            query = label.as_str(),
            leads = records.len(),
            "places lookup finished"
        );
        records
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ScraperError> {
        let mut url = self.base_url.join(path).map_err(|e| ScraperError::InvalidUrl {
            url: format!("{}{path}", self.base_url),
            reason: e.to_string(),
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, ScraperError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: redact_key(url),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

/// URL without its query string, so the API key stays out of logs.
fn redact_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
