//! Batch verification through the WHAPI contacts endpoint.
//!
//! Numbers go out in chunks of at most [`CHUNK_SIZE`]. The provider has
//! answered in several envelope shapes over time; all of them collapse to
//! `(id, status)` pairs here.

use std::collections::HashMap;

use async_trait::async_trait;
use leadscout_core::{CanonicalNumber, ReachabilityStatus};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{ReachabilityError, ReachabilityMap, ReachabilityValidator};

pub const CHUNK_SIZE: usize = 100;
const MAX_ERROR_BODY_CHARS: usize = 800;

#[derive(Debug, Serialize)]
struct ContactsRequest<'a> {
    blocking: &'static str,
    contacts: &'a [String],
    force_check: bool,
}

/// One entry in any of the response shapes.
#[derive(Debug, Default, Deserialize)]
struct ContactItem {
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    wa_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    exists: Option<bool>,
    #[serde(default)]
    is_whatsapp: Option<bool>,
}

impl ContactItem {
    /// Digits of the first identifier the item carries.
    fn id_digits(&self) -> Option<String> {
        [&self.input, &self.number, &self.phone, &self.wa_id]
            .into_iter()
            .flatten()
            .map(|raw| raw.chars().filter(char::is_ascii_digit).collect::<String>())
            .find(|digits| !digits.is_empty())
    }

    fn reachability(&self) -> ReachabilityStatus {
        if let Some(status) = self.status.as_deref() {
            return match status.to_ascii_lowercase().as_str() {
                "valid" => ReachabilityStatus::Valid,
                "invalid" => ReachabilityStatus::Invalid,
                _ => ReachabilityStatus::Unknown,
            };
        }
        match self.exists.or(self.is_whatsapp) {
            Some(true) => ReachabilityStatus::Valid,
            Some(false) => ReachabilityStatus::Invalid,
            None => ReachabilityStatus::Unknown,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContactsResponse {
    Bare(Vec<ContactItem>),
    Wrapped {
        #[serde(default)]
        contacts: Option<Vec<ContactItem>>,
        #[serde(default)]
        results: Option<Vec<ContactItem>>,
        #[serde(default)]
        data: Option<Vec<ContactItem>>,
    },
}

impl ContactsResponse {
    fn into_items(self) -> Vec<ContactItem> {
        match self {
            ContactsResponse::Bare(items) => items,
            ContactsResponse::Wrapped {
                contacts,
                results,
                data,
            } => contacts.or(results).or(data).unwrap_or_default(),
        }
    }
}

/// Parse a contacts response body into `(digits, status)` pairs.
fn parse_contacts(body: &str) -> Result<Vec<(String, ReachabilityStatus)>, ReachabilityError> {
    let response: ContactsResponse =
        serde_json::from_str(body).map_err(|e| ReachabilityError::Deserialize {
            context: "contacts".to_string(),
            source: e,
        })?;
    Ok(response
        .into_items()
        .into_iter()
        .filter_map(|item| item.id_digits().map(|id| (id, item.reachability())))
        .collect())
}

fn excerpt(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

pub struct WhapiValidator {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl WhapiValidator {
    #[must_use]
    pub fn new(client: Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn check_chunk(
        &self,
        token: &str,
        ids: &[String],
    ) -> Result<Vec<(String, ReachabilityStatus)>, ReachabilityError> {
        let url = format!("{}/contacts", self.base_url);
        let request = ContactsRequest {
            blocking: "wait",
            contacts: ids,
            force_check: true,
        };
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_client_error() || status.is_server_error() {
            return Err(ReachabilityError::Upstream {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }
        parse_contacts(&body)
    }
}

#[async_trait]
impl ReachabilityValidator for WhapiValidator {
    fn name(&self) -> &'static str {
        "whapi"
    }

    async fn validate(
        &self,
        numbers: &[CanonicalNumber],
    ) -> Result<ReachabilityMap, ReachabilityError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ReachabilityError::MissingCredential("WHAPI_TOKEN".to_string()))?;

        let mut by_id: HashMap<String, CanonicalNumber> = HashMap::new();
        let mut ids = Vec::new();
        for number in numbers {
            let id = number.normalized_id();
            if !by_id.contains_key(&id) {
                by_id.insert(id.clone(), number.clone());
                ids.push(id);
            }
        }

        let mut results: ReachabilityMap = by_id
            .values()
            .map(|n| (n.clone(), ReachabilityStatus::Unknown))
            .collect();

        for (index, chunk) in ids.chunks(CHUNK_SIZE).enumerate() {
            let statuses = self.check_chunk(token, chunk).await?;
            tracing::debug!(
                chunk = index,
                size = chunk.len(),
                answered = statuses.len(),
                "batch checked"
            );
            for (id, status) in statuses {
                if let Some(number) = by_id.get(&id) {
                    results.insert(number.clone(), status);
                }
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contacts_envelope_with_status() {
        let body = r#"{"contacts":[
            {"input":"+554133221100","status":"valid","wa_id":"554133221100"},
            {"input":"5541998887766","status":"invalid"}
        ]}"#;
        assert_eq!(
            parse_contacts(body).unwrap(),
            vec![
                ("554133221100".to_string(), ReachabilityStatus::Valid),
                ("5541998887766".to_string(), ReachabilityStatus::Invalid),
            ]
        );
    }

    #[test]
    fn bare_array() {
        let body = r#"[{"number":"554133221100","status":"VALID"}]"#;
        assert_eq!(
            parse_contacts(body).unwrap(),
            vec![("554133221100".to_string(), ReachabilityStatus::Valid)]
        );
    }

    #[test]
    fn results_with_exists_flag() {
        let body = r#"{"results":[
            {"phone":"554133221100","exists":true},
            {"phone":"5541998887766","exists":false}
        ]}"#;
        assert_eq!(
            parse_contacts(body).unwrap(),
            vec![
                ("554133221100".to_string(), ReachabilityStatus::Valid),
                ("5541998887766".to_string(), ReachabilityStatus::Invalid),
            ]
        );
    }

    #[test]
    fn data_with_is_whatsapp_flag() {
        let body = r#"{"data":[{"phone":"554133221100","is_whatsapp":false}]}"#;
        assert_eq!(
            parse_contacts(body).unwrap(),
            vec![("554133221100".to_string(), ReachabilityStatus::Invalid)]
        );
    }

    #[test]
    fn unrecognized_status_and_missing_ids() {
        let body = r#"{"contacts":[
            {"input":"554133221100","status":"processing"},
            {"status":"valid"}
        ]}"#;
        assert_eq!(
            parse_contacts(body).unwrap(),
            vec![("554133221100".to_string(), ReachabilityStatus::Unknown)]
        );
    }

    #[test]
    fn empty_object_has_no_items() {
        assert!(parse_contacts("{}").unwrap().is_empty());
    }

    #[test]
    fn non_json_is_deserialize_error() {
        let err = parse_contacts("<html>").unwrap_err();
        assert!(matches!(err, ReachabilityError::Deserialize { .. }));
    }

    #[test]
    fn excerpt_is_capped() {
        let long = "x".repeat(2000);
        assert_eq!(excerpt(&long).len(), MAX_ERROR_BODY_CHARS);
    }
}
