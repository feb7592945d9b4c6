use serde::Serialize;

use crate::phone::CanonicalNumber;

/// Discovery input. `segment` falls back to a generic business term when
/// the caller leaves it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub locality: String,
    pub segment: String,
}

impl SearchQuery {
    #[must_use]
    pub fn new(locality: impl Into<String>, segment: impl Into<String>) -> Self {
        Self {
            locality: locality.into(),
            segment: segment.into(),
        }
    }

    /// Human-readable run label, e.g. `"dentista Curitiba"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.segment, self.locality)
    }

    /// Search phrasings in the order they are submitted to each engine.
    #[must_use]
    pub fn phrasings(&self) -> Vec<String> {
        let label = self.label();
        ["telefone", "contato", "whatsapp"]
            .iter()
            .map(|suffix| format!("{label} {suffix}"))
            .collect()
    }
}

/// An unvalidated phone-like fragment lifted from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub text: String,
}

impl RawCandidate {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReachabilityStatus {
    #[default]
    Unvalidated,
    Valid,
    Invalid,
    Unknown,
}

impl ReachabilityStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReachabilityStatus::Unvalidated => "unvalidated",
            ReachabilityStatus::Valid => "valid",
            ReachabilityStatus::Invalid => "invalid",
            ReachabilityStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ReachabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered business contact, keyed by its canonical phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub name: String,
    pub phone: CanonicalNumber,
    pub address: String,
    pub source_url: String,
    pub reachability_status: ReachabilityStatus,
}

impl LeadRecord {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        phone: CanonicalNumber,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone,
            address: String::new(),
            source_url: source_url.into(),
            reachability_status: ReachabilityStatus::Unvalidated,
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub query: String,
    pub total: usize,
    pub rows: Vec<LeadRecord>,
    pub csv: String,
}

/// Result of validating one caller-supplied number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub raw: String,
    pub canonical: Option<CanonicalNumber>,
    pub status: ReachabilityStatus,
    pub normalized_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrasings_append_each_suffix_to_label() {
        let query = SearchQuery::new("Curitiba", "dentista");
        assert_eq!(query.label(), "dentista Curitiba");
        assert_eq!(
            query.phrasings(),
            vec![
                "dentista Curitiba telefone",
                "dentista Curitiba contato",
                "dentista Curitiba whatsapp",
            ]
        );
    }

    #[test]
    fn lead_record_serializes_camel_case() {
        let phone: CanonicalNumber = "+554133221100".parse().unwrap();
        let record = LeadRecord::new("Clinica", phone, "https://example.com").with_address("Rua A");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["phone"], "+554133221100");
        assert_eq!(value["sourceUrl"], "https://example.com");
        assert_eq!(value["reachabilityStatus"], "unvalidated");
        assert_eq!(value["address"], "Rua A");
    }

    #[test]
    fn validation_outcome_serializes_nulls() {
        let outcome = ValidationOutcome {
            raw: "abc".into(),
            canonical: None,
            status: ReachabilityStatus::Invalid,
            normalized_id: None,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert!(value["canonical"].is_null());
        assert!(value["normalizedId"].is_null());
        assert_eq!(value["status"], "invalid");
    }
}
