use chromiumoxide::error::CdpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("browser error: {0}")]
    Browser(Box<CdpError>),

    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("timed out after {secs}s loading {url}")]
    Timeout { url: String, secs: u64 },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("places API returned {status}: {message}")]
    Api { status: String, message: String },
}

impl From<CdpError> for ScraperError {
    fn from(error: CdpError) -> Self {
        Self::Browser(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdp_errors_convert_into_boxed_browser_variant() {
        let error = ScraperError::from(CdpError::NotFound);
        assert!(matches!(error, ScraperError::Browser(_)));
        assert!(error.to_string().starts_with("browser error:"));
    }
}
