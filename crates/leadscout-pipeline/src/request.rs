use leadscout_core::{AppConfig, Region, SearchQuery};

use crate::error::PipelineError;

const MIN_LOCALITY_CHARS: usize = 2;

/// Discovery input as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    pub locality: String,
    pub segment: Option<String>,
    pub requested_volume: Option<usize>,
    /// Overrides the configured inline-validation setting for this run.
    pub validate: Option<bool>,
}

impl RunRequest {
    #[must_use]
    pub fn new(locality: impl Into<String>) -> Self {
        Self {
            locality: locality.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    #[must_use]
    pub fn with_volume(mut self, volume: usize) -> Self {
        self.requested_volume = Some(volume);
        self
    }

    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = Some(validate);
        self
    }

    /// Apply defaults and input constraints.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] if the trimmed locality is
    /// shorter than two characters.
    pub fn resolve(&self, settings: &PipelineSettings) -> Result<ResolvedRequest, PipelineError> {
        let locality = self.locality.trim();
        if locality.chars().count() < MIN_LOCALITY_CHARS {
            return Err(PipelineError::InvalidInput(format!(
                "locality must have at least {MIN_LOCALITY_CHARS} characters"
            )));
        }

        let segment = self
            .segment
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&settings.default_segment);

        let volume = self
            .requested_volume
            .map_or(settings.default_volume, |v| v.clamp(1, settings.max_volume));

        Ok(ResolvedRequest {
            query: SearchQuery::new(locality, segment),
            volume,
            validate: self.validate.unwrap_or(settings.validate_inline),
        })
    }
}

/// A request that passed validation, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub query: SearchQuery,
    pub volume: usize,
    pub validate: bool,
}

/// The slice of [`AppConfig`] the orchestrator needs per run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub region: Region,
    pub default_segment: String,
    pub default_volume: usize,
    pub max_volume: usize,
    pub validate_inline: bool,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            region: config.default_region,
            default_segment: config.default_segment.clone(),
            default_volume: config.default_volume,
            max_volume: config.max_volume,
            validate_inline: config.validate_inline,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            region: Region::Brazil,
            default_segment: "empresas".to_string(),
            default_volume: 50,
            max_volume: 200,
            validate_inline: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locality_is_trimmed_and_defaults_apply() {
        let resolved = RunRequest::new("  Curitiba ")
            .resolve(&PipelineSettings::default())
            .unwrap();
        assert_eq!(resolved.query, SearchQuery::new("Curitiba", "empresas"));
        assert_eq!(resolved.volume, 50);
        assert!(!resolved.validate);
    }

    #[test]
    fn short_or_blank_locality_is_rejected() {
        for locality in ["", "   ", "X", " Y "] {
            let err = RunRequest::new(locality)
                .resolve(&PipelineSettings::default())
                .unwrap_err();
            assert!(
                matches!(err, PipelineError::InvalidInput(_)),
                "{locality:?}"
            );
        }
    }

    #[test]
    fn two_character_locality_is_accepted() {
        let settings = PipelineSettings::default();
        assert!(RunRequest::new("Rj").resolve(&settings).is_ok());
    }

    #[test]
    fn volume_is_clamped() {
        let settings = PipelineSettings::default();
        let high = RunRequest::new("Curitiba")
            .with_volume(5000)
            .resolve(&settings)
            .unwrap();
        assert_eq!(high.volume, 200);
        let zero = RunRequest::new("Curitiba")
            .with_volume(0)
            .resolve(&settings)
            .unwrap();
        assert_eq!(zero.volume, 1);
    }

    #[test]
    fn blank_segment_falls_back_to_default() {
        let resolved = RunRequest::new("Curitiba")
            .with_segment("   ")
            .resolve(&PipelineSettings::default())
            .unwrap();
        assert_eq!(resolved.query.segment, "empresas");
    }

    #[test]
    fn explicit_validation_flag_overrides_settings() {
        let settings = PipelineSettings {
            validate_inline: true,
            ..PipelineSettings::default()
        };
        let resolved = RunRequest::new("Curitiba")
            .with_validation(false)
            .resolve(&settings)
            .unwrap();
        assert!(!resolved.validate);
        let defaulted = RunRequest::new("Curitiba").resolve(&settings).unwrap();
        assert!(defaulted.validate);
    }
}
