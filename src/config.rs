//! Configuration types for case extraction and figure resolution.
//!
//! All run behaviour is controlled through [`ExtractionConfig`], built via
//! its [`ExtractionConfigBuilder`]. Every knob lives in one struct so a run
//! can be logged and compared with another.

use crate::error::PatdeckError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Configuration for one extraction run.
///
/// # Example
/// ```rust
/// use patdeck::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .render_scale(3.0)
///     .sort_records(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.render_scale, 3.0);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Linear scale applied when rasterising a matched figure page.
    /// Range: 0.5–8.0. Default: 2.0 (four times the pixel area of the page
    /// at 72 DPI).
    pub render_scale: f32,

    /// Characters taken from the first figure-text line when it names no
    /// figure explicitly. Default: 10.
    pub fallback_token_chars: usize,

    /// Order records company-major, date-minor before resolution. Default: true.
    pub sort_records: bool,

    /// Run the figure resolver. When false, records keep no image and no
    /// figure report. Default: true.
    pub resolve_figures: bool,

    /// User password for encrypted candidate PDFs.
    pub password: Option<String>,

    /// Optional progress callback for per-document and per-case events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            render_scale: 2.0,
            fallback_token_chars: 10,
            sort_records: true,
            resolve_figures: true,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("render_scale", &self.render_scale)
            .field("fallback_token_chars", &self.fallback_token_chars)
            .field("sort_records", &self.sort_records)
            .field("resolve_figures", &self.resolve_figures)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale;
        self
    }

    pub fn fallback_token_chars(mut self, n: usize) -> Self {
        self.config.fallback_token_chars = n;
        self
    }

    pub fn sort_records(mut self, v: bool) -> Self {
        self.config.sort_records = v;
        self
    }

    pub fn resolve_figures(mut self, v: bool) -> Self {
        self.config.resolve_figures = v;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, PatdeckError> {
        let c = &self.config;
        if !c.render_scale.is_finite() || !(0.5..=8.0).contains(&c.render_scale) {
            return Err(PatdeckError::InvalidConfig(format!(
                "render scale must be 0.5–8.0, got {}",
                c.render_scale
            )));
        }
        if c.fallback_token_chars == 0 {
            return Err(PatdeckError::InvalidConfig(
                "fallback token length must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
