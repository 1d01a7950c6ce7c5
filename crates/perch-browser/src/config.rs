//! Session configuration.

/// Settings for one browser session.
///
/// Timeouts are deliberately not configurable here; the driver uses fixed
/// generous defaults and reports overruns as errors.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Explicit browser binary path. When `None`, discovery falls back to
    /// the `PERCH_BROWSER_BIN` environment variable and well-known
    /// install locations.
    pub binary_path: Option<String>,
    /// Page viewport in CSS pixels. The desktop layout is
    /// viewport-conditional on the target platform, so this defaults to a
    /// full desktop size.
    pub viewport: (u32, u32),
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            viewport: (1920, 1080),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_viewport_is_desktop() {
        let config = SessionConfig::default();
        assert_eq!(config.viewport, (1920, 1080));
        assert!(config.binary_path.is_none());
    }
}
