//! JWT validation options.

use chrono::Duration;

/// Policy applied after a signature has verified.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Leeway for time-based claims.
    pub leeway: Duration,
    /// Validate expiry.
    pub validate_exp: bool,
    /// Expected issuer.
    pub expected_issuer: Option<String>,
    /// Expected audience.
    pub expected_audience: Option<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            leeway: Duration::seconds(0),
            validate_exp: true,
            expected_issuer: None,
            expected_audience: None,
        }
    }
}

impl ValidationOptions {
    /// Require `iss` to equal `issuer`.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuer = Some(issuer.into());
        self
    }

    /// Require `aud` to equal `audience`.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.expected_audience = Some(audience.into());
        self
    }

    /// Allow `leeway` of clock skew on `exp`.
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }
}
