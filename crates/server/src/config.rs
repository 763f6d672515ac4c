use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// Throttling parameters for the OTP state machine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OtpConfig {
    /// Seconds a code stays valid after issuance.
    pub expiry_seconds: i64,
    /// Failed verification attempts before the email is blocked.
    pub max_attempts: i32,
    /// Issuance calls allowed against an unexpired code.
    pub max_resends: i32,
    /// Seconds an email stays blocked after exceeding the attempt limit.
    pub block_seconds: i64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            expiry_seconds: 300,
            max_attempts: 5,
            max_resends: 3,
            block_seconds: 7200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OAuth2Config {
    /// Access token lifetime in seconds.
    pub access_token_lifetime: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_lifetime: i64,
}

impl Default for OAuth2Config {
    fn default() -> Self {
        Self {
            access_token_lifetime: 36000,
            refresh_token_lifetime: 86400 * 7,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub otp: OtpConfig,
    #[serde(default)]
    pub oauth2: OAuth2Config,
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Any environment variable matching the key path separated by double
/// underscores (e.g. `SMTP__PORT`, `OTP__MAX_ATTEMPTS`) overrides the file
/// value.
///
/// Returns a `ConfigError` instead of panicking so the caller can decide how
/// to fail.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml"))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    validate(&app)?;

    Ok(app)
}

fn validate(app: &AppConfig) -> Result<(), ConfigError> {
    if app.smtp.port == 0 {
        return Err(ConfigError::Validation("smtp.port must be > 0".into()));
    }
    if app.otp.expiry_seconds <= 0 {
        return Err(ConfigError::Validation(
            "otp.expiry_seconds must be > 0".into(),
        ));
    }
    if app.otp.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "otp.max_attempts must be >= 1".into(),
        ));
    }
    if app.otp.max_resends < 1 {
        return Err(ConfigError::Validation(
            "otp.max_resends must be >= 1".into(),
        ));
    }
    if app.otp.block_seconds <= 0 {
        return Err(ConfigError::Validation(
            "otp.block_seconds must be > 0".into(),
        ));
    }
    if app.oauth2.access_token_lifetime <= 0 {
        return Err(ConfigError::Validation(
            "oauth2.access_token_lifetime must be > 0".into(),
        ));
    }
    Ok(())
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            smtp: SmtpConfig {
                server: "localhost".into(),
                port: 25,
                username: "test".into(),
                password: "test".into(),
                from: "noreply@test.example.org".into(),
            },
            otp: OtpConfig::default(),
            oauth2: OAuth2Config::default(),
        }
    }

    #[test]
    fn otp_defaults_match_platform_policy() {
        let otp = OtpConfig::default();
        assert_eq!(otp.expiry_seconds, 300);
        assert_eq!(otp.max_attempts, 5);
        assert_eq!(otp.max_resends, 3);
        assert_eq!(otp.block_seconds, 7200);
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn zero_smtp_port_rejected() {
        let mut cfg = base_config();
        cfg.smtp.port = 0;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn zero_max_attempts_rejected() {
        let mut cfg = base_config();
        cfg.otp.max_attempts = 0;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn negative_expiry_rejected() {
        let mut cfg = base_config();
        cfg.otp.expiry_seconds = -1;
        assert!(validate(&cfg).is_err());
    }
}
