use serde::{Deserialize, Serialize};

use std::{env, fmt, fs, path::Path, sync::Arc};

use crate::message::ValidationPolicy;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// Port on which the relay expects TLS from the first byte instead of STARTTLS
const IMPLICIT_TLS_PORT: u16 = 465;

/// Reads a single environment variable by name.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lookup backed by the process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|key: &str| env::var(key).ok())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Missing env vars. Set SMTP_USER, SMTP_PASS, CONTACT_EMAIL (and optionally SMTP_HOST/SMTP_PORT) in your environment."
    )]
    MissingVars,

    #[error("Invalid SMTP_PORT: {0}")]
    InvalidPort(String),
}

/// SMTP relay settings, resolved again for every submission.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub user: String,
    pub pass: String,
    pub recipient: String,
}

impl SmtpConfig {
    /// Builds the relay settings from `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`,
    /// `SMTP_PASS` and `CONTACT_EMAIL`. Empty values count as unset.
    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let (Some(user), Some(pass), Some(recipient)) =
            (var("SMTP_USER"), var("SMTP_PASS"), var("CONTACT_EMAIL"))
        else {
            return Err(ConfigError::MissingVars);
        };

        let host = var("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());

        let port = match var("SMTP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            host,
            port,
            secure: port == IMPLICIT_TLS_PORT,
            user,
            pass,
            recipient,
        })
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("recipient", &self.recipient)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default)]
    pub validation: ValidationPolicy,
}

const fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

fn load_from_file(path: &str) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(Into::into)
}

pub fn load_config() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path =
        env::var("CONTACT_RELAY_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return load_from_file(&config_path);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return load_from_file("config.yaml");
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'",
            config_path
        );
        return load_from_file("config.example.yaml");
    }

    // Fallback to environment variables
    tracing::info!(
        "No config file found, loading server configuration from CONTACT_RELAY_* environment variables"
    );
    envy::prefixed("CONTACT_RELAY_")
        .from_env::<ServerConfig>()
        .map_err(|e| {
            Box::<dyn std::error::Error>::from(format!(
                "Config file not found and environment variables are invalid. \
                 Tried: '{config_path}', 'config.yaml', 'config.example.yaml', and environment variables. \
                 Error: {e}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SMTP_USER", "relay@example.com"),
        ("SMTP_PASS", "app-password"),
        ("CONTACT_EMAIL", "sales@example.com"),
    ];

    #[test]
    fn defaults_host_and_port() {
        let cfg = SmtpConfig::resolve(lookup(&REQUIRED)).unwrap();

        assert_eq!(cfg.host, "smtp.gmail.com");
        assert_eq!(cfg.port, 587);
        assert!(!cfg.secure);
        assert_eq!(cfg.user, "relay@example.com");
        assert_eq!(cfg.recipient, "sales@example.com");
    }

    #[test]
    fn port_465_is_secure() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SMTP_HOST", "mail.example.com"));
        vars.push(("SMTP_PORT", "465"));

        let cfg = SmtpConfig::resolve(lookup(&vars)).unwrap();

        assert_eq!(cfg.host, "mail.example.com");
        assert_eq!(cfg.port, 465);
        assert!(cfg.secure);
    }

    #[test]
    fn other_ports_are_not_secure() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SMTP_PORT", "2525"));

        let cfg = SmtpConfig::resolve(lookup(&vars)).unwrap();

        assert_eq!(cfg.port, 2525);
        assert!(!cfg.secure);
    }

    #[test]
    fn each_required_var_is_checked() {
        for missing in ["SMTP_USER", "SMTP_PASS", "CONTACT_EMAIL"] {
            let vars: Vec<_> = REQUIRED
                .iter()
                .copied()
                .filter(|(k, _)| *k != missing)
                .collect();

            assert_eq!(
                SmtpConfig::resolve(lookup(&vars)),
                Err(ConfigError::MissingVars),
                "{missing} should be required"
            );
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let vars = [
            ("SMTP_USER", ""),
            ("SMTP_PASS", "app-password"),
            ("CONTACT_EMAIL", "sales@example.com"),
        ];

        assert_eq!(
            SmtpConfig::resolve(lookup(&vars)),
            Err(ConfigError::MissingVars)
        );
    }

    #[test]
    fn missing_vars_reported_before_bad_port() {
        let vars = [("SMTP_PORT", "not-a-port")];

        assert_eq!(
            SmtpConfig::resolve(lookup(&vars)),
            Err(ConfigError::MissingVars)
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SMTP_PORT", "smtp"));

        assert_eq!(
            SmtpConfig::resolve(lookup(&vars)),
            Err(ConfigError::InvalidPort("smtp".to_string()))
        );
    }

    #[test]
    fn debug_hides_password() {
        let cfg = SmtpConfig::resolve(lookup(&REQUIRED)).unwrap();
        let printed = format!("{cfg:?}");

        assert!(!printed.contains("app-password"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn server_config_yaml_defaults() {
        let cfg: ServerConfig = serde_yaml::from_str("port: 9000\n").unwrap();

        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.validation, ValidationPolicy::Strict);

        let cfg: ServerConfig = serde_yaml::from_str("validation: lenient\n").unwrap();

        assert_eq!(cfg.port, DEFAULT_SERVER_PORT);
        assert_eq!(cfg.validation, ValidationPolicy::Lenient);
    }
}
