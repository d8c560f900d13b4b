use crate::adapters::mail::{HttpMailTransport, LogMailTransport, MailSettings};
use crate::core::notification::{DispatchSettings, DEFAULT_SENDER};
use crate::core::MailTransport;
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub notifications: NotificationsConfig,
    pub mail: MailConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub csv_path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            csv_path: "data/whisky.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub subscriptions_path: String,
    pub sender_address: String,
    pub send_timeout_seconds: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            subscriptions_path: "Notifications/notifications.json".to_string(),
            sender_address: DEFAULT_SENDER.to_string(),
            send_timeout_seconds: 10,
        }
    }
}

/// Mail relay connection. When `enabled` is false emails are only logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub enabled: bool,
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
    pub path: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: None,
            port: 25,
            username: None,
            password: None,
            use_tls: false,
            path: "/send".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CatalogError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CatalogError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CatalogError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("catalog.csv_path", &self.catalog.csv_path)?;
        validation::validate_file_extension("catalog.csv_path", &self.catalog.csv_path, &["csv"])?;

        validation::validate_path(
            "notifications.subscriptions_path",
            &self.notifications.subscriptions_path,
        )?;
        validation::validate_email_address(
            "notifications.sender_address",
            &self.notifications.sender_address,
        )?;
        validation::validate_range(
            "notifications.send_timeout_seconds",
            self.notifications.send_timeout_seconds,
            1,
            300,
        )?;

        if self.mail.enabled {
            let host = validation::validate_required_field("mail.host", &self.mail.host)?;
            validation::validate_non_empty_string("mail.host", host)?;
            validation::validate_range("mail.port", self.mail.port, 1, u16::MAX)?;
            if let Some(settings) = self.mail_settings()? {
                validation::validate_url("mail.host", settings.endpoint()?.as_str())?;
            }
        }

        Ok(())
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            sender_address: self.notifications.sender_address.clone(),
            send_timeout: Duration::from_secs(self.notifications.send_timeout_seconds),
        }
    }

    /// `None` while mail is disabled.
    pub fn mail_settings(&self) -> Result<Option<MailSettings>> {
        if !self.mail.enabled {
            return Ok(None);
        }

        let host = validation::validate_required_field("mail.host", &self.mail.host)?;
        Ok(Some(MailSettings {
            host: host.clone(),
            port: self.mail.port,
            username: self.mail.username.clone(),
            password: self.mail.password.clone(),
            use_tls: self.mail.use_tls,
            path: self.mail.path.clone(),
        }))
    }

    pub fn build_transport(&self) -> Result<Arc<dyn MailTransport>> {
        match self.mail_settings()? {
            Some(settings) => {
                tracing::debug!("Using mail relay at {}:{}", settings.host, settings.port);
                Ok(Arc::new(HttpMailTransport::new(settings)?))
            }
            None => Ok(Arc::new(LogMailTransport)),
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[catalog]
csv_path = "/srv/whisky/whisky.csv"

[notifications]
subscriptions_path = "/srv/whisky/notifications.json"
sender_address = "alerts@whisky.test"
send_timeout_seconds = 5

[mail]
enabled = true
host = "relay.whisky.test"
port = 8025
username = "mailer"
password = "secret"

[logging]
json = true
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.catalog.csv_path, "/srv/whisky/whisky.csv");
        assert_eq!(config.notifications.sender_address, "alerts@whisky.test");
        assert_eq!(config.dispatch_settings().send_timeout, Duration::from_secs(5));
        assert!(config.logging.json);
        assert!(config.validate().is_ok());

        let settings = config.mail_settings().unwrap().unwrap();
        assert_eq!(
            settings.endpoint().unwrap().as_str(),
            "http://relay.whisky.test:8025/send"
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.catalog.csv_path, "data/whisky.csv");
        assert_eq!(
            config.notifications.subscriptions_path,
            "Notifications/notifications.json"
        );
        assert_eq!(config.notifications.sender_address, DEFAULT_SENDER);
        assert!(!config.mail.enabled);
        assert!(config.mail_settings().unwrap().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("WHISKY_TEST_MAIL_PASSWORD", "hunter2");

        let toml_content = r#"
[mail]
enabled = true
host = "relay.whisky.test"
password = "${WHISKY_TEST_MAIL_PASSWORD}"
username = "${WHISKY_TEST_UNSET_VARIABLE}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.mail.password.as_deref(), Some("hunter2"));
        assert_eq!(
            config.mail.username.as_deref(),
            Some("${WHISKY_TEST_UNSET_VARIABLE}")
        );

        std::env::remove_var("WHISKY_TEST_MAIL_PASSWORD");
    }

    #[test]
    fn test_validation_failures() {
        let wrong_extension = AppConfig::from_toml_str("[catalog]\ncsv_path = \"whisky.json\"").unwrap();
        assert!(wrong_extension.validate().is_err());

        let bad_sender =
            AppConfig::from_toml_str("[notifications]\nsender_address = \"nobody\"").unwrap();
        assert!(bad_sender.validate().is_err());

        let zero_timeout =
            AppConfig::from_toml_str("[notifications]\nsend_timeout_seconds = 0").unwrap();
        assert!(zero_timeout.validate().is_err());

        let missing_host = AppConfig::from_toml_str("[mail]\nenabled = true").unwrap();
        assert!(matches!(
            missing_host.validate(),
            Err(CatalogError::MissingConfigError { .. })
        ));

        let zero_port =
            AppConfig::from_toml_str("[mail]\nenabled = true\nhost = \"relay\"\nport = 0").unwrap();
        assert!(zero_port.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = AppConfig::from_toml_str("[catalog\ncsv_path = 1");
        assert!(matches!(
            result,
            Err(CatalogError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[catalog]\ncsv_path = \"catalog/whisky.csv\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.catalog.csv_path, "catalog/whisky.csv");
    }
}
