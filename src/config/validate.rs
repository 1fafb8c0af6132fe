use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.logging.rust_log.trim().is_empty() {
        errors.push("logging.rust_log must not be empty".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.max_connections == 0 {
            errors.push("database.max_connections must be > 0".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }

        if database.connect_timeout_secs == 0 {
            errors.push("database.connect_timeout_secs must be > 0".to_string());
        }
    }

    if let Some(auth) = cfg.auth.as_ref() {
        if auth.jwt_secret.trim().is_empty() {
            errors.push("auth.jwt_secret must not be empty".to_string());
        }

        if auth.access_token_ttl_secs == 0 {
            errors.push("auth.access_token_ttl_secs must be > 0".to_string());
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::config::{AppConfig, AuthConfig, DatabaseConfig};

    #[test]
    fn default_config_is_valid() {
        validate(&AppConfig::default()).expect("defaults should validate");
    }

    #[test]
    fn collects_every_database_and_auth_problem() {
        let mut database = DatabaseConfig::new(" ");
        database.min_idle = database.max_connections + 1;
        let mut auth = AuthConfig::new("");
        auth.access_token_ttl_secs = 0;
        let cfg = AppConfig {
            database: Some(database),
            auth: Some(auth),
            ..AppConfig::default()
        };

        let message = validate(&cfg).expect_err("config should fail").to_string();

        assert!(message.contains("database.url must not be empty"));
        assert!(message.contains("database.min_idle"));
        assert!(message.contains("auth.jwt_secret must not be empty"));
        assert!(message.contains("auth.access_token_ttl_secs must be > 0"));
    }
}
