use flexdb_axum::ConfigError;

pub(crate) const DEFAULT_PORT: u16 = 3000;

/// Listener settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServerConfig {
    pub(crate) port: u16,
}

impl ServerConfig {
    /// `PORT` falls back to 3000 when unset or blank
    pub(crate) fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) if !raw.trim().is_empty() => {
                raw.trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidVar {
                        name: "PORT",
                        value: raw.clone(),
                    })?
            }
            _ => DEFAULT_PORT,
        };

        Ok(Self { port })
    }

    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }
}
