use std::fmt;

use crate::error::Error;
use crate::faults::FaultTranslator;

pub const DEFAULT_ENDPOINT_HOST: &str = "app.adestra.com";

fn default_endpoint_host() -> String {
    DEFAULT_ENDPOINT_HOST.to_string()
}

/// Account credentials and endpoint for a client instance.
#[derive(Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ClientConfig {
    pub organisation: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_endpoint_host")]
    pub endpoint_host: String,
}

impl ClientConfig {
    pub fn new(
        organisation: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            organisation: organisation.into(),
            username: username.into(),
            password: password.into(),
            endpoint_host: default_endpoint_host(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        for (field, value) in [
            ("organisation", &self.organisation),
            ("username", &self.username),
            ("password", &self.password),
            ("endpoint_host", &self.endpoint_host),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config {
                    reason: format!("{field} must not be empty"),
                });
            }
        }
        if self.endpoint_host.contains('/') {
            return Err(Error::Config {
                reason: format!("endpoint_host is a host name, got {}", self.endpoint_host),
            });
        }
        Ok(())
    }

    /// XML-RPC endpoint with credentials embedded in the authority.
    pub fn endpoint_url(&self) -> String {
        format!(
            "https://{}.{}:{}@{}/api/xmlrpc",
            self.organisation, self.username, self.password, self.endpoint_host
        )
    }

    pub fn translator(&self) -> FaultTranslator {
        FaultTranslator::new(&self.organisation, &self.username)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("organisation", &self.organisation)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("endpoint_host", &self.endpoint_host)
            .finish()
    }
}
