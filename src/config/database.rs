use mongodb::{options::ClientOptions, Client};
use std::env;
use std::time::Duration;

pub const DEFAULT_URI: &str = "mongodb://localhost:27017/";
pub const DEFAULT_DATABASE: &str = "audiodeck";

pub const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound for a single read or write once connected.
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
}

impl DatabaseConfig {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
        }
    }

    pub fn from_env() -> Self {
        let uri = env::var("MONGO_URI").unwrap_or_else(|_| DEFAULT_URI.to_string());
        Self::new(uri, database_name_from_env())
    }

    /// Connection string with any `user:password@` section masked, safe to log.
    pub fn redacted_uri(&self) -> String {
        match (self.uri.find("://"), self.uri.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                format!("{}***{}", &self.uri[..scheme_end + 3], &self.uri[at..])
            }
            _ => self.uri.clone(),
        }
    }
}

pub fn database_name_from_env() -> String {
    env::var("DATABASE_NAME").unwrap_or_else(|_| DEFAULT_DATABASE.to_string())
}

pub async fn connect(config: &DatabaseConfig) -> Result<Client, mongodb::error::Error> {
    let mut options = ClientOptions::parse(config.uri.as_str()).await?;
    options.app_name = Some("audiodeck".to_string());
    options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
    options.connect_timeout = Some(CONNECT_TIMEOUT);

    Client::with_options(options)
}
