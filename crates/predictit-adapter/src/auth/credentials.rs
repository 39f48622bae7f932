/*
[INPUT]:  Credentials file on disk (whitespace separated username and password)
[OUTPUT]: Account credentials for the token endpoint
[POS]:    Auth layer - credential loading
[UPDATE]: When the credentials file format changes
*/

use std::fmt;
use std::path::Path;

use crate::http::{PredictItError, Result};

/// Account credentials used to obtain a bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Load credentials from a file containing `username password`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PredictItError::Config(format!(
                "Failed to read credentials file {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&content)
    }

    /// Parse `username password` separated by any whitespace
    pub fn parse(content: &str) -> Result<Self> {
        let mut parts = content.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(username), Some(password), None) => Ok(Self::new(username, password)),
            _ => Err(PredictItError::Config(
                "credentials must contain exactly a username and a password".to_string(),
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
