//! Credentials and the prompt collaborator that supplies them.

use std::fmt;
use std::io::BufRead;
use std::sync::Arc;

use async_trait::async_trait;
use console::Term;
use tokio::sync::Mutex;

use crate::error::{Error, Result};

/// Username/password pair. Never printed: `Debug` redacts the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &format_args!("<{} chars>", self.password.len()))
            .finish()
    }
}

/// Credentials cached on a protected collection.
///
/// Shared by every item of the collection so concurrent per-item logins
/// prompt at most once; the lock is held across the prompt.
pub type CredentialCache = Arc<Mutex<Option<Credentials>>>;

/// Build a cache seeded with configured credentials.
pub fn credential_cache(initial: Option<Credentials>) -> CredentialCache {
    Arc::new(Mutex::new(initial))
}

/// What a prompt is asking credentials for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptScope {
    /// The institution identity provider (one login per run).
    Institution,
    /// A credential-protected collection, by title.
    Collection(String),
}

impl fmt::Display for PromptScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptScope::Institution => write!(f, "institution login"),
            PromptScope::Collection(title) => write!(f, "protected series '{}'", title),
        }
    }
}

/// Source of credentials not present in the configuration.
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    async fn username(&self, scope: &PromptScope) -> Result<String>;
    async fn password(&self, scope: &PromptScope) -> Result<String>;
}

/// Interactive terminal prompt.
///
/// With `password_from_stdin`, the institution password is read as one line
/// from piped stdin instead of the terminal.
#[derive(Debug, Clone, Default)]
pub struct ConsolePrompt {
    pub password_from_stdin: bool,
}

impl ConsolePrompt {
    pub fn new(password_from_stdin: bool) -> Self {
        Self {
            password_from_stdin,
        }
    }
}

#[async_trait]
impl CredentialPrompt for ConsolePrompt {
    async fn username(&self, scope: &PromptScope) -> Result<String> {
        let header = format!("Please enter your credentials for the {}.", scope);
        tokio::task::spawn_blocking(move || -> Result<String> {
            let term = Term::stderr();
            term.write_line(&format!("\n{}\n", header))?;
            term.write_str("Username: ")?;
            let name = term.read_line()?;
            Ok(name.trim().to_string())
        })
        .await
        .map_err(|e| Error::Authentication(format!("Prompt task failed: {}", e)))?
    }

    async fn password(&self, scope: &PromptScope) -> Result<String> {
        let piped = self.password_from_stdin && *scope == PromptScope::Institution;
        tokio::task::spawn_blocking(move || -> Result<String> {
            if piped {
                let mut line = String::new();
                std::io::stdin().lock().read_line(&mut line)?;
                return Ok(line.trim_end_matches(['\r', '\n']).to_string());
            }

            let term = Term::stderr();
            term.write_str("Password: ")?;
            Ok(term.read_secure_line()?)
        })
        .await
        .map_err(|e| Error::Authentication(format!("Prompt task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("jdoe", "hunter2");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("jdoe"));
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("<7 chars>"));
    }

    #[tokio::test]
    async fn test_cache_seeded() {
        let cache = credential_cache(Some(Credentials::new("a", "b")));
        assert_eq!(cache.lock().await.as_ref().unwrap().username(), "a");
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(
            PromptScope::Collection("Analysis".into()).to_string(),
            "protected series 'Analysis'"
        );
    }
}
