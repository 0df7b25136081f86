//! Session cookies shared across requests of one authentication scope.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Cookies accumulated by successful logins.
///
/// Cheap to clone; all clones observe the same jar. Writers take the lock
/// exclusively, readers get a consistent snapshot.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    cookies: Arc<RwLock<BTreeMap<String, String>>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge cookies into the jar, overwriting values of the same name.
    pub async fn absorb<I>(&self, cookies: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut jar = self.cookies.write().await;
        for (name, value) in cookies {
            jar.insert(name, value);
        }
        tracing::debug!("Session now holds {} cookie(s)", jar.len());
    }

    /// Current cookies as a `Cookie` header value, `None` when empty.
    pub async fn cookie_header(&self) -> Option<String> {
        let jar = self.cookies.read().await;
        if jar.is_empty() {
            return None;
        }

        Some(
            jar.iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub async fn len(&self) -> usize {
        self.cookies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cookies.read().await.is_empty()
    }
}
