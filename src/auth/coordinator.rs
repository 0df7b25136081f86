//! Login protocols for protected and institution-only collections.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;

use crate::access::Tier;
use crate::auth::credentials::{CredentialCache, CredentialPrompt, Credentials, PromptScope};
use crate::browser::{wait_visible_for, Browser, BrowserPage, Control};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::media::Collection;
use crate::output::ClickCounter;
use crate::portal::SessionState;

/// How often a protected collection has to be logged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginScope {
    /// The portal keeps the protected login across item pages.
    PerCollection,
    /// Without an institution session every item page needs its own login.
    PerItem,
}

/// Runs the institution and per-collection login protocols.
pub struct AuthenticationCoordinator {
    browser: Arc<dyn Browser>,
    prompt: Arc<dyn CredentialPrompt>,
    counter: Arc<ClickCounter>,
    session: SessionState,
    base_url: String,
    identity_provider: String,
    username: Option<String>,
    login_timeout: Duration,
    institution: OnceCell<bool>,
}

impl AuthenticationCoordinator {
    pub fn new(
        browser: Arc<dyn Browser>,
        prompt: Arc<dyn CredentialPrompt>,
        counter: Arc<ClickCounter>,
        session: SessionState,
        config: &Config,
    ) -> Self {
        Self {
            browser,
            prompt,
            counter,
            session,
            base_url: config.base_url().to_string(),
            identity_provider: config.portal.identity_provider.clone(),
            username: config.account.username.clone(),
            login_timeout: config.portal.login_timeout(),
            institution: OnceCell::new(),
        }
    }

    /// Log in through the institution identity provider.
    ///
    /// Runs at most once per coordinator; later calls return the first
    /// outcome. Failures are logged, never propagated.
    pub async fn login_institution(&self) -> bool {
        *self
            .institution
            .get_or_init(|| async {
                match self.try_login_institution().await {
                    Ok(()) => {
                        tracing::info!("Institution login succeeded");
                        true
                    }
                    Err(e) => {
                        tracing::error!(
                            "Institution login failed: {}. Series requiring it will not be downloaded.",
                            e
                        );
                        false
                    }
                }
            })
            .await
    }

    /// Whether the institution login ran and succeeded.
    pub fn institution_logged_in(&self) -> bool {
        self.institution.get() == Some(&true)
    }

    pub fn login_scope(&self) -> LoginScope {
        if self.institution_logged_in() {
            LoginScope::PerCollection
        } else {
            LoginScope::PerItem
        }
    }

    async fn try_login_institution(&self) -> Result<()> {
        let page = self.browser.new_page().await?;
        let result = self.institution_flow(page.as_ref()).await;
        if let Err(e) = page.close().await {
            tracing::debug!("Closing login page failed: {}", e);
        }
        result
    }

    async fn institution_flow(&self, page: &dyn BrowserPage) -> Result<()> {
        page.goto(&format!("{}/", self.base_url)).await?;

        wait_visible_for(page, &Control::LoginLink, self.login_timeout).await?;
        page.click(&Control::LoginLink).await?;
        self.counter.increment().await;

        wait_visible_for(page, &Control::ProviderSearch, self.login_timeout).await?;
        page.click(&Control::ProviderSearch).await?;
        page.fill(&Control::ProviderSearch, &self.identity_provider).await?;

        // The picker may skip the list when the search is unambiguous.
        let entry = Control::ProviderEntry(self.identity_provider.clone());
        if wait_visible_for(page, &entry, self.login_timeout).await.is_ok() {
            page.click(&entry).await?;
            self.counter.increment().await;
        }

        wait_visible_for(page, &Control::InstitutionUsername, self.login_timeout).await?;

        let credentials = self.institution_credentials().await?;
        page.fill(&Control::InstitutionUsername, credentials.username()).await?;
        page.fill(&Control::InstitutionPassword, credentials.password()).await?;
        tracing::debug!(
            "Submitting institution login for {} ({} char password)",
            credentials.username(),
            credentials.password().len()
        );
        page.submit(&Control::InstitutionPassword).await?;
        drop(credentials);
        self.counter.increment().await;

        wait_visible_for(page, &Control::UserSettings, self.login_timeout).await?;

        let landed = page.current_url().await?;
        if !landed.starts_with(&self.base_url) {
            return Err(Error::Authentication(format!(
                "login ended on {} instead of the portal",
                landed
            )));
        }

        self.session.absorb(page.cookies().await?).await;
        Ok(())
    }

    async fn institution_credentials(&self) -> Result<Credentials> {
        let scope = PromptScope::Institution;
        let username = match &self.username {
            Some(username) => username.clone(),
            None => self.prompt.username(&scope).await?,
        };
        let password = self.prompt.password(&scope).await?;
        Ok(Credentials::new(username, password))
    }

    /// Log into a protected collection on its first item page.
    ///
    /// Verifies the credentials once for the whole collection. In
    /// `PerCollection` scope the cached credentials are dropped afterwards;
    /// in `PerItem` scope they stay cached for the item logins.
    pub async fn login_protected(&self, collection: &Collection) -> Result<()> {
        let credentials = match collection.tier() {
            Some(Tier::Protected { credentials }) => credentials.clone(),
            _ => {
                return Err(Error::Authentication(format!(
                    "'{}' is not a protected series",
                    collection.title
                )))
            }
        };
        let entry = collection.available_entries().next().ok_or_else(|| {
            Error::Authentication(format!("'{}' has no item to log in on", collection.title))
        })?;

        let page = self.browser.new_page().await?;
        let result = async {
            page.goto(&entry.page_url(&collection.url)).await?;
            self.counter.increment().await;
            self.login_protected_on_page(page.as_ref(), &credentials, &collection.title)
                .await?;
            self.session.absorb(page.cookies().await?).await;
            Ok::<(), Error>(())
        }
        .await;

        if let Err(e) = page.close().await {
            tracing::debug!("Closing login page failed: {}", e);
        }

        if result.is_ok() && self.login_scope() == LoginScope::PerCollection {
            credentials.lock().await.take();
        }
        result
    }

    /// Submit the credential form on an already opened item page.
    ///
    /// Credentials come from the collection's cache, prompting once when it
    /// is empty. Success means the download control appears.
    pub async fn login_protected_on_page(
        &self,
        page: &dyn BrowserPage,
        cache: &CredentialCache,
        title: &str,
    ) -> Result<()> {
        let credentials = {
            let mut cached = cache.lock().await;
            match cached.as_ref() {
                Some(credentials) => credentials.clone(),
                None => {
                    let scope = PromptScope::Collection(title.to_string());
                    let username = self.prompt.username(&scope).await?;
                    let password = self.prompt.password(&scope).await?;
                    let credentials = Credentials::new(username, password);
                    *cached = Some(credentials.clone());
                    credentials
                }
            }
        };

        wait_visible_for(page, &Control::ProtectedIdentifier, self.login_timeout).await?;
        page.fill(&Control::ProtectedIdentifier, credentials.username()).await?;
        page.fill(&Control::ProtectedPassword, credentials.password()).await?;
        tracing::debug!(
            "Submitting credentials for '{}' as {} ({} char password)",
            title,
            credentials.username(),
            credentials.password().len()
        );
        drop(credentials);

        page.click(&Control::VerifyButton).await?;
        self.counter.increment().await;

        wait_visible_for(page, &Control::DownloadButton, self.login_timeout)
            .await
            .map_err(|_| Error::Authentication(format!("'{}' rejected the credentials", title)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Classification;
    use crate::browser::SourceLink;
    use crate::config::CollectionSpec;
    use crate::media::{CollectionMetadata, Entry, EntryInfo};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex as StdMutex;

    const BASE: &str = "https://video.example";

    #[derive(Default)]
    struct PageState {
        fields: Vec<(Control, String)>,
        unlocked: bool,
        institution_done: bool,
    }

    /// Portal page accepting `user`/`pass` on both login forms.
    struct LoginPage {
        state: StdMutex<PageState>,
        idp_ok: bool,
    }

    impl LoginPage {
        fn field(&self, control: &Control) -> Option<String> {
            let state = self.state.lock().unwrap();
            state
                .fields
                .iter()
                .rev()
                .find(|(c, _)| c == control)
                .map(|(_, v)| v.clone())
        }

        fn visible(&self, control: &Control) -> bool {
            let state = self.state.lock().unwrap();
            match control {
                Control::DownloadButton => state.unlocked,
                Control::VerifyButton | Control::ProtectedIdentifier => !state.unlocked,
                Control::UserSettings => state.institution_done,
                _ => true,
            }
        }
    }

    #[async_trait]
    impl BrowserPage for LoginPage {
        async fn goto(&self, _url: &str) -> Result<()> {
            Ok(())
        }
        async fn is_visible(&self, control: &Control) -> Result<bool> {
            Ok(self.visible(control))
        }
        async fn wait_visible(&self, control: &Control) -> Result<()> {
            loop {
                if self.visible(control) {
                    return Ok(());
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        }
        async fn click(&self, control: &Control) -> Result<()> {
            if *control == Control::VerifyButton {
                let ok = self.field(&Control::ProtectedIdentifier).as_deref() == Some("user")
                    && self.field(&Control::ProtectedPassword).as_deref() == Some("pass");
                self.state.lock().unwrap().unlocked = ok;
            }
            Ok(())
        }
        async fn fill(&self, control: &Control, value: &str) -> Result<()> {
            self.state
                .lock()
                .unwrap()
                .fields
                .push((control.clone(), value.to_string()));
            Ok(())
        }
        async fn submit(&self, _control: &Control) -> Result<()> {
            let ok = self.field(&Control::InstitutionUsername).as_deref() == Some("user")
                && self.field(&Control::InstitutionPassword).as_deref() == Some("pass");
            self.state.lock().unwrap().institution_done = ok;
            Ok(())
        }
        async fn current_url(&self) -> Result<String> {
            Ok(if self.idp_ok {
                format!("{}/", BASE)
            } else {
                "https://idp.example/error".to_string()
            })
        }
        async fn download_links(&self) -> Result<Vec<SourceLink>> {
            Ok(Vec::new())
        }
        async fn cookies(&self) -> Result<Vec<(String, String)>> {
            Ok(vec![("session".into(), "s1".into())])
        }
        async fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    struct LoginBrowser {
        idp_ok: bool,
        pages: StdMutex<u32>,
    }

    #[async_trait]
    impl Browser for LoginBrowser {
        async fn new_page(&self) -> Result<Box<dyn BrowserPage>> {
            *self.pages.lock().unwrap() += 1;
            Ok(Box::new(LoginPage {
                state: StdMutex::new(PageState::default()),
                idp_ok: self.idp_ok,
            }))
        }
        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingPrompt {
        password: String,
        usernames: StdMutex<u32>,
        passwords: StdMutex<u32>,
    }

    #[async_trait]
    impl CredentialPrompt for CountingPrompt {
        async fn username(&self, _scope: &PromptScope) -> Result<String> {
            *self.usernames.lock().unwrap() += 1;
            Ok("user".into())
        }
        async fn password(&self, _scope: &PromptScope) -> Result<String> {
            *self.passwords.lock().unwrap() += 1;
            Ok(self.password.clone())
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.portal.base_url = BASE.into();
        config.portal.login_timeout_secs = 1;
        config
    }

    fn coordinator(
        idp_ok: bool,
        prompt: Arc<CountingPrompt>,
    ) -> (AuthenticationCoordinator, SessionState, Arc<LoginBrowser>) {
        let browser = Arc::new(LoginBrowser {
            idp_ok,
            pages: StdMutex::new(0),
        });
        let session = SessionState::new();
        let coordinator = AuthenticationCoordinator::new(
            browser.clone(),
            prompt,
            Arc::new(ClickCounter::new()),
            session.clone(),
            &config(),
        );
        (coordinator, session, browser)
    }

    fn collection(classification: Classification, credentials: Option<Credentials>) -> Collection {
        let mut collection = Collection::new(
            CollectionSpec {
                url: format!("{}/lectures/secret", BASE),
                credentials,
            },
            CollectionMetadata {
                title: "Secret".into(),
                entries: vec![Entry::Available(EntryInfo {
                    id: "A".into(),
                    title: "One".into(),
                    created: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
                    collection_title: "Secret".into(),
                })],
            },
        );
        collection
            .assign_tier(|c| Tier::from_classification(classification, c))
            .unwrap();
        collection
    }

    fn protected_collection(credentials: Option<Credentials>) -> Collection {
        collection(Classification::Protected, credentials)
    }

    fn cache_of(collection: &Collection) -> CredentialCache {
        match collection.tier() {
            Some(Tier::Protected { credentials }) => credentials.clone(),
            _ => panic!("not protected"),
        }
    }

    #[tokio::test]
    async fn test_institution_login_runs_once() {
        let prompt = Arc::new(CountingPrompt {
            password: "pass".into(),
            ..Default::default()
        });
        let (coordinator, session, browser) = coordinator(true, prompt.clone());

        assert_eq!(coordinator.login_scope(), LoginScope::PerItem);
        assert!(coordinator.login_institution().await);
        assert!(coordinator.login_institution().await);

        assert_eq!(*browser.pages.lock().unwrap(), 1);
        assert_eq!(*prompt.passwords.lock().unwrap(), 1);
        assert_eq!(coordinator.login_scope(), LoginScope::PerCollection);
        assert_eq!(session.cookie_header().await.as_deref(), Some("session=s1"));
    }

    #[tokio::test]
    async fn test_institution_login_rejects_foreign_landing_url() {
        let prompt = Arc::new(CountingPrompt {
            password: "pass".into(),
            ..Default::default()
        });
        let (coordinator, session, _) = coordinator(false, prompt);

        assert!(!coordinator.login_institution().await);
        assert!(!coordinator.institution_logged_in());
        assert!(session.is_empty().await);
    }

    #[tokio::test]
    async fn test_institution_wrong_password_times_out() {
        let prompt = Arc::new(CountingPrompt {
            password: "wrong".into(),
            ..Default::default()
        });
        let (coordinator, _, _) = coordinator(true, prompt);
        assert!(!coordinator.login_institution().await);
        assert_eq!(coordinator.login_scope(), LoginScope::PerItem);
    }

    #[tokio::test]
    async fn test_protected_login_with_configured_credentials() {
        let prompt = Arc::new(CountingPrompt::default());
        let (coordinator, _, _) = coordinator(true, prompt.clone());

        let collection = protected_collection(Some(Credentials::new("user", "pass")));
        coordinator.login_protected(&collection).await.unwrap();

        assert_eq!(*prompt.usernames.lock().unwrap(), 0);
        // Per-item scope keeps credentials for the item logins.
        assert!(cache_of(&collection).lock().await.is_some());
    }

    #[tokio::test]
    async fn test_protected_prompt_is_cached_across_pages() {
        let prompt = Arc::new(CountingPrompt {
            password: "pass".into(),
            ..Default::default()
        });
        let (coordinator, _, browser) = coordinator(true, prompt.clone());

        let collection = protected_collection(None);
        let cache = cache_of(&collection);
        coordinator.login_protected(&collection).await.unwrap();

        for _ in 0..3 {
            let page = browser.new_page().await.unwrap();
            coordinator
                .login_protected_on_page(page.as_ref(), &cache, "Secret")
                .await
                .unwrap();
        }

        assert_eq!(*prompt.usernames.lock().unwrap(), 1);
        assert_eq!(*prompt.passwords.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_protected_login_drops_credentials_per_collection() {
        let prompt = Arc::new(CountingPrompt {
            password: "pass".into(),
            ..Default::default()
        });
        let (coordinator, _, _) = coordinator(true, prompt);
        assert!(coordinator.login_institution().await);

        let collection = protected_collection(Some(Credentials::new("user", "pass")));
        coordinator.login_protected(&collection).await.unwrap();
        assert!(cache_of(&collection).lock().await.is_none());
    }

    #[tokio::test]
    async fn test_protected_login_rejected() {
        let prompt = Arc::new(CountingPrompt::default());
        let (coordinator, _, _) = coordinator(true, prompt);

        let collection = protected_collection(Some(Credentials::new("user", "nope")));
        let result = coordinator.login_protected(&collection).await;
        assert!(matches!(result, Err(Error::Authentication(_))));
    }

    #[tokio::test]
    async fn test_unprotected_collection_is_refused() {
        let (coordinator, _, _) = coordinator(true, Arc::new(CountingPrompt::default()));
        let open = collection(Classification::Open, None);
        assert!(matches!(
            coordinator.login_protected(&open).await,
            Err(Error::Authentication(_))
        ));
    }
}
