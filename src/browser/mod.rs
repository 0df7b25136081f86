//! Browser-automation collaborator.
//!
//! The portal renders its item pages and login forms client-side, so tier
//! probing, logins and download-link discovery go through a real browser.
//! `Browser` and `BrowserPage` abstract over the engine (Chromium via
//! chromiumoxide in the binary, in-memory fakes in tests). Page elements are
//! addressed by the closed `Control` enum rather than free-form selectors.

pub mod chromium;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Error, Result};

pub use chromium::ChromiumBrowser;

/// Page elements the pipeline interacts with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Control {
    /// Cookie consent button on the landing page.
    AgreeButton,
    /// "Download" button of an item page; only rendered when the item is accessible.
    DownloadButton,
    /// Link list inside the download dialog.
    DownloadList,
    /// "Verify" button of the per-collection credential form.
    VerifyButton,
    /// Identifier field of the per-collection credential form.
    ProtectedIdentifier,
    /// Password field of the per-collection credential form.
    ProtectedPassword,
    /// Login link in the portal header.
    LoginLink,
    /// Search box of the identity provider picker.
    ProviderSearch,
    /// Picker entry for the named institution.
    ProviderEntry(String),
    /// Username field of the institution login form.
    InstitutionUsername,
    /// Password field of the institution login form.
    InstitutionPassword,
    /// User menu button, shown once logged in.
    UserSettings,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::AgreeButton => write!(f, "'Agree' button"),
            Control::DownloadButton => write!(f, "'Download' button"),
            Control::DownloadList => write!(f, "download link list"),
            Control::VerifyButton => write!(f, "'Verify' button"),
            Control::ProtectedIdentifier => write!(f, "identifier field"),
            Control::ProtectedPassword => write!(f, "password field"),
            Control::LoginLink => write!(f, "login link"),
            Control::ProviderSearch => write!(f, "identity provider search"),
            Control::ProviderEntry(name) => write!(f, "identity provider entry '{}'", name),
            Control::InstitutionUsername => write!(f, "institution username field"),
            Control::InstitutionPassword => write!(f, "institution password field"),
            Control::UserSettings => write!(f, "'User settings' button"),
        }
    }
}

/// One anchor of the download dialog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceLink {
    pub label: String,
    pub href: String,
}

impl SourceLink {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// A browser engine whose pages share one cookie context.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open a new blank page (tab) in the shared context.
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>>;
    /// Shut the engine down, closing every page.
    async fn close(&self) -> Result<()>;
}

/// A single page of the browser.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;
    async fn is_visible(&self, control: &Control) -> Result<bool>;
    /// Resolve once `control` is visible. Never times out on its own.
    async fn wait_visible(&self, control: &Control) -> Result<()>;
    async fn click(&self, control: &Control) -> Result<()>;
    async fn fill(&self, control: &Control, value: &str) -> Result<()>;
    /// Submit the form `control` belongs to, like pressing Enter in it.
    async fn submit(&self, control: &Control) -> Result<()>;
    async fn current_url(&self) -> Result<String>;
    /// Anchors of the open download dialog.
    async fn download_links(&self) -> Result<Vec<SourceLink>>;
    /// Cookies visible to the current page, as name/value pairs.
    async fn cookies(&self) -> Result<Vec<(String, String)>>;
    async fn close(self: Box<Self>) -> Result<()>;
}

/// `wait_visible` bounded by `timeout`.
pub async fn wait_visible_for(
    page: &dyn BrowserPage,
    control: &Control,
    timeout: Duration,
) -> Result<()> {
    match tokio::time::timeout(timeout, page.wait_visible(control)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            what: control.to_string(),
            seconds: timeout.as_secs(),
        }),
    }
}
