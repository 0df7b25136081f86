//! Item metadata scraping through the browser.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthenticationCoordinator, CredentialCache};
use crate::browser::{wait_visible_for, Browser, BrowserPage, Control};
use crate::error::Result;
use crate::media::{build_item, EntryInfo, Item};
use crate::output::ClickCounter;

/// Login to repeat on every item page of a protected collection.
pub struct PerItemLogin<'a> {
    pub coordinator: &'a AuthenticationCoordinator,
    pub credentials: &'a CredentialCache,
    pub title: &'a str,
}

/// Opens item pages and reads their download dialogs.
pub struct ItemFetcher {
    browser: Arc<dyn Browser>,
    counter: Arc<ClickCounter>,
    timeout: Duration,
}

impl ItemFetcher {
    pub fn new(browser: Arc<dyn Browser>, counter: Arc<ClickCounter>, timeout: Duration) -> Self {
        Self {
            browser,
            counter,
            timeout,
        }
    }

    /// Fetch the sources of one entry of the collection at `collection_url`.
    pub async fn fetch(
        &self,
        collection_url: &str,
        info: &EntryInfo,
        login: Option<&PerItemLogin<'_>>,
    ) -> Result<Item> {
        let page_url = info.page_url(collection_url);
        let page = self.browser.new_page().await?;
        let result = self.scrape(page.as_ref(), &page_url, info, login).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Closing item page failed: {}", e);
        }
        result
    }

    async fn scrape(
        &self,
        page: &dyn BrowserPage,
        page_url: &str,
        info: &EntryInfo,
        login: Option<&PerItemLogin<'_>>,
    ) -> Result<Item> {
        page.goto(page_url).await?;
        self.counter.increment().await;

        if let Some(login) = login {
            login
                .coordinator
                .login_protected_on_page(page, login.credentials, login.title)
                .await?;
        }

        wait_visible_for(page, &Control::DownloadButton, self.timeout).await?;
        page.click(&Control::DownloadButton).await?;
        self.counter.increment().await;

        wait_visible_for(page, &Control::DownloadList, self.timeout).await?;
        let links = page.download_links().await?;
        tracing::debug!("{} offers {} download link(s)", page_url, links.len());

        Ok(build_item(info, page_url.to_string(), &links))
    }
}
