//! Access tier probing.

use std::sync::Arc;
use std::time::Duration;

use crate::access::Classification;
use crate::browser::{Browser, BrowserPage, Control};
use crate::error::Result;
use crate::media::Entry;
use crate::output::ClickCounter;

/// Determines a collection's tier from one representative entry.
pub struct AccessTierClassifier {
    browser: Arc<dyn Browser>,
    counter: Arc<ClickCounter>,
    timeout: Duration,
}

impl AccessTierClassifier {
    pub fn new(browser: Arc<dyn Browser>, counter: Arc<ClickCounter>, timeout: Duration) -> Self {
        Self {
            browser,
            counter,
            timeout,
        }
    }

    /// Classify the collection at `collection_url`.
    ///
    /// Entries hidden by the metadata endpoint mean institution login without
    /// probing. Otherwise the entry's page is opened and whichever of the
    /// download and verify controls shows first decides; the other wait is
    /// dropped. Failures and timeouts yield `Unknown`.
    pub async fn classify(&self, collection_url: &str, representative: &Entry) -> Classification {
        let info = match representative {
            Entry::NotAllowed => return Classification::EthRequired,
            Entry::Available(info) => info,
        };

        let page = match self.browser.new_page().await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Could not open a page to classify {}: {}", collection_url, e);
                return Classification::Unknown;
            }
        };

        let url = info.page_url(collection_url);
        let outcome = tokio::time::timeout(self.timeout, self.probe(page.as_ref(), &url)).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Closing probe page failed: {}", e);
        }

        match outcome {
            Ok(Ok(classification)) => {
                tracing::debug!("{} classified as {}", collection_url, classification);
                classification
            }
            Ok(Err(e)) => {
                tracing::warn!("Classifying {} failed: {}", collection_url, e);
                Classification::Unknown
            }
            Err(_) => {
                tracing::warn!(
                    "No download or verify control on {} within {}s",
                    url,
                    self.timeout.as_secs()
                );
                Classification::Unknown
            }
        }
    }

    async fn probe(&self, page: &dyn BrowserPage, url: &str) -> Result<Classification> {
        page.goto(url).await?;
        self.counter.increment().await;

        tokio::select! {
            r = page.wait_visible(&Control::DownloadButton) => r.map(|_| Classification::Open),
            r = page.wait_visible(&Control::VerifyButton) => r.map(|_| Classification::Protected),
        }
    }
}
