//! Chromium-backed browser using chromiumoxide.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::browser::{Browser, BrowserPage, Control, SourceLink};
use crate::config::BrowserConfig;
use crate::error::{Error, Result};

/// Interval between visibility polls.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn browser_err(e: impl std::fmt::Display) -> Error {
    Error::Browser(e.to_string())
}

/// JSON-encode a string so it can be spliced into a script.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn by_selector(selector: &str) -> String {
    format!("document.querySelector({})", js_string(selector))
}

fn button_with_text(text: &str) -> String {
    format!(
        "Array.from(document.querySelectorAll('button')).find(b => b.textContent.includes({}))",
        js_string(text)
    )
}

fn input_by_label(text: &str) -> String {
    format!(
        "(() => {{ \
            const label = Array.from(document.querySelectorAll('label')) \
                .find(l => l.textContent.trim().startsWith({text})); \
            if (!label) return null; \
            return label.control \
                || (label.htmlFor ? document.getElementById(label.htmlFor) : null) \
                || label.querySelector('input'); \
        }})()",
        text = js_string(text)
    )
}

/// Script expression that evaluates to the element for `control`, or null.
fn finder(control: &Control) -> String {
    match control {
        Control::AgreeButton => button_with_text("Agree"),
        Control::DownloadButton => button_with_text("Download"),
        Control::DownloadList => by_selector("div[role='dialog'] ul a"),
        Control::VerifyButton => button_with_text("Verify"),
        Control::ProtectedIdentifier => input_by_label("Identifier"),
        Control::ProtectedPassword => input_by_label("Password"),
        Control::LoginLink => by_selector("a[href*='~session']"),
        Control::ProviderSearch => by_selector("#userIdPSelection_iddtext"),
        Control::ProviderEntry(name) => {
            by_selector(&format!("div[title='Universities: {}']", name))
        }
        Control::InstitutionUsername => by_selector("input[name='j_username']"),
        Control::InstitutionPassword => by_selector("input[name='j_password']"),
        Control::UserSettings => by_selector("button[title='User settings']"),
    }
}

/// Chromium browser with a single shared cookie context.
pub struct ChromiumBrowser {
    browser: Mutex<CdpBrowser>,
    handler: JoinHandle<()>,
}

impl ChromiumBrowser {
    /// Launch Chromium according to the browser settings.
    pub async fn launch(config: &BrowserConfig, user_agent: &str) -> Result<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(1920, 1080)
            .arg(format!("--user-agent={}", user_agent))
            .arg("--lang=en-US");

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.executable {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|e| Error::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(|e| Error::Browser(format!("Failed to launch Chromium: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {}", e);
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(browser),
            handler,
        })
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(browser_err)?;

        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            tracing::debug!("Browser close failed: {}", e);
        }
        let _ = browser.wait().await;
        self.handler.abort();
        tracing::debug!("Browser closed");
        Ok(())
    }
}

/// One Chromium tab.
pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(browser_err)?
            .into_value()
            .map_err(|e| Error::Browser(format!("Unexpected script result: {:?}", e)))
    }

    /// Run `body` against the element of `control`; `body` sees it as `el`.
    async fn with_element(&self, control: &Control, body: &str) -> Result<()> {
        let script = format!(
            "(el => {{ if (!el) return false; {} return true; }})({})",
            body,
            finder(control)
        );

        if self.eval::<bool>(script).await? {
            Ok(())
        } else {
            Err(Error::Browser(format!("{} not found on page", control)))
        }
    }
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        self.page.goto(url).await.map_err(browser_err)?;
        Ok(())
    }

    async fn is_visible(&self, control: &Control) -> Result<bool> {
        let script = format!(
            "(el => !!el && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length))({})",
            finder(control)
        );
        self.eval(script).await
    }

    async fn wait_visible(&self, control: &Control) -> Result<()> {
        loop {
            match self.is_visible(control).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                // Evaluation fails while a navigation swaps the document.
                Err(e) => tracing::debug!("Visibility poll for {} failed: {}", control, e),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&self, control: &Control) -> Result<()> {
        self.with_element(control, "el.click();").await
    }

    async fn fill(&self, control: &Control, value: &str) -> Result<()> {
        let body = format!(
            "const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value').set; \
             setter.call(el, {}); \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
            js_string(value)
        );
        self.with_element(control, &body).await
    }

    async fn submit(&self, control: &Control) -> Result<()> {
        self.with_element(
            control,
            "if (el.form) { el.form.requestSubmit ? el.form.requestSubmit() : el.form.submit(); } \
             else { el.dispatchEvent(new KeyboardEvent('keydown', { key: 'Enter', bubbles: true })); }",
        )
        .await
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(browser_err)?
            .map(|u| u.to_string())
            .unwrap_or_default())
    }

    async fn download_links(&self) -> Result<Vec<SourceLink>> {
        self.eval(
            "Array.from(document.querySelectorAll(\"div[role='dialog'] ul a\")) \
                .map(a => ({ label: (a.textContent || '').trim(), href: a.href }))"
                .to_string(),
        )
        .await
    }

    async fn cookies(&self) -> Result<Vec<(String, String)>> {
        let cookies = self.page.get_cookies().await.map_err(browser_err)?;
        Ok(cookies.into_iter().map(|c| (c.name, c.value)).collect())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await.map_err(browser_err)
    }
}
