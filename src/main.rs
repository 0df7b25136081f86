//! eth-videoz - CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use indicatif::MultiProgress;
use tracing_subscriber::{fmt, EnvFilter};

use eth_videoz_dl::{
    auth::ConsolePrompt,
    browser::{Browser, ChromiumBrowser, Control},
    cli::Args,
    config::{
        append_collection, create_collection_list, decrement_notice, default_collection_list_path,
        default_config_path, load_collection_list, locate_collection_list, validate_collection_url,
        validate_config, Config,
    },
    download::{AcquisitionOrchestrator, Collaborators, RunReport},
    error::{exit_codes, Error, Result},
    output::{
        print_banner, print_config_summary, print_error, print_info, print_notice,
        print_run_stats, print_success, print_warning, BarFactory, ClickCounter,
    },
    portal::{Catalog, PortalClient, SessionState},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::CollectionListNotFound { .. }
                | Error::TomlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::Connectivity { .. } | Error::Http(_) => {
                    ExitCode::from(exit_codes::NETWORK_ERROR as u8)
                }
                Error::Transfer(_) | Error::TransferStatus { .. } => {
                    ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8)
                }
                Error::Interrupted => ExitCode::from(exit_codes::INTERRUPTED as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let mut config = Config::load_or_default(&config_path)?;
    let list_arg = args.urls.clone();
    let quick_add = args.quick_add.clone();

    args.merge_into_config(&mut config);
    validate_config(&config)?;

    let list_path = resolve_list_path(list_arg.as_deref(), quick_add.is_some())?;

    let portal = PortalClient::new(&config)?;
    print_info(&format!("Connecting to {}...", portal.base_url()));
    portal.check_connectivity().await?;

    if let Some(url) = quick_add {
        quick_add_collection(&portal, &config, &list_path, &url).await?;
    }

    let list = load_collection_list(&list_path, config.base_url())?;
    if list.notice.is_some() {
        if let Some(remaining) = decrement_notice(&list_path)? {
            print_notice(remaining);
        }
    }

    if list.collections.is_empty() {
        print_warning(&format!("No series listed in {}", list_path.display()));
        return Ok(());
    }

    let save_dir = config.save_directory();
    print_config_summary(
        list.collections.len(),
        &config.options.video_quality.to_string(),
        &config.options.subtitles.to_string(),
        &save_dir,
    );

    print_info("Starting browser...");
    let browser: Arc<dyn Browser> =
        Arc::new(ChromiumBrowser::launch(&config.browser, &config.portal.user_agent).await?);

    if let Err(e) = dismiss_cookie_banner(browser.as_ref(), config.base_url()).await {
        tracing::debug!("Cookie banner not dismissed: {}", e);
    }

    let multi = MultiProgress::new();
    let counter = Arc::new(ClickCounter::with_spinner(&multi));
    let collaborators = Collaborators {
        browser: browser.clone(),
        catalog: Arc::new(portal.clone()),
        prompt: Arc::new(ConsolePrompt::new(config.account.password_from_stdin)),
        http: portal.http().clone(),
        progress: Arc::new(BarFactory::new(multi)),
        counter: counter.clone(),
    };
    let orchestrator = AcquisitionOrchestrator::new(collaborators, &config);

    let outcome = tokio::select! {
        report = orchestrator.run(list.collections) => Ok(report),
        _ = tokio::signal::ctrl_c() => Err(Error::Interrupted),
    };

    counter.finish();
    if let Err(e) = browser.close().await {
        tracing::warn!("Closing the browser failed: {}", e);
    }

    let report = outcome?;
    print_run_stats(&report);
    finish(&report)
}

/// The list file to use, creating one when a quick-add URL has nowhere to go.
fn resolve_list_path(explicit: Option<&Path>, adding: bool) -> Result<PathBuf> {
    match locate_collection_list(explicit) {
        Ok(path) => Ok(path),
        Err(e @ Error::CollectionListNotFound { .. }) => {
            if !adding {
                return Err(e);
            }
            let path = explicit
                .map(Path::to_path_buf)
                .or_else(default_collection_list_path)
                .ok_or(e)?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            create_collection_list(&path)?;
            print_info(&format!("Created series list at {}", path.display()));
            Ok(path)
        }
        Err(e) => Err(e),
    }
}

async fn quick_add_collection(
    portal: &PortalClient,
    config: &Config,
    list_path: &Path,
    url: &str,
) -> Result<()> {
    let url = url.trim_end_matches('/');
    validate_collection_url(url, config.base_url())?;

    if !portal.page_exists(url).await? {
        return Err(Error::ConfigValidation {
            field: "series url".to_string(),
            message: format!("'{}' does not point to an existing page", url),
        });
    }

    let list = load_collection_list(list_path, config.base_url())?;
    if list.contains_url(url) {
        print_info(&format!("{} is already listed", url));
        return Ok(());
    }

    let metadata = portal.fetch_collection(url, &SessionState::new()).await?;
    append_collection(list_path, &metadata.title, url)?;
    print_success(&format!("Added '{}' to {}", metadata.title, list_path.display()));
    Ok(())
}

async fn dismiss_cookie_banner(browser: &dyn Browser, base_url: &str) -> Result<()> {
    let page = browser.new_page().await?;
    let result = async {
        page.goto(base_url).await?;
        if page.is_visible(&Control::AgreeButton).await? {
            page.click(&Control::AgreeButton).await?;
            tracing::debug!("Dismissed the cookie banner");
        }
        Ok::<(), Error>(())
    }
    .await;
    page.close().await?;
    result
}

fn finish(report: &RunReport) -> Result<()> {
    let failed = report.files_failed();
    if failed > 0 {
        return Err(Error::Transfer(format!("{} file(s) failed", failed)));
    }
    if report.has_failures() {
        print_warning("Some series or recordings were skipped, see above.");
    } else {
        print_success("All done.");
    }
    Ok(())
}
