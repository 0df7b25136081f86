//! The acquisition pipeline across all configured collections.
//!
//! Collections are handled least-invasive first: open ones are downloaded
//! before any credential is asked for, then the institution login runs (only
//! if some collection needs it), then protected collections, and finally the
//! institution-only ones. Every failure stays local to its item, file or
//! collection.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::access::{AccessTierClassifier, Classification, Tier};
use crate::auth::{AuthenticationCoordinator, CredentialPrompt, LoginScope};
use crate::browser::Browser;
use crate::config::{
    CollectionSpec, Config, OptionsConfig, METADATA_CONCURRENCY, PROBE_CONCURRENCY,
    TRANSFER_CONCURRENCY,
};
use crate::download::items::{ItemFetcher, PerItemLogin};
use crate::download::limiter::ConcurrencyLimiter;
use crate::download::media::{plan_item, PlannedFile};
use crate::download::state::{CollectionReport, RunReport};
use crate::download::transfer::{ProgressFactory, ResumableTransfer, TransferOutcome};
use crate::error::{Error, Result};
use crate::fs::ensure_dir;
use crate::media::{Collection, Item};
use crate::output::{format_bytes, print_info, print_warning, ClickCounter};
use crate::portal::{Catalog, SessionState};

/// External collaborators the pipeline drives.
pub struct Collaborators {
    pub browser: Arc<dyn Browser>,
    pub catalog: Arc<dyn Catalog>,
    pub prompt: Arc<dyn CredentialPrompt>,
    pub http: reqwest::Client,
    pub progress: Arc<dyn ProgressFactory>,
    pub counter: Arc<ClickCounter>,
}

/// Sequences classification, authentication, metadata, sizing and transfer.
pub struct AcquisitionOrchestrator {
    catalog: Arc<dyn Catalog>,
    classifier: AccessTierClassifier,
    coordinator: AuthenticationCoordinator,
    fetcher: ItemFetcher,
    transfer: ResumableTransfer,
    progress: Arc<dyn ProgressFactory>,
    session: SessionState,
    options: OptionsConfig,
    save_dir: PathBuf,
    metadata_limiter: ConcurrencyLimiter,
    probe_limiter: ConcurrencyLimiter,
    transfer_limiter: ConcurrencyLimiter,
}

impl AcquisitionOrchestrator {
    pub fn new(collaborators: Collaborators, config: &Config) -> Self {
        let Collaborators {
            browser,
            catalog,
            prompt,
            http,
            progress,
            counter,
        } = collaborators;

        let session = SessionState::new();
        let timeout = config.portal.classify_timeout();

        Self {
            catalog,
            classifier: AccessTierClassifier::new(browser.clone(), counter.clone(), timeout),
            coordinator: AuthenticationCoordinator::new(
                browser.clone(),
                prompt,
                counter.clone(),
                session.clone(),
                config,
            ),
            fetcher: ItemFetcher::new(browser, counter, timeout),
            transfer: ResumableTransfer::new(http, session.clone()),
            progress,
            session,
            options: config.options.clone(),
            save_dir: config.save_directory(),
            metadata_limiter: ConcurrencyLimiter::new(METADATA_CONCURRENCY),
            probe_limiter: ConcurrencyLimiter::new(PROBE_CONCURRENCY),
            transfer_limiter: ConcurrencyLimiter::new(TRANSFER_CONCURRENCY),
        }
    }

    /// Run the whole pipeline. Never fails as a whole; problems end up in the report.
    pub async fn run(&self, specs: Vec<CollectionSpec>) -> RunReport {
        let mut report = RunReport::default();

        let collections = self.load_collections(specs, &mut report).await;
        let collections = self.classify(collections, &mut report).await;

        let mut open = Vec::new();
        let mut protected = Vec::new();
        let mut eth_required = Vec::new();
        for collection in collections {
            match collection.tier().map(Tier::classification) {
                Some(Classification::Open) => open.push(collection),
                Some(Classification::Protected) => protected.push(collection),
                Some(Classification::EthRequired) => eth_required.push(collection),
                _ => report.skip(collection.title.clone(), "access tier could not be determined"),
            }
        }

        for collection in &open {
            report.collections.push(self.process(collection, None).await);
        }

        if !eth_required.is_empty() {
            print_info("Some series require an institution login.");
            report.institution_login = Some(self.coordinator.login_institution().await);
        }

        let scope = self.coordinator.login_scope();
        for collection in &protected {
            print_info(&format!("Logging in to protected series '{}'", collection.title));
            if let Err(e) = self.coordinator.login_protected(collection).await {
                report.skip(collection.title.clone(), format!("login failed: {}", e));
                continue;
            }

            let collection_report = match (scope, collection.tier()) {
                (LoginScope::PerItem, Some(Tier::Protected { credentials })) => {
                    let login = PerItemLogin {
                        coordinator: &self.coordinator,
                        credentials,
                        title: &collection.title,
                    };
                    self.process(collection, Some(&login)).await
                }
                _ => self.process(collection, None).await,
            };
            report.collections.push(collection_report);
        }

        if report.institution_login == Some(true) {
            for mut collection in eth_required {
                match self.catalog.fetch_collection(&collection.url, &self.session).await {
                    Ok(metadata) => {
                        collection.refresh(metadata);
                        report.collections.push(self.process(&collection, None).await);
                    }
                    Err(e) => report.skip(
                        collection.title.clone(),
                        format!("metadata after login unavailable: {}", e),
                    ),
                }
            }
        } else {
            for collection in eth_required {
                report.skip(collection.title, "institution login did not succeed");
            }
        }

        report
    }

    async fn load_collections(
        &self,
        specs: Vec<CollectionSpec>,
        report: &mut RunReport,
    ) -> Vec<Collection> {
        let results = self
            .metadata_limiter
            .run(
                specs
                    .iter()
                    .map(|spec| self.catalog.fetch_collection(&spec.url, &self.session)),
            )
            .await;

        let mut collections = Vec::new();
        for (spec, result) in specs.into_iter().zip(results) {
            match result {
                Ok(metadata) if metadata.entries.is_empty() => {
                    report.skip(metadata.title, "series lists no recordings");
                }
                Ok(metadata) => collections.push(Collection::new(spec, metadata)),
                Err(e) => report.skip(spec.url, format!("metadata unavailable: {}", e)),
            }
        }
        collections
    }

    async fn classify(
        &self,
        mut collections: Vec<Collection>,
        report: &mut RunReport,
    ) -> Vec<Collection> {
        let classifications = self
            .metadata_limiter
            .run(collections.iter().map(|collection| async move {
                let representative = collection
                    .representative()
                    .ok_or_else(|| Error::Metadata("series lists no recordings".into()))?;
                Ok::<_, Error>(self.classifier.classify(&collection.url, representative).await)
            }))
            .await;

        for (collection, classification) in collections.iter_mut().zip(classifications) {
            let classification = classification.unwrap_or(Classification::Unknown);
            report.count_tier(classification);
            tracing::info!("'{}' is {}", collection.title, classification);

            if let Err(e) = collection.assign_tier(|credentials| {
                Tier::from_classification(classification, credentials)
            }) {
                tracing::error!("{}", e);
            }
        }
        collections
    }

    /// Fetch, size and transfer every item of an accessible collection.
    async fn process(
        &self,
        collection: &Collection,
        login: Option<&PerItemLogin<'_>>,
    ) -> CollectionReport {
        let mut report = CollectionReport::new(collection.title.clone());
        let entries: Vec<_> = collection.available_entries().collect();

        let fetched = self
            .metadata_limiter
            .run(
                entries
                    .iter()
                    .map(|info| self.fetcher.fetch(&collection.url, info, login)),
            )
            .await;

        let mut items: Vec<Item> = Vec::new();
        for (info, result) in entries.iter().zip(fetched) {
            match result {
                Ok(item) => items.push(item),
                Err(e) => {
                    report.items_failed += 1;
                    tracing::warn!("Could not fetch '{}': {}", info.title, e);
                }
            }
        }

        let mut files: Vec<PlannedFile> = Vec::new();
        for item in &items {
            match plan_item(item, &self.options, &self.save_dir) {
                Ok(planned) => {
                    report.items_fetched += 1;
                    files.extend(planned);
                }
                Err(e) => {
                    report.items_failed += 1;
                    tracing::warn!("Skipping '{}': {}", item.title, e);
                }
            }
        }

        if files.is_empty() {
            print_warning(&format!("Nothing to download for '{}'", collection.title));
            return report;
        }

        let sizes = self
            .probe_limiter
            .run(files.iter().map(|file| self.transfer.probe_size(&file.url)))
            .await;
        report.total_size = sizes
            .iter()
            .filter_map(|size| match size {
                Ok(size) => Some(*size),
                Err(e) => {
                    tracing::debug!("Size probe failed: {}", e);
                    None
                }
            })
            .sum();

        print_info(&format!(
            "Downloading {} file(s) ({}) of {} recording(s) from '{}'",
            files.len(),
            format_bytes(report.total_size),
            report.items_fetched,
            collection.title
        ));

        let folders: HashSet<&Path> = files.iter().filter_map(|f| f.path.parent()).collect();
        for folder in folders {
            if let Err(e) = ensure_dir(folder).await {
                tracing::error!("Cannot create {}: {}", folder.display(), e);
            }
        }

        let outcomes = self
            .transfer_limiter
            .run(files.iter().map(|file| self.transfer_file(file)))
            .await;

        for (file, outcome) in files.iter().zip(outcomes) {
            match outcome {
                Ok(outcome) => report.record_outcome(outcome),
                Err(e) => {
                    report.files_failed += 1;
                    tracing::warn!("Transfer of {} failed: {}", file.path.display(), e);
                }
            }
        }

        report
    }

    async fn transfer_file(&self, file: &PlannedFile) -> Result<TransferOutcome> {
        let name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.url.clone());
        let progress = self.progress.track(&name);
        self.transfer.transfer(&file.url, &file.path, progress.as_ref()).await
    }
}
