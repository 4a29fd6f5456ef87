//! Application state management

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::file_record::{FileId, FileRecord};
use crate::intake::{build_records, IdGenerator, IntakeOptions, IntakeSource};
use crate::pager::{ItemsPerPage, PageLink, PageSummary, Pager};
use crate::preview::Viewer;
use chrono::{DateTime, TimeZone, Utc};

/// Main application state
///
/// Owns the catalog, the page state and the id generator. The UI thread holds
/// the only instance and every change goes through its methods, so the pager
/// is always consistent with the catalog length.
#[derive(Debug)]
pub struct AppState {
    config: AppConfig,
    catalog: Catalog,
    pager: Pager,
    ids: IdGenerator,
}

impl AppState {
    /// Create an empty state
    pub fn new(config: AppConfig) -> Self {
        let pager = Pager::new(config.catalog.items_per_page());
        Self {
            config,
            catalog: Catalog::new(),
            pager,
            ids: IdGenerator::new(),
        }
    }

    /// Create a state holding the two sample documents, if enabled
    ///
    /// The samples carry no content, so the viewer shows its placeholder.
    pub fn with_demo_records(config: AppConfig) -> Self {
        let seed = config.catalog.seed_demo_files;
        let mut state = Self::new(config);
        if seed {
            state.catalog.append(demo_records());
            tracing::info!("Seeded {} demo records", state.catalog.len());
        }
        state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn intake_options(&self) -> IntakeOptions {
        IntakeOptions::from(&self.config.intake)
    }

    /// Append one upload batch; returns the number of records added
    ///
    /// An empty batch changes nothing and consumes no ids.
    pub fn ingest(&mut self, sources: Vec<IntakeSource>, now: DateTime<Utc>) -> usize {
        if sources.is_empty() {
            return 0;
        }
        let stamp = self.ids.next_batch(now);
        let records = build_records(sources, stamp, now, self.config.intake.retain_raw_data);
        let count = records.len();
        self.catalog.append(records);
        tracing::info!("Uploaded {} files (catalog: {})", count, self.catalog.len());
        count
    }

    /// Remove a record and keep the current page in range
    pub fn delete(&mut self, id: &FileId) -> Option<FileRecord> {
        let removed = self.catalog.remove(id);
        match &removed {
            Some(record) => tracing::info!("Deleted {} ({})", record.name(), id),
            None => tracing::debug!("Delete of unknown id {} ignored", id),
        }
        self.pager.clamp(self.catalog.len());
        removed
    }

    /// Delete a record, closing `viewer` first when it shows that record
    pub fn delete_viewed(&mut self, id: &FileId, viewer: &mut Viewer) -> Option<FileRecord> {
        if viewer.state().file().is_some_and(|f| f.id() == id) {
            viewer.close();
        }
        self.delete(id)
    }

    pub fn find(&self, id: &FileId) -> Option<&FileRecord> {
        self.catalog.get(id)
    }

    /// Records on the current page
    pub fn visible(&self) -> &[FileRecord] {
        self.pager.visible(self.catalog.as_slice())
    }

    pub fn total_pages(&self) -> usize {
        self.pager.total_pages(self.catalog.len())
    }

    pub fn current_page(&self) -> usize {
        self.pager.current_page()
    }

    pub fn items_per_page(&self) -> ItemsPerPage {
        self.pager.items_per_page()
    }

    pub fn page_links(&self) -> Vec<PageLink> {
        self.pager.page_links(self.catalog.len())
    }

    pub fn summary(&self) -> PageSummary {
        self.pager.summary(self.catalog.len())
    }

    pub fn has_prev_page(&self) -> bool {
        self.pager.has_prev()
    }

    pub fn has_next_page(&self) -> bool {
        self.pager.has_next(self.catalog.len())
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.pager.go_to(page, self.catalog.len());
    }

    pub fn next_page(&mut self) {
        self.pager.next(self.catalog.len());
    }

    pub fn prev_page(&mut self) {
        self.pager.prev(self.catalog.len());
    }

    pub fn first_page(&mut self) {
        self.pager.first();
    }

    pub fn last_page(&mut self) {
        self.pager.last(self.catalog.len());
    }

    pub fn set_items_per_page(&mut self, items_per_page: ItemsPerPage) {
        self.pager.set_items_per_page(items_per_page);
    }

    pub fn cycle_items_per_page(&mut self) {
        self.set_items_per_page(self.pager.items_per_page().cycle());
    }
}

fn demo_records() -> Vec<FileRecord> {
    let day = |d: u32| {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    };
    vec![
        FileRecord::new(
            FileId::from_raw("1"),
            "GSAP_msds_02720121.pdf".to_string(),
            2_048_000,
            day(15),
            None,
        ),
        FileRecord::new(
            FileId::from_raw("2"),
            "shell-marine-forward-together-pocketbook-digital.pdf".to_string(),
            5_120_000,
            day(16),
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_record::FileType;
    use crate::format::format_date;

    fn state() -> AppState {
        AppState::new(AppConfig::default())
    }

    fn sources(n: usize) -> Vec<IntakeSource> {
        (1..=n)
            .map(|i| IntakeSource::from_bytes(format!("file{}.txt", i), vec![0u8; i]))
            .collect()
    }

    fn visible_names(state: &AppState) -> Vec<&str> {
        state.visible().iter().map(|r| r.name()).collect()
    }

    #[test]
    fn test_ingest_into_empty_catalog() {
        let mut state = state();
        assert_eq!(state.ingest(sources(3), Utc::now()), 3);

        let names: Vec<_> = state.catalog().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["file1.txt", "file2.txt", "file3.txt"]);

        let mut ids: Vec<_> = state.catalog().iter().map(|r| r.id().clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_ids_unique_across_batches_in_same_millisecond() {
        let mut state = state();
        let now = Utc::now();
        state.ingest(sources(2), now);
        state.ingest(sources(2), now);

        let mut ids: Vec<_> = state.catalog().iter().map(|r| r.id().clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_empty_ingest_is_noop() {
        let mut state = state();
        let now = Utc::now();
        assert_eq!(state.ingest(Vec::new(), now), 0);
        assert!(state.catalog().is_empty());

        // No stamp was consumed by the empty batch
        state.ingest(sources(1), now);
        let expected = format!("{}-0", now.timestamp_millis());
        assert_eq!(state.catalog().as_slice()[0].id().as_str(), expected);
    }

    #[test]
    fn test_twelve_records_paginate() {
        let mut state = state();
        state.ingest(sources(12), Utc::now());

        assert_eq!(state.total_pages(), 3);
        assert_eq!(
            visible_names(&state),
            vec!["file1.txt", "file2.txt", "file3.txt", "file4.txt", "file5.txt"]
        );

        state.go_to_page(3);
        assert_eq!(visible_names(&state), vec!["file11.txt", "file12.txt"]);
    }

    #[test]
    fn test_page_size_change_on_last_page() {
        let mut state = state();
        state.ingest(sources(12), Utc::now());
        state.go_to_page(3);

        state.set_items_per_page(ItemsPerPage::Ten);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.total_pages(), 2);
    }

    #[test]
    fn test_delete_only_record() {
        let mut state = state();
        state.ingest(sources(1), Utc::now());
        let id = state.catalog().as_slice()[0].id().clone();

        assert!(state.delete(&id).is_some());
        assert!(state.catalog().is_empty());
        assert_eq!(state.total_pages(), 0);
        assert_eq!(state.current_page(), 1);
        assert!(state.visible().is_empty());
        assert_eq!(state.summary().to_string(), "0 – 0 of 0");
    }

    #[test]
    fn test_delete_last_row_of_last_page_moves_back() {
        let mut state = state();
        state.ingest(sources(11), Utc::now());
        state.last_page();
        assert_eq!(state.current_page(), 3);

        let id = state.visible()[0].id().clone();
        state.delete(&id);
        assert_eq!(state.current_page(), 2);
        assert_eq!(state.visible().len(), 5);
    }

    fn viewer() -> Viewer {
        let config = crate::config::ViewerConfig {
            simulated_latency_ms: 0,
            max_preview_chars: 64,
        };
        let loader = crate::preview::DefaultPreviewLoader::new(&config, crate::resource::ResourceManager::new());
        Viewer::new(tokio::runtime::Handle::current(), std::sync::Arc::new(loader))
    }

    #[tokio::test]
    async fn test_deleting_viewed_file_closes_viewer() {
        let mut state = state();
        state.ingest(sources(6), Utc::now());
        state.last_page();
        assert_eq!(state.current_page(), 2);

        let shown = state.visible()[0].clone();
        let mut viewer = viewer();
        viewer.open(shown.clone());
        viewer.settle().await;
        assert!(viewer.state().content().is_some());

        let removed = state.delete_viewed(shown.id(), &mut viewer);
        assert_eq!(removed.map(|r| r.name().to_string()), Some("file6.txt".to_string()));
        assert!(matches!(viewer.state(), crate::preview::ViewerState::Idle));
        assert_eq!(state.catalog().len(), 5);
        assert_eq!(state.total_pages(), 1);
        assert_eq!(state.current_page(), 1);
    }

    #[tokio::test]
    async fn test_deleting_other_file_keeps_viewer_open() {
        let mut state = state();
        state.ingest(sources(3), Utc::now());
        let shown = state.catalog().as_slice()[0].clone();
        let other = state.catalog().as_slice()[2].id().clone();

        let mut viewer = viewer();
        viewer.open(shown.clone());
        viewer.settle().await;

        state.delete_viewed(&other, &mut viewer);
        assert_eq!(viewer.state().file().map(|f| f.id()), Some(shown.id()));
        assert_eq!(state.catalog().len(), 2);
    }

    #[test]
    fn test_current_page_in_range_after_every_delete() {
        let mut state = state();
        state.ingest(sources(23), Utc::now());
        state.set_items_per_page(ItemsPerPage::Ten);

        while let Some(id) = state.catalog().iter().last().map(|r| r.id().clone()) {
            state.last_page();
            state.delete(&id);
            assert!(state.current_page() <= state.total_pages().max(1));
        }
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn test_delete_unknown_id() {
        let mut state = state();
        state.ingest(sources(6), Utc::now());
        state.next_page();
        let before: Vec<_> = state.catalog().iter().map(|r| r.id().clone()).collect();

        assert!(state.delete(&FileId::from_raw("missing")).is_none());

        let after: Vec<_> = state.catalog().iter().map(|r| r.id().clone()).collect();
        assert_eq!(before, after);
        assert_eq!(state.current_page(), 2);
    }

    #[test]
    fn test_type_inference_through_ingest() {
        let mut state = state();
        state.ingest(
            vec![
                IntakeSource::from_bytes("report.PDF", vec![1, 2, 3]),
                IntakeSource::from_bytes("notes", vec![4]),
            ],
            Utc::now(),
        );
        let records = state.catalog().as_slice();
        assert_eq!(records[0].file_type(), FileType::Pdf);
        assert_eq!(records[1].file_type(), FileType::Other);
        assert!(records[1].raw().is_none());
    }

    #[test]
    fn test_demo_records() {
        let state = AppState::with_demo_records(AppConfig::default());
        let records = state.catalog().as_slice();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), "GSAP_msds_02720121.pdf");
        assert_eq!(records[0].size(), 2_048_000);
        assert_eq!(format_date(records[1].upload_date()), "2024-01-16");
        assert!(records.iter().all(|r| r.raw().is_none()));

        let mut config = AppConfig::default();
        config.catalog.seed_demo_files = false;
        assert!(AppState::with_demo_records(config).catalog().is_empty());
    }

    #[test]
    fn test_configured_page_size() {
        let mut config = AppConfig::default();
        config.catalog.items_per_page = 20;
        let mut state = AppState::new(config);
        assert_eq!(state.items_per_page(), ItemsPerPage::Twenty);

        state.cycle_items_per_page();
        assert_eq!(state.items_per_page(), ItemsPerPage::Fifty);
    }
}
