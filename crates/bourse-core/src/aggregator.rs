//! Country-grouped view builder.
//!
//! The aggregator holds two [`CountryGroupedView`]s: `all`, built once from the
//! catalog, and `current`, rebuilt from `all` on every filter selection.
//! `current` is always a per-key subset of `all`.

use tracing::{debug, info, warn};

use crate::catalog::{CatalogPayload, CountryGroupedView};
use crate::domain::ExchangeRecord;
use crate::filter::FilterSelection;

/// Result of offering a catalog to the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Accepted { countries: usize, records: usize },
    /// A catalog was already accepted; the new one was dropped.
    Ignored,
}

/// Result of applying a filter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { countries: usize, records: usize },
    /// No catalog yet; `current` was left as is.
    NotLoaded,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    all: CountryGroupedView,
    current: CountryGroupedView,
    loaded: bool,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a flat record list, grouping by normalized country.
    pub fn ingest_records(&mut self, records: &[ExchangeRecord]) -> IngestOutcome {
        self.accept(|| CountryGroupedView::from_records(records))
    }

    /// Ingest a catalog that is already grouped by country.
    pub fn ingest_grouped(&mut self, groups: &[(String, Vec<ExchangeRecord>)]) -> IngestOutcome {
        self.accept(|| CountryGroupedView::from_groups(groups))
    }

    pub fn ingest(&mut self, payload: &CatalogPayload) -> IngestOutcome {
        match payload {
            CatalogPayload::Flat(records) => self.ingest_records(records),
            CatalogPayload::Grouped(groups) => self.ingest_grouped(groups),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Unfiltered view; empty until a catalog is accepted.
    pub fn all(&self) -> &CountryGroupedView {
        &self.all
    }

    pub fn current(&self) -> &CountryGroupedView {
        &self.current
    }

    /// Rebuild `current` from `all` for the given selection.
    ///
    /// Countries keep the selection's order. Unknown countries get no key;
    /// known countries always get one, even when no exchange matches.
    pub fn apply(&mut self, selection: &FilterSelection) -> ApplyOutcome {
        if !self.loaded {
            warn!("filters applied before the exchange catalog was loaded");
            return ApplyOutcome::NotLoaded;
        }

        let FilterSelection {
            countries,
            exchanges,
            ..
        } = selection.normalized();

        let mut filtered = CountryGroupedView::new();
        for country in countries {
            let Some(bucket) = self.all.get(&country) else {
                continue;
            };

            let matched = if exchanges.is_empty() {
                bucket.to_vec()
            } else {
                bucket
                    .iter()
                    .filter(|record| exchanges.contains(&record.normalized_mic()))
                    .cloned()
                    .collect()
            };
            filtered.insert(country, matched);
        }

        let outcome = ApplyOutcome::Applied {
            countries: filtered.len(),
            records: filtered.record_count(),
        };
        debug!(?outcome, "rebuilt country view");
        self.current = filtered;
        outcome
    }

    fn accept<F>(&mut self, build: F) -> IngestOutcome
    where
        F: FnOnce() -> CountryGroupedView,
    {
        if self.loaded {
            warn!("exchange catalog already loaded; ignoring late response");
            return IngestOutcome::Ignored;
        }

        let view = build();
        let outcome = IngestOutcome::Accepted {
            countries: view.len(),
            records: view.record_count(),
        };
        info!(?outcome, "exchange catalog loaded");
        self.current = view.clone();
        self.all = view;
        self.loaded = true;
        outcome
    }
}
