//! Page-level wiring of the filter controller and the aggregator.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::aggregator::{Aggregator, ApplyOutcome, IngestOutcome};
use crate::catalog::{CatalogPayload, CountryGroupedView};
use crate::filter::FilterStateController;
use crate::loader::{CatalogLoader, CatalogSource};
use crate::CatalogError;

/// Market overview session.
///
/// Every selection emitted by the controller is forwarded to the aggregator,
/// so [`current`](Self::current) always reflects the latest selection once a
/// catalog has been accepted. Single-threaded by construction.
pub struct MarketOverview {
    filters: FilterStateController,
    aggregator: Rc<RefCell<Aggregator>>,
    last_outcome: Rc<Cell<Option<ApplyOutcome>>>,
}

impl MarketOverview {
    pub fn new() -> Self {
        let aggregator = Rc::new(RefCell::new(Aggregator::new()));
        let last_outcome = Rc::new(Cell::new(None));
        let mut filters = FilterStateController::new();

        let sink = Rc::clone(&aggregator);
        let outcome_slot = Rc::clone(&last_outcome);
        filters.subscribe(move |selection| {
            let outcome = sink.borrow_mut().apply(selection);
            outcome_slot.set(Some(outcome));
        });

        Self {
            filters,
            aggregator,
            last_outcome,
        }
    }

    /// Accept a decoded catalog. Only the first call has any effect.
    pub fn load(&mut self, payload: &CatalogPayload) -> IngestOutcome {
        let outcome = self.aggregator.borrow_mut().ingest(payload);
        if matches!(outcome, IngestOutcome::Accepted { .. }) {
            self.filters.attach_catalog(payload.to_catalog());
        }
        outcome
    }

    /// Fetch and accept the catalog unless one has already been accepted.
    pub async fn load_from(
        &mut self,
        loader: &CatalogLoader,
        source: &CatalogSource,
    ) -> Result<IngestOutcome, CatalogError> {
        if self.is_loaded() {
            debug!(location = %source.location, "catalog already loaded; skipping fetch");
            return Ok(IngestOutcome::Ignored);
        }

        let payload = loader.fetch(source).await?;
        Ok(self.load(&payload))
    }

    pub fn is_loaded(&self) -> bool {
        self.aggregator.borrow().is_loaded()
    }

    pub fn filters(&self) -> &FilterStateController {
        &self.filters
    }

    /// Mutating the controller recomputes [`current`](Self::current).
    pub fn filters_mut(&mut self) -> &mut FilterStateController {
        &mut self.filters
    }

    pub fn all(&self) -> Ref<'_, CountryGroupedView> {
        Ref::map(self.aggregator.borrow(), Aggregator::all)
    }

    pub fn current(&self) -> Ref<'_, CountryGroupedView> {
        Ref::map(self.aggregator.borrow(), Aggregator::current)
    }

    /// Outcome of the most recent filter emission, if any.
    pub fn last_outcome(&self) -> Option<ApplyOutcome> {
        self.last_outcome.get()
    }
}

impl Default for MarketOverview {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExchangeRecord;

    fn payload() -> CatalogPayload {
        CatalogPayload::Flat(vec![
            ExchangeRecord::new("NYSE", "xnys", "New York Stock Exchange", "us", "New York"),
            ExchangeRecord::new("LSE", "xlon", "London Stock Exchange", "gb", "London"),
        ])
    }

    #[test]
    fn selections_before_load_are_no_ops() {
        let mut overview = MarketOverview::new();
        overview.filters_mut().set_countries(["us"]);

        assert_eq!(overview.last_outcome(), Some(ApplyOutcome::NotLoaded));
        assert!(overview.current().is_empty());
    }

    #[test]
    fn emissions_rebuild_current_view() {
        let mut overview = MarketOverview::new();
        overview.load(&payload());

        overview.filters_mut().set_countries(["gb"]);

        assert_eq!(overview.current().countries().collect::<Vec<_>>(), vec!["GB"]);
        assert_eq!(
            overview.last_outcome(),
            Some(ApplyOutcome::Applied { countries: 1, records: 1 })
        );
    }

    #[test]
    fn only_first_catalog_is_attached() {
        let mut overview = MarketOverview::new();
        overview.load(&payload());
        let late = CatalogPayload::Flat(vec![ExchangeRecord::new("", "xpar", "", "fr", "")]);

        assert_eq!(overview.load(&late), IngestOutcome::Ignored);
        assert_eq!(overview.filters().available_countries(), ["GB", "US"]);
    }
}
