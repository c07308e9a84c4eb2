//! Cascading filter state.
//!
//! [`FilterStateController`] owns the user's [`FilterSelection`] and the list
//! of exchange codes that are legal for the selected countries. Every
//! mutating operation runs to completion and then hands the full selection to
//! each subscriber, in subscription order.
//!
//! Country changes cascade into the exchange field:
//!
//! | Operation | Legal exchanges | Selected exchanges |
//! |-----------|-----------------|--------------------|
//! | [`set_countries`](FilterStateController::set_countries) | recomputed | cleared |
//! | [`remove_country`](FilterStateController::remove_country) | recomputed | kept |
//! | [`remove_exchange`](FilterStateController::remove_exchange) | unchanged | one removed |
//! | [`set_field`](FilterStateController::set_field) | unchanged | replaced (exchange field only) |

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::{normalize_code, normalize_codes, Interval};

/// Current user selection, also the payload of every filter change event.
///
/// Serializes with the event keys `country`, `exchange`, `sector`,
/// `industryGroup`, `industry`, `subIndustry` and `interval`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    #[serde(rename = "country", default)]
    pub countries: Vec<String>,
    #[serde(rename = "exchange", default)]
    pub exchanges: Vec<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry_group: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub sub_industry: Option<String>,
    #[serde(default)]
    pub interval: Interval,
}

impl FilterSelection {
    /// Copy with countries and exchanges normalized; used for selections that
    /// did not come through the controller.
    pub fn normalized(&self) -> Self {
        Self {
            countries: normalize_codes(&self.countries),
            exchanges: normalize_codes(&self.exchanges),
            ..self.clone()
        }
    }
}

/// Direct assignment of one non-country field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Exchanges(Vec<String>),
    Sector(Option<String>),
    IndustryGroup(Option<String>),
    Industry(Option<String>),
    SubIndustry(Option<String>),
    Interval(Interval),
}

/// Handle returned by [`FilterStateController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&FilterSelection)>;

/// Owner of the filter selection and the derived legal exchange list.
pub struct FilterStateController {
    catalog: Catalog,
    selection: FilterSelection,
    available_countries: Vec<String>,
    legal_exchanges: Vec<String>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for FilterStateController {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStateController {
    /// Controller with no catalog attached and the initial selection.
    pub fn new() -> Self {
        Self {
            catalog: Catalog::default(),
            selection: FilterSelection::default(),
            available_countries: Vec::new(),
            legal_exchanges: Vec::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        let mut controller = Self::new();
        controller.attach_catalog(catalog);
        controller
    }

    /// Install the catalog the legal exchange set is derived from.
    ///
    /// Recomputes options for countries that were selected before the catalog
    /// arrived. Does not clear exchanges and does not emit.
    pub fn attach_catalog(&mut self, catalog: Catalog) {
        self.available_countries = catalog.countries();
        self.catalog = catalog;
        self.recompute_legal_exchanges();
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Sorted distinct countries present in the attached catalog.
    pub fn available_countries(&self) -> &[String] {
        &self.available_countries
    }

    /// Sorted distinct MICs belonging to the selected countries.
    pub fn legal_exchanges(&self) -> &[String] {
        &self.legal_exchanges
    }

    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&FilterSelection) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns `false` when the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Replace the country selection. Any country change invalidates the
    /// previous exchange choice, so exchanges are cleared before emitting.
    pub fn set_countries<I, S>(&mut self, countries: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selection.countries = normalize_codes(countries);
        self.recompute_legal_exchanges();
        self.selection.exchanges.clear();
        self.emit();
    }

    /// Drop one country. Selected exchanges are left untouched.
    pub fn remove_country(&mut self, country: &str) {
        let country = normalize_code(country);
        self.selection.countries.retain(|existing| *existing != country);
        self.recompute_legal_exchanges();
        self.emit();
    }

    pub fn remove_exchange(&mut self, exchange: &str) {
        let exchange = normalize_code(exchange);
        self.selection.exchanges.retain(|existing| *existing != exchange);
        self.emit();
    }

    /// Assign a non-country field without touching the legal exchange list.
    pub fn set_field(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Exchanges(exchanges) => {
                self.selection.exchanges = normalize_codes(exchanges);
            }
            FieldUpdate::Sector(value) => self.selection.sector = value,
            FieldUpdate::IndustryGroup(value) => self.selection.industry_group = value,
            FieldUpdate::Industry(value) => self.selection.industry = value,
            FieldUpdate::SubIndustry(value) => self.selection.sub_industry = value,
            FieldUpdate::Interval(value) => self.selection.interval = value,
        }
        self.emit();
    }

    pub fn set_exchanges<I, S>(&mut self, exchanges: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exchanges = exchanges
            .into_iter()
            .map(|exchange| exchange.as_ref().to_owned())
            .collect();
        self.set_field(FieldUpdate::Exchanges(exchanges));
    }

    pub fn set_interval(&mut self, interval: Interval) {
        self.set_field(FieldUpdate::Interval(interval));
    }

    /// Selected exchanges that are not legal for the selected countries.
    pub fn stale_exchanges(&self) -> Vec<&str> {
        self.selection
            .exchanges
            .iter()
            .filter(|exchange| !self.legal_exchanges.contains(exchange))
            .map(String::as_str)
            .collect()
    }

    fn recompute_legal_exchanges(&mut self) {
        self.legal_exchanges = self.catalog.mics_for_countries(&self.selection.countries);
        debug!(
            countries = ?self.selection.countries,
            legal_exchanges = self.legal_exchanges.len(),
            "recomputed legal exchanges"
        );
    }

    fn emit(&mut self) {
        debug!(
            countries = ?self.selection.countries,
            exchanges = ?self.selection.exchanges,
            interval = %self.selection.interval,
            subscribers = self.subscribers.len(),
            "filter selection changed"
        );
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.selection);
        }
    }
}

impl std::fmt::Debug for FilterStateController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterStateController")
            .field("selection", &self.selection)
            .field("legal_exchanges", &self.legal_exchanges)
            .field("catalog_records", &self.catalog.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
