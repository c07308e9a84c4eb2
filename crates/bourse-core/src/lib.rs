//! # Bourse Core
//!
//! Narrow a catalog of stock exchanges by country and exchange code and view
//! the result grouped by country.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`aggregator`] | Builds the unfiltered and filtered country-grouped views |
//! | [`catalog`] | Catalog payloads (flat or grouped) and [`CountryGroupedView`] |
//! | [`domain`] | [`ExchangeRecord`], [`Interval`], code normalization |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`filter`] | Cascading filter state and change subscriptions |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`loader`] | One-shot catalog retrieval from a URL or file |
//! | [`overview`] | Wires filter emissions into the aggregator |
//! | [`taxonomy`] | GICS option lists |
//!
//! ## Data flow
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │ CatalogLoader   │────▶│ Aggregator       │ all (built once)
//! └─────────────────┘     └────────▲─────────┘ current (per selection)
//!                                  │ FilterSelection
//!                         ┌────────┴─────────┐
//!                         │ FilterState      │ countries ─▶ legal exchanges
//!                         │ Controller       │
//!                         └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use bourse_core::{CatalogPayload, CatalogShape, MarketOverview};
//!
//! let body = r#"[
//!     {"code":"NYSE","mic":"xnys","name":"New York Stock Exchange","country":"us","city":"New York"},
//!     {"code":"NASDAQ","mic":"xnas","name":"Nasdaq","country":"us","city":"New York"},
//!     {"code":"LSE","mic":"xlon","name":"London Stock Exchange","country":"gb","city":"London"}
//! ]"#;
//!
//! let mut overview = MarketOverview::new();
//! overview.load(&CatalogPayload::parse(body, CatalogShape::Auto)?);
//!
//! overview.filters_mut().set_countries(["us"]);
//! assert_eq!(overview.filters().legal_exchanges(), ["XNAS", "XNYS"]);
//!
//! overview.filters_mut().set_exchanges(["XNYS"]);
//! assert_eq!(overview.current().get("US").map(<[_]>::len), Some(1));
//! # Ok::<(), bourse_core::CatalogError>(())
//! ```

pub mod aggregator;
pub mod catalog;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod http_client;
pub mod loader;
pub mod overview;
pub mod taxonomy;

pub use aggregator::{Aggregator, ApplyOutcome, IngestOutcome};
pub use catalog::{Catalog, CatalogPayload, CatalogShape, CountryGroupedView};
pub use domain::{normalize_code, normalize_codes, ExchangeRecord, Interval};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};
pub use error::{CatalogError, ValidationError};
pub use filter::{FieldUpdate, FilterSelection, FilterStateController, SubscriptionId};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, StaticHttpClient,
};
pub use loader::{CatalogLoader, CatalogLocation, CatalogSource};
pub use overview::MarketOverview;
pub use taxonomy::{GicsEntry, TaxonomyOptions};
