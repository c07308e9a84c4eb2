use bourse_core::{ApplyOutcome, CountryGroupedView, FieldUpdate, FilterSelection, MarketOverview};
use serde::Serialize;

use crate::cli::ViewArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ViewResponseData<'a> {
    selection: &'a FilterSelection,
    legal_exchanges: &'a [String],
    countries: usize,
    records: usize,
    view: &'a CountryGroupedView,
}

pub fn run(args: &ViewArgs, overview: &mut MarketOverview) -> Result<CommandResult, CliError> {
    let filters = overview.filters_mut();

    if !args.countries.is_empty() {
        filters.set_countries(&args.countries);
    }
    if !args.exchanges.is_empty() {
        filters.set_exchanges(&args.exchanges);
    }
    for country in &args.remove_countries {
        filters.remove_country(country);
    }
    for exchange in &args.remove_exchanges {
        filters.remove_exchange(exchange);
    }

    let taxonomy = [
        args.sector.clone().map(|v| FieldUpdate::Sector(Some(v))),
        args.industry_group.clone().map(|v| FieldUpdate::IndustryGroup(Some(v))),
        args.industry.clone().map(|v| FieldUpdate::Industry(Some(v))),
        args.sub_industry.clone().map(|v| FieldUpdate::SubIndustry(Some(v))),
    ];
    for update in taxonomy.into_iter().flatten() {
        filters.set_field(update);
    }
    if let Some(interval) = args.interval {
        filters.set_interval(interval);
    }

    let mut warnings = Vec::new();
    if overview.last_outcome() == Some(ApplyOutcome::NotLoaded) {
        warnings.push(String::from(
            "exchange catalog is not loaded; filters were recorded but not applied",
        ));
    }
    for exchange in overview.filters().stale_exchanges() {
        warnings.push(format!(
            "exchange '{exchange}' is not listed for the selected countries"
        ));
    }

    let filters = overview.filters();
    let current = overview.current();
    let data = serde_json::to_value(ViewResponseData {
        selection: filters.selection(),
        legal_exchanges: filters.legal_exchanges(),
        countries: current.len(),
        records: current.record_count(),
        view: &current,
    })?;

    Ok(CommandResult::ok(data).with_warnings(warnings))
}
