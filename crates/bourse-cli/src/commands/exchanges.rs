use bourse_core::MarketOverview;
use serde::Serialize;

use crate::cli::ExchangesArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ExchangesResponseData<'a> {
    countries: &'a [String],
    exchanges: &'a [String],
}

pub fn run(args: &ExchangesArgs, overview: &mut MarketOverview) -> Result<CommandResult, CliError> {
    overview.filters_mut().set_countries(&args.countries);

    let filters = overview.filters();
    let countries = &filters.selection().countries;
    if countries.is_empty() {
        return Err(CliError::Command(String::from(
            "--country must contain at least one non-blank code",
        )));
    }

    let loaded = overview.is_loaded();
    let warnings = countries
        .iter()
        .filter(|country| loaded && !filters.available_countries().contains(country))
        .map(|country| format!("country '{country}' is not present in the catalog"))
        .collect::<Vec<_>>();

    let data = serde_json::to_value(ExchangesResponseData {
        countries,
        exchanges: filters.legal_exchanges(),
    })?;

    Ok(CommandResult::ok(data).with_warnings(warnings))
}
