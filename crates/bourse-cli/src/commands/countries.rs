use bourse_core::MarketOverview;
use serde::Serialize;

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct CountriesResponseData<'a> {
    count: usize,
    countries: &'a [String],
}

pub fn run(overview: &MarketOverview) -> Result<CommandResult, CliError> {
    let countries = overview.filters().available_countries();
    let data = serde_json::to_value(CountriesResponseData {
        count: countries.len(),
        countries,
    })?;

    Ok(CommandResult::ok(data))
}
