mod countries;
mod exchanges;
mod sectors;
mod view;

use std::time::Instant;

use bourse_core::{CatalogLoader, Envelope, EnvelopeError, EnvelopeMeta, MarketOverview};
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }
}

pub async fn run(cli: &Cli, settings: &Settings) -> Result<Envelope<Value>, CliError> {
    let started = Instant::now();

    let (command_result, catalog) = match &cli.command {
        Command::Countries => {
            let (overview, errors) = open_overview(settings).await?;
            (
                countries::run(&overview)?.with_errors(errors),
                Some(settings.catalog.clone()),
            )
        }
        Command::Exchanges(args) => {
            let (mut overview, errors) = open_overview(settings).await?;
            (
                exchanges::run(args, &mut overview)?.with_errors(errors),
                Some(settings.catalog.clone()),
            )
        }
        Command::View(args) => {
            let (mut overview, errors) = open_overview(settings).await?;
            (
                view::run(args, &mut overview)?.with_errors(errors),
                Some(settings.catalog.clone()),
            )
        }
        Command::Sectors => (sectors::run(settings)?, None),
    };

    let CommandResult {
        data,
        warnings,
        errors,
    } = command_result;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut meta = EnvelopeMeta::new(Uuid::new_v4().to_string(), "v1.0.0", catalog, latency_ms)?;
    for warning in warnings {
        meta.push_warning(warning);
    }

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

/// Load the catalog into a fresh session. A failed fetch is reported as an
/// envelope error and leaves the session empty.
async fn open_overview(
    settings: &Settings,
) -> Result<(MarketOverview, Vec<EnvelopeError>), CliError> {
    let source = settings.catalog_source();
    let loader = CatalogLoader::default().with_timeout_ms(settings.timeout_ms);
    let mut overview = MarketOverview::new();

    let mut errors = Vec::new();
    if let Err(failure) = overview.load_from(&loader, &source).await {
        error!(location = %source.location, error = %failure, "failed to load exchange catalog");
        errors.push(
            EnvelopeError::new(failure.code(), failure.to_string())?
                .with_retryable(failure.retryable()),
        );
    }

    Ok((overview, errors))
}
