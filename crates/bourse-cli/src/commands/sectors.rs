use bourse_core::TaxonomyOptions;

use crate::config::Settings;
use crate::error::CliError;

use super::CommandResult;

pub fn run(settings: &Settings) -> Result<CommandResult, CliError> {
    let options = TaxonomyOptions::from_file(&settings.gics)?;
    let data = serde_json::to_value(&options)?;

    Ok(CommandResult::ok(data).with_warnings(vec![String::from(
        "taxonomy options are informational; they do not narrow the exchange view",
    )]))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_options_from_configured_taxonomy_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"sector_name": "Utilities"}}, {{"sector_name": "Energy"}}]"#
        )
        .expect("write taxonomy");
        let settings = Settings {
            gics: file.path().to_path_buf(),
            ..Settings::default()
        };

        let result = run(&settings).expect("sectors should succeed");

        assert_eq!(result.data["sectors"], serde_json::json!(["Energy", "Utilities"]));
    }

    #[test]
    fn missing_taxonomy_file_is_a_catalog_error() {
        let settings = Settings {
            gics: std::path::PathBuf::from("does/not/exist/gics.json"),
            ..Settings::default()
        };

        let err = run(&settings).err().expect("must fail");
        assert_eq!(err.exit_code(), 3);
    }
}
