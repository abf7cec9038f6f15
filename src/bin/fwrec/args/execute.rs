use std::collections::HashMap;
use std::io::Write;

use fwrec::{FormatKind, FormatOptions, InputFile};
use tracing::info;

use super::error::CliError;
use super::ini::load_ini;
use super::parse_util::{parse_format, parse_line_termination, parse_number};
use super::types::Args;

/// Settings after applying INI defaults under the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Settings {
    pub input_format: Option<FormatKind>,
    pub output_format: FormatKind,
    pub options: FormatOptions,
}

impl Args {
    pub(super) fn settings(&self) -> Result<Settings, CliError> {
        let ini = match &self.ini_file {
            Some(path) => load_ini(path)?,
            None => HashMap::new(),
        };
        self.settings_with(&ini)
    }

    pub(super) fn settings_with(&self, ini: &HashMap<String, String>) -> Result<Settings, CliError> {
        let wrap = |key: &str, e: super::types::ParseArgError| {
            CliError::Config(format!("INI key {key}: {e}"))
        };

        let input_format = match (self.input_format, ini.get("input_format")) {
            (Some(kind), _) => Some(kind),
            (None, Some(v)) => Some(parse_format(v).map_err(|e| wrap("input_format", e))?),
            (None, None) => None,
        };
        let output_format = match (self.output_format, ini.get("output_format")) {
            (Some(kind), _) => kind,
            (None, Some(v)) => parse_format(v).map_err(|e| wrap("output_format", e))?,
            (None, None) => FormatKind::IntelHex,
        };
        let line_termination = match (&self.line_termination, ini.get("line_termination")) {
            (Some(lt), _) => lt.clone(),
            (None, Some(v)) => parse_line_termination(v).map_err(|e| wrap("line_termination", e))?,
            (None, None) => "\n".to_string(),
        };
        let bytes_per_record = match (self.bytes_per_record, ini.get("bytes_per_record")) {
            (Some(n), _) => Some(n),
            (None, Some(v)) => Some(parse_number(v).map_err(|e| wrap("bytes_per_record", e))?),
            (None, None) => None,
        };

        Ok(Settings {
            input_format,
            output_format,
            options: FormatOptions {
                line_termination,
                bytes_per_record,
            },
        })
    }

    pub fn execute(&self) -> Result<(), CliError> {
        let settings = self.settings()?;
        let inputs: Vec<InputFile> = self
            .input_files
            .iter()
            .map(|path| InputFile {
                path: path.clone(),
                kind: settings.input_format,
            })
            .collect();

        info!(
            inputs = inputs.len(),
            output = %settings.output_format,
            "converting"
        );
        let lines = fwrec::merge_files(
            settings.output_format,
            self.output_file.as_deref(),
            &inputs,
            settings.options,
        )?;

        if self.output_file.is_none() {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(lines.concat().as_bytes())?;
            stdout.flush()?;
        }
        Ok(())
    }
}
