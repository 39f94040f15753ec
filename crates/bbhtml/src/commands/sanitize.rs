//! `bbhtml sanitize` command implementation.

use std::path::PathBuf;

use bb_config::Config;
use bb_renderer::{HtmlSanitizer, Sanitizer, strip_tags};
use clap::Args;

use super::{read_input, write_output};
use crate::engine::sanitizer_policy;
use crate::error::CliError;

/// Arguments for the sanitize command.
#[derive(Args)]
pub(crate) struct SanitizeArgs {
    /// HTML input file (`-` or omitted reads stdin).
    input: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover bbhtml.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Strip every tag and print the text content.
    #[arg(long)]
    text: bool,
}

impl SanitizeArgs {
    /// Execute the sanitize command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input or sanitization fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let source = read_input(self.input.as_deref())?;
        let result = if self.text {
            strip_tags(&source)
        } else {
            let config = Config::load(self.config.as_deref(), None)?;
            HtmlSanitizer::new(sanitizer_policy(&config.sanitizer)).sanitize(&source)?
        };
        write_output(None, &result)?;
        Ok(())
    }
}
