//! `bbhtml render` command implementation.

use std::path::PathBuf;

use bb_config::{CliSettings, Config};
use clap::Args;

use super::{read_input, write_output};
use crate::engine::renderer_from_config;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// BBCode input file (`-` or omitted reads stdin).
    input: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover bbhtml.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Template directory (overrides config).
    #[arg(long, env = "BBHTML_TEMPLATES_DIR")]
    templates_dir: Option<PathBuf>,

    /// Comma-separated block tags (overrides config).
    #[arg(long, value_delimiter = ',')]
    block_tags: Option<Vec<String>>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input or rendering fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            templates_dir: self.templates_dir,
            block_tags: self.block_tags,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Using configuration");
        }

        let renderer = renderer_from_config(&config)?;
        let source = read_input(self.input.as_deref())?;
        let html = renderer.render(&source)?;

        write_output(self.output.as_deref(), &html)?;
        if let Some(path) = &self.output {
            output.success(&format!("Wrote {}", path.display()));
        }
        Ok(())
    }
}
