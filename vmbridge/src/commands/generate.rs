use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use vmbridge_source::{CONFIG_FILE, Config};

use super::{Format, UnwrapOrExit};
use crate::{
    backends,
    ops::{self, GenerateOptions},
    reports,
};

#[derive(Args)]
pub struct GenerateCommand {
    /// Path to vmbridge.toml
    #[arg(short, long, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Output directory (overrides project.output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// View model to generate for (overrides project.view_model)
    #[arg(long)]
    pub view_model: Option<String>,

    /// Show what would be generated without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

impl GenerateCommand {
    pub fn run(&self) -> Result<()> {
        let config = Config::from_file(&self.config).unwrap_or_exit();
        let sources = ops::load_sources(&config).unwrap_or_exit();
        let model = ops::extract(&config, sources, self.view_model.as_deref())?;

        let output_dir = self
            .output
            .clone()
            .unwrap_or_else(|| config.project.output.clone());
        let backends = backends::selected(&config.generate);
        let report = ops::generate(
            &model,
            &backends,
            GenerateOptions {
                output_dir: &output_dir,
                dry_run: self.dry_run,
            },
        )?;

        reports::print(self.format, &report)
    }
}
