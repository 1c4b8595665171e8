use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use vmbridge_source::{CONFIG_FILE, Config};

use super::{Format, UnwrapOrExit};
use crate::{ops, reports};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to vmbridge.toml
    #[arg(short, long, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// View model to check (overrides project.view_model)
    #[arg(long)]
    pub view_model: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

impl CheckCommand {
    pub fn run(&self) -> Result<()> {
        let config = Config::from_file(&self.config).unwrap_or_exit();
        let sources = ops::load_sources(&config).unwrap_or_exit();
        let model = ops::extract(&config, sources, self.view_model.as_deref())?;

        let report = ops::check(&model, &self.config);
        reports::print(self.format, &report)
    }
}
