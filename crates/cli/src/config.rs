//! Compare options from a TOML file, overridden by command line flags.

use anyhow::{Context, Result};
use clap::Args;
use policy_compare::{ChildrenLvl, CompareOptions, EventsLvl, IdLvl, KeyLvl, PropertiesLvl, RefLvl};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone, Default)]
pub struct OptionsArgs {
    /// TOML file with compare options
    #[arg(long = "options")]
    pub file: Option<PathBuf>,

    /// Properties: none|simple|all (or 0|1|2)
    #[arg(long)]
    pub prop_lvl: Option<PropertiesLvl>,

    /// Children: none|first|all (or 0|1|2)
    #[arg(long)]
    pub child_lvl: Option<ChildrenLvl>,

    /// Events: none|all (or 0|1)
    #[arg(long)]
    pub event_lvl: Option<EventsLvl>,

    /// Identifiers: none|all (or 0|1)
    #[arg(long)]
    pub id_lvl: Option<IdLvl>,

    /// Tags: any|exact
    #[arg(long)]
    pub key_lvl: Option<KeyLvl>,

    /// Schema refs: none|default|limit:<n>
    #[arg(long)]
    pub ref_lvl: Option<RefLvl>,
}

impl OptionsArgs {
    pub fn resolve(&self) -> Result<CompareOptions> {
        let mut options = match &self.file {
            Some(path) => load_options(path)?,
            None => CompareOptions::default(),
        };
        if let Some(lvl) = self.prop_lvl {
            options.prop_lvl = lvl;
        }
        if let Some(lvl) = self.child_lvl {
            options.child_lvl = lvl;
        }
        if let Some(lvl) = self.event_lvl {
            options.event_lvl = lvl;
        }
        if let Some(lvl) = self.id_lvl {
            options.id_lvl = lvl;
        }
        if let Some(lvl) = self.key_lvl {
            options.key_lvl = lvl;
        }
        if let Some(lvl) = self.ref_lvl {
            options.ref_lvl = lvl;
        }
        options.validate()?;
        log::debug!("Compare options: {options:?}");
        Ok(options)
    }
}

pub fn load_options(path: &Path) -> Result<CompareOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid options file {}", path.display()))
}
