//! Configuration loading and validation
//!
//! Configuration comes from an optional YAML file, validated with
//! `validator`, with command-line overrides merged on top.

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::{ErrorContext, TemplateResult};

/// Command-line options
#[derive(Debug, Default, Parser)]
#[command(name = "templix", about = "Asynchronous streaming template server")]
pub struct Opt {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    pub conf: Option<String>,

    /// Listen address override
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,

    /// Template root directory override
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    pub listen: SocketAddr,

    #[validate(nested)]
    pub templates: TemplateSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            templates: TemplateSettings::default(),
        }
    }
}

// Config file load and validation
impl Config {
    pub fn load_from_yaml<P>(path: P) -> TemplateResult<Self>
    where
        P: AsRef<std::path::Path> + std::fmt::Display,
    {
        let conf_str = fs::read_to_string(&path)
            .with_context(&format!("Unable to read conf file from {path}"))?;
        debug!("Conf file read from {path}");
        Self::from_yaml(&conf_str)
    }

    // config load entry point
    pub fn load_with_opt(opt: &Opt) -> TemplateResult<Self> {
        let mut conf = match &opt.conf {
            Some(path) => Self::load_from_yaml(path)?,
            None => Self::default(),
        };
        conf.merge_with_opt(opt);
        Ok(conf)
    }

    pub fn from_yaml(conf_str: &str) -> TemplateResult<Self> {
        trace!("Read conf file: {conf_str}");
        let conf: Config =
            serde_yaml::from_str(conf_str).with_context("Unable to parse yaml conf")?;

        trace!("Loaded conf: {conf:?}");

        conf.validate().with_context("Conf file validation failed")?;

        Ok(conf)
    }

    pub fn merge_with_opt(&mut self, opt: &Opt) {
        if let Some(listen) = opt.listen {
            self.listen = listen;
        }
        if let Some(root) = &opt.root {
            self.templates.root = root.clone();
        }
    }
}

/// Template resolution settings shared by every unit of one deployment
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "TemplateSettings::validate_default_document"))]
pub struct TemplateSettings {
    /// Root directory template identifiers resolve against
    pub root: PathBuf,

    /// Document name substituted when an identifier denotes a directory
    pub default_document: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            default_document: "index.html".to_string(),
        }
    }
}

impl TemplateSettings {
    fn validate_default_document(&self) -> Result<(), ValidationError> {
        if self.default_document.is_empty() || self.default_document.contains('/') {
            return Err(ValidationError::new("invalid_default_document"));
        }
        Ok(())
    }
}
