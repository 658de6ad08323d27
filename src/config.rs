//! Command-line arguments and the optional JSON configuration file.
//!
//! Values are resolved in this order, later ones winning:
//!
//! 1. Built-in defaults (a local conversion service on port 5000, every form enabled)
//! 2. The JSON file given by `--config` / `ISATAB_UPLOAD_CONFIG`
//! 3. `--server` / `ISATAB_SERVER`
//!
//! ```json
//! {
//!   "server_url": "https://isatools.example.org/",
//!   "forms": { "accession_form_selector": "#byAccession" },
//!   "enabled": ["by_accession_number"]
//! }
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    form::Form,
    models::{
        UploadKind, ACCESSION_CHUNKED_FIELD, ACCESSION_NUMBER_FIELD, ACCESSION_REPOSITORY_FIELD,
        ISAJSON_CHUNKED_FIELD, ISAJSON_FILE_FIELD, ISATAB_FILE_CHUNKED_FIELD, ISATAB_FILE_FIELD,
    },
};

#[derive(Debug, Parser)]
#[command(name = "isatab-upload", version, about = "Submit ISA-TAB and ISA-JSON uploads to the ISA conversion service")]
pub struct Args {
    /// Path to a JSON configuration file
    #[arg(short = 'f', long, env = "ISATAB_UPLOAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the conversion service
    #[arg(long, env = "ISATAB_SERVER")]
    pub server: Option<Url>,

    #[arg(long, env = "ISATAB_UPLOAD_LOG", default_value = "info")]
    pub log_level: LevelFilter,

    /// Write the response body into this directory as well as showing it
    #[arg(long)]
    pub save_to: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert an ISA-TAB archive (.zip) to ISA-JSON
    File {
        path: Option<PathBuf>,
        /// Split the JSON output into one file per section
        #[arg(long)]
        chunked: bool,
    },
    /// Fetch ISA-TAB from a public repository and convert it to ISA-JSON
    Accession {
        accession_number: Option<String>,
        #[arg(long, value_enum, default_value_t = Repository::Metabolights)]
        repository: Repository,
        #[arg(long)]
        chunked: bool,
    },
    /// Convert an ISA-JSON archive (.zip) to ISA-TAB
    Isajson {
        path: Option<PathBuf>,
        /// The archive holds chunked JSON rather than a single combined file
        #[arg(long)]
        chunked: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Repository {
    Metabolights,
    Sra,
}

impl Repository {
    pub fn as_str(self) -> &'static str {
        match self {
            Repository::Metabolights => "metabolights",
            Repository::Sra => "sra",
        }
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

impl Command {
    /// Fills in the form this subcommand stands for.
    pub fn to_form(&self, forms: &FormsConfig) -> Form {
        match self {
            Command::File { path, chunked } => Form::new(&forms.file_form_selector)
                .with_file(&forms.file_field, path.clone())
                .with_text(ISATAB_FILE_CHUNKED_FIELD, flag(*chunked)),
            Command::Accession {
                accession_number,
                repository,
                chunked,
            } => Form::new(&forms.accession_form_selector)
                .with_text(ACCESSION_REPOSITORY_FIELD, repository.as_str())
                .with_text(&forms.accession_field, accession_number.clone().unwrap_or_default())
                .with_text(ACCESSION_CHUNKED_FIELD, flag(*chunked)),
            Command::Isajson { path, chunked } => Form::new(&forms.isajson_form_selector)
                .with_file(&forms.isajson_field, path.clone())
                .with_text(ISAJSON_CHUNKED_FIELD, flag(*chunked)),
        }
    }
}

/// Which form each upload flow listens on, and the field that must be filled in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FormsConfig {
    pub file_form_selector: String,
    pub file_field: String,
    pub accession_form_selector: String,
    pub accession_field: String,
    pub isajson_form_selector: String,
    pub isajson_field: String,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            file_form_selector: "#isatabToIsajsonByFileForm".to_string(),
            file_field: ISATAB_FILE_FIELD.to_string(),
            accession_form_selector: "#isatabToIsajsonByAccessionNumberForm".to_string(),
            accession_field: ACCESSION_NUMBER_FIELD.to_string(),
            isajson_form_selector: "#isajsonToIsatabForm".to_string(),
            isajson_field: ISAJSON_FILE_FIELD.to_string(),
        }
    }
}

impl FormsConfig {
    /// `(selector, designated field)` for `kind`.
    pub fn binding(&self, kind: UploadKind) -> (&str, &str) {
        match kind {
            UploadKind::ByFile => (&self.file_form_selector, &self.file_field),
            UploadKind::ByAccessionNumber => (&self.accession_form_selector, &self.accession_field),
            UploadKind::IsajsonByFile => (&self.isajson_form_selector, &self.isajson_field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server_url: Url,
    pub forms: FormsConfig,
    /// Upload flows wired up by `initialize`
    pub enabled: Vec<UploadKind>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: Url::parse("http://localhost:5000/").expect("default server URL is valid"),
            forms: FormsConfig::default(),
            enabled: vec![
                UploadKind::ByFile,
                UploadKind::ByAccessionNumber,
                UploadKind::IsajsonByFile,
            ],
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_json(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            None => Self::default(),
        };

        if let Some(server) = &args.server {
            config.server_url = server.clone();
        }

        Ok(config)
    }

    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }
}
