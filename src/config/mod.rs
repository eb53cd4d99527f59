pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::services::dates::parse_date;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const MIN_TERM_YEARS: u32 = 1;
pub const MAX_TERM_YEARS: u32 = 100;
pub const INPUT_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "csv"];

#[cfg(feature = "cli")]
fn parse_as_of(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("cannot read '{}' as a date (use dd/mm/YYYY)", value))
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "royalty-etl")]
#[command(about = "Compute royalty terms and renewal dates for usage spreadsheets")]
pub struct CliConfig {
    /// Input workbooks (.xlsx or .csv); rows from all files are merged
    #[arg(required = true)]
    pub input_files: Vec<String>,

    #[arg(long, default_value = ".")]
    pub output_path: String,

    /// Initial protection term in years
    #[arg(long, default_value = "2")]
    pub initial_term: u32,

    /// Renewal term in years
    #[arg(long, default_value = "2")]
    pub ext_term: u32,

    /// Keep text columns as-is instead of Proper Case
    #[arg(long)]
    pub no_proper: bool,

    /// Overwrite an existing result without zipping it first
    #[arg(long)]
    pub no_backup: bool,

    /// Compute renewals relative to this date instead of today
    #[arg(long, value_parser = parse_as_of)]
    pub as_of: Option<NaiveDate>,

    /// Extra output formats next to xlsx
    #[arg(long, value_delimiter = ',', default_value = "xlsx")]
    pub formats: Vec<String>,

    #[arg(long, help = "Also write logs to this file")]
    pub log_file: Option<String>,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_files(&self) -> &[String] {
        &self.input_files
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn initial_term(&self) -> u32 {
        self.initial_term
    }

    fn ext_term(&self) -> u32 {
        self.ext_term
    }

    fn auto_proper(&self) -> bool {
        !self.no_proper
    }

    fn auto_backup(&self) -> bool {
        !self.no_backup
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_list("input_files", &self.input_files)?;
        validation::validate_file_extensions("input_files", &self.input_files, INPUT_EXTENSIONS)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_range("initial_term", self.initial_term, MIN_TERM_YEARS, MAX_TERM_YEARS)?;
        validation::validate_range("ext_term", self.ext_term, MIN_TERM_YEARS, MAX_TERM_YEARS)?;
        validation::validate_output_formats("formats", &self.formats)?;
        Ok(())
    }
}
