use crate::config::{INPUT_EXTENSIONS, MAX_TERM_YEARS, MIN_TERM_YEARS};
use crate::core::ConfigProvider;
use crate::domain::services::dates::parse_date;
use crate::domain::services::royalty::{
    FeeRates, FeeTable, RenewalPolicy, RoyaltyCalculator, DEFAULT_RENEWAL_RATIO,
    DEFAULT_SHORT_USAGE_SECONDS,
};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub terms: TermsConfig,
    pub royalty: RoyaltyConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_files: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermsConfig {
    pub initial_term: Option<u32>,
    pub ext_term: Option<u32>,
    /// dd/mm/YYYY；未設定時使用今天
    pub as_of: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoyaltyConfig {
    pub short_usage_seconds: Option<u32>,
    pub renewal_ratio: Option<f64>,
    pub renewal_policy: Option<RenewalPolicy>,
    #[serde(default)]
    pub rates: Vec<FeeRateEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeRateEntry {
    pub usage_type: String,
    pub full: i64,
    pub half: i64,
    #[serde(default)]
    pub renew: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_file: Option<String>,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
    pub auto_backup: Option<bool>,
}

fn default_output_formats() -> Vec<String> {
    vec!["xlsx".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_file: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${INPUT_DIR})；未定義的變數保留原文
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_non_empty_list("source.input_files", &self.source.input_files)?;
        validation::validate_file_extensions(
            "source.input_files",
            &self.source.input_files,
            INPUT_EXTENSIONS,
        )?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        if let Some(name) = &self.load.output_file {
            validation::validate_file_extensions(
                "load.output_file",
                std::slice::from_ref(name),
                &["xlsx"],
            )?;
        }
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        validation::validate_range(
            "terms.initial_term",
            self.initial_term(),
            MIN_TERM_YEARS,
            MAX_TERM_YEARS,
        )?;
        validation::validate_range("terms.ext_term", self.ext_term(), MIN_TERM_YEARS, MAX_TERM_YEARS)?;
        if let Some(as_of) = &self.terms.as_of {
            if parse_date(as_of).is_none() {
                return Err(EtlError::InvalidConfigValueError {
                    field: "terms.as_of".to_string(),
                    value: as_of.clone(),
                    reason: "Expected a date such as 19/10/2026".to_string(),
                });
            }
        }

        validation::validate_range("royalty.renewal_ratio", self.renewal_ratio(), 0.0, 1.0)?;
        validation::validate_non_empty_list("royalty.rates", &self.royalty.rates)?;
        self.fee_table()?;

        Ok(())
    }

    /// 由 `[[royalty.rates]]` 建立費率表
    pub fn fee_table(&self) -> Result<FeeTable> {
        let mut table = FeeTable::new();
        for entry in &self.royalty.rates {
            table
                .insert(
                    &entry.usage_type,
                    FeeRates {
                        full: entry.full,
                        half: entry.half,
                        renew: entry.renew,
                    },
                )
                .map_err(|e| EtlError::ConfigValidationError {
                    field: "royalty.rates".to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(table)
    }

    pub fn calculator(&self) -> Result<RoyaltyCalculator> {
        Ok(RoyaltyCalculator::new(self.fee_table()?)
            .with_short_usage_seconds(self.short_usage_seconds())
            .with_renewal(self.renewal_policy(), self.renewal_ratio()))
    }

    pub fn short_usage_seconds(&self) -> u32 {
        self.royalty
            .short_usage_seconds
            .unwrap_or(DEFAULT_SHORT_USAGE_SECONDS)
    }

    pub fn renewal_ratio(&self) -> f64 {
        self.royalty.renewal_ratio.unwrap_or(DEFAULT_RENEWAL_RATIO)
    }

    pub fn renewal_policy(&self) -> RenewalPolicy {
        self.royalty.renewal_policy.unwrap_or_default()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_file(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_file.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_files(&self) -> &[String] {
        &self.source.input_files
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn initial_term(&self) -> u32 {
        self.terms.initial_term.unwrap_or(2)
    }

    fn ext_term(&self) -> u32 {
        self.terms.ext_term.unwrap_or(2)
    }

    /// 費用管道讀的是已格式化的期限結果，文字欄位原樣保留
    fn auto_proper(&self) -> bool {
        false
    }

    fn auto_backup(&self) -> bool {
        self.load.auto_backup.unwrap_or(true)
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn as_of(&self) -> Option<NaiveDate> {
        self.terms.as_of.as_deref().and_then(parse_date)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[pipeline]
name = "vcpmc-royalty"
description = "Royalty fees for Q3"

[source]
input_files = ["Danh_sach_Ket_qua.xlsx"]

[terms]
initial_term = 3
as_of = "19/10/2026"

[royalty]
renewal_ratio = 0.5

[[royalty.rates]]
usage_type = "Nhạc nền"
full = 1000000
half = 500000
renew = 400000

[[royalty.rates]]
usage_type = "Karaoke"
full = 2000000
half = 1000000

[load]
output_path = "./output"
output_formats = ["xlsx", "csv"]
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.pipeline.name, "vcpmc-royalty");
        assert_eq!(config.input_files().to_vec(), vec!["Danh_sach_Ket_qua.xlsx".to_string()]);
        assert_eq!(config.initial_term(), 3);
        assert_eq!(config.ext_term(), 2);
        assert_eq!(config.as_of(), NaiveDate::from_ymd_opt(2026, 10, 19));
        assert_eq!(config.renewal_ratio(), 0.5);
        assert_eq!(config.renewal_policy(), RenewalPolicy::Ratio);
        assert_eq!(config.short_usage_seconds(), 120);
        assert!(config.auto_backup());
        assert!(!config.auto_proper());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());

        let table = config.fee_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("karaoke").unwrap().renew, 0);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ROYALTY_TEST_OUTPUT_DIR", "/tmp/royalty-out");

        let content = BASIC.replace("./output", "${ROYALTY_TEST_OUTPUT_DIR}");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.load.output_path, "/tmp/royalty-out");

        std::env::remove_var("ROYALTY_TEST_OUTPUT_DIR");
    }

    #[test]
    fn test_unknown_env_var_is_kept() {
        let content = BASIC.replace("./output", "${ROYALTY_TEST_UNSET_VAR}");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.load.output_path, "${ROYALTY_TEST_UNSET_VAR}");
    }

    #[test]
    fn test_config_validation() {
        let duplicate = BASIC.replace("usage_type = \"Karaoke\"", "usage_type = \"nhạc nền\"");
        let config = TomlConfig::from_toml_str(&duplicate).unwrap();
        assert!(config.validate().is_err());

        let bad_ratio = BASIC.replace("renewal_ratio = 0.5", "renewal_ratio = 1.5");
        let config = TomlConfig::from_toml_str(&bad_ratio).unwrap();
        assert!(config.validate().is_err());

        let bad_date = BASIC.replace("as_of = \"19/10/2026\"", "as_of = \"soon\"");
        let config = TomlConfig::from_toml_str(&bad_date).unwrap();
        assert!(config.validate().is_err());

        let bad_input = BASIC.replace("Danh_sach_Ket_qua.xlsx", "notes.txt");
        let config = TomlConfig::from_toml_str(&bad_input).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = TomlConfig::from_toml_str("[pipeline\nname=").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(BASIC.as_bytes()).unwrap();
        let config = TomlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.load.output_formats, vec!["xlsx", "csv"]);
    }
}
