use crate::core::{ConfigProvider, ExportFormat, PdfOptions};
use crate::domain::ports::{MAX_FONT_SIZE, MIN_FONT_SIZE};
use crate::utils::error::{Result, SheetError};
use crate::utils::validation::{
    validate_non_empty_list, validate_one_of, validate_path, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_OUTPUT_DIR: &str = "charaktere";
pub const LOG_FORMATS: [&str; 2] = ["compact", "json"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub pdf: PdfOptions,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub formats: Vec<ExportFormat>,
    pub bundle: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_OUTPUT_DIR.to_string(),
            formats: ExportFormat::ALL.to_vec(),
            bundle: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "compact".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SheetError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Like `from_file`, but a missing file means defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "No config at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SheetError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SheetError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("output.directory", &self.output.directory)?;
        validate_non_empty_list("output.formats", &self.output.formats)?;

        validate_range(
            "pdf.title_font_size",
            self.pdf.title_font_size,
            MIN_FONT_SIZE,
            MAX_FONT_SIZE,
        )?;
        validate_range(
            "pdf.heading_font_size",
            self.pdf.heading_font_size,
            MIN_FONT_SIZE,
            MAX_FONT_SIZE,
        )?;
        validate_range(
            "pdf.body_font_size",
            self.pdf.body_font_size,
            MIN_FONT_SIZE,
            MAX_FONT_SIZE,
        )?;

        validate_one_of("logging.format", &self.logging.format, &LOG_FORMATS)?;

        Ok(())
    }

    pub fn json_logging(&self) -> bool {
        self.logging.format == "json"
    }
}

impl ConfigProvider for AppConfig {
    fn output_dir(&self) -> &str {
        &self.output.directory
    }

    fn formats(&self) -> &[ExportFormat] {
        &self.output.formats
    }

    fn bundle(&self) -> bool {
        self.output.bundle
    }

    fn pdf_options(&self) -> &PdfOptions {
        &self.pdf
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.output_dir(), "charaktere");
        assert_eq!(config.formats(), &[ExportFormat::Csv, ExportFormat::Pdf]);
        assert!(!config.bundle());
        assert_eq!(config.pdf_options().body_font_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[output]
directory = "./export"
formats = ["pdf"]
bundle = true

[pdf]
author = "Spielleitung"
body_font_size = 11

[logging]
format = "json"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.output_dir(), "./export");
        assert_eq!(config.formats(), &[ExportFormat::Pdf]);
        assert!(config.bundle());
        assert_eq!(config.pdf.author.as_deref(), Some("Spielleitung"));
        assert_eq!(config.pdf.body_font_size, 11);
        assert_eq!(config.pdf.heading_font_size, 12);
        assert!(config.json_logging());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HELDENBOGEN_TEST_OUTPUT", "/tmp/helden");

        let config = AppConfig::from_toml_str(
            r#"
[output]
directory = "${HELDENBOGEN_TEST_OUTPUT}"
"#,
        )
        .unwrap();
        assert_eq!(config.output.directory, "/tmp/helden");

        std::env::remove_var("HELDENBOGEN_TEST_OUTPUT");
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let result = AppConfig::from_toml_str(
            r#"
[output]
formats = ["docx"]
"#,
        );
        assert!(matches!(result, Err(SheetError::ConfigError { .. })));
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.pdf.body_font_size = 2;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.output.formats.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\ndirectory = \"aus_datei\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.directory, "aus_datei");
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let config = AppConfig::load_or_default("/nonexistent/heldenbogen.toml").unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
