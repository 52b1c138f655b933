use crate::utils::error::{Result, SheetError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_dir(&self) -> &str;
    fn formats(&self) -> &[ExportFormat];
    fn bundle(&self) -> bool;
    fn pdf_options(&self) -> &PdfOptions;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Pdf];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(SheetError::InvalidConfigValueError {
                field: "format".to_string(),
                value: s.to_string(),
                reason: "Supported formats: csv, pdf".to_string(),
            }),
        }
    }
}

/// Typography and metadata of the rendered sheet. Sizes are in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfOptions {
    pub author: Option<String>,
    pub title_font_size: i64,
    pub heading_font_size: i64,
    pub body_font_size: i64,
}

pub const MIN_FONT_SIZE: i64 = 6;
pub const MAX_FONT_SIZE: i64 = 24;

impl PdfOptions {
    /// The same options with every font size pulled into the printable range.
    pub fn clamped(&self) -> Self {
        let clamp = |size: i64| size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        Self {
            author: self.author.clone(),
            title_font_size: clamp(self.title_font_size),
            heading_font_size: clamp(self.heading_font_size),
            body_font_size: clamp(self.body_font_size),
        }
    }
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            author: None,
            title_font_size: 14,
            heading_font_size: 12,
            body_font_size: 10,
        }
    }
}
