use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Draft parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("PDF rendering error: {0}")]
    PdfError(#[from] lopdf::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Form error in '{field}': {message}")]
    FormError { field: String, message: String },

    #[error("Missing columns, expected {expected}")]
    MissingColumns { expected: String },

    #[error("Missing row '{field}'")]
    MissingField { field: String },

    #[error("Invalid value in row '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Unknown {kind}: '{name}'")]
    UnknownName { kind: &'static str, name: String },

    #[error("Unsupported sheet format: {path}")]
    UnsupportedFormat { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Import,
    Form,
    Config,
    Io,
    Render,
}

impl SheetError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SheetError::CsvError(_)
            | SheetError::SerializationError(_)
            | SheetError::MissingColumns { .. }
            | SheetError::MissingField { .. }
            | SheetError::InvalidField { .. }
            | SheetError::UnknownName { .. }
            | SheetError::UnsupportedFormat { .. } => ErrorCategory::Import,
            SheetError::FormError { .. }
            | SheetError::TomlError(_)
            | SheetError::TomlSerializeError(_) => ErrorCategory::Form,
            SheetError::ConfigError { .. }
            | SheetError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            SheetError::IoError(_) => ErrorCategory::Io,
            SheetError::PdfError(_) | SheetError::ZipError(_) => ErrorCategory::Render,
        }
    }

    /// The single message shown to the user.
    pub fn user_friendly_message(&self) -> String {
        match self {
            SheetError::MissingColumns { .. } => {
                "⚠️ Fehler: Die hochgeladene Datei hat nicht die richtigen Spalten!".to_string()
            }
            _ => match self.category() {
                ErrorCategory::Import => format!("⚠️ Fehler beim Verarbeiten der Datei: {}", self),
                ErrorCategory::Form => format!("⚠️ Fehler im Heldenbogen: {}", self),
                ErrorCategory::Config => format!("⚠️ Fehler in der Konfiguration: {}", self),
                ErrorCategory::Io => format!("⚠️ Datei konnte nicht gelesen oder geschrieben werden: {}", self),
                ErrorCategory::Render => format!("⚠️ Export fehlgeschlagen: {}", self),
            },
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Import => "Exportiere den Charakter erneut und lade die unveränderte CSV-Datei hoch",
            ErrorCategory::Form => "Prüfe die Namen von Heldenklasse, Attributen und Fähigkeiten im Entwurf",
            ErrorCategory::Config => "Prüfe die Konfigurationsdatei (TOML) auf Tippfehler",
            ErrorCategory::Io => "Prüfe Pfad und Zugriffsrechte",
            ErrorCategory::Render => "Versuche den Export erneut",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Import | ErrorCategory::Form => 1,
            ErrorCategory::Config => 2,
            ErrorCategory::Io | ErrorCategory::Render => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
