pub mod csv_codec;
pub mod engine;
pub mod pdf_layout;
pub mod pdf_writer;
pub mod point_buy;

pub use crate::domain::model::CharacterSheet;
pub use crate::domain::ports::{ConfigProvider, ExportFormat, PdfOptions, Storage};
pub use crate::utils::error::Result;
pub use point_buy::{RuleWarning, ValidationReport};
