use crate::core::{csv_codec, pdf_writer, point_buy, ValidationReport};
use crate::domain::form::FormState;
use crate::domain::model::CharacterSheet;
use crate::domain::ports::{ConfigProvider, ExportFormat, Storage};
use crate::utils::error::{Result, SheetError};
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

/// Where a sheet file comes from, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetSource {
    /// A `Feld,Wert` export.
    Csv,
    /// A TOML form draft.
    Draft,
}

impl SheetSource {
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(SheetSource::Csv),
            Some("toml") => Ok(SheetSource::Draft),
            _ => Err(SheetError::UnsupportedFormat {
                path: path.to_string(),
            }),
        }
    }
}

pub struct SheetEngine<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> SheetEngine<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Reads a sheet from a CSV export or rebuilds it from a form draft.
    pub async fn load(&self, path: &str) -> Result<CharacterSheet> {
        let source = SheetSource::from_path(path)?;
        tracing::debug!("Loading {:?} sheet from {}", source, path);

        let data = self.storage.read_file(path).await?;
        let sheet = match source {
            SheetSource::Csv => csv_codec::decode(&data)?,
            SheetSource::Draft => {
                let text = String::from_utf8(data).map_err(|e| SheetError::FormError {
                    field: path.to_string(),
                    message: format!("draft is not valid UTF-8: {}", e),
                })?;
                FormState::from_toml_str(&text)?.build()?
            }
        };

        tracing::info!("📄 Loaded '{}' ({}) from {}", sheet.name, sheet.hero_class, path);
        Ok(sheet)
    }

    pub async fn write_draft(&self, path: &str, form: &FormState) -> Result<()> {
        let text = form.to_toml_string()?;
        self.storage.write_file(path, text.as_bytes()).await?;
        tracing::info!("📝 Draft written to {}", path);
        Ok(())
    }

    pub fn check(&self, sheet: &CharacterSheet) -> ValidationReport {
        let report = point_buy::check(sheet);
        report.log(&sheet.name);
        report
    }

    pub fn encode(&self, sheet: &CharacterSheet, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Csv => csv_codec::encode(sheet),
            ExportFormat::Pdf => pdf_writer::render(sheet, self.config.pdf_options()),
        }
    }

    /// Writes the configured formats to the output directory and returns the
    /// written paths. Warnings never stop an export.
    pub async fn export(&self, sheet: &CharacterSheet) -> Result<Vec<String>> {
        let stem = sheet.file_stem();

        let mut formats: Vec<ExportFormat> = Vec::new();
        for &format in self.config.formats() {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }

        let mut files = Vec::with_capacity(formats.len());
        for format in formats {
            let name = format!("{}.{}", stem, format.extension());
            files.push((name, self.encode(sheet, format)?));
        }

        if self.config.bundle() {
            let name = format!("{}.zip", stem);
            let data = bundle(&files)?;
            files = vec![(name, data)];
        }

        let mut written = Vec::with_capacity(files.len());
        for (name, data) in files {
            let path = Path::new(self.config.output_dir())
                .join(&name)
                .to_string_lossy()
                .into_owned();
            tracing::debug!("Writing {} ({} bytes)", path, data.len());
            self.storage.write_file(&path, &data).await?;
            written.push(path);
        }

        Ok(written)
    }
}

fn bundle(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (name, data) in files {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_path() {
        assert_eq!(SheetSource::from_path("kim.csv").unwrap(), SheetSource::Csv);
        assert_eq!(SheetSource::from_path("dir/kim.CSV").unwrap(), SheetSource::Csv);
        assert_eq!(SheetSource::from_path("kim.toml").unwrap(), SheetSource::Draft);
        assert!(matches!(
            SheetSource::from_path("kim.pdf"),
            Err(SheetError::UnsupportedFormat { .. })
        ));
        assert!(SheetSource::from_path("kim").is_err());
    }

    #[test]
    fn test_bundle_contains_all_files() {
        let files = vec![
            ("a.csv".to_string(), b"Feld,Wert\r\n".to_vec()),
            ("a.pdf".to_string(), b"%PDF-1.5".to_vec()),
        ];
        let data = bundle(&files).unwrap();

        let archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(archive.len(), 2);
        assert!(names.contains(&"a.csv"));
        assert!(names.contains(&"a.pdf"));
    }
}
