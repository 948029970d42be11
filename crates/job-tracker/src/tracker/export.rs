use super::domain::Application;
use crate::sync::sheets::{application_row, HEADER_ROW};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv buffer: {0}")]
    Flush(String),
}

/// Render applications with the same columns as the tracker spreadsheet.
pub fn applications_csv(applications: &[Application]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER_ROW)?;
    for application in applications {
        writer.write_record(application_row(application))?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.error().to_string()))
}
