use std::sync::Arc;

use async_trait::async_trait;
use google_sheets4::api::{
    CellData, ExtendedValue, GridData, GridProperties, RowData, Scope, Sheet, SheetProperties,
    Spreadsheet, SpreadsheetProperties, ValueRange,
};
use google_sheets4::Sheets;
use tracing::{debug, info};

use crate::tracker::domain::Application;

pub const SPREADSHEET_TITLE: &str = "Job Applications Tracker";
pub const SHEET_NAME: &str = "Applications";
pub const HEADER_ROW: [&str; 9] = [
    "ID",
    "Company",
    "Title",
    "Location",
    "Salary",
    "Status",
    "Applied Date",
    "Job URL",
    "Notes",
];

#[derive(Debug, thiserror::Error)]
pub enum SpreadsheetError {
    #[error("spreadsheet operation failed: {0}")]
    Backend(String),
    #[error("spreadsheet response missing {0}")]
    MissingField(&'static str),
}

/// Raw spreadsheet operations needed by [`SheetsSync`].
#[async_trait]
pub trait SpreadsheetGateway: Send + Sync {
    /// Create a spreadsheet with a single sheet whose first row is `header` (frozen).
    async fn create_spreadsheet(
        &self,
        title: &str,
        sheet: &str,
        header: &[&str],
    ) -> Result<String, SpreadsheetError>;
    async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), SpreadsheetError>;
    /// Values of a single-column range, one entry per row; blank rows are empty strings.
    async fn read_column(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<String>, SpreadsheetError>;
    async fn update_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), SpreadsheetError>;
}

/// Mirrors application records into the tracker spreadsheet, one row per application keyed by
/// the application id in column A.
#[derive(Clone)]
pub struct SheetsSync {
    gateway: Arc<dyn SpreadsheetGateway>,
}

impl std::fmt::Debug for SheetsSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsSync").finish_non_exhaustive()
    }
}

impl SheetsSync {
    pub fn new(gateway: Arc<dyn SpreadsheetGateway>) -> Self {
        Self { gateway }
    }

    /// Append `application` to `spreadsheet_id`, provisioning a spreadsheet first when none is
    /// associated. Returns the spreadsheet id that now holds the row.
    pub async fn push_new(
        &self,
        application: &Application,
        spreadsheet_id: Option<&str>,
    ) -> Result<String, SpreadsheetError> {
        let spreadsheet_id = match spreadsheet_id {
            Some(id) => id.to_string(),
            None => {
                let id = self
                    .gateway
                    .create_spreadsheet(SPREADSHEET_TITLE, SHEET_NAME, &HEADER_ROW)
                    .await?;
                info!(spreadsheet_id = %id, "provisioned tracker spreadsheet");
                id
            }
        };

        self.gateway
            .append_row(&spreadsheet_id, &full_range(), application_row(application))
            .await?;
        debug!(application_id = %application.id, %spreadsheet_id, "appended spreadsheet row");
        Ok(spreadsheet_id)
    }

    /// Overwrite the row holding `application`, appending when the row cannot be found.
    pub async fn push_update(&self, application: &Application) -> Result<String, SpreadsheetError> {
        let Some(spreadsheet_id) = application.google_sheets_id.as_deref() else {
            return self.push_new(application, None).await;
        };

        let ids = self
            .gateway
            .read_column(spreadsheet_id, &format!("{SHEET_NAME}!A:A"))
            .await?;

        match ids.iter().position(|cell| *cell == application.id.0) {
            Some(index) => {
                let row = index + 1;
                self.gateway
                    .update_row(
                        spreadsheet_id,
                        &format!("{SHEET_NAME}!A{row}:I{row}"),
                        application_row(application),
                    )
                    .await?;
                debug!(application_id = %application.id, row, "updated spreadsheet row");
                Ok(spreadsheet_id.to_string())
            }
            None => self.push_new(application, Some(spreadsheet_id)).await,
        }
    }
}

fn full_range() -> String {
    format!("{SHEET_NAME}!A:I")
}

/// Column layout shared by the spreadsheet and the CSV export.
pub fn application_row(application: &Application) -> Vec<String> {
    vec![
        application.id.0.clone(),
        application.company.clone(),
        application.title.clone(),
        application.location.clone(),
        application.salary.clone().unwrap_or_default(),
        application.status.label().to_string(),
        application.applied_date.format("%Y-%m-%d").to_string(),
        application.job_url.clone().unwrap_or_default(),
        application.notes.clone().unwrap_or_default(),
    ]
}

/// Thin wrapper around the generated google-sheets4 client.
pub struct GoogleSheetsClient<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    hub: Sheets<C>,
}

impl<C> GoogleSheetsClient<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: Sheets<C>) -> Self {
        Self { hub }
    }

    fn map_error<E: std::fmt::Display>(err: E) -> SpreadsheetError {
        SpreadsheetError::Backend(err.to_string())
    }

    fn value_range(row: Vec<String>) -> ValueRange {
        ValueRange {
            values: Some(vec![row.into_iter().map(serde_json::Value::String).collect()]),
            ..ValueRange::default()
        }
    }
}

impl<C> std::fmt::Debug for GoogleSheetsClient<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl<C> SpreadsheetGateway for GoogleSheetsClient<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    async fn create_spreadsheet(
        &self,
        title: &str,
        sheet: &str,
        header: &[&str],
    ) -> Result<String, SpreadsheetError> {
        let header_cells = header
            .iter()
            .map(|label| CellData {
                user_entered_value: Some(ExtendedValue {
                    string_value: Some(label.to_string()),
                    ..ExtendedValue::default()
                }),
                ..CellData::default()
            })
            .collect();

        let request = Spreadsheet {
            properties: Some(SpreadsheetProperties {
                title: Some(title.to_string()),
                ..SpreadsheetProperties::default()
            }),
            sheets: Some(vec![Sheet {
                properties: Some(SheetProperties {
                    title: Some(sheet.to_string()),
                    grid_properties: Some(GridProperties {
                        frozen_row_count: Some(1),
                        ..GridProperties::default()
                    }),
                    ..SheetProperties::default()
                }),
                data: Some(vec![GridData {
                    start_row: Some(0),
                    start_column: Some(0),
                    row_data: Some(vec![RowData {
                        values: Some(header_cells),
                        ..RowData::default()
                    }]),
                    ..GridData::default()
                }]),
                ..Sheet::default()
            }]),
            ..Spreadsheet::default()
        };

        let (_, created) = self
            .hub
            .spreadsheets()
            .create(request)
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await
            .map_err(Self::map_error)?;

        created
            .spreadsheet_id
            .ok_or(SpreadsheetError::MissingField("spreadsheetId"))
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), SpreadsheetError> {
        self.hub
            .spreadsheets()
            .values_append(Self::value_range(row), spreadsheet_id, range)
            .value_input_option("RAW")
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await
            .map_err(Self::map_error)?;
        Ok(())
    }

    async fn read_column(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<String>, SpreadsheetError> {
        let (_, values) = self
            .hub
            .spreadsheets()
            .values_get(spreadsheet_id, range)
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await
            .map_err(Self::map_error)?;

        Ok(values
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| match row.into_iter().next() {
                Some(serde_json::Value::String(cell)) => cell,
                Some(serde_json::Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect())
    }

    async fn update_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), SpreadsheetError> {
        self.hub
            .spreadsheets()
            .values_update(Self::value_range(row), spreadsheet_id, range)
            .value_input_option("RAW")
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await
            .map_err(Self::map_error)?;
        Ok(())
    }
}
