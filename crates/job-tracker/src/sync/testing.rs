use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::mailbox::{FetchedMessage, MailboxError, MailboxGateway};
use super::sheets::{SpreadsheetError, SpreadsheetGateway};

/// Spreadsheet double that keeps every sheet's rows in memory.
#[derive(Default)]
pub(crate) struct RecordingSpreadsheet {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    created: Mutex<Vec<(String, Vec<String>)>>,
    updated: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSpreadsheet {
    pub(crate) fn with_sheet(id: &str) -> Self {
        let double = Self::default();
        double
            .sheets
            .lock()
            .expect("sheets mutex poisoned")
            .insert(id.to_string(), vec![vec!["ID".to_string()]]);
        double
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn rows(&self, id: &str) -> Vec<Vec<String>> {
        self.sheets
            .lock()
            .expect("sheets mutex poisoned")
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn created(&self) -> Vec<(String, Vec<String>)> {
        self.created.lock().expect("created mutex poisoned").clone()
    }

    pub(crate) fn updated_ranges(&self) -> Vec<String> {
        self.updated.lock().expect("updated mutex poisoned").clone()
    }

    fn check(&self) -> Result<(), SpreadsheetError> {
        if self.fail {
            Err(SpreadsheetError::Backend("quota exceeded".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SpreadsheetGateway for RecordingSpreadsheet {
    async fn create_spreadsheet(
        &self,
        title: &str,
        _sheet: &str,
        header: &[&str],
    ) -> Result<String, SpreadsheetError> {
        self.check()?;
        let mut created = self.created.lock().expect("created mutex poisoned");
        let header: Vec<String> = header.iter().map(|cell| cell.to_string()).collect();
        created.push((title.to_string(), header.clone()));
        let id = format!("sheet-{}", created.len());
        self.sheets
            .lock()
            .expect("sheets mutex poisoned")
            .insert(id.clone(), vec![header]);
        Ok(id)
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        _range: &str,
        row: Vec<String>,
    ) -> Result<(), SpreadsheetError> {
        self.check()?;
        self.sheets
            .lock()
            .expect("sheets mutex poisoned")
            .entry(spreadsheet_id.to_string())
            .or_default()
            .push(row);
        Ok(())
    }

    async fn read_column(
        &self,
        spreadsheet_id: &str,
        _range: &str,
    ) -> Result<Vec<String>, SpreadsheetError> {
        self.check()?;
        Ok(self
            .rows(spreadsheet_id)
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or_default())
            .collect())
    }

    async fn update_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), SpreadsheetError> {
        self.check()?;
        // "Applications!A{n}:I{n}"
        let index: usize = range
            .rsplit_once(":I")
            .and_then(|(_, n)| n.parse().ok())
            .expect("range carries a row number");
        let mut sheets = self.sheets.lock().expect("sheets mutex poisoned");
        let rows = sheets
            .get_mut(spreadsheet_id)
            .expect("spreadsheet exists");
        rows[index - 1] = row;
        self.updated
            .lock()
            .expect("updated mutex poisoned")
            .push(range.to_string());
        Ok(())
    }
}

/// Mailbox double returning a canned result set and recording queries.
#[derive(Default)]
pub(crate) struct CannedMailbox {
    messages: Vec<FetchedMessage>,
    queries: Mutex<Vec<String>>,
    fail: bool,
}

impl CannedMailbox {
    pub(crate) fn new(messages: Vec<FetchedMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries mutex poisoned").clone()
    }
}

#[async_trait]
impl MailboxGateway for CannedMailbox {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<FetchedMessage>, MailboxError> {
        self.queries
            .lock()
            .expect("queries mutex poisoned")
            .push(query.to_string());
        if self.fail {
            return Err(MailboxError::Backend("invalid credentials".to_string()));
        }
        Ok(self
            .messages
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }
}
