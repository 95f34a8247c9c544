//! Google Sheets v4 backend over the values API.
//!
//! # Responsibility
//! - Bind a signed-in account to one spreadsheet and make sure every
//!   collection tab exists.
//! - Translate whole-tab writes into `values:clear` + `values.update` calls.
//!
//! # Invariants
//! - Values are written with `valueInputOption=RAW` so dates and ids stay text.
//! - A 401 response drops the session; the caller has to sign in again.

use crate::model::collection::CollectionKind;
use crate::sync::backend::{
    SheetAccount, SheetAuthRequest, SheetBackend, SheetError, SheetResult, SyncStage,
};
use log::{info, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const BACKEND_ID: &str = "google_sheets";
const SPREADSHEET_TITLE: &str = "Lifeboard";

pub const DEFAULT_API_BASE_URL: &str = "https://sheets.googleapis.com";

#[derive(Debug, Clone)]
struct Session {
    access_token: String,
    account: SheetAccount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetMeta {
    spreadsheet_id: String,
    spreadsheet_url: Option<String>,
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct GoogleSheetsBackend {
    client: Client,
    api_base_url: String,
    session: Mutex<Option<Session>>,
}

impl GoogleSheetsBackend {
    /// Builds a backend talking to `api_base_url` with a per-request timeout.
    pub fn new(api_base_url: impl Into<String>, request_timeout: Duration) -> SheetResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| transport_error(SyncStage::Auth, &err))?;
        Ok(Self {
            client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            session: Mutex::new(None),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn active_session(&self, stage: SyncStage) -> SheetResult<Session> {
        self.lock()
            .clone()
            .ok_or_else(|| SheetError::not_authenticated(BACKEND_ID, stage))
    }

    fn spreadsheet_url(&self, sheet_id: &str) -> String {
        format!("{}/v4/spreadsheets/{sheet_id}", self.api_base_url)
    }

    fn send(
        &self,
        stage: SyncStage,
        request: RequestBuilder,
    ) -> SheetResult<reqwest::blocking::Response> {
        let response = request
            .send()
            .map_err(|err| transport_error(stage, &err))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            *self.lock() = None;
        }
        let body = response.text().unwrap_or_default();
        Err(http_error(stage, status, &body))
    }

    fn create_spreadsheet(&self, access_token: &str) -> SheetResult<SpreadsheetMeta> {
        let request = self
            .client
            .post(format!("{}/v4/spreadsheets", self.api_base_url))
            .bearer_auth(access_token)
            .json(&json!({ "properties": { "title": SPREADSHEET_TITLE } }));
        let response = self.send(SyncStage::Auth, request)?;
        response
            .json::<SpreadsheetMeta>()
            .map_err(|err| decode_error(SyncStage::Auth, &err))
    }

    fn fetch_spreadsheet(
        &self,
        access_token: &str,
        sheet_id: &str,
    ) -> SheetResult<SpreadsheetMeta> {
        let request = self
            .client
            .get(self.spreadsheet_url(sheet_id))
            .query(&[("fields", "spreadsheetId,spreadsheetUrl,sheets.properties.title")])
            .bearer_auth(access_token);
        let response = self.send(SyncStage::Auth, request)?;
        response
            .json::<SpreadsheetMeta>()
            .map_err(|err| decode_error(SyncStage::Auth, &err))
    }

    fn ensure_tabs(&self, access_token: &str, meta: &SpreadsheetMeta) -> SheetResult<()> {
        let missing = CollectionKind::ALL
            .iter()
            .map(|kind| kind.sheet_name())
            .filter(|name| {
                !meta
                    .sheets
                    .iter()
                    .any(|sheet| sheet.properties.title == *name)
            })
            .collect::<Vec<_>>();
        if missing.is_empty() {
            return Ok(());
        }

        let requests = missing
            .iter()
            .map(|title| json!({ "addSheet": { "properties": { "title": title } } }))
            .collect::<Vec<_>>();
        let request = self
            .client
            .post(format!(
                "{}:batchUpdate",
                self.spreadsheet_url(&meta.spreadsheet_id)
            ))
            .bearer_auth(access_token)
            .json(&json!({ "requests": requests }));
        self.send(SyncStage::Auth, request)?;
        info!(
            "event=sheet_tabs_created module=sync status=ok backend={BACKEND_ID} count={}",
            missing.len()
        );
        Ok(())
    }
}

impl SheetBackend for GoogleSheetsBackend {
    fn backend_id(&self) -> &str {
        BACKEND_ID
    }

    fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    fn authenticate(&self, request: &SheetAuthRequest) -> SheetResult<SheetAccount> {
        let access_token = request.access_token.trim();
        if access_token.is_empty() {
            return Err(SheetError::new(
                BACKEND_ID,
                SyncStage::Auth,
                "invalid_credentials",
                "Access token is empty.",
                false,
            ));
        }

        let meta = match request.spreadsheet_id.as_deref().map(str::trim) {
            Some(sheet_id) if !sheet_id.is_empty() => {
                self.fetch_spreadsheet(access_token, sheet_id)?
            }
            _ => self.create_spreadsheet(access_token)?,
        };
        self.ensure_tabs(access_token, &meta)?;

        let sheet_url = meta.spreadsheet_url.clone().unwrap_or_else(|| {
            format!(
                "https://docs.google.com/spreadsheets/d/{}",
                meta.spreadsheet_id
            )
        });
        let account = SheetAccount {
            email: request.email.clone(),
            sheet_id: meta.spreadsheet_id,
            sheet_url,
        };
        *self.lock() = Some(Session {
            access_token: access_token.to_string(),
            account: account.clone(),
        });
        Ok(account)
    }

    fn sign_out(&self) {
        *self.lock() = None;
    }

    fn write_range(&self, sheet: &str, rows: &[Vec<String>]) -> SheetResult<()> {
        let session = self.active_session(SyncStage::Push)?;
        let base = self.spreadsheet_url(&session.account.sheet_id);

        let clear = self
            .client
            .post(format!("{base}/values/{sheet}:clear"))
            .bearer_auth(&session.access_token)
            .json(&json!({}));
        self.send(SyncStage::Push, clear)?;

        if rows.is_empty() {
            return Ok(());
        }
        let range = format!("{sheet}!A1");
        let update = self
            .client
            .put(format!("{base}/values/{range}"))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&session.access_token)
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": rows,
            }));
        self.send(SyncStage::Push, update)?;
        Ok(())
    }

    fn read_range(&self, sheet: &str) -> SheetResult<Vec<Vec<String>>> {
        let session = self.active_session(SyncStage::Pull)?;
        let request = self
            .client
            .get(format!(
                "{}/values/{sheet}",
                self.spreadsheet_url(&session.account.sheet_id)
            ))
            .bearer_auth(&session.access_token);

        let response = match self.send(SyncStage::Pull, request) {
            Ok(response) => response,
            // Unknown tab: nothing was ever pushed there.
            Err(err) if err.code == "http_400" => {
                warn!(
                    "event=sheet_read module=sync status=skip backend={BACKEND_ID} sheet={sheet} reason=missing_tab"
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };
        let range = response
            .json::<ValueRange>()
            .map_err(|err| decode_error(SyncStage::Pull, &err))?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn transport_error(stage: SyncStage, err: &reqwest::Error) -> SheetError {
    let code = if err.is_timeout() { "timeout" } else { "transport" };
    SheetError::new(BACKEND_ID, stage, code, err.to_string(), true)
}

fn decode_error(stage: SyncStage, err: &reqwest::Error) -> SheetError {
    SheetError::new(BACKEND_ID, stage, "invalid_response", err.to_string(), false)
}

fn http_error(stage: SyncStage, status: StatusCode, body: &str) -> SheetError {
    let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    SheetError::new(
        BACKEND_ID,
        stage,
        format!("http_{}", status.as_u16()),
        message,
        retryable,
    )
}
