//! Bulk push/pull between collections and remote tabs.
//!
//! # Responsibility
//! - Serialize records into header-ordered rows and overwrite each tab.
//! - Rebuild typed JSON records from tab rows on pull.
//! - Flatten/re-nest habit history for its tabular form.
//!
//! # Invariants
//! - Every push rewrites every collection; there is no incremental path.
//! - Pull maps columns by header name, so reordered remote columns still load.
//! - Pulled collections only hold valid records and history of known habits.

use crate::model::collection::CollectionKind;
use crate::model::collections::Collections;
use crate::model::habit_history::{HabitDayRow, HabitHistory};
use crate::sync::backend::{SheetBackend, SheetError, SheetResult, SyncStage};
use crate::sync::sheet_schema::{decode_row, encode_row, header_row, headers_for, HeaderField};
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Totals of one bulk push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushReport {
    pub sheets_written: usize,
    pub rows_written: usize,
}

pub struct SheetSyncService {
    backend: Arc<dyn SheetBackend>,
}

impl SheetSyncService {
    pub fn new(backend: Arc<dyn SheetBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn SheetBackend> {
        &self.backend
    }

    pub fn is_authenticated(&self) -> bool {
        self.backend.is_authenticated()
    }

    /// Overwrites `sheet` with a header row followed by one row per record.
    pub fn sync_data_to_sheet(
        &self,
        sheet: &str,
        records: &[Value],
        headers: &[HeaderField],
    ) -> SheetResult<()> {
        let mut rows = Vec::with_capacity(records.len() + 1);
        rows.push(header_row(headers));
        rows.extend(records.iter().map(|record| encode_row(record, headers)));
        self.backend.write_range(sheet, &rows)
    }

    /// Reads `sheet` and rebuilds one JSON object per non-blank data row.
    pub fn load_data_from_sheet(
        &self,
        sheet: &str,
        headers: &[HeaderField],
    ) -> SheetResult<Vec<Value>> {
        let mut rows = self.backend.read_range(sheet)?.into_iter();
        let Some(first) = rows.next() else {
            return Ok(Vec::new());
        };

        let positions = column_positions(&first, headers);
        let data_rows: Box<dyn Iterator<Item = Vec<String>>> = match positions {
            Some(_) => Box::new(rows),
            // No recognizable header: treat the first row as data.
            None => {
                warn!("event=sheet_pull module=sync status=fallback sheet={sheet} reason=missing_header");
                Box::new(std::iter::once(first).chain(rows))
            }
        };

        Ok(data_rows
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| match &positions {
                Some(positions) => decode_row(&align_cells(&row, positions), headers),
                None => decode_row(&row, headers),
            })
            .collect())
    }

    /// Pushes every collection to its tab.
    pub fn push_all(&self, collections: &Collections) -> SheetResult<PushReport> {
        let started_at = Instant::now();
        let mut report = PushReport::default();

        for kind in CollectionKind::ALL {
            let records = export_records(collections, kind)?;
            self.sync_data_to_sheet(kind.sheet_name(), &records, headers_for(kind))?;
            report.sheets_written += 1;
            report.rows_written += records.len();
            debug!(
                "event=sheet_push module=sync status=ok collection={kind} rows={}",
                records.len()
            );
        }

        debug!(
            "event=sheet_push_all module=sync status=ok sheets={} rows={} duration_ms={}",
            report.sheets_written,
            report.rows_written,
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Pulls every tab into a fresh `Collections`.
    ///
    /// Rows that fail record validation are dropped, as is history of habits
    /// missing from the `Habits` tab.
    pub fn pull_all(&self) -> SheetResult<Collections> {
        let mut collections = Collections::default();
        for kind in CollectionKind::ALL {
            let records = self.load_data_from_sheet(kind.sheet_name(), headers_for(kind))?;
            import_records(&mut collections, kind, records)?;
            let dropped = collections.drop_invalid(kind);
            if dropped > 0 {
                warn!(
                    "event=sheet_pull module=sync status=skip collection={kind} dropped={dropped} reason=invalid_record"
                );
            }
        }
        let orphans = collections.drop_orphan_history();
        if orphans > 0 {
            warn!(
                "event=sheet_pull module=sync status=skip collection=habitHistory dropped={orphans} reason=unknown_habit"
            );
        }
        Ok(collections)
    }
}

fn export_records(collections: &Collections, kind: CollectionKind) -> SheetResult<Vec<Value>> {
    if kind == CollectionKind::HabitHistory {
        return collections
            .habit_history
            .to_rows()
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| invalid_data(SyncStage::Push, kind, &err));
    }

    match collections.to_document(kind) {
        Ok(Value::Array(records)) => Ok(records),
        Ok(_) => Ok(Vec::new()),
        Err(err) => Err(invalid_data(SyncStage::Push, kind, &err)),
    }
}

fn import_records(
    collections: &mut Collections,
    kind: CollectionKind,
    records: Vec<Value>,
) -> SheetResult<()> {
    if kind == CollectionKind::HabitHistory {
        let rows = records
            .into_iter()
            .filter_map(|record| serde_json::from_value::<HabitDayRow>(record).ok())
            .collect::<Vec<_>>();
        collections.habit_history = HabitHistory::from_rows(rows);
        return Ok(());
    }

    let records = records
        .into_iter()
        .filter(|record| {
            record
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|id| !id.trim().is_empty())
        })
        .collect::<Vec<_>>();
    collections
        .load_document(kind, Value::Array(records))
        .map_err(|err| invalid_data(SyncStage::Pull, kind, &err))
}

fn column_positions(header: &[String], headers: &[HeaderField]) -> Option<Vec<Option<usize>>> {
    let positions = headers
        .iter()
        .map(|field| header.iter().position(|cell| cell.trim() == field.key))
        .collect::<Vec<_>>();
    positions.iter().any(Option::is_some).then_some(positions)
}

fn align_cells(row: &[String], positions: &[Option<usize>]) -> Vec<String> {
    positions
        .iter()
        .map(|position| {
            position
                .and_then(|index| row.get(index))
                .cloned()
                .unwrap_or_default()
        })
        .collect()
}

fn invalid_data(stage: SyncStage, kind: CollectionKind, err: &serde_json::Error) -> SheetError {
    SheetError::new(
        "sheet_sync",
        stage,
        "invalid_data",
        format!("{} rows could not be mapped: {err}", kind.sheet_name()),
        false,
    )
}
