//! Header specs and row codecs for the remote tabs.
//!
//! Each collection maps to one tab with a fixed, ordered header row. Cells
//! travel as strings; the header's field type decides how a cell is rebuilt
//! into JSON on pull.

use crate::model::collection::CollectionKind;
use serde_json::{Map, Number, Value};

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// Arrays/maps carried as JSON text in one cell.
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderField {
    pub key: &'static str,
    pub field_type: FieldType,
}

const fn text(key: &'static str) -> HeaderField {
    HeaderField {
        key,
        field_type: FieldType::String,
    }
}

const fn number(key: &'static str) -> HeaderField {
    HeaderField {
        key,
        field_type: FieldType::Number,
    }
}

const fn flag(key: &'static str) -> HeaderField {
    HeaderField {
        key,
        field_type: FieldType::Boolean,
    }
}

const fn object(key: &'static str) -> HeaderField {
    HeaderField {
        key,
        field_type: FieldType::Object,
    }
}

const TASK_HEADERS: &[HeaderField] = &[
    text("id"),
    text("text"),
    text("date"),
    text("time"),
    text("priority"),
    text("category"),
    flag("completed"),
    text("completedDate"),
    flag("notDone"),
    text("createdAt"),
    text("updatedAt"),
];

const EXPENSE_HEADERS: &[HeaderField] = &[
    text("id"),
    number("amount"),
    text("category"),
    text("description"),
    text("date"),
    text("paymentMethod"),
    text("createdAt"),
    text("updatedAt"),
];

const NOTE_HEADERS: &[HeaderField] = &[
    text("id"),
    text("title"),
    text("content"),
    text("color"),
    flag("pinned"),
    object("tags"),
    text("createdAt"),
    text("updatedAt"),
];

const HABIT_HEADERS: &[HeaderField] = &[
    text("id"),
    text("name"),
    text("frequency"),
    number("target"),
    text("color"),
    text("icon"),
    text("createdAt"),
    text("updatedAt"),
];

const HABIT_HISTORY_HEADERS: &[HeaderField] = &[text("habitId"), text("date"), flag("completed")];

const MEAL_HEADERS: &[HeaderField] = &[
    text("id"),
    text("name"),
    text("mealType"),
    number("calories"),
    text("date"),
    text("notes"),
    text("createdAt"),
    text("updatedAt"),
];

const CALL_REMINDER_HEADERS: &[HeaderField] = &[
    text("id"),
    text("name"),
    text("phone"),
    text("date"),
    text("time"),
    text("notes"),
    flag("completed"),
    text("completedAt"),
    text("createdAt"),
    text("updatedAt"),
];

const BUCKET_LIST_HEADERS: &[HeaderField] = &[
    text("id"),
    text("title"),
    text("description"),
    text("category"),
    text("targetDate"),
    flag("completed"),
    text("completedDate"),
    text("createdAt"),
    text("updatedAt"),
];

const VISION_BOARD_HEADERS: &[HeaderField] = &[
    text("id"),
    text("title"),
    text("description"),
    text("category"),
    text("imageUrl"),
    text("createdAt"),
    text("updatedAt"),
];

const JOURNAL_HEADERS: &[HeaderField] = &[
    text("id"),
    text("date"),
    text("content"),
    text("mood"),
    text("createdAt"),
    text("updatedAt"),
];

const QUOTE_HEADERS: &[HeaderField] = &[
    text("id"),
    text("text"),
    text("author"),
    flag("favorite"),
    text("createdAt"),
    text("updatedAt"),
];

const ALARM_HEADERS: &[HeaderField] = &[
    text("id"),
    text("time"),
    text("label"),
    flag("enabled"),
    object("days"),
    text("sound"),
    text("createdAt"),
    text("updatedAt"),
];

const MOVIE_HEADERS: &[HeaderField] = &[
    text("id"),
    text("title"),
    text("genre"),
    flag("watched"),
    number("rating"),
    text("notes"),
    text("createdAt"),
    text("updatedAt"),
];

/// Ordered header spec of the tab backing `kind`.
pub fn headers_for(kind: CollectionKind) -> &'static [HeaderField] {
    match kind {
        CollectionKind::Tasks => TASK_HEADERS,
        CollectionKind::Expenses => EXPENSE_HEADERS,
        CollectionKind::Notes => NOTE_HEADERS,
        CollectionKind::Habits => HABIT_HEADERS,
        CollectionKind::HabitHistory => HABIT_HISTORY_HEADERS,
        CollectionKind::Meals => MEAL_HEADERS,
        CollectionKind::CallReminders | CollectionKind::CompletedCallReminders => {
            CALL_REMINDER_HEADERS
        }
        CollectionKind::BucketList => BUCKET_LIST_HEADERS,
        CollectionKind::VisionBoard => VISION_BOARD_HEADERS,
        CollectionKind::JournalEntries => JOURNAL_HEADERS,
        CollectionKind::Quotes => QUOTE_HEADERS,
        CollectionKind::Alarms => ALARM_HEADERS,
        CollectionKind::Movies => MOVIE_HEADERS,
    }
}

pub fn header_row(headers: &[HeaderField]) -> Vec<String> {
    headers.iter().map(|field| field.key.to_string()).collect()
}

/// Serializes one record into header-ordered cells; missing fields are blank.
pub fn encode_row(record: &Value, headers: &[HeaderField]) -> Vec<String> {
    headers
        .iter()
        .map(|field| encode_cell(record.get(field.key)))
        .collect()
}

/// Rebuilds one record from header-ordered cells.
///
/// Blank or unparsable cells are left out so the record type's defaults apply.
pub fn decode_row(cells: &[String], headers: &[HeaderField]) -> Value {
    let mut record = Map::new();
    for (index, field) in headers.iter().enumerate() {
        let Some(cell) = cells.get(index) else {
            break;
        };
        if let Some(value) = decode_cell(cell, field.field_type) {
            record.insert(field.key.to_string(), value);
        }
    }
    Value::Object(record)
}

fn encode_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => other.to_string(),
    }
}

fn decode_cell(cell: &str, field_type: FieldType) -> Option<Value> {
    if cell.is_empty() {
        return None;
    }
    match field_type {
        FieldType::String => Some(Value::String(cell.to_string())),
        FieldType::Number => parse_number(cell.trim()),
        FieldType::Boolean => Some(Value::Bool(matches!(
            cell.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes"
        ))),
        FieldType::Object => serde_json::from_str(cell).ok(),
    }
}

fn parse_number(cell: &str) -> Option<Value> {
    let parsed = cell.parse::<f64>().ok().filter(|value| value.is_finite())?;
    // Integral values come back as integers so `u32` fields deserialize.
    if parsed.fract() == 0.0 && parsed.abs() <= MAX_SAFE_INTEGER {
        return Some(Value::Number(Number::from(parsed as i64)));
    }
    Number::from_f64(parsed).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::{decode_row, encode_row, headers_for, FieldType, HeaderField};
    use crate::model::collection::CollectionKind;
    use crate::model::records::{Alarm, Habit};
    use serde_json::json;

    #[test]
    fn encode_follows_header_order_and_blanks_missing_fields() {
        let headers = [
            HeaderField {
                key: "b",
                field_type: FieldType::Number,
            },
            HeaderField {
                key: "a",
                field_type: FieldType::String,
            },
            HeaderField {
                key: "c",
                field_type: FieldType::Object,
            },
        ];
        let cells = encode_row(&json!({"a": "x", "b": 2.5, "c": ["mon"]}), &headers);
        assert_eq!(cells, vec!["2.5", "x", r#"["mon"]"#]);

        let cells = encode_row(&json!({"a": null}), &headers);
        assert_eq!(cells, vec!["", "", ""]);
    }

    #[test]
    fn decoded_rows_rebuild_typed_records() {
        let headers = headers_for(CollectionKind::Alarms);
        let mut alarm = Alarm::new("06:30", "Gym");
        alarm.id = "1700000000000".to_string();
        alarm.days = vec!["mon".to_string(), "wed".to_string()];
        alarm.enabled = false;

        let cells = encode_row(&serde_json::to_value(&alarm).unwrap(), headers);
        let restored: Alarm = serde_json::from_value(decode_row(&cells, headers)).unwrap();
        assert_eq!(restored, alarm);
    }

    #[test]
    fn integral_numbers_decode_as_integers() {
        let headers = headers_for(CollectionKind::Habits);
        let cells = vec![
            "1".to_string(),
            "Stretch".to_string(),
            "daily".to_string(),
            "3.0".to_string(),
        ];
        let habit: Habit = serde_json::from_value(decode_row(&cells, headers)).unwrap();
        assert_eq!(habit.target, 3);
        assert!(habit.color.is_none());
    }

    #[test]
    fn boolean_cells_accept_sheet_spellings() {
        let headers = [HeaderField {
            key: "done",
            field_type: FieldType::Boolean,
        }];
        assert_eq!(decode_row(&["TRUE".to_string()], &headers), json!({"done": true}));
        assert_eq!(decode_row(&["no".to_string()], &headers), json!({"done": false}));
        assert_eq!(decode_row(&[String::new()], &headers), json!({}));
    }
}
