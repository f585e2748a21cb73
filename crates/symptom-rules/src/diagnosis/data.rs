use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Input data snapshot that rules are evaluated against.
///
/// Mapping-like inputs are JSON objects and are looked up by key. Structs enter through
/// [`Snapshot::from_record`], which exposes their fields as keys. Every other shape answers
/// lookups with "absent" instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Value);

impl Snapshot {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Captures the serialized fields of an attribute-bearing record.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(record).map(Self)
    }

    /// Fetches a field, returning `None` for missing fields and unsupported shapes.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match &self.0 {
            Value::Object(map) => map.get(name),
            _ => None,
        }
    }

    pub fn is_truthy(&self, name: &str) -> bool {
        self.field(name).map(is_truthy).unwrap_or(false)
    }

    /// Numeric view of a field. Booleans count as 1 and 0.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(numeric)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }
}

impl From<Value> for Snapshot {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Map<String, Value>> for Snapshot {
    fn from(map: Map<String, Value>) -> Self {
        Self(Value::Object(map))
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

pub(crate) fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Reads one snapshot per CSV row, keyed by the header row.
pub fn snapshots_from_csv<R: Read>(reader: R) -> Result<Vec<Snapshot>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut snapshots = Vec::new();

    for record in csv_reader.records() {
        let row = record?;
        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| (header.to_string(), typed_cell(cell)))
            .collect::<Map<String, Value>>();
        snapshots.push(Snapshot::from(fields));
    }

    Ok(snapshots)
}

fn typed_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }

    match cell.to_ascii_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(integer) = cell.parse::<i64>() {
        return Value::from(integer);
    }

    cell.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}
