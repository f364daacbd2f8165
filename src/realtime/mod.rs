use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

mod feed;
mod pass;
pub use feed::*;
pub use pass::Pass;
use pass::RawPass;

const PASSES_KEY: &str = "Passes";
const STATUS_PASSED: &str = "PASSED";

/// Top-level keys that are payload metadata rather than stop entries.
const META_KEYS: [&str; 1] = ["stopareacode"];

#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("stop entry {0} matches neither recognized payload shape")]
    UnrecognizedStop(String),
}

/// Optional constraints applied while flattening a payload. A `None` field
/// means no constraint.
#[derive(Debug, Clone, Default)]
pub struct PassFilter {
    /// Exact match on the public line number.
    pub line: Option<String>,
    /// Case-insensitive substring match on the destination name.
    pub destination: Option<String>,
}

impl PassFilter {
    pub fn new(line: Option<String>, destination: Option<String>) -> Self {
        Self { line, destination }
    }

    fn matches(&self, pass: &RawPass) -> bool {
        if let Some(line) = &self.line
            && pass.line_public_number.as_deref() != Some(line.as_str())
        {
            return false;
        }
        if let Some(destination) = &self.destination {
            let name = pass.destination_name.as_deref().unwrap_or("");
            if !name.to_lowercase().contains(&destination.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// The two payload shapes seen in the wild, discriminated once per stop
/// entry by probing for a `Passes` key at the first nesting level.
enum StopEntry<'a> {
    /// `{stop_code: {Passes: {...}}}`
    Flat(&'a Map<String, Value>),
    /// `{stop_code: {transport_type: {operator: {line: {Passes: {...}}}}}}`
    Nested(&'a Map<String, Value>),
}

impl<'a> StopEntry<'a> {
    fn detect(stop_code: &str, value: &'a Value) -> Result<Self, ShapeError> {
        let object = value
            .as_object()
            .ok_or_else(|| ShapeError::UnrecognizedStop(stop_code.to_string()))?;
        if object.contains_key(PASSES_KEY) {
            Ok(Self::Flat(object))
        } else {
            Ok(Self::Nested(object))
        }
    }
}

/// Flattens a raw payload into a sorted pass list. Handles both recognized
/// shapes without the caller knowing which one the upstream returned, drops
/// passes already gone, and applies the filter.
pub fn extract_passes(payload: &Value, filter: &PassFilter) -> Result<Vec<Pass>, ShapeError> {
    let root = payload.as_object().ok_or(ShapeError::NotAnObject)?;
    let mut passes = Vec::new();

    for (stop_code, entry) in root {
        if META_KEYS.contains(&stop_code.as_str()) {
            continue;
        }
        match StopEntry::detect(stop_code, entry)? {
            StopEntry::Flat(object) => {
                collect_leaf_passes(stop_code, object, filter, &mut passes)?;
            }
            StopEntry::Nested(transport_types) => {
                for transport_data in object_values(stop_code, transport_types)? {
                    for operator_data in object_values(stop_code, transport_data)? {
                        for line_data in object_values(stop_code, operator_data)? {
                            collect_leaf_passes(stop_code, line_data, filter, &mut passes)?;
                        }
                    }
                }
            }
        }
    }

    passes.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
    Ok(passes)
}

/// Pulls the pass records out of an object holding a `Passes` key and keeps
/// the ones that survive the status check and the filter. An object without
/// a `Passes` key is an empty line entry and yields nothing; a `Passes`
/// value that is not an object is an unrecognized shape.
fn collect_leaf_passes(
    stop_code: &str,
    object: &Map<String, Value>,
    filter: &PassFilter,
    out: &mut Vec<Pass>,
) -> Result<(), ShapeError> {
    let records = match object.get(PASSES_KEY) {
        None => return Ok(()),
        Some(Value::Object(records)) => records,
        Some(_) => return Err(ShapeError::UnrecognizedStop(stop_code.to_string())),
    };
    for (index, record) in records {
        let raw: RawPass = match serde_json::from_value(record.clone()) {
            Ok(raw) => raw,
            Err(err) => {
                debug!("Skipping malformed pass {index} at stop {stop_code}: {err}");
                continue;
            }
        };
        if raw.trip_stop_status.as_deref() == Some(STATUS_PASSED) {
            continue;
        }
        if filter.matches(&raw) {
            out.push(raw.into_pass(stop_code));
        }
    }
    Ok(())
}

/// Every value of a nested intermediate level must itself be an object;
/// anything else means the payload matches neither recognized shape, which
/// must surface as an error rather than a silently shorter list.
fn object_values<'a>(
    stop_code: &str,
    map: &'a Map<String, Value>,
) -> Result<Vec<&'a Map<String, Value>>, ShapeError> {
    map.values()
        .map(|value| {
            value
                .as_object()
                .ok_or_else(|| ShapeError::UnrecognizedStop(stop_code.to_string()))
        })
        .collect()
}
