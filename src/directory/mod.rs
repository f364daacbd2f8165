use std::{collections::HashMap, path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::gtfs::{self, Gtfs, GtfsStop, OverrideStop};

pub mod cache;
pub mod search;
pub use cache::*;
pub use search::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Gtfs error: {0}")]
    Gtfs(#[from] gtfs::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One stop of the directory. `code` is the identifier the live-data
/// endpoint accepts; `id` is the schedule dataset's internal identifier and
/// is only used for search and lookup. They coincide for stops without a
/// distinct timing-point code.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StopRecord {
    pub id: Arc<str>,
    pub code: Arc<str>,
    pub name: Arc<str>,
    pub normalized_name: Arc<str>,
    pub latitude: f64,
    pub longitude: f64,
    pub routes: Vec<String>,
}

impl From<GtfsStop> for StopRecord {
    fn from(value: GtfsStop) -> Self {
        let code = match value.stop_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code.into(),
            _ => value.stop_id.as_str().into(),
        };
        Self {
            id: value.stop_id.into(),
            code,
            name: value.stop_name.as_str().into(),
            normalized_name: value.stop_name.to_lowercase().into(),
            latitude: value.stop_lat,
            longitude: value.stop_lon,
            routes: Vec::new(),
        }
    }
}

impl From<OverrideStop> for StopRecord {
    fn from(value: OverrideStop) -> Self {
        Self {
            id: value.id.into(),
            code: value.code.into(),
            name: value.name.as_str().into(),
            normalized_name: value.name.to_lowercase().into(),
            latitude: value.lat,
            longitude: value.lon,
            routes: value.route.into_iter().collect(),
        }
    }
}

/// Immutable snapshot of every known stop. Built once per cache refresh and
/// replaced wholesale, never patched in place. Scan order is the bundled
/// file order followed by accepted overrides.
#[derive(Debug, Clone, Default)]
pub struct StopDirectory {
    stops: Vec<StopRecord>,
    id_lookup: HashMap<Arc<str>, usize>,
    code_lookup: HashMap<Arc<str>, usize>,
}

impl StopDirectory {
    pub fn get(&self, id: &str) -> Option<&StopRecord> {
        let index = self.id_lookup.get(id)?;
        Some(&self.stops[*index])
    }

    pub fn find_by_code(&self, code: &str) -> Option<&StopRecord> {
        let index = self.code_lookup.get(code)?;
        Some(&self.stops[*index])
    }

    pub fn stops(&self) -> &[StopRecord] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    fn push(&mut self, record: StopRecord) -> bool {
        if self.id_lookup.contains_key(&record.id) {
            return false;
        }
        let index = self.stops.len();
        self.id_lookup.insert(record.id.clone(), index);
        self.code_lookup.entry(record.code.clone()).or_insert(index);
        self.stops.push(record);
        true
    }

    pub(crate) fn from_records(records: Vec<StopRecord>) -> Self {
        let mut directory = Self::default();
        for record in records {
            directory.push(record);
        }
        directory
    }
}

/// Builds a [`StopDirectory`] from the bundled archive plus an optional
/// manual override list.
pub struct DirectoryBuilder {
    archive: Gtfs,
    overrides_path: Option<PathBuf>,
}

impl DirectoryBuilder {
    pub fn new(archive_path: PathBuf) -> Self {
        Self {
            archive: Gtfs::from_zip(archive_path),
            overrides_path: None,
        }
    }

    pub fn with_overrides(mut self, path: PathBuf) -> Self {
        self.overrides_path = Some(path);
        self
    }

    /// A missing or unparsable archive fails the build; there is no silent
    /// empty directory. A broken override list only costs the overrides.
    pub fn build(&self) -> Result<StopDirectory, Error> {
        let mut directory = StopDirectory::default();
        self.archive.stream_stops(|(_, stop)| {
            if stop.stop_id.is_empty() {
                return;
            }
            let record: StopRecord = stop.into();
            if !directory.push(record) {
                debug!("Dropping duplicate bundled stop_id");
            }
        })?;
        info!("Loaded {} stops from the bundled archive", directory.len());

        if let Some(path) = &self.overrides_path {
            match load_overrides(path) {
                Ok(overrides) => apply_overrides(&mut directory, overrides),
                Err(err) => {
                    warn!("Ignoring unusable override list at {path:?}: {err}");
                }
            }
        }
        Ok(directory)
    }
}

fn load_overrides(path: &PathBuf) -> Result<Vec<OverrideStop>, Error> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Bundled data always wins: an override whose id is already present is
/// skipped, overrides only fill gaps.
fn apply_overrides(directory: &mut StopDirectory, overrides: Vec<OverrideStop>) {
    let mut accepted = 0usize;
    for entry in overrides {
        let id = entry.id.clone();
        if directory.push(entry.into()) {
            accepted += 1;
        } else {
            debug!("Skipping override for {id}: bundled entry exists");
        }
    }
    info!("Applied {accepted} manual stop overrides");
}
