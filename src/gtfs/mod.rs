use std::{
    fs::File,
    io::{self},
    path::PathBuf,
};
use thiserror::Error;
use zip::{ZipArchive, read::ZipFile};

pub mod models;
pub use models::*;

const STOPS_FILE_NAME: &str = "stops.txt";
const REQUIRED_STOP_COLUMNS: [&str; 4] = ["stop_id", "stop_name", "stop_lat", "stop_lon"];

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Csv file {0} is missing required column {1}")]
    MissingColumn(String, String),
    #[error("Could not find file with name: {0}")]
    FileNotFound(String),
}

/// Reader for the bundled schedule archive. Only `stops.txt` is consumed;
/// the rest of the feed is irrelevant for live departure queries.
pub struct Gtfs {
    path: PathBuf,
    stops_file_name: String,
}

impl Gtfs {
    pub fn from_zip(path: PathBuf) -> Self {
        Self {
            path,
            stops_file_name: STOPS_FILE_NAME.into(),
        }
    }

    pub fn with_stops_file_name(mut self, name: impl Into<String>) -> Self {
        self.stops_file_name = name.into();
        self
    }

    /// Streams every parseable row of the stop list. Rows that fail to
    /// deserialize are skipped; a missing file or missing required column
    /// fails the whole call.
    pub fn stream_stops<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsStop)),
    {
        let zip_file = File::open(&self.path)?;
        let mut archive = ZipArchive::new(zip_file)?;
        let file = get_file(&mut archive, &self.stops_file_name)?;
        let mut reader = csv::Reader::from_reader(file);
        check_columns(&mut reader, &self.stops_file_name)?;
        reader
            .deserialize::<GtfsStop>()
            .filter_map(|row| row.ok())
            .enumerate()
            .for_each(f);
        Ok(())
    }
}

fn check_columns<R: io::Read>(
    reader: &mut csv::Reader<R>,
    file_name: &str,
) -> Result<(), self::Error> {
    let headers = reader.headers()?;
    for column in REQUIRED_STOP_COLUMNS {
        if !headers.iter().any(|header| header.trim() == column) {
            return Err(self::Error::MissingColumn(
                file_name.to_string(),
                column.to_string(),
            ));
        }
    }
    Ok(())
}

fn get_file<'a>(
    archive: &'a mut ZipArchive<File>,
    name: &'a str,
) -> Result<ZipFile<'a, File>, self::Error> {
    let index = archive
        .index_for_name(name)
        .ok_or(self::Error::FileNotFound(name.to_string()))?;
    let file = archive.by_index(index)?;
    Ok(file)
}
