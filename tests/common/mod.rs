use std::{
    fs::File,
    io::Write,
    path::PathBuf,
    sync::atomic::{AtomicU32, Ordering},
};

use zip::{ZipWriter, write::SimpleFileOptions};

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Unique path under the system temp dir, so parallel tests never collide.
pub fn temp_path(name: &str) -> PathBuf {
    let unique = format!(
        "halte-test-{}-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed),
        name
    );
    std::env::temp_dir().join(unique)
}

/// Builds a minimal schedule archive holding the given `stops.txt` body.
pub fn write_stops_zip(path: &PathBuf, stops_csv: &str) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    zip.start_file("stops.txt", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(stops_csv.as_bytes()).unwrap();
    zip.finish().unwrap();
}

pub const STOPS_CSV: &str = "\
stop_id,stop_code,stop_name,stop_lat,stop_lon
2503199,31000495,Centraal Station,52.3791,4.9003
2503200,31000496,Centraal Station,52.3792,4.9004
2505001,,Museumplein,52.3579,4.8816
2505100,305125,Zuid,52.3389,4.8728
";
