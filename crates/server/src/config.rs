use std::path::PathBuf;

/// Poll intervals outside this window are clamped; polling faster than once
/// a minute only strains the upstream API.
const MIN_POLL_INTERVAL_SECS: u64 = 60;
const MAX_POLL_INTERVAL_SECS: u64 = 300;

const DEFAULT_FEED_BASE_URL: &str = "http://v0.ovapi.nl";
const DEFAULT_PORT: u16 = 3000;

/// A stop set the poller keeps a departure board for.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub stop_codes: Vec<String>,
    pub line: Option<String>,
    pub destination: Option<String>,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gtfs_zip: PathBuf,
    pub overrides_file: Option<PathBuf>,
    pub cache_file: PathBuf,
    pub feed_base_url: String,
    pub port: u16,
    pub watch: Option<WatchConfig>,
}

impl Config {
    /// Reads configuration from the environment. Only the archive path is
    /// mandatory.
    pub fn from_env() -> Result<Self, String> {
        let gtfs_zip = std::env::var("HALTE_GTFS_ZIP")
            .map(PathBuf::from)
            .map_err(|_| "HALTE_GTFS_ZIP must point at the bundled GTFS archive".to_string())?;
        let overrides_file = std::env::var("HALTE_OVERRIDES").ok().map(PathBuf::from);
        let cache_file = std::env::var("HALTE_CACHE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("halte_stop_cache.json"));
        let feed_base_url = std::env::var("HALTE_FEED_URL")
            .unwrap_or_else(|_| DEFAULT_FEED_BASE_URL.to_string());
        let port = match std::env::var("HALTE_PORT") {
            Ok(value) => value.parse().map_err(|_| "HALTE_PORT must be a port number")?,
            Err(_) => DEFAULT_PORT,
        };

        let watch = match std::env::var("HALTE_WATCH_STOPS") {
            Ok(codes) => {
                let stop_codes: Vec<String> = codes
                    .split(',')
                    .map(str::trim)
                    .filter(|code| !code.is_empty())
                    .map(str::to_string)
                    .collect();
                if stop_codes.is_empty() {
                    None
                } else {
                    let poll_interval_secs = std::env::var("HALTE_POLL_INTERVAL")
                        .ok()
                        .and_then(|value| value.parse().ok())
                        .unwrap_or(MIN_POLL_INTERVAL_SECS)
                        .clamp(MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS);
                    Some(WatchConfig {
                        stop_codes,
                        line: non_empty(std::env::var("HALTE_WATCH_LINE").ok()),
                        destination: non_empty(std::env::var("HALTE_WATCH_DESTINATION").ok()),
                        poll_interval_secs,
                    })
                }
            }
            Err(_) => None,
        };

        Ok(Self {
            gtfs_zip,
            overrides_file,
            cache_file,
            feed_base_url,
            port,
            watch,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
