use serde::{Deserialize, Serialize};

/// One row of `stops.txt`. Real-world feeds carry many more columns;
/// everything outside this set is ignored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsStop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    /// Secondary timing-point code. Often empty; the live-data endpoint
    /// falls back to `stop_id` when it is.
    #[serde(default)]
    pub stop_code: Option<String>,
}

/// One entry of the manual override list: a stop known to have live data
/// but missing from (or wrong in) the bundled archive.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OverrideStop {
    pub id: String,
    pub name: String,
    pub code: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub route: Option<String>,
}
