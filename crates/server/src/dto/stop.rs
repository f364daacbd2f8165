use halte::directory::{SearchGroup, StopRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopDto {
    pub id: String,
    pub code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StopDto {
    pub fn from(stop: &StopRecord) -> Self {
        Self {
            id: stop.id.to_string(),
            code: stop.code.to_string(),
            name: stop.name.to_string(),
            latitude: stop.latitude,
            longitude: stop.longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopGroupDto {
    pub name: String,
    pub stop_codes: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Joined route labels, e.g. `"22, 25, 51"`.
    pub routes: String,
    pub direction_count: usize,
}

impl From<SearchGroup> for StopGroupDto {
    fn from(group: SearchGroup) -> Self {
        Self {
            name: group.name,
            stop_codes: group.stop_codes,
            latitude: group.latitude,
            longitude: group.longitude,
            routes: group.routes.join(", "),
            direction_count: group.direction_count,
        }
    }
}
