use halte::{realtime::Pass, shared::time};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassDto {
    pub line_number: Option<String>,
    pub destination: Option<String>,
    pub expected_arrival: Option<String>,
    pub target_arrival: Option<String>,
    pub delay_minutes: Option<i64>,
    pub transport_type: Option<String>,
    pub origin_stop_code: String,
    /// Countdown relative to the moment the response is built.
    pub minutes_until_departure: Option<i64>,
}

impl From<Pass> for PassDto {
    fn from(pass: Pass) -> Self {
        let minutes_until_departure =
            time::minutes_until(pass.expected_arrival.as_deref(), time::local_now());
        Self {
            line_number: pass.line_number,
            destination: pass.destination,
            expected_arrival: pass.expected_arrival,
            target_arrival: pass.target_arrival,
            delay_minutes: pass.delay_minutes,
            transport_type: pass.transport_type,
            origin_stop_code: pass.origin_stop_code,
            minutes_until_departure,
        }
    }
}
