use serde::{Deserialize, Serialize};

use crate::shared::time;

/// One predicted arrival of a vehicle at a stop. Rebuilt wholesale on every
/// poll cycle, never mutated in place.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Pass {
    pub line_number: Option<String>,
    pub destination: Option<String>,
    /// Zoneless local ISO-8601, e.g. `2025-12-01T14:30:00`.
    pub expected_arrival: Option<String>,
    /// Scheduled counterpart of `expected_arrival`.
    pub target_arrival: Option<String>,
    /// `None` means unknown, not on time.
    pub delay_minutes: Option<i64>,
    pub transport_type: Option<String>,
    /// The stop-code key the pass was found under.
    pub origin_stop_code: String,
}

impl Pass {
    /// Sort key used everywhere a pass list is ordered. The timestamp format
    /// is fixed-width and zero-padded, so a raw string compare is a correct
    /// chronological compare and avoids re-parsing on every comparison.
    pub fn sort_key(&self) -> &str {
        self.expected_arrival.as_deref().unwrap_or("")
    }
}

/// Leaf record of the upstream payload, in the operator's field naming.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct RawPass {
    #[serde(rename = "LinePublicNumber")]
    pub line_public_number: Option<String>,
    #[serde(rename = "DestinationName50")]
    pub destination_name: Option<String>,
    #[serde(rename = "ExpectedArrivalTime")]
    pub expected_arrival_time: Option<String>,
    #[serde(rename = "TargetArrivalTime")]
    pub target_arrival_time: Option<String>,
    #[serde(rename = "TransportType")]
    pub transport_type: Option<String>,
    #[serde(rename = "TripStopStatus")]
    pub trip_stop_status: Option<String>,
}

impl RawPass {
    pub fn into_pass(self, origin_stop_code: &str) -> Pass {
        let delay_minutes = time::delay(
            self.expected_arrival_time.as_deref(),
            self.target_arrival_time.as_deref(),
        );
        Pass {
            line_number: self.line_public_number,
            destination: self.destination_name,
            expected_arrival: self.expected_arrival_time,
            target_arrival: self.target_arrival_time,
            delay_minutes,
            transport_type: self.transport_type,
            origin_stop_code: origin_stop_code.to_string(),
        }
    }
}
