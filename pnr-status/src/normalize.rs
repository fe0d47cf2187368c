use crate::fields::{first_of, is_truthy, text_or};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub const NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_NOT_FOUND_MESSAGE: &str = "Invalid PNR or PNR not found";

/// The upstream answered, but has no booking for the PNR.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct NotFoundError {
    pub message: String,
}

impl Default for NotFoundError {
    fn default() -> Self {
        NotFoundError {
            message: DEFAULT_NOT_FOUND_MESSAGE.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("Invalid API response: expected a JSON object, got {0}")]
    UnexpectedShape(&'static str),

    #[error("Invalid API response: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Stable journey shape returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyStatus {
    pub boarding_point: String,
    pub destination_station: String,
    pub train_number: String,
    pub train_name: String,
    pub date_of_journey: String,
    pub class_name: String,
    pub quota: String,
    pub passenger_list: Vec<PassengerStatus>,
    /// Filled in by the request handler once the upstream call is timed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerStatus {
    pub serial_number: u64,
    pub current_status: String,
    pub current_coach: String,
    pub current_berth: String,
    pub booking_status: String,
}

/// Maps a government enquiry response onto [`JourneyStatus`].
///
/// A truthy `error` field or a missing `trainNo` means the PNR is unknown.
pub fn normalize_enquiry(raw: &Value) -> Result<JourneyStatus, NotFoundError> {
    let has_error = raw.get("error").is_some_and(is_truthy);
    let train_number = first_of(raw, &["trainNo"]);

    let Some(train_number) = train_number.filter(|_| !has_error) else {
        // `error` is sometimes a flag and sometimes the message itself
        let message = first_of(raw, &["errorMessage"]).or_else(|| {
            raw.get("error")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        });

        return Err(message
            .map(|message| NotFoundError { message })
            .unwrap_or_default());
    };

    let passenger_list = raw
        .get("passengerList")
        .and_then(Value::as_array)
        .map(|passengers| {
            passengers
                .iter()
                .enumerate()
                .map(|(index, passenger)| normalize_passenger(index, passenger))
                .collect()
        })
        .unwrap_or_default();

    Ok(JourneyStatus {
        boarding_point: text_or(raw, &["boardingPoint"], NOT_AVAILABLE),
        destination_station: text_or(raw, &["reservationUpTo"], NOT_AVAILABLE),
        train_number,
        train_name: text_or(raw, &["trainName"], NOT_AVAILABLE),
        date_of_journey: text_or(raw, &["dateOfJourney"], NOT_AVAILABLE),
        class_name: text_or(raw, &["journeyClass"], NOT_AVAILABLE),
        quota: text_or(raw, &["quota"], NOT_AVAILABLE),
        passenger_list,
        processing_time_seconds: None,
    })
}

fn normalize_passenger(index: usize, raw: &Value) -> PassengerStatus {
    // Upstream serial numbers are 1-based; fall back to list position
    let serial_number = first_of(raw, &["passengerSerialNumber"])
        .and_then(|s| s.parse().ok())
        .unwrap_or(index as u64 + 1);

    PassengerStatus {
        serial_number,
        current_status: text_or(
            raw,
            &["currentStatusDetails", "currentStatus"],
            NOT_AVAILABLE,
        ),
        current_coach: text_or(raw, &["currentCoachId"], ""),
        current_berth: text_or(raw, &["currentBerthNo", "currentBerthCode"], ""),
        booking_status: text_or(
            raw,
            &["bookingStatusDetails", "bookingStatus"],
            NOT_AVAILABLE,
        ),
    }
}

/// Converts a normalized journey into a JSON object body.
pub fn journey_to_body(journey: &JourneyStatus) -> Result<Map<String, Value>, NormalizeError> {
    into_object(serde_json::to_value(journey)?)
}

/// Partner responses are already shaped for clients and pass through as-is.
pub fn passthrough(raw: Value) -> Result<Map<String, Value>, NormalizeError> {
    into_object(raw)
}

fn into_object(value: Value) -> Result<Map<String, Value>, NormalizeError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(NormalizeError::UnexpectedShape(json_type(&other))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
