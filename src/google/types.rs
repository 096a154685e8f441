//! Structured results returned by the backend clients
//!
//! These are the shapes the result formatter understands. Upstream wire types
//! live privately next to each client.

use serde::{Deserialize, Serialize};

/// Summary of a Gmail message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MessageSummary {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub date: String,
    pub snippet: String,
}

/// Confirmation of a sent message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentMessage {
    pub id: String,
    pub thread_id: String,
}

/// Summary of a calendar event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EventSummary {
    pub id: String,
    pub summary: String,
    pub start: String,
    pub end: String,
    pub location: String,
    pub description: String,
    pub attendees: Vec<String>,
}

/// Event to create
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewEvent {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
}

/// Identifier of a created event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    pub html_link: Option<String>,
}

/// Travel mode for directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }
}

impl std::str::FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driving" => Ok(TravelMode::Driving),
            "walking" => Ok(TravelMode::Walking),
            "bicycling" => Ok(TravelMode::Bicycling),
            "transit" => Ok(TravelMode::Transit),
            other => Err(format!("unsupported travel mode: {}", other)),
        }
    }
}

/// A single leg step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance: String,
    pub duration: String,
}

/// Directions between two places (first route, first leg)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directions {
    pub start_address: String,
    pub end_address: String,
    pub distance: String,
    pub duration: String,
    pub steps: Vec<RouteStep>,
}

/// Geocoding result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    pub lat: f64,
    pub lng: f64,
}

/// A place returned by a nearby search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub types: Vec<String>,
    pub place_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_mode_parse() {
        assert_eq!("Walking".parse::<TravelMode>(), Ok(TravelMode::Walking));
        assert_eq!("transit".parse::<TravelMode>(), Ok(TravelMode::Transit));
        assert!("teleport".parse::<TravelMode>().is_err());
        assert_eq!(TravelMode::default().as_str(), "driving");
    }
}
