//! Maps tools

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::gateway::dispatch::CallContext;
use crate::gateway::format::ToolOutput;
use crate::gateway::registry::ToolHandler;
use crate::gateway::schema::{ParamType, ParameterSpec, ToolSchema};
use crate::gateway::validate::Arguments;
use crate::google::types::TravelMode;
use crate::google::MapsBackend;
use crate::tools::clamp_u32;

pub const DIRECTIONS: &str = "get_directions_tool";
pub const GEOCODE: &str = "geocode_address_tool";
pub const NEARBY_PLACES: &str = "find_nearby_places_tool";

/// Places API rejects radii above 50 km
const MAX_RADIUS_METERS: u32 = 50_000;

pub fn directions_schema() -> ToolSchema {
    ToolSchema::new(vec![
        ParameterSpec::required("origin", ParamType::String, "Starting address or place"),
        ParameterSpec::required("destination", ParamType::String, "Destination address or place"),
        ParameterSpec::with_default("mode", ParamType::String, "driving", "Travel mode")
            .one_of(&["driving", "walking", "bicycling", "transit"]),
    ])
}

pub fn geocode_schema() -> ToolSchema {
    ToolSchema::new(vec![ParameterSpec::required(
        "address",
        ParamType::String,
        "Address to geocode",
    )])
}

pub fn nearby_places_schema() -> ToolSchema {
    ToolSchema::new(vec![
        ParameterSpec::required(
            "location",
            ParamType::String,
            "Address or place to search around",
        ),
        ParameterSpec::with_default(
            "radius",
            ParamType::Integer,
            5000,
            "Search radius in meters",
        ),
        ParameterSpec::optional(
            "place_type",
            ParamType::String,
            "Place type filter, e.g. 'restaurant' or 'cafe'",
        ),
    ])
}

/// Routes between two locations
pub struct GetDirections {
    maps: Arc<dyn MapsBackend>,
}

impl GetDirections {
    pub fn new(maps: Arc<dyn MapsBackend>) -> Self {
        Self { maps }
    }
}

#[async_trait]
impl ToolHandler for GetDirections {
    async fn call(&self, args: Arguments, ctx: &CallContext) -> Result<ToolOutput, BackendError> {
        // The schema restricts `mode` to known values
        let mode = args
            .str("mode")
            .and_then(|m| m.parse::<TravelMode>().ok())
            .unwrap_or_default();

        let directions = self
            .maps
            .directions(
                args.str_or_empty("origin"),
                args.str_or_empty("destination"),
                mode,
                ctx,
            )
            .await?;
        Ok(ToolOutput::Directions(directions))
    }
}

/// Resolves an address to coordinates
pub struct GeocodeAddress {
    maps: Arc<dyn MapsBackend>,
}

impl GeocodeAddress {
    pub fn new(maps: Arc<dyn MapsBackend>) -> Self {
        Self { maps }
    }
}

#[async_trait]
impl ToolHandler for GeocodeAddress {
    async fn call(&self, args: Arguments, ctx: &CallContext) -> Result<ToolOutput, BackendError> {
        let result = self.maps.geocode(args.str_or_empty("address"), ctx).await?;
        Ok(ToolOutput::Geocode(result))
    }
}

/// Searches for places around a location
pub struct FindNearbyPlaces {
    maps: Arc<dyn MapsBackend>,
}

impl FindNearbyPlaces {
    pub fn new(maps: Arc<dyn MapsBackend>) -> Self {
        Self { maps }
    }
}

#[async_trait]
impl ToolHandler for FindNearbyPlaces {
    async fn call(&self, args: Arguments, ctx: &CallContext) -> Result<ToolOutput, BackendError> {
        let location = args.str_or_empty("location");
        let radius = clamp_u32(args.i64("radius").unwrap_or(5000), 1, MAX_RADIUS_METERS);

        let places = self
            .maps
            .nearby_places(location, radius, args.str("place_type"), ctx)
            .await?;
        Ok(ToolOutput::Places {
            location: location.to_string(),
            places,
        })
    }
}
