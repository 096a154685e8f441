//! Tool definitions
//!
//! Every tool the server exposes is registered here, in the order clients see
//! it in `tools/list`. Handlers receive their backend through [`Backends`], so
//! tests can swap any service for a fake.

pub mod calendar;
pub mod gmail;
pub mod maps;

use std::sync::Arc;

use crate::error::RegistryError;
use crate::gateway::registry::{Registry, ToolDescriptor};
use crate::google::{CalendarBackend, GmailBackend, MapsBackend};

/// Backend clients shared by the tool handlers
#[derive(Clone)]
pub struct Backends {
    pub gmail: Arc<dyn GmailBackend>,
    pub calendar: Arc<dyn CalendarBackend>,
    pub maps: Arc<dyn MapsBackend>,
}

/// Build the registry of all tools
pub fn build_registry(backends: &Backends) -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();

    for descriptor in descriptors(backends) {
        registry.register(descriptor)?;
    }

    tracing::debug!(tools = registry.len(), "tool registry built");
    Ok(registry)
}

fn descriptors(backends: &Backends) -> Vec<ToolDescriptor> {
    let gmail = &backends.gmail;
    let calendar = &backends.calendar;
    let maps = &backends.maps;

    vec![
        ToolDescriptor::new(
            gmail::LIST_MESSAGES,
            "List recent Gmail messages with optional search query",
            gmail::list_messages_schema(),
            Arc::new(gmail::ListMessages::new(Arc::clone(gmail))),
        ),
        ToolDescriptor::new(
            gmail::SEND_MESSAGE,
            "Send a Gmail message",
            gmail::send_message_schema(),
            Arc::new(gmail::SendMessage::new(Arc::clone(gmail))),
        ),
        ToolDescriptor::new(
            calendar::LIST_EVENTS,
            "List upcoming calendar events",
            calendar::list_events_schema(),
            Arc::new(calendar::ListEvents::new(Arc::clone(calendar))),
        ),
        ToolDescriptor::new(
            calendar::CREATE_EVENT,
            "Create a new calendar event",
            calendar::create_event_schema(),
            Arc::new(calendar::CreateEvent::new(Arc::clone(calendar))),
        ),
        ToolDescriptor::new(
            maps::DIRECTIONS,
            "Get directions between two locations",
            maps::directions_schema(),
            Arc::new(maps::GetDirections::new(Arc::clone(maps))),
        ),
        ToolDescriptor::new(
            maps::GEOCODE,
            "Geocode an address to get coordinates",
            maps::geocode_schema(),
            Arc::new(maps::GeocodeAddress::new(Arc::clone(maps))),
        ),
        ToolDescriptor::new(
            maps::NEARBY_PLACES,
            "Find nearby places around a location",
            maps::nearby_places_schema(),
            Arc::new(maps::FindNearbyPlaces::new(Arc::clone(maps))),
        ),
    ]
}

/// Clamp a validated integer into the `u32` range upstream APIs accept
pub(crate) fn clamp_u32(value: i64, min: u32, max: u32) -> u32 {
    value.clamp(i64::from(min), i64::from(max)) as u32
}
