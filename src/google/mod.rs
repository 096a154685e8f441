//! Google service backends
//!
//! Each service sits behind a trait so the tool layer can be driven by fakes
//! in tests. The HTTP clients here are the production implementations.

pub mod auth;
pub mod calendar;
pub mod gmail;
pub mod http;
pub mod maps;
pub mod types;

#[cfg(test)]
mod test_support;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::gateway::dispatch::CallContext;
use types::{
    CreatedEvent, Directions, EventSummary, GeocodeResult, MessageSummary, NewEvent, Place,
    SentMessage, TravelMode,
};

pub use auth::{token_source_from_config, FileTokenSource, StaticTokenSource, TokenSource};
pub use calendar::CalendarClient;
pub use gmail::GmailClient;
pub use maps::MapsClient;

/// Mail listing and sending
#[async_trait]
pub trait GmailBackend: Send + Sync {
    async fn list_messages(
        &self,
        query: &str,
        max_results: u32,
        ctx: &CallContext,
    ) -> Result<Vec<MessageSummary>, BackendError>;

    async fn send_message(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        ctx: &CallContext,
    ) -> Result<SentMessage, BackendError>;
}

/// Upcoming events and event creation
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    async fn list_events(
        &self,
        calendar_id: &str,
        max_results: u32,
        ctx: &CallContext,
    ) -> Result<Vec<EventSummary>, BackendError>;

    async fn create_event(
        &self,
        event: &NewEvent,
        ctx: &CallContext,
    ) -> Result<CreatedEvent, BackendError>;
}

/// Routing, geocoding and place search
#[async_trait]
pub trait MapsBackend: Send + Sync {
    /// First route between two points, `None` when no route exists
    async fn directions(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
        ctx: &CallContext,
    ) -> Result<Option<Directions>, BackendError>;

    /// Best match for an address, `None` when nothing matches
    async fn geocode(
        &self,
        address: &str,
        ctx: &CallContext,
    ) -> Result<Option<GeocodeResult>, BackendError>;

    /// Places within `radius` meters of a free-form location
    async fn nearby_places(
        &self,
        location: &str,
        radius: u32,
        place_type: Option<&str>,
        ctx: &CallContext,
    ) -> Result<Vec<Place>, BackendError>;
}
