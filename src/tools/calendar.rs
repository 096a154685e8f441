//! Calendar tools

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::config::calendar::PRIMARY;
use crate::error::BackendError;
use crate::gateway::dispatch::CallContext;
use crate::gateway::format::ToolOutput;
use crate::gateway::registry::ToolHandler;
use crate::gateway::schema::{ParamType, ParameterSpec, ToolSchema};
use crate::gateway::validate::Arguments;
use crate::google::types::NewEvent;
use crate::google::CalendarBackend;
use crate::tools::clamp_u32;

pub const LIST_EVENTS: &str = "list_calendar_events_tool";
pub const CREATE_EVENT: &str = "create_calendar_event_tool";

const MAX_LIST_RESULTS: u32 = 2500;

pub fn list_events_schema() -> ToolSchema {
    ToolSchema::new(vec![
        ParameterSpec::with_default(
            "calendar_id",
            ParamType::String,
            PRIMARY,
            "Calendar to read, 'primary' for the user's main calendar",
        ),
        ParameterSpec::with_default(
            "max_results",
            ParamType::Integer,
            10,
            "Maximum number of events to return",
        ),
    ])
}

pub fn create_event_schema() -> ToolSchema {
    ToolSchema::new(vec![
        ParameterSpec::required("summary", ParamType::String, "Event title"),
        ParameterSpec::required(
            "start_time",
            ParamType::String,
            "Start time in ISO 8601 format, e.g. '2024-01-15T10:00:00Z'",
        ),
        ParameterSpec::required(
            "end_time",
            ParamType::String,
            "End time in ISO 8601 format",
        ),
        ParameterSpec::with_default("description", ParamType::String, "", "Event description"),
        ParameterSpec::with_default("location", ParamType::String, "", "Event location"),
        ParameterSpec::with_default(
            "attendees",
            ParamType::Array,
            json!([]),
            "Attendee email addresses",
        ),
    ])
}

/// Lists upcoming events of a calendar
pub struct ListEvents {
    calendar: Arc<dyn CalendarBackend>,
}

impl ListEvents {
    pub fn new(calendar: Arc<dyn CalendarBackend>) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl ToolHandler for ListEvents {
    async fn call(&self, args: Arguments, ctx: &CallContext) -> Result<ToolOutput, BackendError> {
        let calendar_id = match args.str_or_empty("calendar_id") {
            "" => PRIMARY,
            id => id,
        };
        let max_results = clamp_u32(args.i64("max_results").unwrap_or(10), 1, MAX_LIST_RESULTS);

        let events = self
            .calendar
            .list_events(calendar_id, max_results, ctx)
            .await?;
        Ok(ToolOutput::Events(events))
    }
}

/// Creates an event on the primary calendar
pub struct CreateEvent {
    calendar: Arc<dyn CalendarBackend>,
}

impl CreateEvent {
    pub fn new(calendar: Arc<dyn CalendarBackend>) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl ToolHandler for CreateEvent {
    async fn call(&self, args: Arguments, ctx: &CallContext) -> Result<ToolOutput, BackendError> {
        let non_empty = |name: &str| args.str(name).filter(|s| !s.is_empty()).map(String::from);

        let event = NewEvent {
            summary: args.str_or_empty("summary").to_string(),
            start_time: args.str_or_empty("start_time").to_string(),
            end_time: args.str_or_empty("end_time").to_string(),
            description: non_empty("description"),
            location: non_empty("location"),
            attendees: args.str_list("attendees"),
        };

        let created = self.calendar.create_event(&event, ctx).await?;
        Ok(ToolOutput::EventCreated(created))
    }
}
