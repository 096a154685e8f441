//! Google Calendar API client

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::calendar::{API_BASE_URL, PRIMARY, TIME_ZONE};
use crate::error::BackendError;
use crate::gateway::dispatch::CallContext;
use crate::google::auth::TokenSource;
use crate::google::http::read_json;
use crate::google::types::{CreatedEvent, EventSummary, NewEvent};
use crate::google::CalendarBackend;

/// Start or end of an event: timed events carry `dateTime`, all-day ones `date`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

impl EventTime {
    fn timed(date_time: &str) -> Self {
        Self {
            date_time: Some(date_time.to_string()),
            date: None,
            time_zone: Some(TIME_ZONE.to_string()),
        }
    }

    fn display(&self) -> String {
        self.date_time
            .clone()
            .or_else(|| self.date.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Attendee {
    #[serde(default)]
    email: Option<String>,
}

/// A calendar event as returned by the API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    start: EventTime,
    #[serde(default)]
    end: EventTime,
    #[serde(default)]
    attendees: Vec<Attendee>,
    #[serde(default)]
    html_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<Event>,
}

/// Body of an insert request
#[derive(Debug, Clone, Serialize)]
struct InsertEventRequest {
    summary: String,
    description: String,
    start: EventTime,
    end: EventTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attendees: Vec<Attendee>,
}

impl From<&NewEvent> for InsertEventRequest {
    fn from(event: &NewEvent) -> Self {
        Self {
            summary: event.summary.clone(),
            description: event.description.clone().unwrap_or_default(),
            start: EventTime::timed(&event.start_time),
            end: EventTime::timed(&event.end_time),
            location: event.location.clone().filter(|l| !l.is_empty()),
            attendees: event
                .attendees
                .iter()
                .filter(|email| !email.is_empty())
                .map(|email| Attendee {
                    email: Some(email.clone()),
                })
                .collect(),
        }
    }
}

impl From<Event> for EventSummary {
    fn from(event: Event) -> Self {
        EventSummary {
            start: event.start.display(),
            end: event.end.display(),
            id: event.id,
            summary: event.summary.unwrap_or_default(),
            location: event.location.unwrap_or_default(),
            description: event.description.unwrap_or_default(),
            attendees: event.attendees.into_iter().filter_map(|a| a.email).collect(),
        }
    }
}

/// Google Calendar API client
pub struct CalendarClient {
    http_client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    base_url: String,
}

impl CalendarClient {
    pub fn new(http_client: reqwest::Client, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http_client,
            tokens,
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }
}

#[async_trait]
impl CalendarBackend for CalendarClient {
    async fn list_events(
        &self,
        calendar_id: &str,
        max_results: u32,
        ctx: &CallContext,
    ) -> Result<Vec<EventSummary>, BackendError> {
        let token = self.tokens.access_token().await?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let response = self
            .http_client
            .get(self.events_url(calendar_id))
            .bearer_auth(&token)
            .query(&[
                ("timeMin", now),
                ("maxResults", max_results.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .timeout(ctx.timeout)
            .send()
            .await?;

        let list: EventList = read_json(response).await?;
        Ok(list.items.into_iter().map(EventSummary::from).collect())
    }

    async fn create_event(
        &self,
        event: &NewEvent,
        ctx: &CallContext,
    ) -> Result<CreatedEvent, BackendError> {
        let token = self.tokens.access_token().await?;

        let response = self
            .http_client
            .post(self.events_url(PRIMARY))
            .bearer_auth(&token)
            .json(&InsertEventRequest::from(event))
            .timeout(ctx.timeout)
            .send()
            .await?;

        let created: Event = read_json(response).await?;
        tracing::info!(event_id = %created.id, "created calendar event");

        Ok(CreatedEvent {
            id: created.id,
            html_link: created.html_link,
        })
    }
}
