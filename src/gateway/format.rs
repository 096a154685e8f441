//! Result formatting
//!
//! Turns a handler's structured [`ToolOutput`] into text content blocks. One
//! block per item, in the order the backend returned them.

use std::sync::LazyLock;

use regex::Regex;

use crate::google::types::{
    CreatedEvent, Directions, EventSummary, GeocodeResult, MessageSummary, Place, SentMessage,
};
use crate::mcp::types::ToolResultContent;

/// Block produced for an empty result
pub const NO_RESULTS: &str = "No results found.";

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static HTML_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").unwrap());

/// Structured result of a tool handler
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Messages(Vec<MessageSummary>),
    MessageSent(SentMessage),
    Events(Vec<EventSummary>),
    EventCreated(CreatedEvent),
    Directions(Option<Directions>),
    Geocode(Option<GeocodeResult>),
    Places { location: String, places: Vec<Place> },
    /// Free-form text for handlers outside the built-in Google tools.
    ///
    /// None of the built-in handlers produce it; it lets an embedder register
    /// a tool without adding a variant here. Empty text formats as the
    /// no-results block.
    Text(String),
}

/// Format a structured result as content blocks
pub fn format(output: &ToolOutput) -> Vec<ToolResultContent> {
    let blocks = match output {
        ToolOutput::Messages(messages) => messages.iter().map(message_block).collect(),
        ToolOutput::MessageSent(sent) => vec![format!(
            "Message sent successfully! Message ID: {}",
            sent.id
        )],
        ToolOutput::Events(events) => events.iter().map(event_block).collect(),
        ToolOutput::EventCreated(created) => vec![created_event_block(created)],
        ToolOutput::Directions(Some(directions)) => directions_blocks(directions),
        ToolOutput::Geocode(Some(result)) => vec![format!(
            "Address: {}\nLatitude: {}\nLongitude: {}",
            result.formatted_address, result.lat, result.lng
        )],
        ToolOutput::Places { location, places } => places
            .iter()
            .map(|place| place_block(location, place))
            .collect(),
        ToolOutput::Text(text) if !text.is_empty() => vec![text.clone()],
        ToolOutput::Directions(None) | ToolOutput::Geocode(None) | ToolOutput::Text(_) => {
            Vec::new()
        }
    };

    if blocks.is_empty() {
        return vec![ToolResultContent::text(NO_RESULTS)];
    }
    blocks.into_iter().map(ToolResultContent::text).collect()
}

fn message_block(msg: &MessageSummary) -> String {
    format!(
        "From: {}\nSubject: {}\nDate: {}\nSnippet: {}",
        or_placeholder(&msg.from, "Unknown"),
        or_placeholder(&msg.subject, "No Subject"),
        msg.date,
        msg.snippet
    )
}

fn event_block(event: &EventSummary) -> String {
    let mut text = format!(
        "Title: {}\nStart: {}\nEnd: {}",
        or_placeholder(&event.summary, "No Title"),
        event.start,
        event.end
    );
    if !event.location.is_empty() {
        text.push_str(&format!("\nLocation: {}", event.location));
    }
    if !event.description.is_empty() {
        text.push_str(&format!("\nDescription: {}", event.description));
    }
    if !event.attendees.is_empty() {
        text.push_str(&format!("\nAttendees: {}", event.attendees.join(", ")));
    }
    text
}

fn created_event_block(created: &CreatedEvent) -> String {
    let mut text = format!("Event created successfully! Event ID: {}", created.id);
    if let Some(link) = &created.html_link {
        text.push_str(&format!("\nLink: {}", link));
    }
    text
}

fn directions_blocks(directions: &Directions) -> Vec<String> {
    let header = format!(
        "Directions from {} to {}:\nDistance: {}\nDuration: {}",
        directions.start_address, directions.end_address, directions.distance, directions.duration
    );

    std::iter::once(header)
        .chain(directions.steps.iter().enumerate().map(|(i, step)| {
            format!(
                "{}. {} ({}, {})",
                i + 1,
                strip_html(&step.instruction),
                step.distance,
                step.duration
            )
        }))
        .collect()
}

fn place_block(location: &str, place: &Place) -> String {
    let rating = place
        .rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "Near {}:\nName: {}\nAddress: {}\nRating: {}\nTypes: {}",
        location,
        place.name,
        place.address,
        rating,
        place.types.join(", ")
    )
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

/// Remove HTML markup from Maps step instructions
pub fn strip_html(text: &str) -> String {
    let stripped = HTML_TAG.replace_all(text, " ");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode character references in one pass, so `&amp;lt;` stays `&lt;`.
/// Unknown named entities are left as written.
fn decode_entities(text: &str) -> String {
    HTML_ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "nbsp" => Some(' '),
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity.strip_prefix('#').and_then(|code| {
                    let value = match code.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                        None => code.parse().ok()?,
                    };
                    char::from_u32(value)
                }),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
