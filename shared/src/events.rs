//! Inbound LINE webhook events.

use serde::Deserialize;

use crate::{Error, Result};

/// Webhook request body.
#[derive(Debug, Deserialize)]
struct Envelope {
    events: Vec<InboundEvent>,
}

/// Kind of webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Message,
    #[serde(other)]
    Other,
}

/// A single webhook event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Absent for events that cannot be replied to (e.g. unfollow)
    #[serde(default)]
    pub reply_token: String,
    #[serde(default)]
    pub message: Option<Message>,
}

/// Message payload carried by a `message` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Text(TextMessage),
    Location(LocationMessage),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextMessage {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationMessage {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl LocationMessage {
    /// Coordinates as two-decimal strings, the precision sent to the search API.
    pub fn query_coordinates(&self) -> (String, String) {
        (format_coordinate(self.latitude), format_coordinate(self.longitude))
    }
}

/// Format a coordinate with exactly two decimal places.
pub fn format_coordinate(value: f64) -> String {
    format!("{:.2}", value)
}

/// Decode a webhook body into its events, preserving arrival order.
pub fn parse(body: &[u8]) -> Result<Vec<InboundEvent>> {
    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|e| Error::Parse(format!("Invalid webhook body: {}", e)))?;
    Ok(envelope.events)
}
