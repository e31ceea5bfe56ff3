use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::EventStore;
use crate::models::event::{CalendarEvent, EventPatch, NewEvent};
use crate::models::settings::StoreSettings;

/// JSON client for a remote event store.
pub struct HttpEventStore {
    client: Client,
    events_url: Url,
    max_response_bytes: usize,
    max_retries: usize,
    retry_delay_ms: u64,
}

impl HttpEventStore {
    pub fn new(settings: &StoreSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build event store HTTP client")?;

        Ok(Self {
            client,
            events_url: Self::events_url(&settings.base_url)?,
            max_response_bytes: settings.max_response_bytes,
            max_retries: settings.max_retries,
            retry_delay_ms: settings.retry_delay_ms,
        })
    }

    fn events_url(base_url: &str) -> Result<Url> {
        let base = base_url.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(anyhow!("Event store URL must use HTTP or HTTPS"));
        }
        Url::parse(&format!("{}/events", base))
            .with_context(|| format!("Invalid event store URL: {}", Self::redact_url(base)))
    }

    fn list_url(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Url {
        let mut url = self.events_url.clone();
        url.query_pairs_mut()
            .append_pair("start", &start.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("end", &end.to_rfc3339_opts(SecondsFormat::Secs, true));
        url
    }

    fn event_url(&self, id: &str) -> Result<Url> {
        if id.trim().is_empty() {
            return Err(anyhow!("Event id cannot be empty"));
        }
        let mut url = self.events_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Event store URL cannot hold a path"))?
            .push(id);
        Ok(url)
    }

    fn list_once(&self, url: &Url) -> Result<Vec<CalendarEvent>> {
        let events: Vec<CalendarEvent> = self.send_json(self.client.get(url.clone()))?;

        // Reject the whole batch rather than lay out a partial window.
        for event in &events {
            event
                .validate()
                .with_context(|| format!("Event store returned invalid event '{}'", event.id))?;
        }
        Ok(events)
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let bytes = self.send(request)?;
        serde_json::from_slice(&bytes).context("Event store returned malformed JSON")
    }

    fn send(&self, request: RequestBuilder) -> Result<Vec<u8>> {
        let response = request
            .send()
            .context("Network error during event store request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Event store request failed with HTTP status {}", status));
        }

        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_bytes {
                return Err(anyhow!(
                    "Event store response too large ({} bytes > {} bytes)",
                    content_length,
                    self.max_response_bytes
                ));
            }
        }

        let bytes = response
            .bytes()
            .context("Failed to read event store response body")?;

        if bytes.len() > self.max_response_bytes {
            return Err(anyhow!(
                "Event store response too large ({} bytes > {} bytes)",
                bytes.len(),
                self.max_response_bytes
            ));
        }

        Ok(bytes.to_vec())
    }

    /// Keep scheme, host and path; drop credentials and query values.
    fn redact_url(url: &str) -> String {
        match Url::parse(url) {
            Ok(parsed) => {
                let host = parsed.host_str().unwrap_or("***");
                let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();
                let query = if parsed.query().is_some() {
                    "?***redacted***"
                } else {
                    ""
                };
                format!("{}://{}{}{}{}", parsed.scheme(), host, port, parsed.path(), query)
            }
            Err(_) => "***redacted-url***".to_string(),
        }
    }
}

impl EventStore for HttpEventStore {
    fn list(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<CalendarEvent>> {
        let url = self.list_url(start, end);
        let redacted = Self::redact_url(url.as_str());
        let mut last_error: Option<anyhow::Error> = None;

        for attempt in 0..=self.max_retries {
            match self.list_once(&url) {
                Ok(events) => {
                    log::debug!("Fetched {} event(s) from {}", events.len(), redacted);
                    return Ok(events);
                }
                Err(err) => {
                    let is_last_attempt = attempt == self.max_retries;
                    if is_last_attempt {
                        last_error = Some(err.context(format!(
                            "Failed to list events from {} after {} attempts",
                            redacted,
                            attempt + 1
                        )));
                    } else {
                        log::warn!(
                            "Event list attempt {} failed for {}: {}",
                            attempt + 1,
                            redacted,
                            err
                        );
                        thread::sleep(Duration::from_millis(self.retry_delay_ms));
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("Unknown event store error")))
    }

    fn create(&self, event: NewEvent) -> Result<CalendarEvent> {
        event.validate().context("Refusing to send invalid event")?;

        let created: CalendarEvent = self
            .send_json(self.client.post(self.events_url.clone()).json(&event))
            .context("Failed to create event")?;
        created
            .validate()
            .context("Event store returned invalid event")?;

        log::info!("Created event {}", created.id);
        Ok(created)
    }

    fn update(&self, id: &str, patch: EventPatch) -> Result<CalendarEvent> {
        let url = self.event_url(id)?;
        let updated: CalendarEvent = self
            .send_json(self.client.patch(url).json(&patch))
            .with_context(|| format!("Failed to update event {}", id))?;
        updated
            .validate()
            .context("Event store returned invalid event")?;

        log::info!("Updated event {}", id);
        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let url = self.event_url(id)?;
        self.send(self.client.delete(url))
            .with_context(|| format!("Failed to delete event {}", id))?;

        log::info!("Deleted event {}", id);
        Ok(())
    }
}
