// Settings module
// Engine configuration loaded from settings.toml

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::models::view::ViewKind;
use crate::utils::date::{weekday_from_index, CalendarFrame};

/// Geometry inputs for the time grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    /// Layout units per hour of wall-clock time.
    pub row_height_units: f64,
    /// Smallest height a timed block is given.
    pub min_height_units: f64,
    /// Pack and cluster on the drawn extent rather than the true end, so
    /// floored blocks never collide on screen. Off by default.
    pub pack_by_visual_extent: bool,
}

impl GridMetrics {
    /// Duration a block of minimum height represents.
    pub fn min_visual_minutes(&self) -> f64 {
        if self.row_height_units <= 0.0 {
            return 0.0;
        }
        self.min_height_units / self.row_height_units * 60.0
    }
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            row_height_units: 48.0,
            min_height_units: 12.0,
            pack_by_visual_extent: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    pub max_response_bytes: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 20,
            max_retries: 2,
            retry_delay_ms: 400,
            max_response_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 0 = Sunday, 1 = Monday, ... 6 = Saturday
    pub first_day_of_week: u8,
    /// Display offset used to decide calendar days.
    pub utc_offset_minutes: i32,
    pub row_height_units: f64,
    pub min_height_units: f64,
    pub pack_by_visual_extent: bool,
    pub default_view: ViewKind,
    pub store: StoreSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let metrics = GridMetrics::default();
        Self {
            first_day_of_week: 0, // Sunday
            utc_offset_minutes: 0,
            row_height_units: metrics.row_height_units,
            min_height_units: metrics.min_height_units,
            pack_by_visual_extent: metrics.pack_by_visual_extent,
            default_view: ViewKind::Month,
            store: StoreSettings::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.first_day_of_week > 6 {
            return Err("First day of week must be between 0 (Sunday) and 6 (Saturday)".to_string());
        }

        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err("UTC offset must be less than 24 hours".to_string());
        }

        if !self.row_height_units.is_finite() || self.row_height_units <= 0.0 {
            return Err("Row height must be a positive number".to_string());
        }

        if !self.min_height_units.is_finite() || self.min_height_units < 0.0 {
            return Err("Minimum block height cannot be negative".to_string());
        }

        if self.min_height_units > self.row_height_units * 24.0 {
            return Err("Minimum block height cannot exceed a full day".to_string());
        }

        let base_url = self.store.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err("Event store URL must start with http:// or https://".to_string());
        }

        if self.store.timeout_secs == 0 {
            return Err("Event store timeout must be greater than 0 seconds".to_string());
        }

        Ok(())
    }

    pub fn frame(&self) -> CalendarFrame {
        let offset = FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| CalendarFrame::default().offset());
        CalendarFrame::new(offset, weekday_from_index(self.first_day_of_week))
    }

    pub fn metrics(&self) -> GridMetrics {
        GridMetrics {
            row_height_units: self.row_height_units,
            min_height_units: self.min_height_units,
            pack_by_visual_extent: self.pack_by_visual_extent,
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
