//! Normalized feed data: the typed collections the layout engine consumes.
//!
//! Everything here is a plain value record produced fresh on every render
//! pass. Instants are `DateTime<Utc>`; "local-time-resolved" means the
//! conversion from wall-clock fields used the render timezone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::WeatherCondition;

/// One calendar entry from the aggregated calendar feed.
///
/// `start <= end` is not guaranteed by upstream; overlap logic tolerates
/// inverted ranges. After normalization the event collection is sorted
/// ascending by `start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// True when the source start string carried no time-of-day component.
    pub is_all_day: bool,
    pub summary: String,
    pub location: Option<String>,
}

/// One point of an hourly or daily forecast series.
///
/// Upstream omits fields freely; absent values stay `None` rather than
/// borrowing a sentinel. The collection is sorted ascending by `time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub time: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub temperature_low: Option<f64>,
    pub precipitation: Option<f64>,
    pub condition: WeatherCondition,
}

/// Instantaneous weather observations for the current-conditions panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub temperature_low: Option<f64>,
    pub temperature_high: Option<f64>,
    pub precipitation: Option<f64>,
    /// Sun elevation in degrees; used to pick day/night glyph variants.
    pub sun_elevation: Option<f64>,
    pub condition: WeatherCondition,
    /// Free-text weather sentence shown under the forecast strip.
    pub summary: String,
}

/// The raw snapshot strings one render pass works from.
///
/// Acquisition (polling, caching) happens outside this crate; by the time a
/// pass starts these are already-resident strings. Empty strings are valid
/// and yield an empty, but still renderable, layout.
#[derive(Debug, Clone, Default)]
pub struct FeedInput {
    pub calendar: String,
    pub forecast_hourly: String,
    pub forecast_daily: String,
    pub tasks: String,
    pub current: String,
}
