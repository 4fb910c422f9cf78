use chrono::Weekday;

/// Knobs for the layout engine.
///
/// The defaults reproduce the display the engine was built for: a Monday-first
/// six-week month grid, four hourly and seven daily forecast slots, and an
/// agenda region with room for twelve rows.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// First day of the week in the month grid.
    pub first_weekday: Weekday,
    /// Label token for events falling on the current day.
    pub today_label: String,
    /// Label token for events falling on the next day.
    pub tomorrow_label: String,
    /// Days covered by the agenda, starting at today's midnight.
    pub agenda_window_days: i64,
    /// Maximum number of event rows in the agenda.
    pub agenda_event_cap: usize,
    /// Maximum number of agenda rows overall (events plus tasks).
    pub agenda_cap: usize,
    /// Maximum entries in the hourly forecast strip.
    pub hourly_cap: usize,
    /// Maximum entries in the daily forecast list.
    pub daily_cap: usize,
    /// Precipitation percentages at or below this are not worth showing.
    pub precipitation_threshold: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            first_weekday: Weekday::Mon,
            today_label: "Today".to_string(),
            tomorrow_label: "Tomorrow".to_string(),
            agenda_window_days: 3,
            agenda_event_cap: 9,
            agenda_cap: 12,
            hourly_cap: 4,
            daily_cap: 7,
            precipitation_threshold: 5.0,
        }
    }
}
