//! Layout computation: normalized collections in, render-ready rows out.
//!
//! Everything the presentation adapter draws is decided here: which calendar
//! cells are busy, which forecast entries fit the strips, which agenda rows
//! survive the caps and what their date labels say. The adapter maps the
//! result to pixels and nothing else.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::WeatherCondition;
use crate::config::LayoutConfig;
use crate::feed;
use crate::time::{calendar_grid, CalendarGrid};
use crate::types::{CalendarEvent, CurrentConditions, FeedInput, ForecastPoint};

/// Half-open interval overlap: `[x1, x2)` against `[y1, y2)`.
///
/// Inverted ranges overlap nothing; upstream occasionally emits
/// `end < start` and the answer has to be "no" rather than a panic.
pub fn is_overlap<T: Ord>(x1: T, x2: T, y1: T, y2: T) -> bool {
    if x2 < x1 || y2 < y1 {
        return false;
    }
    x1 < y2 && y1 < x2
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Today's and tomorrow's day spans within the grid.
///
/// When "now" falls outside the 42-day window all three boundaries collapse
/// to the epoch; the spans are zero-width and every label falls back to an
/// absolute date.
#[derive(Debug, Clone, Copy)]
pub struct AgendaWindow {
    pub today_start: DateTime<Utc>,
    pub today_end: DateTime<Utc>,
    pub tomorrow_end: DateTime<Utc>,
}

impl AgendaWindow {
    pub fn locate(grid: &CalendarGrid, now: DateTime<Utc>) -> Self {
        match grid.day_index_of(now) {
            Some(i) => {
                let bounds = grid.bounds();
                Self {
                    today_start: bounds[i],
                    today_end: bounds[i + 1],
                    tomorrow_end: bounds[i + 2],
                }
            }
            None => Self {
                today_start: DateTime::UNIX_EPOCH,
                today_end: DateTime::UNIX_EPOCH,
                tomorrow_end: DateTime::UNIX_EPOCH,
            },
        }
    }

    /// Relative date label for an instant: the today/tomorrow token when it
    /// falls in those spans, otherwise `YYYY.MM.DD.` or `MM.DD.`.
    pub fn label<Tz: TimeZone>(
        &self,
        instant: DateTime<Utc>,
        include_year: bool,
        tz: &Tz,
        config: &LayoutConfig,
    ) -> String {
        if self.today_start <= instant && instant < self.today_end {
            config.today_label.clone()
        } else if self.today_end <= instant && instant < self.tomorrow_end {
            config.tomorrow_label.clone()
        } else {
            let local = instant.with_timezone(tz);
            if include_year {
                format!("{}.{:02}.{:02}.", local.year(), local.month(), local.day())
            } else {
                format!("{:02}.{:02}.", local.month(), local.day())
            }
        }
    }
}

/// The date header and clock stamp of the pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayPanel {
    pub year: i32,
    /// 1-12.
    pub month: u32,
    pub day: u32,
    /// 0 = Monday.
    pub weekday: u8,
    pub hour: u32,
    pub minute: u32,
}

/// One cell of the six-week month grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCell {
    pub day: u32,
    pub in_current_month: bool,
    pub is_today: bool,
    /// Whether any event overlaps this day.
    pub busy: bool,
}

/// Current weather, reduced to what the panel draws.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentPanel {
    pub temperature: Option<i32>,
    pub temperature_low: Option<i32>,
    pub temperature_high: Option<i32>,
    /// Only present above the display threshold.
    pub precipitation: Option<i32>,
    pub condition: WeatherCondition,
    /// Picks the day/night glyph variant.
    pub is_day: bool,
    pub summary: String,
}

/// One column of the hourly forecast strip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyEntry {
    /// Local hour, 0-23.
    pub hour: u32,
    pub icon: WeatherCondition,
    pub temperature: Option<i32>,
    pub precipitation: Option<i32>,
}

/// One row of the daily forecast list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyEntry {
    /// 0 = Monday.
    pub weekday: u8,
    pub icon: WeatherCondition,
    /// Untranslated identifier for the text column.
    pub condition: WeatherCondition,
    pub temperature_low: Option<i32>,
    pub temperature: Option<i32>,
}

/// How an agenda event renders its two label lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgendaKind {
    AllDaySingle,
    AllDayMulti,
    TimedSingle,
    TimedMulti,
}

/// One row of the agenda region: an upcoming event or a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgendaEntry {
    Event {
        summary: String,
        location: Option<String>,
        kind: AgendaKind,
        when: String,
        when_secondary: Option<String>,
    },
    Task {
        subject: String,
    },
}

/// Render-ready output of one pass. Pure data; the presentation adapter
/// performs no further computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    pub today: TodayPanel,
    pub cells: Vec<DayCell>,
    pub current: CurrentPanel,
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<DailyEntry>,
    pub agenda: Vec<AgendaEntry>,
}

/// Run one render pass.
///
/// `now` is the single wall-clock sample for the pass: the caller reads the
/// clock once and every comparison below uses that value, so a date boundary
/// crossing mid-render cannot tear the layout.
pub fn compose<Tz: TimeZone>(feeds: &FeedInput, now: DateTime<Tz>, config: &LayoutConfig) -> Layout {
    let tz = now.timezone();
    let events = feed::extract_events(&feeds.calendar, &tz);
    let hourly = feed::extract_forecast(&feeds.forecast_hourly, &tz);
    let daily = feed::extract_forecast(&feeds.forecast_daily, &tz);
    let tasks = feed::extract_tasks(&feeds.tasks);
    let current = feed::extract_current(&feeds.current);

    let grid = calendar_grid(&now, config.first_weekday);
    let now_utc = now.with_timezone(&Utc);
    let window = AgendaWindow::locate(&grid, now_utc);

    Layout {
        today: today_panel(&now),
        cells: day_cells(&grid, &events, &now),
        current: current_panel(&current, config),
        hourly: hourly_slice(&hourly, now_utc, &tz, config),
        daily: daily_slice(&daily, now_utc, &tz, config),
        agenda: agenda_rows(&events, &tasks, window, &tz, config),
    }
}

fn today_panel<Tz: TimeZone>(now: &DateTime<Tz>) -> TodayPanel {
    TodayPanel {
        year: now.year(),
        month: now.month(),
        day: now.day(),
        weekday: now.weekday().num_days_from_monday() as u8,
        hour: now.hour(),
        minute: now.minute(),
    }
}

fn day_cells<Tz: TimeZone>(
    grid: &CalendarGrid,
    events: &[CalendarEvent],
    now: &DateTime<Tz>,
) -> Vec<DayCell> {
    let tz = now.timezone();
    (0..CalendarGrid::DAYS)
        .map(|i| {
            let (cell_start, cell_end) = grid.day_span(i);
            let local = cell_start.with_timezone(&tz);
            let in_current_month = local.month() == now.month();
            DayCell {
                day: local.day(),
                in_current_month,
                is_today: in_current_month && local.day() == now.day(),
                busy: events
                    .iter()
                    .any(|event| is_overlap(cell_start, cell_end, event.start, event.end)),
            }
        })
        .collect()
}

fn current_panel(current: &CurrentConditions, config: &LayoutConfig) -> CurrentPanel {
    CurrentPanel {
        temperature: display_round(current.temperature),
        temperature_low: display_round(current.temperature_low),
        temperature_high: display_round(current.temperature_high),
        precipitation: display_precipitation(current.precipitation, config),
        condition: current.condition,
        // Unknown elevation counts as day.
        is_day: current.sun_elevation.map(|e| e > 0.0).unwrap_or(true),
        summary: capitalize_first(&current.summary),
    }
}

fn hourly_slice<Tz: TimeZone>(
    points: &[ForecastPoint],
    now: DateTime<Utc>,
    tz: &Tz,
    config: &LayoutConfig,
) -> Vec<HourlyEntry> {
    points
        .iter()
        .filter(|point| now < point.time)
        .take(config.hourly_cap)
        .map(|point| HourlyEntry {
            hour: point.time.with_timezone(tz).hour(),
            icon: point.condition.forecast_icon(),
            temperature: display_round(point.temperature),
            precipitation: display_precipitation(point.precipitation, config),
        })
        .collect()
}

fn daily_slice<Tz: TimeZone>(
    points: &[ForecastPoint],
    now: DateTime<Utc>,
    tz: &Tz,
    config: &LayoutConfig,
) -> Vec<DailyEntry> {
    points
        .iter()
        .filter(|point| now < point.time)
        .take(config.daily_cap)
        .map(|point| DailyEntry {
            weekday: point.time.with_timezone(tz).weekday().num_days_from_monday() as u8,
            icon: point.condition.forecast_icon(),
            condition: point.condition,
            temperature_low: display_round(point.temperature_low),
            temperature: display_round(point.temperature),
        })
        .collect()
}

fn agenda_rows<Tz: TimeZone>(
    events: &[CalendarEvent],
    tasks: &[String],
    window: AgendaWindow,
    tz: &Tz,
    config: &LayoutConfig,
) -> Vec<AgendaEntry> {
    let horizon = window.today_start + Duration::days(config.agenda_window_days);
    let mut rows: Vec<AgendaEntry> = events
        .iter()
        .filter(|event| is_overlap(window.today_start, horizon, event.start, event.end))
        .take(config.agenda_event_cap)
        .map(|event| event_row(event, window, tz, config))
        .collect();
    let remaining = config.agenda_cap.saturating_sub(rows.len());
    rows.extend(
        tasks
            .iter()
            .take(remaining)
            .map(|task| AgendaEntry::Task { subject: task.clone() }),
    );
    rows
}

fn event_row<Tz: TimeZone>(
    event: &CalendarEvent,
    window: AgendaWindow,
    tz: &Tz,
    config: &LayoutConfig,
) -> AgendaEntry {
    let start_local = event.start.with_timezone(tz);
    let end_local = event.end.with_timezone(tz);
    // A short all-day event still counts as single-day even though its
    // exclusive end lands on the next midnight.
    let single_day = (start_local.year() == end_local.year()
        && start_local.ordinal() == end_local.ordinal())
        || (event.is_all_day && event.end < event.start + Duration::hours(36));

    let (kind, when, when_secondary) = if event.is_all_day && single_day {
        (AgendaKind::AllDaySingle, window.label(event.start, true, tz, config), None)
    } else if event.is_all_day {
        (
            AgendaKind::AllDayMulti,
            window.label(event.start, true, tz, config),
            // Exclusive midnight end: step half a day back so the label
            // names the last day the event covers.
            Some(window.label(event.end - Duration::hours(12), true, tz, config)),
        )
    } else if single_day {
        (
            AgendaKind::TimedSingle,
            format!(
                "{} {:02}:{:02}",
                window.label(event.start, true, tz, config),
                start_local.hour(),
                start_local.minute()
            ),
            Some(format!("{:02}:{:02}", end_local.hour(), end_local.minute())),
        )
    } else {
        (
            AgendaKind::TimedMulti,
            format!(
                "{} {:02}:{:02}",
                window.label(event.start, true, tz, config),
                start_local.hour(),
                start_local.minute()
            ),
            Some(format!(
                "{} {:02}:{:02}",
                window.label(event.end, true, tz, config),
                end_local.hour(),
                end_local.minute()
            )),
        )
    };

    AgendaEntry::Event {
        summary: event.summary.clone(),
        location: event.location.clone(),
        kind,
        when,
        when_secondary,
    }
}

fn display_round(value: Option<f64>) -> Option<i32> {
    value.map(|v| v.round() as i32)
}

fn display_precipitation(value: Option<f64>, config: &LayoutConfig) -> Option<i32> {
    value.filter(|p| *p > config.precipitation_threshold).map(|p| p.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn cet() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn noon() -> DateTime<FixedOffset> {
        cet().with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        cet().with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap().with_timezone(&Utc)
    }

    fn make_event(start: DateTime<Utc>, end: DateTime<Utc>, all_day: bool) -> CalendarEvent {
        CalendarEvent {
            start,
            end,
            is_all_day: all_day,
            summary: "event".to_string(),
            location: None,
        }
    }

    fn test_window() -> AgendaWindow {
        let now = noon();
        let grid = calendar_grid(&now, chrono::Weekday::Mon);
        AgendaWindow::locate(&grid, now.with_timezone(&Utc))
    }

    #[test]
    fn overlap_half_open_semantics() {
        assert!(is_overlap(0, 10, 5, 15));
        assert!(!is_overlap(0, 10, 10, 20));
        assert!(!is_overlap(10, 20, 0, 10));
        assert!(is_overlap(0, 100, 40, 60));
    }

    #[test]
    fn overlap_tolerates_inverted_ranges() {
        assert!(!is_overlap(10, 5, 0, 20));
        assert!(!is_overlap(0, 20, 10, 5));
    }

    #[test]
    fn capitalize_first_handles_unicode_and_empty() {
        assert_eq!(capitalize_first("szeles idő"), "Szeles idő");
        assert_eq!(capitalize_first("árvíz"), "Árvíz");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("Már nagy"), "Már nagy");
    }

    #[test]
    fn window_labels_today_tomorrow_and_absolute() {
        let config = LayoutConfig::default();
        let window = test_window();
        let tz = cet();
        assert_eq!(window.label(window.today_start, true, &tz, &config), "Today");
        assert_eq!(window.label(window.today_end, true, &tz, &config), "Tomorrow");
        assert_eq!(window.label(local(2024, 3, 20, 9, 0), true, &tz, &config), "2024.03.20.");
        assert_eq!(window.label(local(2024, 3, 20, 9, 0), false, &tz, &config), "03.20.");
    }

    #[test]
    fn window_outside_grid_falls_back_to_absolute() {
        let config = LayoutConfig::default();
        let now = noon();
        let grid = calendar_grid(&now, chrono::Weekday::Mon);
        // A pass whose "now" predates the whole grid finds no today span.
        let window = AgendaWindow::locate(&grid, DateTime::UNIX_EPOCH);
        assert_eq!(window.today_start, window.tomorrow_end);
        assert_eq!(window.label(local(2024, 3, 10, 0, 0), true, &cet(), &config), "2024.03.10.");
    }

    #[test]
    fn agenda_caps_events_then_fills_with_tasks() {
        let config = LayoutConfig::default();
        let window = test_window();
        // 15 overlapping events, all inside the 3-day window.
        let events: Vec<CalendarEvent> = (0..15)
            .map(|i| {
                make_event(
                    window.today_start + Duration::minutes(30 * i),
                    window.today_start + Duration::minutes(30 * i + 25),
                    false,
                )
            })
            .collect();
        let tasks: Vec<String> = (0..5).map(|i| format!("task {i}")).collect();
        let rows = agenda_rows(&events, &tasks, window, &cet(), &config);
        assert_eq!(rows.len(), 12);
        let event_count =
            rows.iter().filter(|r| matches!(r, AgendaEntry::Event { .. })).count();
        assert_eq!(event_count, 9);
        // Events stay chronological, tasks keep feed order at the tail.
        match &rows[9] {
            AgendaEntry::Task { subject } => assert_eq!(subject, "task 0"),
            other => panic!("expected a task row, got {other:?}"),
        }
    }

    #[test]
    fn agenda_ignores_events_outside_window() {
        let config = LayoutConfig::default();
        let window = test_window();
        let events = vec![
            make_event(local(2024, 3, 20, 9, 0), local(2024, 3, 20, 10, 0), false),
            make_event(local(2024, 3, 1, 9, 0), local(2024, 3, 1, 10, 0), false),
        ];
        let rows = agenda_rows(&events, &[], window, &cet(), &config);
        assert!(rows.is_empty());
    }

    #[test]
    fn event_rows_classify_and_label() {
        let config = LayoutConfig::default();
        let window = test_window();
        let tz = cet();

        // All-day, one day: Mar 11 00:00 .. Mar 12 00:00 local.
        let all_day =
            make_event(local(2024, 3, 11, 0, 0), local(2024, 3, 12, 0, 0), true);
        match event_row(&all_day, window, &tz, &config) {
            AgendaEntry::Event { kind, when, when_secondary, .. } => {
                assert_eq!(kind, AgendaKind::AllDaySingle);
                assert_eq!(when, "Tomorrow");
                assert_eq!(when_secondary, None);
            }
            other => panic!("unexpected row {other:?}"),
        }

        // All-day spanning three days: secondary labels the last covered day.
        let spanning =
            make_event(local(2024, 3, 11, 0, 0), local(2024, 3, 14, 0, 0), true);
        match event_row(&spanning, window, &tz, &config) {
            AgendaEntry::Event { kind, when, when_secondary, .. } => {
                assert_eq!(kind, AgendaKind::AllDayMulti);
                assert_eq!(when, "Tomorrow");
                assert_eq!(when_secondary.as_deref(), Some("2024.03.13."));
            }
            other => panic!("unexpected row {other:?}"),
        }

        // Timed, same day.
        let timed = make_event(local(2024, 3, 10, 9, 0), local(2024, 3, 10, 10, 30), false);
        match event_row(&timed, window, &tz, &config) {
            AgendaEntry::Event { kind, when, when_secondary, .. } => {
                assert_eq!(kind, AgendaKind::TimedSingle);
                assert_eq!(when, "Today 09:00");
                assert_eq!(when_secondary.as_deref(), Some("10:30"));
            }
            other => panic!("unexpected row {other:?}"),
        }

        // Timed, crossing midnight.
        let overnight = make_event(local(2024, 3, 10, 22, 0), local(2024, 3, 11, 1, 0), false);
        match event_row(&overnight, window, &tz, &config) {
            AgendaEntry::Event { kind, when, when_secondary, .. } => {
                assert_eq!(kind, AgendaKind::TimedMulti);
                assert_eq!(when, "Today 22:00");
                assert_eq!(when_secondary.as_deref(), Some("Tomorrow 01:00"));
            }
            other => panic!("unexpected row {other:?}"),
        }
    }

    #[test]
    fn busy_cells_mark_event_days_only() {
        let now = noon();
        let grid = calendar_grid(&now, chrono::Weekday::Mon);
        let events = vec![
            make_event(local(2024, 3, 12, 9, 0), local(2024, 3, 12, 10, 0), false),
            // Inverted range must not mark anything (or panic).
            make_event(local(2024, 3, 14, 10, 0), local(2024, 3, 14, 9, 0), false),
        ];
        let cells = day_cells(&grid, &events, &now);
        assert_eq!(cells.len(), 42);
        let busy_days: Vec<u32> =
            cells.iter().filter(|c| c.busy).map(|c| c.day).collect();
        assert_eq!(busy_days, vec![12]);
        let today: Vec<&DayCell> = cells.iter().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].day, 10);
        assert!(today[0].in_current_month);
    }

    #[test]
    fn forecast_slices_cap_and_substitute_icons() {
        let config = LayoutConfig::default();
        let now_utc = noon().with_timezone(&Utc);
        let points: Vec<ForecastPoint> = (0..8)
            .map(|i| ForecastPoint {
                time: local(2024, 3, 10, 9 + i, 0),
                temperature: Some(5.0 + i as f64),
                temperature_low: Some(1.0),
                precipitation: if i == 5 { Some(55.0) } else { Some(2.0) },
                condition: WeatherCondition::PartlyCloudy,
            })
            .collect();

        let hourly = hourly_slice(&points, now_utc, &cet(), &config);
        // Points at 09:00-12:00 are not strictly after noon.
        assert_eq!(hourly.len(), 4);
        assert_eq!(hourly[0].hour, 13);
        assert_eq!(hourly[0].icon, WeatherCondition::Cloudy);
        assert_eq!(hourly[0].temperature, Some(9));
        assert_eq!(hourly[0].precipitation, None, "2% stays under the threshold");
        assert_eq!(hourly[1].precipitation, Some(55));

        let daily = daily_slice(&points, now_utc, &cet(), &config);
        assert_eq!(daily.len(), 4, "only four points lie after now");
        assert_eq!(daily[0].icon, WeatherCondition::Cloudy);
        assert_eq!(daily[0].condition, WeatherCondition::PartlyCloudy);
        assert_eq!(daily[0].weekday, 6, "March 10, 2024 is a Sunday");
    }

    #[test]
    fn current_panel_keeps_condition_and_resolves_daylight() {
        let config = LayoutConfig::default();
        let observed = CurrentConditions {
            temperature: Some(11.6),
            temperature_low: Some(3.5),
            temperature_high: Some(13.4),
            precipitation: Some(2.0),
            sun_elevation: Some(-5.0),
            condition: WeatherCondition::PartlyCloudy,
            summary: "scattered clouds".to_string(),
        };
        let panel = current_panel(&observed, &config);
        assert_eq!(panel.temperature, Some(12));
        assert_eq!(panel.temperature_low, Some(4));
        assert_eq!(panel.precipitation, None);
        assert_eq!(panel.condition, WeatherCondition::PartlyCloudy, "no icon substitution here");
        assert!(!panel.is_day);
        assert_eq!(panel.summary, "Scattered clouds");

        let unknown_sun = CurrentConditions::default();
        assert!(current_panel(&unknown_sun, &config).is_day);
    }

    #[test]
    fn empty_feeds_compose_to_a_sparse_layout() {
        let layout = compose(&FeedInput::default(), noon(), &LayoutConfig::default());
        assert_eq!(layout.cells.len(), 42);
        assert!(layout.hourly.is_empty());
        assert!(layout.daily.is_empty());
        assert!(layout.agenda.is_empty());
        assert_eq!(layout.today.year, 2024);
        assert_eq!(layout.today.month, 3);
        assert_eq!(layout.today.day, 10);
        assert_eq!(layout.today.weekday, 6);
        assert_eq!((layout.today.hour, layout.today.minute), (12, 0));
        assert_eq!(layout.cells.iter().filter(|c| c.is_today).count(), 1);
    }
}
