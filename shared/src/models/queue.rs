//! Queued crop cycle views and their display projection

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Days-until-available at or below which a shelf counts as coming soon
pub const COMING_SOON_DAYS: i64 = 3;

/// A pending crop cycle from `GET /api/cropcycle/pending`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedCycleView {
    pub cycle_id: i64,
    pub crop_name: String,
    #[serde(default)]
    pub crop_variety: String,
    #[serde(default)]
    pub crop_type: String,
    #[serde(default)]
    pub status: String,
    pub waiting_for_shelf: Option<WaitingForShelf>,
    pub queued_at: Option<String>,
    pub will_start_from: Option<String>,
    pub queue_position: Option<u32>,
}

/// Forecast for the shelf a queued cycle is waiting on
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaitingForShelf {
    pub rack_id: Option<i64>,
    pub shelf_id: Option<i64>,
    pub current_cycle_id: Option<i64>,
    pub current_crop: Option<String>,
    pub expected_available_date: Option<String>,
    pub days_until_available: Option<i64>,
    pub current_status: Option<String>,
}

/// Which wait panel a queued cycle renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaitPanel {
    /// No shelf forecast at all
    AwaitingAssignment,
    /// A specific rack and shelf are known
    Detailed {
        rack_id: i64,
        shelf_id: i64,
        current_crop: Option<String>,
        days_until_available: Option<i64>,
        expected_available_date: Option<String>,
        will_start_from: Option<String>,
    },
    /// A forecast exists but without a specific location
    General {
        current_crop: Option<String>,
        wait_estimate: Option<String>,
    },
}

impl WaitPanel {
    pub fn message(&self) -> String {
        match self {
            WaitPanel::AwaitingAssignment => "Waiting for shelf assignment".to_string(),
            WaitPanel::Detailed {
                rack_id, shelf_id, ..
            } => format!("Waiting for Rack {}, Shelf {}", rack_id, shelf_id),
            WaitPanel::General {
                current_crop,
                wait_estimate,
            } => {
                let mut message = match current_crop.as_deref().filter(|c| !c.is_empty()) {
                    Some(crop) => format!("Waiting for {} to complete", crop),
                    None => "Waiting for an available shelf".to_string(),
                };
                if let Some(estimate) = wait_estimate {
                    message.push_str(&format!(" (estimated wait: {})", estimate));
                }
                message
            }
        }
    }
}

/// Advisory banner shown on top of the wait panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityHighlight {
    AvailableNow,
    ComingSoon,
}

impl AvailabilityHighlight {
    pub fn for_days(days_until_available: Option<i64>) -> Option<Self> {
        match days_until_available? {
            0 => Some(AvailabilityHighlight::AvailableNow),
            1..=COMING_SOON_DAYS => Some(AvailabilityHighlight::ComingSoon),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AvailabilityHighlight::AvailableNow => {
                "Shelf is available now - planting will start shortly"
            }
            AvailabilityHighlight::ComingSoon => "Shelf will be available soon",
        }
    }
}

/// Display projection of a queued cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueProjection {
    pub cycle_id: i64,
    pub crop_name: String,
    pub crop_variety: String,
    pub queue_position: Option<u32>,
    pub queued_at: Option<String>,
    pub panel: WaitPanel,
    pub highlight: Option<AvailabilityHighlight>,
}

/// Select the wait panel and banner for a queued cycle
pub fn project_queued_cycle(view: &QueuedCycleView) -> QueueProjection {
    let (panel, highlight) = match &view.waiting_for_shelf {
        None => (WaitPanel::AwaitingAssignment, None),
        Some(shelf) => {
            let panel = match (shelf.rack_id, shelf.shelf_id) {
                (Some(rack_id), Some(shelf_id)) => WaitPanel::Detailed {
                    rack_id,
                    shelf_id,
                    current_crop: shelf.current_crop.clone(),
                    days_until_available: shelf.days_until_available,
                    expected_available_date: shelf
                        .expected_available_date
                        .as_deref()
                        .map(format_display_date),
                    will_start_from: view.will_start_from.clone(),
                },
                _ => WaitPanel::General {
                    current_crop: shelf.current_crop.clone(),
                    wait_estimate: shelf
                        .days_until_available
                        .filter(|d| *d > 0)
                        .map(wait_estimate),
                },
            };
            (panel, AvailabilityHighlight::for_days(shelf.days_until_available))
        }
    };

    QueueProjection {
        cycle_id: view.cycle_id,
        crop_name: view.crop_name.clone(),
        crop_variety: view.crop_variety.clone(),
        queue_position: view.queue_position,
        queued_at: view.queued_at.as_deref().map(format_display_date),
        panel,
        highlight,
    }
}

/// Human-readable wait estimate for a number of days
pub fn wait_estimate(days: i64) -> String {
    match days {
        d if d < 0 => "Overdue".to_string(),
        0 => "Available now".to_string(),
        1 => "1 day".to_string(),
        d => format!("{} days", d),
    }
}

/// Format a backend date for display, falling back to the raw text
pub fn format_display_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%b %-d, %Y").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%b %-d, %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%b %-d, %Y").to_string();
    }
    raw.to_string()
}
