// Settings module
// Board configuration as read from board.toml

use serde::{Deserialize, Serialize};

use crate::models::board::{BoardConfig, BoardKind, CapacityPolicy, Granularity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub branch_id: String,
    pub board: BoardKind,
    pub first_day_of_week: u8,
    pub slot_minutes: u32,
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_per_slot: Option<usize>,
    pub request_timeout_secs: u64,
    pub fetch_retries: usize,
    pub retry_delay_ms: u64,
    pub drag_threshold_px: f32,
    pub desktop_notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            branch_id: "main".to_string(),
            board: BoardKind::Appointments,
            first_day_of_week: 0, // Sunday
            slot_minutes: 30,
            day_start_hour: 9,
            day_end_hour: 17,
            max_per_slot: None,
            request_timeout_secs: 20,
            fetch_retries: 2,
            retry_delay_ms: 400,
            drag_threshold_px: 4.0,
            desktop_notifications: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err("API base URL must start with http:// or https://".to_string());
        }

        if self.branch_id.trim().is_empty() {
            return Err("Branch ID cannot be empty".to_string());
        }

        if self.first_day_of_week > 6 {
            return Err("First day of week must be between 0 (Sunday) and 6 (Saturday)".to_string());
        }

        if self.board == BoardKind::Appointments {
            if self.slot_minutes == 0 || 60 % self.slot_minutes != 0 {
                return Err("Slot length must divide an hour evenly".to_string());
            }

            if self.day_start_hour >= self.day_end_hour || self.day_end_hour > 24 {
                return Err("Day start hour must be before day end hour (max 24)".to_string());
            }
        }

        if self.max_per_slot == Some(0) {
            return Err("Slot capacity must be at least 1 when set".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be greater than 0 seconds".to_string());
        }

        if self.drag_threshold_px.is_nan() || self.drag_threshold_px < 0.0 {
            return Err("Drag threshold cannot be negative".to_string());
        }

        Ok(())
    }

    /// The tagged board configuration these settings describe.
    pub fn board_config(&self) -> BoardConfig {
        let granularity = match self.board {
            BoardKind::Appointments => Granularity::Slots {
                step_minutes: self.slot_minutes,
                start_hour: self.day_start_hour,
                end_hour: self.day_end_hour,
            },
            BoardKind::Tests => Granularity::Day,
        };

        let capacity = self
            .max_per_slot
            .map(CapacityPolicy::PerCell)
            .unwrap_or_default();

        BoardConfig {
            kind: self.board,
            granularity,
            capacity,
            first_day_of_week: self.first_day_of_week,
        }
    }
}
