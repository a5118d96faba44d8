//! Travel game: pick up to three activities, get German destinations back.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::ApiClient;
use crate::error::TravelError;

/// Most activities one destination search accepts, custom one included
pub const MAX_ACTIVITIES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub destination_name: String,
    pub state: String,
}

/// Catalogue picks plus an optional free-text activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivitySelection {
    selected: Vec<String>,
    custom_text: String,
    custom_enabled: bool,
}

impl ActivitySelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected entries, counting an enabled custom activity
    pub fn total(&self) -> usize {
        self.selected.len() + usize::from(self.custom_enabled)
    }

    pub fn is_full(&self) -> bool {
        self.total() >= MAX_ACTIVITIES
    }

    pub fn is_selected(&self, activity: &str) -> bool {
        self.selected.iter().any(|a| a == activity)
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn custom_text(&self) -> &str {
        &self.custom_text
    }

    pub fn custom_enabled(&self) -> bool {
        self.custom_enabled
    }

    /// Select or deselect. Returns whether the activity is selected afterwards.
    pub fn toggle(&mut self, activity: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|a| a == activity) {
            self.selected.remove(pos);
            return false;
        }
        if self.is_full() {
            return false;
        }
        self.selected.push(activity.to_string());
        true
    }

    pub fn set_custom_text(&mut self, text: &str) {
        self.custom_text = text.to_string();
    }

    /// Enabling needs text and a free slot; disabling always works
    pub fn toggle_custom(&mut self) -> bool {
        if self.custom_enabled {
            self.custom_enabled = false;
        } else if !self.custom_text.trim().is_empty() && !self.is_full() {
            self.custom_enabled = true;
        }
        self.custom_enabled
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Lowercased activities to send, capped at `MAX_ACTIVITIES`
    pub fn activities(&self) -> Result<Vec<String>, TravelError> {
        let custom = self.custom_text.trim();
        if self.custom_enabled && custom.is_empty() {
            return Err(TravelError::EmptyCustomActivity);
        }

        let activities: Vec<String> = self
            .selected
            .iter()
            .map(String::as_str)
            .chain(self.custom_enabled.then_some(custom))
            .map(str::to_lowercase)
            .take(MAX_ACTIVITIES)
            .collect();

        if activities.is_empty() {
            return Err(TravelError::NoActivities);
        }
        Ok(activities)
    }
}

pub async fn find_destinations(
    client: &ApiClient,
    selection: &ActivitySelection,
) -> Result<Vec<Destination>, TravelError> {
    let activities = selection.activities()?;
    let destinations = client.find_destinations(&activities).await?;

    info!(
        "{} destinations for [{}]",
        destinations.len(),
        activities.join(", ")
    );
    Ok(destinations)
}
