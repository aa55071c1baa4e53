//! Engine configuration.
//!
//! Consolidates the timeline engine's tolerances and cadences into a single
//! typed struct. The config travels with the engine instance it was built
//! with; there is no global.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Centralized engine configuration.
///
/// All tolerances in one place so the mutators and the queries that guard
/// them can never disagree. A frontend can batch-update the whole struct in
/// a single IPC call.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EngineConfig {
    /// Minimum clip length in seconds. Trim and split operations clamp or
    /// reject inputs that would leave a segment shorter than this.
    pub min_clip_len: f64,

    /// Adjacency tolerance in seconds for merging two clips.
    /// `find_adjacent_clip` uses the same value as `combine_clips`.
    pub merge_tolerance: f64,

    /// Playback tick cadence in seconds (0.1 = 10 ticks per second).
    pub tick_interval: f64,

    /// Slack in seconds when detecting that the playhead has reached the
    /// end of the active clip.
    pub end_epsilon: f64,

    /// Initial zoom level (pixels-per-second multiplier).
    pub default_zoom: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_clip_len: 0.1,
            merge_tolerance: 0.1,
            tick_interval: 0.1,
            end_epsilon: 0.1,
            default_zoom: 1.0,
        }
    }
}

impl EngineConfig {
    /// Validate and clamp settings to acceptable ranges.
    pub fn validate(&mut self) {
        self.min_clip_len = self.min_clip_len.clamp(0.001, 10.0);
        self.merge_tolerance = self.merge_tolerance.clamp(0.001, 5.0);
        self.tick_interval = self.tick_interval.clamp(0.01, 1.0);
        self.end_epsilon = self.end_epsilon.clamp(0.001, 1.0);
        if self.default_zoom <= 0.0 {
            self.default_zoom = 1.0;
        }
    }

    /// Reset all settings to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
