use spe_core::{HeatmapFeature, SpeError, DEFAULT_CYCLE_DAYS};

pub const MIN_H3_LEVEL: u8 = 5;
pub const MAX_H3_LEVEL: u8 = 11;
pub const DEFAULT_H3_LEVEL: u8 = 7;
pub const DEFAULT_SEARCH_K: usize = 5;
pub const DEFAULT_COMPONENT: &str = "service_stop_time";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapControls {
    pub feature: HeatmapFeature,
    pub day: u32,
    pub h3_level: u8,
}

impl Default for HeatmapControls {
    fn default() -> Self {
        Self {
            feature: HeatmapFeature::default(),
            day: 0,
            h3_level: DEFAULT_H3_LEVEL,
        }
    }
}

/// Controls of the analysis side panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPanel {
    heatmap: HeatmapControls,
    search_k: usize,
    component: String,
    /// Length of the scheduling cycle; heatmap days run over `[0, cycle_days)`.
    cycle_days: u32,
}

impl Default for AnalysisPanel {
    fn default() -> Self {
        Self {
            heatmap: HeatmapControls::default(),
            search_k: DEFAULT_SEARCH_K,
            component: DEFAULT_COMPONENT.to_string(),
            cycle_days: DEFAULT_CYCLE_DAYS,
        }
    }
}

impl AnalysisPanel {
    pub fn heatmap(&self) -> &HeatmapControls {
        &self.heatmap
    }

    pub fn search_k(&self) -> usize {
        self.search_k
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn cycle_days(&self) -> u32 {
        self.cycle_days
    }

    /// Adopt a new cycle length. A selected day past the end moves to the
    /// last day of the cycle. Zero is ignored.
    pub fn set_cycle_days(&mut self, cycle_days: u32) {
        if cycle_days == 0 {
            return;
        }
        self.cycle_days = cycle_days;
        self.heatmap.day = self.heatmap.day.min(cycle_days - 1);
    }

    pub fn set_feature(&mut self, feature: HeatmapFeature) {
        self.heatmap.feature = feature;
    }

    pub fn set_day(&mut self, day: u32) -> Result<(), SpeError> {
        if day >= self.cycle_days {
            return Err(SpeError::InvalidField {
                field: "heatmap.day",
                reason: format!("must be within [0, {}], got {}", self.cycle_days - 1, day),
            });
        }
        self.heatmap.day = day;
        Ok(())
    }

    pub fn set_h3_level(&mut self, level: u8) -> Result<(), SpeError> {
        if !(MIN_H3_LEVEL..=MAX_H3_LEVEL).contains(&level) {
            return Err(SpeError::InvalidField {
                field: "heatmap.h3_level",
                reason: format!("must be within [{}, {}], got {}", MIN_H3_LEVEL, MAX_H3_LEVEL, level),
            });
        }
        self.heatmap.h3_level = level;
        Ok(())
    }

    pub fn set_search_k(&mut self, k: usize) -> Result<(), SpeError> {
        if k == 0 {
            return Err(SpeError::InvalidField {
                field: "search_k",
                reason: "must be at least 1".to_string(),
            });
        }
        self.search_k = k;
        Ok(())
    }

    pub fn select_component(&mut self, name: impl Into<String>) {
        self.component = name.into();
    }
}
