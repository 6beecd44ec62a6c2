//! Tooltip state shared by the chart the user hovers and its siblings

use serde::{Deserialize, Serialize};

/// Change-point fields shown in a hover tooltip, in display order
pub const TOOLTIP_CHANGE_FIELDS: [&str; 5] = [
    "mean_before",
    "mean_after",
    "forward_change_percent",
    "pvalue",
    "time",
];

/// Trailing line of every tooltip
pub const TOOLTIP_HINT: &str = "click for more";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TooltipMode {
    #[default]
    Hidden,
    /// Tooltip of the chart under the pointer
    Active,
    /// Dimmed mirror of a sibling's hover position
    Ghost,
}

/// Represents the state of one chart's tooltip
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TooltipState {
    pub mode: TooltipMode,

    /// Index of the hovered point in the dataset
    pub index: Option<usize>,

    /// Opacity of the tooltip box (0-1)
    pub opacity: f32,

    pub lines: Vec<TooltipLine>,
}

/// Represents a single `label: value` row of the tooltip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TooltipLine {
    pub label: String,
    pub value: String,
}

impl TooltipLine {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

impl TooltipState {
    pub fn show_active(&mut self, index: usize, lines: Vec<TooltipLine>) {
        self.mode = TooltipMode::Active;
        self.index = Some(index);
        self.opacity = 1.0;
        self.lines = lines;
    }

    pub fn show_ghost(&mut self, index: usize, lines: Vec<TooltipLine>, opacity: f32) {
        self.mode = TooltipMode::Ghost;
        self.index = Some(index);
        self.opacity = opacity.clamp(0.0, 1.0);
        self.lines = lines;
    }

    pub fn hide(&mut self) {
        *self = Self::default();
    }

    pub fn is_visible(&self) -> bool {
        self.mode != TooltipMode::Hidden
    }

    pub fn is_ghost(&self) -> bool {
        self.mode == TooltipMode::Ghost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ghost_opacity_is_clamped() {
        let mut state = TooltipState::default();
        state.show_ghost(3, vec![], 1.7);

        assert!(state.is_ghost());
        assert_eq!(state.index, Some(3));
        assert_eq!(state.opacity, 1.0);

        state.hide();
        assert!(!state.is_visible());
        assert_eq!(state.index, None);
    }
}
