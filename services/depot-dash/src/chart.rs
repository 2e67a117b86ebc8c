// services/depot-dash/src/chart.rs
//
// Chart presentation: shape heuristic, slice colors and the render capability
//

use serde::{Deserialize, Serialize};

use crate::aggregator::ChartDataset;
use crate::selection::BranchFilter;

/// Up to this many branches the overview is drawn as a plain pie.
pub const PIE_MAX_BRANCHES: usize = 4;
pub const SINGLE_BRANCH_CUTOUT: u8 = 75;
pub const OVERVIEW_CUTOUT: u8 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Light,
    Dark,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Light => DisplayMode::Dark,
            DisplayMode::Dark => DisplayMode::Light,
        }
    }

    /// (saturation %, lightness %) used for every slice in this mode.
    fn palette(self) -> (u8, u8) {
        match self {
            DisplayMode::Light => (70, 55),
            DisplayMode::Dark => (65, 65),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslColor {
    pub hue: f64,
    pub saturation: u8,
    pub lightness: u8,
}

impl HslColor {
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let s = f64::from(self.saturation) / 100.0;
        let l = f64::from(self.lightness) / 100.0;
        let h = self.hue.rem_euclid(360.0) / 60.0;

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }
}

/// Color of entry `index` out of `count`: the hue wheel split evenly.
/// Pure, so the same dataset always gets the same colors.
pub fn slice_color(index: usize, count: usize, mode: DisplayMode) -> HslColor {
    let hue = if count == 0 {
        0.0
    } else {
        index as f64 * 360.0 / count as f64
    };
    let (saturation, lightness) = mode.palette();
    HslColor { hue, saturation, lightness }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartShape {
    Pie,
    Ring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
    pub shape: ChartShape,
    pub cutout_percent: u8,
}

pub fn choose_style(filter: BranchFilter, branch_count: usize) -> ChartStyle {
    if !filter.is_all() {
        return ChartStyle {
            shape: ChartShape::Ring,
            cutout_percent: SINGLE_BRANCH_CUTOUT,
        };
    }
    ChartStyle {
        shape: if branch_count <= PIE_MAX_BRANCHES { ChartShape::Pie } else { ChartShape::Ring },
        cutout_percent: OVERVIEW_CUTOUT,
    }
}

/// Whatever draws the chart. Clicks come back through
/// `DashboardModel::on_chart_click` as an index into the dataset drawn last.
pub trait ChartRenderer {
    fn render_chart(&mut self, dataset: &ChartDataset, style: ChartStyle);
}
