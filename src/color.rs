use palette::{LinSrgb, Mix, Srgb};
use serde::Serialize;

use crate::data::model::{ProbabilityCategory, ProbabilityTable};

// ---------------------------------------------------------------------------
// Continuous color scales
// ---------------------------------------------------------------------------

/// Named continuous color scales (ColorBrewer stops, evenly spaced).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColorScale {
    Reds,
    Greens,
    Blues,
    /// Neutral fallback when no category is known.
    Greys,
    /// Diverging red (dry) → blue (wet), used for forecast amounts.
    RdBu,
}

const REDS: &[[u8; 3]] = &[
    [255, 245, 240],
    [254, 224, 210],
    [252, 187, 161],
    [252, 146, 114],
    [251, 106, 74],
    [239, 59, 44],
    [203, 24, 29],
    [165, 15, 21],
    [103, 0, 13],
];

const GREENS: &[[u8; 3]] = &[
    [247, 252, 245],
    [229, 245, 224],
    [199, 233, 192],
    [161, 217, 155],
    [116, 196, 118],
    [65, 171, 93],
    [35, 139, 69],
    [0, 109, 44],
    [0, 68, 27],
];

const BLUES: &[[u8; 3]] = &[
    [247, 251, 255],
    [222, 235, 247],
    [198, 219, 239],
    [158, 202, 225],
    [107, 174, 214],
    [66, 146, 198],
    [33, 113, 181],
    [8, 81, 156],
    [8, 48, 107],
];

const GREYS: &[[u8; 3]] = &[
    [255, 255, 255],
    [240, 240, 240],
    [217, 217, 217],
    [189, 189, 189],
    [150, 150, 150],
    [115, 115, 115],
    [82, 82, 82],
    [37, 37, 37],
    [0, 0, 0],
];

const RD_BU: &[[u8; 3]] = &[
    [103, 0, 31],
    [178, 24, 43],
    [214, 96, 77],
    [244, 165, 130],
    [253, 219, 199],
    [247, 247, 247],
    [209, 229, 240],
    [146, 197, 222],
    [67, 147, 195],
    [33, 102, 172],
    [5, 48, 97],
];

impl ColorScale {
    pub fn name(&self) -> &'static str {
        match self {
            ColorScale::Reds => "Reds",
            ColorScale::Greens => "Greens",
            ColorScale::Blues => "Blues",
            ColorScale::Greys => "Greys",
            ColorScale::RdBu => "RdBu",
        }
    }

    fn stops(&self) -> &'static [[u8; 3]] {
        match self {
            ColorScale::Reds => REDS,
            ColorScale::Greens => GREENS,
            ColorScale::Blues => BLUES,
            ColorScale::Greys => GREYS,
            ColorScale::RdBu => RD_BU,
        }
    }

    /// Scale bound to a probability category: dry is red, normal green,
    /// wet blue.
    pub fn for_category(category: ProbabilityCategory) -> Self {
        match category {
            ProbabilityCategory::Below => ColorScale::Reds,
            ProbabilityCategory::Normal => ColorScale::Greens,
            ProbabilityCategory::Above => ColorScale::Blues,
        }
    }

    /// Color at normalized position `t` ∈ [0, 1], interpolated between
    /// neighbouring stops in linear light. Out-of-range `t` is clamped.
    pub fn evaluate(&self, t: f64) -> Srgb<u8> {
        let stops = self.stops();
        let last = stops.len() - 1;
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let pos = t * last as f64;
        let lower = (pos.floor() as usize).min(last);
        let frac = (pos - lower as f64) as f32;
        if lower == last || frac <= 0.0 {
            return to_srgb(stops[lower]);
        }

        let a: LinSrgb = to_srgb(stops[lower]).into_format::<f32>().into_linear();
        let b: LinSrgb = to_srgb(stops[lower + 1]).into_format::<f32>().into_linear();
        let mixed: Srgb = Srgb::from_linear(a.mix(b, frac));
        mixed.into_format::<u8>()
    }
}

fn to_srgb([r, g, b]: [u8; 3]) -> Srgb<u8> {
    Srgb::new(r, g, b)
}

// ---------------------------------------------------------------------------
// Palette selection for the probability view
// ---------------------------------------------------------------------------

/// Scale for the probability map: the first row with a known category picks
/// it; a table with no known category falls back to [`ColorScale::Greys`].
///
/// The fallback is silent: callers get a valid scale either way.
pub fn select_palette(table: &ProbabilityTable) -> ColorScale {
    table
        .iter()
        .find_map(|r| r.category)
        .map(ColorScale::for_category)
        .unwrap_or(ColorScale::Greys)
}

// ---------------------------------------------------------------------------
// Fixed category colors for the distribution chart
// ---------------------------------------------------------------------------

/// Segment color of a category in the stacked distribution bars.
pub fn category_color(category: ProbabilityCategory) -> &'static str {
    match category {
        ProbabilityCategory::Below => "#DC143C",
        ProbabilityCategory::Normal => "#66CDAA",
        ProbabilityCategory::Above => "#4682B4",
    }
}

/// Parse a `#RRGGBB` color, as stored in chart specifications.
pub fn parse_hex(hex: &str) -> Option<Srgb<u8>> {
    hex.parse::<Srgb<u8>>().ok()
}
