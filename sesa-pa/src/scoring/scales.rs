//! Proficiency-scale mappings over the composite score
//!
//! Four independent, total, side-effect-free functions: band, CEFR, TOEFL
//! Speaking equivalent, IELTS Speaking equivalent. The TOEFL and IELTS
//! interpolation formulas intentionally preserve the literal breakpoints
//! and divisors of the established mapping, including the wider bottom
//! band; reports produced before and after this implementation must agree.

use serde::{Deserialize, Serialize};

/// Coarse four-level quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    A,
    B,
    C,
    D,
}

impl Band {
    pub fn letter(&self) -> &'static str {
        match self {
            Band::A => "A",
            Band::B => "B",
            Band::C => "C",
            Band::D => "D",
        }
    }

    /// Display label with the localized qualifier
    pub fn label(&self) -> &'static str {
        match self {
            Band::A => "A（優秀）",
            Band::B => "B（良好）",
            Band::C => "C（要努力）",
            Band::D => "D（要改善）",
        }
    }
}

/// CEFR level estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CefrLevel {
    PreA1,
    A1,
    A2,
    B1,
    B2,
    C1,
}

impl CefrLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CefrLevel::PreA1 => "Pre-A1",
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
        }
    }
}

/// Band step function: ≥85→A, ≥70→B, ≥55→C, else D
pub fn band_for(score: f64) -> Band {
    if score >= 85.0 {
        Band::A
    } else if score >= 70.0 {
        Band::B
    } else if score >= 55.0 {
        Band::C
    } else {
        Band::D
    }
}

/// CEFR step function: ≥90→C1, ≥80→B2, ≥70→B1, ≥55→A2, ≥40→A1, else Pre-A1
pub fn cefr_for(score: f64) -> CefrLevel {
    if score >= 90.0 {
        CefrLevel::C1
    } else if score >= 80.0 {
        CefrLevel::B2
    } else if score >= 70.0 {
        CefrLevel::B1
    } else if score >= 55.0 {
        CefrLevel::A2
    } else if score >= 40.0 {
        CefrLevel::A1
    } else {
        CefrLevel::PreA1
    }
}

/// TOEFL Speaking equivalent, rendered "n/30"
///
/// Piecewise-linear within bands anchored at {0,55,70,80,90} →
/// {0,14,18,22,26}, 4 points per band except the bottom (0-55 scaled to
/// 0-14). Fractional positions truncate to integers; capped at 30.
pub fn toefl_equivalent(score: f64) -> String {
    let points = if score >= 90.0 {
        (26 + ((score - 90.0) / 10.0 * 4.0) as i64).min(30)
    } else if score >= 80.0 {
        22 + ((score - 80.0) / 10.0 * 4.0) as i64
    } else if score >= 70.0 {
        18 + ((score - 70.0) / 10.0 * 4.0) as i64
    } else if score >= 55.0 {
        14 + ((score - 55.0) / 15.0 * 4.0) as i64
    } else {
        ((score / 55.0 * 14.0) as i64).max(0)
    };
    format!("{}/30", points)
}

/// IELTS Speaking equivalent, half-point value rendered with one decimal
///
/// Piecewise-linear within bands anchored at {0,40,50,60,70,80,90} →
/// {1.0,4.0,5.0,5.5,6.0,7.0,8.0}; the top band extrapolates above 90 up to
/// 9.0. Rounded to the nearest 0.5 with ties to even, floored at 1.0.
pub fn ielts_equivalent(score: f64) -> String {
    let value = if score >= 90.0 {
        (8.0 + (score - 90.0) / 10.0).min(9.0)
    } else if score >= 80.0 {
        7.0 + (score - 80.0) / 10.0
    } else if score >= 70.0 {
        6.0 + (score - 70.0) / 10.0
    } else if score >= 60.0 {
        5.5 + (score - 60.0) / 20.0
    } else if score >= 50.0 {
        5.0 + (score - 50.0) / 20.0
    } else if score >= 40.0 {
        4.0 + (score - 40.0) / 10.0
    } else {
        (score / 40.0 * 4.0).max(1.0)
    };
    format!("{:.1}", crate::scoring::round_half_to_even(value * 2.0) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_breakpoints() {
        assert_eq!(band_for(100.0), Band::A);
        assert_eq!(band_for(85.0), Band::A);
        assert_eq!(band_for(84.9), Band::B);
        assert_eq!(band_for(70.0), Band::B);
        assert_eq!(band_for(69.9), Band::C);
        assert_eq!(band_for(55.0), Band::C);
        assert_eq!(band_for(54.9), Band::D);
        assert_eq!(band_for(0.0), Band::D);
        // Total over the full real line, including out-of-range inputs
        assert_eq!(band_for(-10.0), Band::D);
        assert_eq!(band_for(150.0), Band::A);
    }

    #[test]
    fn cefr_breakpoints() {
        assert_eq!(cefr_for(95.0), CefrLevel::C1);
        assert_eq!(cefr_for(90.0), CefrLevel::C1);
        assert_eq!(cefr_for(89.9), CefrLevel::B2);
        assert_eq!(cefr_for(85.0), CefrLevel::B2);
        assert_eq!(cefr_for(80.0), CefrLevel::B2);
        assert_eq!(cefr_for(79.9), CefrLevel::B1);
        assert_eq!(cefr_for(70.0), CefrLevel::B1);
        assert_eq!(cefr_for(55.0), CefrLevel::A2);
        assert_eq!(cefr_for(40.0), CefrLevel::A1);
        assert_eq!(cefr_for(39.9), CefrLevel::PreA1);
        assert_eq!(cefr_for(-5.0), CefrLevel::PreA1);
    }

    #[test]
    fn toefl_breakpoints() {
        assert_eq!(toefl_equivalent(0.0), "0/30");
        assert_eq!(toefl_equivalent(55.0), "14/30");
        assert_eq!(toefl_equivalent(70.0), "18/30");
        assert_eq!(toefl_equivalent(80.0), "22/30");
        assert_eq!(toefl_equivalent(90.0), "26/30");
        assert_eq!(toefl_equivalent(100.0), "30/30");
    }

    #[test]
    fn toefl_interpolates_within_bands() {
        // 85 is halfway through the 80-90 band: 22 + trunc(0.5*4) = 24
        assert_eq!(toefl_equivalent(85.0), "24/30");
        // 62.5 is halfway through 55-70: 14 + trunc(7.5/15*4) = 16
        assert_eq!(toefl_equivalent(62.5), "16/30");
        // Bottom band: 27.5/55*14 = 7
        assert_eq!(toefl_equivalent(27.5), "7/30");
        // Cap at 30 above 100
        assert_eq!(toefl_equivalent(120.0), "30/30");
        assert_eq!(toefl_equivalent(-5.0), "0/30");
    }

    #[test]
    fn toefl_continuous_at_breakpoints() {
        // No jump just below each anchor: value approaches the next anchor
        assert_eq!(toefl_equivalent(54.999), "13/30");
        assert_eq!(toefl_equivalent(69.999), "17/30");
        assert_eq!(toefl_equivalent(79.999), "21/30");
        assert_eq!(toefl_equivalent(89.999), "25/30");
    }

    #[test]
    fn ielts_breakpoints() {
        assert_eq!(ielts_equivalent(0.0), "1.0");
        assert_eq!(ielts_equivalent(40.0), "4.0");
        assert_eq!(ielts_equivalent(50.0), "5.0");
        assert_eq!(ielts_equivalent(60.0), "5.5");
        assert_eq!(ielts_equivalent(70.0), "6.0");
        assert_eq!(ielts_equivalent(80.0), "7.0");
        assert_eq!(ielts_equivalent(90.0), "8.0");
    }

    #[test]
    fn ielts_interpolates_and_rounds_to_half_points() {
        // 85 -> 7.0 + 0.5 = 7.5
        assert_eq!(ielts_equivalent(85.0), "7.5");
        // 81.5 -> 7.15 -> rounds to 7.0
        assert_eq!(ielts_equivalent(81.5), "7.0");
        // Top band extrapolates, capped at 9.0
        assert_eq!(ielts_equivalent(100.0), "9.0");
        assert_eq!(ielts_equivalent(95.0), "8.5");
        // Floor at 1.0
        assert_eq!(ielts_equivalent(0.0), "1.0");
        assert_eq!(ielts_equivalent(5.0), "1.0");
    }

    #[test]
    fn ielts_quarter_point_ties_round_to_even_half_step() {
        // 82.5 -> 7.25 -> doubled 14.5, even neighbor 14 -> 7.0
        assert_eq!(ielts_equivalent(82.5), "7.0");
        // 42.5 -> 4.25 -> doubled 8.5, even neighbor 8 -> 4.0
        assert_eq!(ielts_equivalent(42.5), "4.0");
        // 87.5 -> 7.75 -> doubled 15.5, even neighbor 16 -> 8.0
        assert_eq!(ielts_equivalent(87.5), "8.0");
    }

    #[test]
    fn worked_example_composite_85() {
        assert_eq!(band_for(85.0), Band::A);
        assert_eq!(cefr_for(85.0), CefrLevel::B2);
        assert_eq!(toefl_equivalent(85.0), "24/30");
        assert_eq!(ielts_equivalent(85.0), "7.5");
    }
}
