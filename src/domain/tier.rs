use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual bucket for a correlation value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    StrongPositive,
    Positive,
    Neutral,
    Negative,
    StrongNegative,
}

impl Tier {
    /// Legend order, strongest positive first
    pub const ALL: [Tier; 5] = [
        Tier::StrongPositive,
        Tier::Positive,
        Tier::Neutral,
        Tier::Negative,
        Tier::StrongNegative,
    ];

    /// Bucket a correlation value. Lower bounds are inclusive and checked
    /// from the top down, so values past +/-1 land in the outer tiers.
    pub fn classify(value: f64) -> Tier {
        if value.is_nan() {
            return Tier::Neutral;
        }

        if value >= 0.7 {
            Tier::StrongPositive
        } else if value >= 0.3 {
            Tier::Positive
        } else if value >= -0.3 {
            Tier::Neutral
        } else if value >= -0.7 {
            Tier::Negative
        } else {
            Tier::StrongNegative
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::StrongPositive => "strong-positive",
            Tier::Positive => "positive",
            Tier::Neutral => "neutral",
            Tier::Negative => "negative",
            Tier::StrongNegative => "strong-negative",
        }
    }

    /// Heatmap cell colour
    pub fn color_hex(&self) -> &'static str {
        match self {
            Tier::StrongPositive => "#1a9850",
            Tier::Positive => "#91cf60",
            Tier::Neutral => "#ffffbf",
            Tier::Negative => "#fc8d59",
            Tier::StrongNegative => "#d73027",
        }
    }

    /// Range text shown in the legend
    pub fn range_text(&self) -> &'static str {
        match self {
            Tier::StrongPositive => ">= 0.7",
            Tier::Positive => ">= 0.3",
            Tier::Neutral => "-0.3 to 0.3",
            Tier::Negative => "<= -0.3",
            Tier::StrongNegative => "<= -0.7",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_reference_points() {
        assert_eq!(Tier::classify(1.0), Tier::StrongPositive);
        assert_eq!(Tier::classify(0.0), Tier::Neutral);
        assert_eq!(Tier::classify(-1.0), Tier::StrongNegative);
    }

    #[test]
    fn test_classify_boundaries_inclusive() {
        assert_eq!(Tier::classify(0.7), Tier::StrongPositive);
        assert_eq!(Tier::classify(0.69999), Tier::Positive);
        assert_eq!(Tier::classify(0.3), Tier::Positive);
        assert_eq!(Tier::classify(0.29999), Tier::Neutral);
        assert_eq!(Tier::classify(-0.3), Tier::Neutral);
        assert_eq!(Tier::classify(-0.30001), Tier::Negative);
        assert_eq!(Tier::classify(-0.7), Tier::Negative);
        assert_eq!(Tier::classify(-0.70001), Tier::StrongNegative);
    }

    #[test]
    fn test_classify_out_of_range_and_nan() {
        assert_eq!(Tier::classify(1.0000000001), Tier::StrongPositive);
        assert_eq!(Tier::classify(-1.0000000001), Tier::StrongNegative);
        assert_eq!(Tier::classify(f64::NAN), Tier::Neutral);
    }

    #[test]
    fn test_legend_metadata() {
        assert_eq!(Tier::ALL.len(), 5);
        assert_eq!(Tier::StrongPositive.color_hex(), "#1a9850");
        assert_eq!(Tier::StrongNegative.color_hex(), "#d73027");
        assert_eq!(Tier::Neutral.to_string(), "neutral");
    }
}
