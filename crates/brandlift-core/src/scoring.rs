//! Brand maturity scoring.
//!
//! Each signal is worth 0-3 points by level, multiplied by its weight. The
//! weighted total (0-30) places the business in one of four tiers.

use serde::{Deserialize, Serialize};

use crate::profile::BrandSignals;

const AWARENESS_WEIGHT: u8 = 3;
const SOCIAL_WEIGHT: u8 = 2;
const REVIEWS_WEIGHT: u8 = 2;
const AGE_WEIGHT: u8 = 1;
const SEARCH_WEIGHT: u8 = 2;

/// Highest reachable weighted score.
pub const MAX_POINTS: u8 =
    3 * (AWARENESS_WEIGHT + SOCIAL_WEIGHT + REVIEWS_WEIGHT + AGE_WEIGHT + SEARCH_WEIGHT);

/// Brand maturity tier, ordered from least to most mature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandTier {
    Emerging,
    Developing,
    Established,
    Dominant,
}

impl BrandTier {
    pub const ALL: [BrandTier; 4] = [
        Self::Emerging,
        Self::Developing,
        Self::Established,
        Self::Dominant,
    ];

    /// Tier for a weighted score.
    pub fn from_points(points: u8) -> Self {
        match points {
            0..=7 => Self::Emerging,
            8..=14 => Self::Developing,
            15..=22 => Self::Established,
            _ => Self::Dominant,
        }
    }

    /// Parse from string, accepting the label as well as the key.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == needle || t.label().to_lowercase() == needle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emerging => "emerging",
            Self::Developing => "developing",
            Self::Established => "established",
            Self::Dominant => "dominant",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Emerging => "Emerging Brand",
            Self::Developing => "Developing Brand",
            Self::Established => "Established Brand",
            Self::Dominant => "Dominant Brand",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Emerging => {
                "Few people know the brand yet, so every dollar should help the right audience discover it."
            }
            Self::Developing => {
                "The brand has a foothold and needs consistent visibility to turn familiarity into preference."
            }
            Self::Established => {
                "The brand is recognized in its market and can lean harder on converting existing demand."
            }
            Self::Dominant => {
                "The brand leads its category and should defend its position while harvesting demand efficiently."
            }
        }
    }
}

impl std::fmt::Display for BrandTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contribution of one signal to the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalScore {
    pub signal: String,
    pub level: String,
    pub points: u8,
    pub weight: u8,
    pub weighted: u8,
}

/// Result of scoring a set of brand signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandScore {
    pub points: u8,
    pub max_points: u8,
    pub tier: BrandTier,
    pub breakdown: Vec<SignalScore>,
}

impl BrandScore {
    /// Score as a percentage of the maximum, rounded down.
    pub fn percent(&self) -> u8 {
        (u16::from(self.points) * 100 / u16::from(self.max_points.max(1))) as u8
    }
}

fn signal(name: &str, level: &str, points: u8, weight: u8) -> SignalScore {
    SignalScore {
        signal: name.to_string(),
        level: level.to_string(),
        points,
        weight,
        weighted: points * weight,
    }
}

/// Score the brand signals and assign a tier.
pub fn calculate_brand_tier(signals: &BrandSignals) -> BrandScore {
    let breakdown = vec![
        signal(
            "awareness",
            signals.awareness.as_str(),
            signals.awareness.ordinal(),
            AWARENESS_WEIGHT,
        ),
        signal(
            "social_following",
            signals.social_following.as_str(),
            signals.social_following.ordinal(),
            SOCIAL_WEIGHT,
        ),
        signal(
            "reviews",
            signals.reviews.as_str(),
            signals.reviews.ordinal(),
            REVIEWS_WEIGHT,
        ),
        signal(
            "business_age",
            signals.business_age.as_str(),
            signals.business_age.ordinal(),
            AGE_WEIGHT,
        ),
        signal(
            "search_presence",
            signals.search_presence.as_str(),
            signals.search_presence.ordinal(),
            SEARCH_WEIGHT,
        ),
    ];

    let points: u8 = breakdown.iter().map(|s| s.weighted).sum();

    BrandScore {
        points,
        max_points: MAX_POINTS,
        tier: BrandTier::from_points(points),
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::*;

    fn signals(level: usize) -> BrandSignals {
        BrandSignals {
            awareness: BrandAwareness::ALL[level],
            social_following: SocialFollowing::ALL[level],
            reviews: ReviewVolume::ALL[level],
            business_age: BusinessAge::ALL[level],
            search_presence: SearchPresence::ALL[level],
        }
    }

    #[test]
    fn test_extremes() {
        let low = calculate_brand_tier(&signals(0));
        assert_eq!(low.points, 0);
        assert_eq!(low.tier, BrandTier::Emerging);

        let high = calculate_brand_tier(&signals(3));
        assert_eq!(high.points, 30);
        assert_eq!(high.max_points, 30);
        assert_eq!(high.tier, BrandTier::Dominant);
        assert_eq!(high.percent(), 100);
    }

    #[test]
    fn test_uniform_levels_map_to_tiers() {
        // Every signal at level n scores 10 * n.
        assert_eq!(calculate_brand_tier(&signals(1)).tier, BrandTier::Developing);
        assert_eq!(calculate_brand_tier(&signals(2)).tier, BrandTier::Established);
    }

    #[test]
    fn test_weights_apply_per_signal() {
        let s = BrandSignals {
            awareness: BrandAwareness::National,
            social_following: SocialFollowing::Under1k,
            reviews: ReviewVolume::NoReviews,
            business_age: BusinessAge::Over10Years,
            search_presence: SearchPresence::Invisible,
        };
        let score = calculate_brand_tier(&s);
        assert_eq!(score.points, 9 + 3);
        assert_eq!(score.tier, BrandTier::Developing);
        assert_eq!(score.breakdown[0].weighted, 9);
        assert_eq!(score.breakdown[3].weighted, 3);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(BrandTier::from_points(7), BrandTier::Emerging);
        assert_eq!(BrandTier::from_points(8), BrandTier::Developing);
        assert_eq!(BrandTier::from_points(14), BrandTier::Developing);
        assert_eq!(BrandTier::from_points(15), BrandTier::Established);
        assert_eq!(BrandTier::from_points(22), BrandTier::Established);
        assert_eq!(BrandTier::from_points(23), BrandTier::Dominant);
    }

    #[test]
    fn test_every_combination_is_scored() {
        let mut count = 0;
        for a in BrandAwareness::ALL {
            for s in SocialFollowing::ALL {
                for r in ReviewVolume::ALL {
                    for b in BusinessAge::ALL {
                        for p in SearchPresence::ALL {
                            let score = calculate_brand_tier(&BrandSignals {
                                awareness: *a,
                                social_following: *s,
                                reviews: *r,
                                business_age: *b,
                                search_presence: *p,
                            });
                            assert!(score.points <= MAX_POINTS);
                            assert_eq!(score.tier, BrandTier::from_points(score.points));
                            count += 1;
                        }
                    }
                }
            }
        }
        assert_eq!(count, 4 * 4 * 4 * 4 * 4);
    }

    #[test]
    fn test_tier_ordering_and_parse() {
        assert!(BrandTier::Emerging < BrandTier::Dominant);
        assert_eq!(BrandTier::parse("Established Brand"), Some(BrandTier::Established));
        assert_eq!(BrandTier::parse(" DOMINANT "), Some(BrandTier::Dominant));
        assert_eq!(BrandTier::parse("legendary"), None);
    }
}
