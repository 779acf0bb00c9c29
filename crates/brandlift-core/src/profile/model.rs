//! Business profile domain models.

use serde::{Deserialize, Serialize};

/// Declares a closed set of form choices with a wire key and a display label.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($key:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $key)] $variant),+
        }

        impl $name {
            /// All choices, lowest first.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire key.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            /// Human readable label.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Position in declaration order, starting at 0.
            pub fn ordinal(&self) -> u8 {
                Self::ALL.iter().position(|v| v == self).unwrap_or(0) as u8
            }

            /// Choices as form options.
            pub fn options() -> Vec<ChoiceOption> {
                Self::ALL
                    .iter()
                    .map(|v| ChoiceOption {
                        value: v.as_str(),
                        label: v.label(),
                    })
                    .collect()
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == needle)
                    .ok_or_else(|| {
                        let expected: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        format!("invalid value '{}', expected one of: {}", s, expected.join(", "))
                    })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// A selectable option in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub value: &'static str,
    pub label: &'static str,
}

choice_enum! {
    /// How widely the brand is recognized.
    BrandAwareness {
        Unknown => ("unknown", "Mostly unknown"),
        Local => ("local", "Known locally"),
        Regional => ("regional", "Known regionally"),
        National => ("national", "Known nationally"),
    }
}

choice_enum! {
    /// Combined social media following.
    SocialFollowing {
        Under1k => ("under_1k", "Under 1,000"),
        From1kTo10k => ("from_1k_to_10k", "1,000 - 10,000"),
        From10kTo100k => ("from_10k_to_100k", "10,000 - 100,000"),
        Over100k => ("over_100k", "Over 100,000"),
    }
}

choice_enum! {
    /// Number of public reviews across platforms.
    ReviewVolume {
        NoReviews => ("none", "No reviews yet"),
        Under50 => ("under_50", "Under 50"),
        From50To250 => ("from_50_to_250", "50 - 250"),
        Over250 => ("over_250", "Over 250"),
    }
}

choice_enum! {
    /// Time the business has been operating.
    BusinessAge {
        Under1Year => ("under_1_year", "Less than a year"),
        From1To3Years => ("from_1_to_3_years", "1 - 3 years"),
        From3To10Years => ("from_3_to_10_years", "3 - 10 years"),
        Over10Years => ("over_10_years", "Over 10 years"),
    }
}

choice_enum! {
    /// How often people search for the brand by name.
    SearchPresence {
        Invisible => ("none", "Nobody searches for us by name"),
        Low => ("low", "A few branded searches"),
        Moderate => ("moderate", "Steady branded searches"),
        High => ("high", "Lots of branded searches"),
    }
}

choice_enum! {
    /// Monthly marketing budget band.
    MonthlyBudget {
        Under2k => ("under_2k", "Under $2,000"),
        From2kTo5k => ("from_2k_to_5k", "$2,000 - $5,000"),
        From5kTo15k => ("from_5k_to_15k", "$5,000 - $15,000"),
        From15kTo50k => ("from_15k_to_50k", "$15,000 - $50,000"),
        Over50k => ("over_50k", "Over $50,000"),
    }
}

choice_enum! {
    /// What the business most wants marketing to achieve.
    PrimaryGoal {
        BrandAwareness => ("brand_awareness", "Build brand awareness"),
        LeadGeneration => ("lead_generation", "Generate leads"),
        Sales => ("sales", "Drive sales"),
        CustomerRetention => ("customer_retention", "Retain customers"),
        MarketExpansion => ("market_expansion", "Expand into new markets"),
    }
}

choice_enum! {
    /// Steps of the multi-step assessment form.
    FormStep {
        Business => ("business", "Your business"),
        Brand => ("brand", "Brand recognition"),
        Goals => ("goals", "Goals & budget"),
        Contact => ("contact", "Contact details"),
    }
}

impl MonthlyBudget {
    /// Representative monthly spend in whole dollars for the band.
    pub fn amount(&self) -> u32 {
        match self {
            Self::Under2k => 1_000,
            Self::From2kTo5k => 3_500,
            Self::From5kTo15k => 10_000,
            Self::From15kTo50k => 32_500,
            Self::Over50k => 75_000,
        }
    }
}

/// The five self-reported brand recognition signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandSignals {
    pub awareness: BrandAwareness,
    pub social_following: SocialFollowing,
    pub reviews: ReviewVolume,
    pub business_age: BusinessAge,
    pub search_presence: SearchPresence,
}

/// How to reach the prospect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_role: Option<String>,
}

/// A complete assessment submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub business_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differentiators: Option<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
    pub monthly_budget: MonthlyBudget,
    pub primary_goal: PrimaryGoal,
    pub signals: BrandSignals,
    pub contact: ContactInfo,
}

impl BusinessProfile {
    /// Trim strings, drop blank optionals, lowercase the email and prefix
    /// bare website domains with `https://`.
    pub fn normalize(mut self) -> Self {
        self.business_name = self.business_name.trim().to_string();
        self.industry = self.industry.trim().to_string();
        self.website = normalize_website(self.website);
        self.location = non_blank(self.location);
        self.target_audience = non_blank(self.target_audience);
        self.differentiators = non_blank(self.differentiators);
        self.competitors = self
            .competitors
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        self.contact.name = self.contact.name.trim().to_string();
        self.contact.email = self.contact.email.trim().to_lowercase();
        self.contact.phone = non_blank(self.contact.phone);
        self.contact.company_role = non_blank(self.contact.company_role);
        self
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn normalize_website(value: Option<String>) -> Option<String> {
    non_blank(value).map(|w| {
        let lower = w.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") || w.contains("://") {
            w
        } else {
            format!("https://{}", w)
        }
    })
}
