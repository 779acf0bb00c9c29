//! Form validation.
//!
//! The form is submitted step by step, so validation works on a draft where
//! every field may still be missing. A draft turns into a
//! [`BusinessProfile`] once every step validates.

use serde::{Deserialize, Serialize};

use super::model::*;

const MAX_NAME_LEN: usize = 120;
const MAX_COMPETITORS: usize = 5;

/// A single problem with one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub step: FormStep,
    pub field: String,
    pub message: String,
}

/// All problems found in a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, step: FormStep, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            step,
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors that belong to one step.
    pub fn for_step(&self, step: FormStep) -> Vec<&FieldError> {
        self.errors.iter().filter(|e| e.step == step).collect()
    }

    /// Names of the fields with errors, in order.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Partially filled brand signals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalsDraft {
    pub awareness: Option<BrandAwareness>,
    pub social_following: Option<SocialFollowing>,
    pub reviews: Option<ReviewVolume>,
    pub business_age: Option<BusinessAge>,
    pub search_presence: Option<SearchPresence>,
}

/// Partially filled contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_role: Option<String>,
}

/// A form submission in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDraft {
    pub business_name: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub target_audience: Option<String>,
    pub differentiators: Option<String>,
    pub competitors: Vec<String>,
    pub monthly_budget: Option<MonthlyBudget>,
    pub primary_goal: Option<PrimaryGoal>,
    pub signals: SignalsDraft,
    pub contact: ContactDraft,
}

impl From<&BusinessProfile> for ProfileDraft {
    fn from(p: &BusinessProfile) -> Self {
        Self {
            business_name: Some(p.business_name.clone()),
            website: p.website.clone(),
            industry: Some(p.industry.clone()),
            location: p.location.clone(),
            target_audience: p.target_audience.clone(),
            differentiators: p.differentiators.clone(),
            competitors: p.competitors.clone(),
            monthly_budget: Some(p.monthly_budget),
            primary_goal: Some(p.primary_goal),
            signals: SignalsDraft {
                awareness: Some(p.signals.awareness),
                social_following: Some(p.signals.social_following),
                reviews: Some(p.signals.reviews),
                business_age: Some(p.signals.business_age),
                search_presence: Some(p.signals.search_presence),
            },
            contact: ContactDraft {
                name: Some(p.contact.name.clone()),
                email: Some(p.contact.email.clone()),
                phone: p.contact.phone.clone(),
                company_role: p.contact.company_role.clone(),
            },
        }
    }
}

impl ProfileDraft {
    /// Validate the fields of a single step.
    pub fn validate_step(&self, step: FormStep) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        match step {
            FormStep::Business => self.check_business(&mut errors),
            FormStep::Brand => self.check_brand(&mut errors),
            FormStep::Goals => self.check_goals(&mut errors),
            FormStep::Contact => self.check_contact(&mut errors),
        }
        errors
    }

    /// Validate every step, collecting all errors.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        for step in FormStep::ALL {
            errors.errors.extend(self.validate_step(*step).errors);
        }
        errors
    }

    /// Normalize, validate and build the complete profile.
    pub fn into_profile(self) -> Result<BusinessProfile, ValidationErrors> {
        let draft = self.normalized();
        let errors = draft.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        draft.build().ok_or(errors)
    }

    fn normalized(mut self) -> Self {
        self.business_name = non_blank(self.business_name);
        self.industry = non_blank(self.industry);
        self.website = normalize_website(self.website);
        self.contact.name = non_blank(self.contact.name);
        self.contact.email = non_blank(self.contact.email).map(|e| e.to_lowercase());
        self
    }

    fn build(self) -> Option<BusinessProfile> {
        let profile = BusinessProfile {
            business_name: self.business_name?,
            website: self.website,
            industry: self.industry?,
            location: self.location,
            target_audience: self.target_audience,
            differentiators: self.differentiators,
            competitors: self.competitors,
            monthly_budget: self.monthly_budget?,
            primary_goal: self.primary_goal?,
            signals: BrandSignals {
                awareness: self.signals.awareness?,
                social_following: self.signals.social_following?,
                reviews: self.signals.reviews?,
                business_age: self.signals.business_age?,
                search_presence: self.signals.search_presence?,
            },
            contact: ContactInfo {
                name: self.contact.name?,
                email: self.contact.email?,
                phone: self.contact.phone,
                company_role: self.contact.company_role,
            },
        };
        Some(profile.normalize())
    }

    fn check_business(&self, errors: &mut ValidationErrors) {
        let step = FormStep::Business;
        check_name(errors, step, "business_name", self.business_name.as_deref());
        check_name(errors, step, "industry", self.industry.as_deref());

        if let Some(website) = self.website.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
            let normalized = normalize_website(Some(website.to_string())).unwrap_or_default();
            if !is_valid_website(&normalized) {
                errors.push(step, "website", "must be an http or https address");
            }
        }

        let competitors = self.competitors.iter().filter(|c| !c.trim().is_empty()).count();
        if competitors > MAX_COMPETITORS {
            errors.push(
                step,
                "competitors",
                format!("list at most {} competitors", MAX_COMPETITORS),
            );
        }
    }

    fn check_brand(&self, errors: &mut ValidationErrors) {
        let step = FormStep::Brand;
        let s = &self.signals;
        if s.awareness.is_none() {
            errors.push(step, "signals.awareness", "is required");
        }
        if s.social_following.is_none() {
            errors.push(step, "signals.social_following", "is required");
        }
        if s.reviews.is_none() {
            errors.push(step, "signals.reviews", "is required");
        }
        if s.business_age.is_none() {
            errors.push(step, "signals.business_age", "is required");
        }
        if s.search_presence.is_none() {
            errors.push(step, "signals.search_presence", "is required");
        }
    }

    fn check_goals(&self, errors: &mut ValidationErrors) {
        if self.monthly_budget.is_none() {
            errors.push(FormStep::Goals, "monthly_budget", "is required");
        }
        if self.primary_goal.is_none() {
            errors.push(FormStep::Goals, "primary_goal", "is required");
        }
    }

    fn check_contact(&self, errors: &mut ValidationErrors) {
        let step = FormStep::Contact;
        if self.contact.name.as_deref().map(str::trim).unwrap_or("").is_empty() {
            errors.push(step, "contact.name", "is required");
        }
        match self.contact.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            None => errors.push(step, "contact.email", "is required"),
            Some(email) if !is_valid_email(email) => {
                errors.push(step, "contact.email", "is not a valid email address")
            }
            Some(_) => {}
        }
    }
}

impl BusinessProfile {
    /// Validate a complete profile with the same rules as the form.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let errors = ProfileDraft::from(self).validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_name(errors: &mut ValidationErrors, step: FormStep, field: &str, value: Option<&str>) {
    let value = value.map(str::trim).unwrap_or("");
    if value.is_empty() {
        errors.push(step, field, "is required");
    } else if value.chars().count() > MAX_NAME_LEN {
        errors.push(
            step,
            field,
            format!("must be at most {} characters", MAX_NAME_LEN),
        );
    }
}

/// One `@`, a non-empty local part and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_valid_website(url: &str) -> bool {
    let lower = url.to_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.chars().any(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> ProfileDraft {
        ProfileDraft {
            business_name: Some("  Acme Bakery ".to_string()),
            website: Some("acmebakery.com".to_string()),
            industry: Some("Food & Beverage".to_string()),
            location: Some("   ".to_string()),
            competitors: vec!["Crumbs".to_string(), " ".to_string()],
            monthly_budget: Some(MonthlyBudget::From2kTo5k),
            primary_goal: Some(PrimaryGoal::LeadGeneration),
            signals: SignalsDraft {
                awareness: Some(BrandAwareness::Local),
                social_following: Some(SocialFollowing::From1kTo10k),
                reviews: Some(ReviewVolume::Under50),
                business_age: Some(BusinessAge::From3To10Years),
                search_presence: Some(SearchPresence::Low),
            },
            contact: ContactDraft {
                name: Some("Dana".to_string()),
                email: Some(" Dana@AcmeBakery.com ".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_draft_builds_normalized_profile() {
        let profile = complete_draft().into_profile().unwrap();
        assert_eq!(profile.business_name, "Acme Bakery");
        assert_eq!(profile.website.as_deref(), Some("https://acmebakery.com"));
        assert_eq!(profile.location, None);
        assert_eq!(profile.competitors, vec!["Crumbs".to_string()]);
        assert_eq!(profile.contact.email, "dana@acmebakery.com");
    }

    #[test]
    fn test_empty_draft_reports_every_required_field() {
        let errors = ProfileDraft::default().validate();
        assert_eq!(errors.for_step(FormStep::Business).len(), 2);
        assert_eq!(errors.for_step(FormStep::Brand).len(), 5);
        assert_eq!(errors.for_step(FormStep::Goals).len(), 2);
        assert_eq!(errors.for_step(FormStep::Contact).len(), 2);
    }

    #[test]
    fn test_step_validation_only_checks_that_step() {
        let draft = ProfileDraft {
            business_name: Some("Acme".to_string()),
            industry: Some("Retail".to_string()),
            ..Default::default()
        };
        assert!(draft.validate_step(FormStep::Business).is_empty());
        assert!(!draft.validate_step(FormStep::Contact).is_empty());
    }

    #[test]
    fn test_invalid_email_and_website() {
        let mut draft = complete_draft();
        draft.contact.email = Some("dana@localhost".to_string());
        draft.website = Some("ftp://acme.com".to_string());
        let errors = draft.into_profile().unwrap_err();
        assert_eq!(errors.fields(), vec!["website", "contact.email"]);
    }

    #[test]
    fn test_too_many_competitors_and_long_name() {
        let mut draft = complete_draft();
        draft.competitors = (0..6).map(|i| format!("Rival {}", i)).collect();
        draft.business_name = Some("x".repeat(121));
        let errors = draft.validate_step(FormStep::Business);
        assert_eq!(errors.fields(), vec!["business_name", "competitors"]);
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("a b@c.com"));
    }

    #[test]
    fn test_profile_validate_matches_draft_rules() {
        let mut profile = complete_draft().into_profile().unwrap();
        assert!(profile.validate().is_ok());
        profile.contact.email = "nope".to_string();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_choice_parsing() {
        assert_eq!("REGIONAL".parse::<BrandAwareness>(), Ok(BrandAwareness::Regional));
        assert_eq!("none".parse::<ReviewVolume>(), Ok(ReviewVolume::NoReviews));
        assert!("huge".parse::<MonthlyBudget>().is_err());
        assert_eq!(SocialFollowing::Over100k.ordinal(), 3);
    }
}
