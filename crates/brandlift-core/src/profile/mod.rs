//! Business profile collected by the multi-step assessment form.

pub mod model;
pub mod validate;

use serde::Serialize;

pub use model::*;
pub use validate::{FieldError, ProfileDraft, ValidationErrors};

/// A field as the form renders it.
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
}

/// One page of the form.
#[derive(Debug, Clone, Serialize)]
pub struct FormStepSchema {
    pub step: FormStep,
    pub title: &'static str,
    pub fields: Vec<FormField>,
}

fn text(name: &'static str, label: &'static str, required: bool) -> FormField {
    FormField {
        name,
        label,
        required,
        options: Vec::new(),
    }
}

fn choice(name: &'static str, label: &'static str, options: Vec<ChoiceOption>) -> FormField {
    FormField {
        name,
        label,
        required: true,
        options,
    }
}

/// Describe the form steps, their fields and allowed choices.
pub fn form_schema() -> Vec<FormStepSchema> {
    FormStep::ALL
        .iter()
        .map(|step| {
            let fields = match step {
                FormStep::Business => vec![
                    text("business_name", "Business name", true),
                    text("website", "Website", false),
                    text("industry", "Industry", true),
                    text("location", "Primary location", false),
                    text("target_audience", "Who are your ideal customers?", false),
                    text("differentiators", "What makes you different?", false),
                    text("competitors", "Main competitors", false),
                ],
                FormStep::Brand => vec![
                    choice("signals.awareness", "Brand awareness", BrandAwareness::options()),
                    choice(
                        "signals.social_following",
                        "Social media following",
                        SocialFollowing::options(),
                    ),
                    choice("signals.reviews", "Online reviews", ReviewVolume::options()),
                    choice("signals.business_age", "Years in business", BusinessAge::options()),
                    choice(
                        "signals.search_presence",
                        "Branded search",
                        SearchPresence::options(),
                    ),
                ],
                FormStep::Goals => vec![
                    choice("monthly_budget", "Monthly marketing budget", MonthlyBudget::options()),
                    choice("primary_goal", "Primary goal", PrimaryGoal::options()),
                ],
                FormStep::Contact => vec![
                    text("contact.name", "Your name", true),
                    text("contact.email", "Email", true),
                    text("contact.phone", "Phone", false),
                    text("contact.company_role", "Role", false),
                ],
            };
            FormStepSchema {
                step: *step,
                title: step.label(),
                fields,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_schema_covers_every_step() {
        let schema = form_schema();
        assert_eq!(schema.len(), 4);
        assert_eq!(schema[0].step, FormStep::Business);
        let brand = &schema[1];
        assert_eq!(brand.fields.len(), 5);
        assert!(brand.fields.iter().all(|f| f.options.len() == 4));
        assert_eq!(schema[2].fields[0].options.len(), 5);
    }
}
