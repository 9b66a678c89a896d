//! Career catalog: the fixed categories and roles a session can select.

use serde::Serialize;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CareerCategory {
    pub name: &'static str,
    pub icon: &'static str,
    pub roles: &'static [&'static str],
}

pub const CATEGORIES: &[CareerCategory] = &[
    CareerCategory {
        name: "Technology",
        icon: "💻",
        roles: &[
            "AI & Machine Learning Engineer",
            "Data Scientist",
            "Cybersecurity Analyst",
            "Cloud Solutions Architect",
            "Full Stack Developer",
            "DevOps Engineer",
            "Blockchain Developer",
            "Mobile App Developer",
            "Data Engineer",
            "Software Quality Assurance Engineer",
        ],
    },
    CareerCategory {
        name: "Healthcare",
        icon: "🩺",
        roles: &[
            "Medical Data Analyst",
            "Telehealth Specialist",
            "Biomedical Engineer",
            "Clinical Research Associate",
            "Healthcare Administrator",
            "Public Health Specialist",
            "Medical Laboratory Technologist",
            "Physiotherapist",
            "Pharmacy Manager",
            "Healthcare IT Consultant",
        ],
    },
    CareerCategory {
        name: "Business",
        icon: "💼",
        roles: &[
            "Business Analyst",
            "Digital Marketing Strategist",
            "Financial Data Analyst",
            "Product Manager",
            "HR Analytics Specialist",
            "Management Consultant",
            "Supply Chain Analyst",
            "Investment Banker",
            "Brand Manager",
            "Operations Manager",
        ],
    },
    CareerCategory {
        name: "Content Creation",
        icon: "🎥",
        roles: &[
            "Video Content Strategist",
            "Social Media Manager",
            "Copywriter / Content Writer",
            "Graphic Designer",
            "SEO Specialist",
            "Podcast Producer",
            "UX/UI Designer",
            "Video Editor",
            "Influencer Marketing Manager",
            "Content Marketing Strategist",
        ],
    },
];

/// A category/role pair known to the catalog.
///
/// Only constructed through [`CareerSelection::resolve`], so templates never
/// interpolate an unrecognised value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CareerSelection {
    category: &'static str,
    role: &'static str,
}

impl CareerSelection {
    /// Looks up a category and role case-insensitively and returns the
    /// canonical names.
    pub fn resolve(category: &str, role: &str) -> Result<Self, AppError> {
        let category = category.trim();
        let role = role.trim();

        let found = CATEGORIES
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(category))
            .ok_or_else(|| {
                AppError::Validation(format!("Unknown career category '{category}'"))
            })?;

        let role = found
            .roles
            .iter()
            .find(|r| r.eq_ignore_ascii_case(role))
            .copied()
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "'{role}' is not a role in the {} category",
                    found.name
                ))
            })?;

        Ok(Self {
            category: found.name,
            role,
        })
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    pub fn role(&self) -> &'static str {
        self.role
    }

    /// Human-readable label used to tag cached reports.
    pub fn label(&self) -> String {
        format!("{} → {}", self.category, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_ten_roles() {
        assert_eq!(CATEGORIES.len(), 4);
        assert!(CATEGORIES.iter().all(|c| c.roles.len() == 10));
    }

    #[test]
    fn test_resolve_is_case_insensitive_and_canonical() {
        let selection = CareerSelection::resolve(" technology ", "data scientist").unwrap();
        assert_eq!(selection.category(), "Technology");
        assert_eq!(selection.role(), "Data Scientist");
        assert_eq!(selection.label(), "Technology → Data Scientist");
    }

    #[test]
    fn test_resolve_rejects_role_from_other_category() {
        let err = CareerSelection::resolve("Healthcare", "Data Scientist").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_resolve_rejects_unknown_category() {
        assert!(CareerSelection::resolve("Aerospace", "Pilot").is_err());
    }
}
