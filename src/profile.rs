// src/profile.rs
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ProfileError;

/// Static applicant data used as matching input. Read-only for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub name: String,
    #[serde(default)]
    pub current_role: String,
    #[serde(default)]
    pub target_role: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
    /// Declaration order is the order achievements are highlighted in.
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub portfolio: BTreeMap<String, String>,
    /// Statement used when the posting matches skills of a category, keyed by category.
    #[serde(default)]
    pub talking_points: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Only consulted when weighted scoring is enabled.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub text: String,
    /// Skill names this achievement demonstrates.
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_weight() -> f64 {
    1.0
}

impl Skill {
    pub fn new(name: &str, category: &str, synonyms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            weight: default_weight(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Skill name followed by its synonyms, lowercased.
    pub fn search_terms(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(&self.name)
            .chain(self.synonyms.iter())
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty())
    }
}

impl Achievement {
    pub fn new(text: &str, tags: &[&str]) -> Self {
        Self {
            text: text.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl ApplicantProfile {
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let profile: Self = toml::from_str(&content).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        profile.validate()?;

        info!(
            "Loaded profile for {} with {} skills from {}",
            profile.name,
            profile.skills.len(),
            path.display()
        );
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::Invalid("name must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for skill in &self.skills {
            let key = skill.name.trim().to_lowercase();
            if key.is_empty() {
                return Err(ProfileError::Invalid("skill name must not be empty".to_string()));
            }
            if !seen.insert(key) {
                return Err(ProfileError::Invalid(format!(
                    "duplicate skill '{}'",
                    skill.name
                )));
            }
            if !skill.weight.is_finite() || skill.weight <= 0.0 {
                return Err(ProfileError::Invalid(format!(
                    "skill '{}' must have a positive weight",
                    skill.name
                )));
            }
        }
        Ok(())
    }

    /// The Infrastructure → Automation profile the tool ships with.
    pub fn builtin() -> Self {
        Self {
            name: "Trey".to_string(),
            current_role: "Infrastructure Engineer".to_string(),
            target_role: "AI/Automation Specialist".to_string(),
            skills: vec![
                Skill::new("Linux", "infrastructure", &["unix", "ubuntu", "centos", "red hat"]),
                Skill::new("Windows Server", "infrastructure", &["windows"]),
                Skill::new("Network Management", "infrastructure", &["networking"]),
                Skill::new("System Monitoring", "infrastructure", &["monitoring", "observability"]),
                Skill::new("Python", "automation", &["python3"]).with_weight(1.5),
                Skill::new("API Integration", "automation", &["rest api", "apis"]),
                Skill::new("GitHub Automation", "automation", &["github"]),
                Skill::new("Automation", "automation", &["automate", "scripting"]).with_weight(1.5),
                Skill::new("CI/CD", "automation", &["continuous integration", "devops"]),
                Skill::new("Docker", "cloud", &["containers", "containerization"]),
                Skill::new("Kubernetes", "cloud", &["k8s", "container orchestration"]),
                Skill::new("AWS", "cloud", &["amazon web services"]),
                Skill::new("Machine Learning", "ai_learning", &["artificial intelligence"])
                    .with_weight(1.5),
                Skill::new("Data Analysis", "ai_learning", &["analytics"]),
            ],
            achievements: vec![
                Achievement::new(
                    "Maintained 99.8% uptime across production infrastructure",
                    &["Linux", "Windows Server", "System Monitoring"],
                ),
                Achievement::new(
                    "Built a production GitHub automation bot with Python and REST APIs",
                    &["Python", "API Integration", "GitHub Automation", "Automation"],
                ),
                Achievement::new(
                    "Automated routine server maintenance and deployment pipelines",
                    &["Automation", "CI/CD", "Docker"],
                ),
                Achievement::new(
                    "Developing the Memory Platform, an AI-powered family connection app",
                    &["Machine Learning", "Data Analysis", "Python"],
                ),
            ],
            portfolio: BTreeMap::from([
                ("github".to_string(), "https://github.com/Tanarius".to_string()),
                ("portfolio".to_string(), "https://tanarius.github.io".to_string()),
            ]),
            talking_points: BTreeMap::from([
                (
                    "infrastructure".to_string(),
                    "Infrastructure stability: 99.8% uptime shows the reliability critical systems need"
                        .to_string(),
                ),
                (
                    "automation".to_string(),
                    "Automation development: built a production GitHub integration bot with practical API work"
                        .to_string(),
                ),
                (
                    "ai_learning".to_string(),
                    "AI transition: actively building the Memory Platform with machine learning for data insights"
                        .to_string(),
                ),
            ]),
        }
    }
}
