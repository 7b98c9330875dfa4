// src/generation/generator.rs
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::matcher::{
    category_matches, fit_score, highlight_achievements, match_skills, talking_points,
    ScoreWeighting,
};
use super::templates::{TemplateLibrary, TemplateValues};
use crate::extraction::JobPosting;
use crate::profile::ApplicantProfile;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitAnalysis {
    /// Subset of the profile's skills, in profile order.
    pub matched_skills: Vec<String>,
    pub fit_score: f64,
    pub highlighted_achievements: Vec<String>,
    /// Category → matched skill names, each list in profile order.
    pub category_matches: BTreeMap<String, Vec<String>>,
    pub talking_points: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GeneratedApplication {
    pub cover_letter_text: String,
    pub analysis: FitAnalysis,
    pub template_id: String,
    pub generated_at: DateTime<Utc>,
}

pub struct ContentGenerator<'a> {
    library: &'a TemplateLibrary,
    weighting: ScoreWeighting,
}

impl<'a> ContentGenerator<'a> {
    pub fn new(library: &'a TemplateLibrary) -> Self {
        Self {
            library,
            weighting: ScoreWeighting::Uniform,
        }
    }

    pub fn with_weighting(mut self, weighting: ScoreWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn analyze(&self, job: &JobPosting, profile: &ApplicantProfile) -> FitAnalysis {
        let matched_skills = match_skills(&job.description, profile);
        let fit_score = fit_score(&matched_skills, profile, self.weighting);
        let highlighted_achievements = highlight_achievements(&matched_skills, profile);
        let category_matches = category_matches(&matched_skills, profile);
        let talking_points = talking_points(
            &matched_skills,
            profile,
            display_or(&job.company, "your company"),
        );

        FitAnalysis {
            matched_skills,
            fit_score,
            highlighted_achievements,
            category_matches,
            talking_points,
        }
    }

    /// Same inputs give the same letter and analysis; only `generated_at` varies.
    pub fn generate(&self, job: &JobPosting, profile: &ApplicantProfile) -> GeneratedApplication {
        let analysis = self.analyze(job, profile);
        let template = self.library.select(job);
        let cover_letter_text = template.render(&template_values(job, profile, &analysis));

        info!(
            "Generated cover letter for {} using '{}' template ({} matched skills, fit {:.2})",
            display_or(&job.company, "unknown company"),
            template.id,
            analysis.matched_skills.len(),
            analysis.fit_score
        );

        GeneratedApplication {
            cover_letter_text,
            analysis,
            template_id: template.id.clone(),
            generated_at: Utc::now(),
        }
    }
}

fn template_values(
    job: &JobPosting,
    profile: &ApplicantProfile,
    analysis: &FitAnalysis,
) -> TemplateValues {
    let portfolio = profile
        .portfolio
        .iter()
        .map(|(label, link)| format!("{}: {}", label, link))
        .collect();

    TemplateValues::default()
        .scalar("name", profile.name.as_str())
        .scalar("current_role", display_or(&profile.current_role, "engineer"))
        .scalar("target_role", display_or(&profile.target_role, "new"))
        .scalar("company_name", display_or(&job.company, "your company"))
        .scalar("job_title", display_or(&job.title, "advertised"))
        .scalar("location", job.location.as_str())
        .scalar("platform", job.source_platform.label())
        .list("matched_skills", analysis.matched_skills.clone())
        .list("achievements", analysis.highlighted_achievements.clone())
        .list("portfolio", portfolio)
}

fn display_or<'s>(value: &'s str, fallback: &'s str) -> &'s str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{SourcePlatform, WorkArrangement};
    use crate::profile::{Achievement, Skill};

    fn profile() -> ApplicantProfile {
        ApplicantProfile {
            name: "Sam".to_string(),
            current_role: "Infrastructure Engineer".to_string(),
            target_role: "Automation".to_string(),
            skills: vec![
                Skill::new("Linux", "infrastructure", &[]),
                Skill::new("Python", "automation", &[]),
                Skill::new("Kubernetes", "cloud", &[]),
            ],
            achievements: vec![
                Achievement::new("Kept the Linux fleet at 99.8% uptime", &["Linux"]),
                Achievement::new("Moved batch jobs onto Kubernetes", &["Kubernetes"]),
                Achievement::new("Automated patching with Python", &["Python"]),
            ],
            portfolio: Default::default(),
            talking_points: Default::default(),
        }
    }

    fn job(title: &str, company: &str, description: &str) -> JobPosting {
        JobPosting {
            title: title.to_string(),
            company: company.to_string(),
            description: description.to_string(),
            source_platform: SourcePlatform::Indeed,
            source_url: "https://www.indeed.com/viewjob?jk=1".to_string(),
            location: String::new(),
            salary: None,
            work_arrangement: WorkArrangement::Unspecified,
            requirements: Vec::new(),
            technologies: Vec::new(),
        }
    }

    #[test]
    fn test_generate_end_to_end_fields() {
        let library = TemplateLibrary::builtin().unwrap();
        let generator = ContentGenerator::new(&library);
        let posting = job(
            "Infrastructure Engineer",
            "TechCorp",
            "Run Linux servers, own monitoring, write Python tooling.",
        );

        let app = generator.generate(&posting, &profile());

        assert_eq!(app.analysis.matched_skills, vec!["Linux", "Python"]);
        assert!((app.analysis.fit_score - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            app.analysis.highlighted_achievements,
            vec![
                "Kept the Linux fleet at 99.8% uptime",
                "Automated patching with Python"
            ]
        );
        assert_eq!(app.template_id, "infrastructure_plus");
        assert!(app.cover_letter_text.contains("TechCorp"));
        assert!(app.cover_letter_text.contains("• Linux"));
        assert!(app.cover_letter_text.contains("• Python"));
        assert!(!app.cover_letter_text.contains("Kubernetes"));
        assert_eq!(
            app.analysis.category_matches,
            BTreeMap::from([
                ("automation".to_string(), vec!["Python".to_string()]),
                ("infrastructure".to_string(), vec!["Linux".to_string()]),
            ])
        );
        assert_eq!(app.analysis.talking_points.len(), 3);
        assert!(app.analysis.talking_points[2].ends_with("which is what TechCorp needs"));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let library = TemplateLibrary::builtin().unwrap();
        let generator = ContentGenerator::new(&library);
        let posting = job("Platform Engineer", "TechCorp", "Linux and Kubernetes");

        let first = generator.generate(&posting, &profile());
        let second = generator.generate(&posting, &profile());

        assert_eq!(first.cover_letter_text, second.cover_letter_text);
        assert_eq!(first.analysis, second.analysis);
    }

    #[test]
    fn test_generate_with_empty_job_degrades() {
        let library = TemplateLibrary::builtin().unwrap();
        let generator = ContentGenerator::new(&library);
        let app = generator.generate(&job("", "", ""), &profile());

        assert!(app.analysis.matched_skills.is_empty());
        assert_eq!(app.analysis.fit_score, 0.0);
        assert!(app.analysis.highlighted_achievements.is_empty());
        assert!(app.analysis.category_matches.is_empty());
        assert_eq!(app.analysis.talking_points.len(), 1);
        assert_eq!(app.template_id, "default");
        assert!(app.cover_letter_text.contains("advertised role at your company"));
        assert!(!app.cover_letter_text.contains("{{"));
        assert!(!app.cover_letter_text.contains("A few results"));
    }

    #[test]
    fn test_weighted_generation() {
        let library = TemplateLibrary::builtin().unwrap();
        let mut weighted_profile = profile();
        weighted_profile.skills[1].weight = 2.0;
        let generator =
            ContentGenerator::new(&library).with_weighting(ScoreWeighting::SkillWeights);

        let analysis = generator.analyze(&job("", "", "python"), &weighted_profile);
        assert!((analysis.fit_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_analysis_serializes_camel_case() {
        let analysis = FitAnalysis {
            matched_skills: vec!["Linux".to_string()],
            fit_score: 0.5,
            highlighted_achievements: vec![],
            category_matches: BTreeMap::from([(
                "infrastructure".to_string(),
                vec!["Linux".to_string()],
            )]),
            talking_points: vec!["Infrastructure experience: hands-on with Linux".to_string()],
        };
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["matchedSkills"][0], "Linux");
        assert_eq!(value["fitScore"], 0.5);
        assert!(value["highlightedAchievements"].as_array().unwrap().is_empty());
        assert_eq!(value["categoryMatches"]["infrastructure"][0], "Linux");
        assert_eq!(
            value["talkingPoints"][0],
            "Infrastructure experience: hands-on with Linux"
        );
    }
}
