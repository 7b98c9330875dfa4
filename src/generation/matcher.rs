// src/generation/matcher.rs
//! Keyword presence matching between a posting and the applicant's skills.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::profile::ApplicantProfile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreWeighting {
    /// `|matched| / |skills|`
    #[default]
    Uniform,
    /// Sum of matched skill weights over the sum of all weights.
    SkillWeights,
}

/// Skills whose name or any synonym occurs in `description`, case-insensitively.
/// One mention counts the same as ten. Result keeps profile declaration order.
pub fn match_skills(description: &str, profile: &ApplicantProfile) -> Vec<String> {
    let haystack = description.to_lowercase();
    if haystack.trim().is_empty() {
        return Vec::new();
    }

    profile
        .skills
        .iter()
        .filter(|skill| skill.search_terms().any(|term| haystack.contains(&term)))
        .map(|skill| skill.name.clone())
        .collect()
}

/// Always within [0, 1]; an empty skill list scores 0.
pub fn fit_score(matched: &[String], profile: &ApplicantProfile, weighting: ScoreWeighting) -> f64 {
    if profile.skills.is_empty() {
        return 0.0;
    }

    let score = match weighting {
        ScoreWeighting::Uniform => {
            let matched_count = profile
                .skills
                .iter()
                .filter(|skill| contains_ignore_case(matched, &skill.name))
                .count();
            matched_count as f64 / profile.skills.len() as f64
        }
        ScoreWeighting::SkillWeights => {
            let total: f64 = profile.skills.iter().map(|skill| skill.weight).sum();
            if total <= 0.0 {
                return 0.0;
            }
            let hit: f64 = profile
                .skills
                .iter()
                .filter(|skill| contains_ignore_case(matched, &skill.name))
                .map(|skill| skill.weight)
                .sum();
            hit / total
        }
    };

    score.clamp(0.0, 1.0)
}

/// Achievements tagged with at least one matched skill, in profile order.
pub fn highlight_achievements(matched: &[String], profile: &ApplicantProfile) -> Vec<String> {
    profile
        .achievements
        .iter()
        .filter(|achievement| {
            achievement
                .tags
                .iter()
                .any(|tag| contains_ignore_case(matched, tag))
        })
        .map(|achievement| achievement.text.clone())
        .collect()
}

/// Matched skill names grouped by their profile category, each list in profile order.
/// Skills without a category are grouped under `general`.
pub fn category_matches(
    matched: &[String],
    profile: &ApplicantProfile,
) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for skill in profile
        .skills
        .iter()
        .filter(|skill| contains_ignore_case(matched, &skill.name))
    {
        groups
            .entry(category_key(&skill.category))
            .or_default()
            .push(skill.name.clone());
    }
    groups
}

/// One point per matched category, in the order categories first appear in the profile,
/// followed by a closing point about `company`.
///
/// A category uses the profile's own statement from `talking_points` when it has one.
pub fn talking_points(
    matched: &[String],
    profile: &ApplicantProfile,
    company: &str,
) -> Vec<String> {
    let groups = category_matches(matched, profile);

    let mut categories: Vec<String> = Vec::new();
    for skill in &profile.skills {
        let key = category_key(&skill.category);
        if groups.contains_key(&key) && !categories.contains(&key) {
            categories.push(key);
        }
    }

    let mut points: Vec<String> = categories
        .iter()
        .map(|category| {
            profile
                .talking_points
                .iter()
                .find(|(key, _)| category_key(key) == *category)
                .map(|(_, point)| point.clone())
                .unwrap_or_else(|| {
                    format!(
                        "{} experience: hands-on with {}",
                        category_label(category),
                        groups[category].join(", ")
                    )
                })
        })
        .collect();

    points.push(format!(
        "Growth mindset: actively building new skills to stay current, which is what {} needs",
        company
    ));
    points
}

fn category_key(category: &str) -> String {
    let key = category.trim().to_lowercase();
    if key.is_empty() {
        "general".to_string()
    } else {
        key
    }
}

/// `ai_learning` → `Ai learning`
fn category_label(key: &str) -> String {
    let spaced = key.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

fn contains_ignore_case(values: &[String], needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    values.iter().any(|value| value.trim().to_lowercase() == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Achievement, Skill};

    fn profile() -> ApplicantProfile {
        ApplicantProfile {
            name: "Sam".to_string(),
            current_role: String::new(),
            target_role: String::new(),
            skills: vec![
                Skill::new("Linux", "infrastructure", &["ubuntu"]),
                Skill::new("Python", "automation", &[]).with_weight(2.0),
                Skill::new("Kubernetes", "cloud", &["k8s"]),
            ],
            achievements: vec![
                Achievement::new("Ran a 500-node Ubuntu fleet", &["Linux"]),
                Achievement::new("Migrated services to k8s", &["Kubernetes"]),
                Achievement::new("Wrote the deploy tooling", &["python", "Kubernetes"]),
            ],
            portfolio: Default::default(),
            talking_points: BTreeMap::from([(
                "infrastructure".to_string(),
                "Infrastructure stability: fleets kept patched and monitored".to_string(),
            )]),
        }
    }

    #[test]
    fn test_match_is_case_insensitive_and_ordered() {
        let matched = match_skills("We need PYTHON and linux experience", &profile());
        assert_eq!(matched, vec!["Linux", "Python"]);
    }

    #[test]
    fn test_match_uses_synonyms() {
        let matched = match_skills("Our stack: Ubuntu, K8S", &profile());
        assert_eq!(matched, vec!["Linux", "Kubernetes"]);
    }

    #[test]
    fn test_match_is_presence_not_frequency() {
        let once = match_skills("linux", &profile());
        let many = match_skills("linux linux linux linux", &profile());
        assert_eq!(once, many);
    }

    #[test]
    fn test_matched_skills_subset_of_profile() {
        let p = profile();
        let matched = match_skills("linux python kubernetes rust go java", &p);
        assert!(matched
            .iter()
            .all(|m| p.skills.iter().any(|s| &s.name == m)));
    }

    #[test]
    fn test_empty_description_matches_nothing() {
        assert!(match_skills("", &profile()).is_empty());
        let score = fit_score(&[], &profile(), ScoreWeighting::Uniform);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_uniform_fit_score() {
        let matched = vec!["Linux".to_string(), "Python".to_string()];
        let score = fit_score(&matched, &profile(), ScoreWeighting::Uniform);
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_fit_score() {
        let matched = vec!["Python".to_string()];
        let score = fit_score(&matched, &profile(), ScoreWeighting::SkillWeights);
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_fit_score_monotonic_and_bounded() {
        let p = profile();
        let names: Vec<String> = p.skills.iter().map(|s| s.name.clone()).collect();
        for weighting in [ScoreWeighting::Uniform, ScoreWeighting::SkillWeights] {
            let mut previous = 0.0;
            for n in 0..=names.len() {
                let score = fit_score(&names[..n], &p, weighting);
                assert!((0.0..=1.0).contains(&score));
                assert!(score >= previous);
                previous = score;
            }
            assert!((previous - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fit_score_ignores_names_outside_profile() {
        let matched = vec!["Linux".to_string(), "COBOL".to_string()];
        let score = fit_score(&matched, &profile(), ScoreWeighting::Uniform);
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_profile_scores_zero() {
        let mut p = profile();
        p.skills.clear();
        assert_eq!(fit_score(&["Linux".to_string()], &p, ScoreWeighting::Uniform), 0.0);
    }

    #[test]
    fn test_highlight_keeps_profile_order() {
        let matched = vec!["Python".to_string(), "Linux".to_string()];
        assert_eq!(
            highlight_achievements(&matched, &profile()),
            vec!["Ran a 500-node Ubuntu fleet", "Wrote the deploy tooling"]
        );
    }

    #[test]
    fn test_highlight_folds_unicode_case() {
        let mut p = profile();
        p.skills.push(Skill::new("Ñandú", "automation", &[]));
        p.achievements = vec![Achievement::new("Shipped the ñandú pipeline", &["ÑANDÚ"])];

        let matched = match_skills("Experience with ñandú preferred", &p);
        assert_eq!(matched, vec!["Ñandú"]);
        assert_eq!(
            highlight_achievements(&matched, &p),
            vec!["Shipped the ñandú pipeline"]
        );
        assert!(fit_score(&matched, &p, ScoreWeighting::Uniform) > 0.0);
    }

    #[test]
    fn test_category_matches_group_in_profile_order() {
        let mut p = profile();
        p.skills.push(Skill::new("Bash", "", &[]));
        p.skills.push(Skill::new("Ansible", "automation", &[]));

        let matched = match_skills("ansible, python, bash and linux", &p);
        let groups = category_matches(&matched, &p);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups["automation"], vec!["Python", "Ansible"]);
        assert_eq!(groups["infrastructure"], vec!["Linux"]);
        assert_eq!(groups["general"], vec!["Bash"]);
        assert!(!groups.contains_key("cloud"));
    }

    #[test]
    fn test_talking_points_follow_profile_category_order() {
        let matched = vec!["Python".to_string(), "Linux".to_string()];
        let points = talking_points(&matched, &profile(), "TechCorp");

        assert_eq!(
            points,
            vec![
                "Infrastructure stability: fleets kept patched and monitored".to_string(),
                "Automation experience: hands-on with Python".to_string(),
                "Growth mindset: actively building new skills to stay current, which is what TechCorp needs".to_string(),
            ]
        );
    }

    #[test]
    fn test_talking_points_without_matches_keep_closing_point() {
        let points = talking_points(&[], &profile(), "your company");
        assert_eq!(points.len(), 1);
        assert!(points[0].ends_with("which is what your company needs"));
    }
}
