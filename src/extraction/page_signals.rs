// src/extraction/page_signals.rs
//! Secondary facts read off the posting text: salary range, work arrangement, requirement
//! bullets and technology mentions.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SALARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\$\s?[\d,]+(?:\.\d+)?k?\s*(?:-|–|to)\s*\$\s?[\d,]+(?:\.\d+)?k?|[\d,]{4,}\s*(?:-|–|to)\s*[\d,]{4,}\s*(?:USD|AUD|NZD|dollars)",
    )
    .expect("valid regex")
});

const REQUIREMENT_HEADINGS: &[&str] = &["requirements", "qualifications", "must have", "essential"];
const SECTION_BREAKS: &[&str] = &["responsibilities", "about", "benefits"];
const BULLETS: &[char] = &['•', '-', '*', '◦'];

const TECH_KEYWORDS: &[&str] = &[
    "python",
    "javascript",
    "aws",
    "azure",
    "kubernetes",
    "docker",
    "linux",
    "windows",
    "networking",
    "automation",
    "ci/cd",
    "devops",
    "machine learning",
    "ai",
    "data analysis",
    "api",
    "rest",
    "json",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkArrangement {
    Remote,
    Hybrid,
    Onsite,
    Unspecified,
}

pub fn find_salary(text: &str) -> Option<String> {
    SALARY_RE.find(text).map(|m| m.as_str().trim().to_string())
}

/// Hybrid is checked first since hybrid postings usually mention remote days too.
pub fn detect_work_arrangement(text: &str) -> WorkArrangement {
    if text.trim().is_empty() {
        return WorkArrangement::Unspecified;
    }
    let lower = text.to_lowercase();
    if lower.contains("hybrid") {
        WorkArrangement::Hybrid
    } else if ["remote", "work from home", "wfh"]
        .iter()
        .any(|term| lower.contains(term))
    {
        WorkArrangement::Remote
    } else {
        WorkArrangement::Onsite
    }
}

/// Technology keywords named in the description, in keyword-table order.
pub fn find_technologies(description: &str) -> Vec<String> {
    let words = words(description);
    TECH_KEYWORDS
        .iter()
        .filter(|keyword| contains_word_run(&words, keyword))
        .map(|keyword| keyword.to_string())
        .collect()
}

/// Case-insensitive match of `phrase` as a run of whole words in `text`, so `ai` does not
/// match inside `maintain`.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    contains_word_run(&words(text), phrase)
}

fn contains_word_run(words: &[String], phrase: &str) -> bool {
    let needle = self::words(phrase);
    !needle.is_empty()
        && words
            .windows(needle.len())
            .any(|window| window == needle.as_slice())
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Collects bullet lines that follow a requirements-style heading, stopping at the next section.
pub fn extract_requirements(description: &str) -> Vec<String> {
    let mut requirements = Vec::new();
    let mut capturing = false;

    for line in description.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();
        let is_bullet = line.starts_with(BULLETS);

        if !is_bullet && REQUIREMENT_HEADINGS.iter().any(|h| lower.contains(h)) {
            capturing = true;
            continue;
        }
        if !capturing {
            continue;
        }
        if is_bullet {
            let item = line.trim_start_matches(BULLETS).trim();
            if !item.is_empty() {
                requirements.push(item.to_string());
            }
        } else if SECTION_BREAKS.iter().any(|s| lower.contains(s)) {
            break;
        }
    }

    requirements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_salary_dollar_range() {
        let text = "Pay: $80,000 - $95,000 per year plus super";
        assert_eq!(find_salary(text).as_deref(), Some("$80,000 - $95,000"));
    }

    #[test]
    fn test_find_salary_k_range() {
        assert_eq!(find_salary("Salary $120k to $140k").as_deref(), Some("$120k to $140k"));
    }

    #[test]
    fn test_find_salary_absent() {
        assert_eq!(find_salary("Competitive package"), None);
    }

    #[test]
    fn test_detect_work_arrangement() {
        assert_eq!(detect_work_arrangement("Fully remote team"), WorkArrangement::Remote);
        assert_eq!(
            detect_work_arrangement("Hybrid, two remote days a week"),
            WorkArrangement::Hybrid
        );
        assert_eq!(detect_work_arrangement("Office in Sydney"), WorkArrangement::Onsite);
        assert_eq!(detect_work_arrangement("  "), WorkArrangement::Unspecified);
    }

    #[test]
    fn test_extract_requirements_stops_at_next_section() {
        let description = "We build things.\nRequirements\n• Linux administration\n- Python scripting\nNice extras we mention\n* Monitoring\nBenefits\n• Free lunch";
        assert_eq!(
            extract_requirements(description),
            vec!["Linux administration", "Python scripting", "Monitoring"]
        );
    }

    #[test]
    fn test_extract_requirements_none_without_heading() {
        assert!(extract_requirements("• Linux\n• Python").is_empty());
    }

    #[test]
    fn test_find_technologies_whole_words_only() {
        let description = "Maintain Linux hosts, build CI/CD with Docker and expose a REST API.";
        assert_eq!(
            find_technologies(description),
            vec!["docker", "linux", "ci/cd", "api", "rest"]
        );
    }

    #[test]
    fn test_contains_phrase() {
        assert!(contains_phrase("Senior Site Reliability Engineer", "site reliability"));
        assert!(contains_phrase("AI Engineer", "ai"));
        assert!(!contains_phrase("Maintenance Technician", "ai"));
        assert!(!contains_phrase("anything", ""));
    }
}
