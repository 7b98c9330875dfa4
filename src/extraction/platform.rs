// src/extraction/platform.rs
//! Per-site extraction rules. Adding a job board means adding a row to `RULESETS`.

use std::fmt;

use reqwest::Url;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourcePlatform {
    Indeed,
    LinkedIn,
    #[serde(rename = "SEEK")]
    Seek,
    Generic,
}

impl SourcePlatform {
    /// Detects the platform from the URL host, falling back to `Generic`.
    pub fn from_url(url: &Url) -> Self {
        url.host_str().map(Self::from_host).unwrap_or(Self::Generic)
    }

    pub fn from_host(host: &str) -> Self {
        let host = host.to_lowercase();
        RULESETS
            .iter()
            .find(|rules| {
                host.split('.')
                    .any(|label| rules.host_labels.contains(&label))
            })
            .map(|rules| rules.platform)
            .unwrap_or(Self::Generic)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourcePlatform::Indeed => "Indeed",
            SourcePlatform::LinkedIn => "LinkedIn",
            SourcePlatform::Seek => "SEEK",
            SourcePlatform::Generic => "Generic",
        }
    }
}

impl fmt::Display for SourcePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered selector lists per field. The first selector that yields text wins.
#[derive(Debug)]
pub struct Ruleset {
    pub platform: SourcePlatform,
    pub host_labels: &'static [&'static str],
    pub title: &'static [&'static str],
    pub company: &'static [&'static str],
    pub location: &'static [&'static str],
    pub description: &'static [&'static str],
    /// Fall back to the largest paragraph block when no description selector matches.
    pub largest_block_fallback: bool,
}

pub static RULESETS: [Ruleset; 4] = [
    Ruleset {
        platform: SourcePlatform::Indeed,
        host_labels: &["indeed"],
        title: &[
            "h1.jobsearch-JobInfoHeader-title",
            "h1[data-testid='jobsearch-JobInfoHeader-title']",
            "[data-testid='jobTitle']",
            ".jobsearch-JobInfoHeader-title",
        ],
        company: &[
            "[data-testid='inlineHeader-companyName']",
            "[data-company-name='true']",
            "[data-testid='companyName']",
            ".jobsearch-InlineCompanyRating a",
            ".jobsearch-InlineCompanyRating",
        ],
        location: &[
            "[data-testid='inlineHeader-companyLocation']",
            "[data-testid='job-location']",
            "[data-testid='jobLocation']",
        ],
        description: &[
            "#jobDescriptionText",
            ".jobsearch-jobDescriptionText",
            "[data-testid='jobDescription']",
        ],
        largest_block_fallback: false,
    },
    Ruleset {
        platform: SourcePlatform::LinkedIn,
        host_labels: &["linkedin"],
        title: &[
            "h1.top-card-layout__title",
            ".job-details-jobs-unified-top-card__job-title",
            "h1[data-test-id='job-title']",
            ".jobs-unified-top-card__job-title",
        ],
        company: &[
            ".job-details-jobs-unified-top-card__company-name",
            ".topcard__org-name-link",
            "a[data-test-id='job-poster-name']",
            ".jobs-unified-top-card__company-name",
        ],
        location: &[
            ".job-details-jobs-unified-top-card__bullet",
            ".topcard__flavor--bullet",
            "[data-test-id='job-location']",
            ".jobs-unified-top-card__bullet",
        ],
        description: &[
            ".show-more-less-html__markup",
            ".jobs-description-content__text",
            ".jobs-box__html-content",
            "[data-test-id='job-description']",
        ],
        largest_block_fallback: false,
    },
    Ruleset {
        platform: SourcePlatform::Seek,
        host_labels: &["seek"],
        title: &[
            "h1[data-automation='job-detail-title']",
            "[data-automation='job-detail-title']",
        ],
        company: &[
            "[data-automation='advertiser-name']",
            "[data-automation='job-detail-company-name']",
        ],
        location: &["[data-automation='job-detail-location']"],
        description: &[
            "[data-automation='jobAdDetails']",
            "[data-automation='job-detail-description']",
        ],
        largest_block_fallback: false,
    },
    Ruleset {
        platform: SourcePlatform::Generic,
        host_labels: &[],
        title: &["h1", "h2"],
        company: &[
            ".company-name",
            "[itemprop='hiringOrganization'] [itemprop='name']",
            "[itemprop='hiringOrganization']",
            "[class*='company-name']",
            "[class*='companyName']",
            "[class*='employer-name']",
        ],
        location: &["[class*='location']"],
        description: &["[itemprop='description']", ".job-description"],
        largest_block_fallback: true,
    },
];

pub fn ruleset_for(platform: SourcePlatform) -> &'static Ruleset {
    RULESETS
        .iter()
        .find(|rules| rules.platform == platform)
        .unwrap_or(&RULESETS[RULESETS.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_host_known_platforms() {
        assert_eq!(SourcePlatform::from_host("www.indeed.com"), SourcePlatform::Indeed);
        assert_eq!(SourcePlatform::from_host("au.indeed.com"), SourcePlatform::Indeed);
        assert_eq!(SourcePlatform::from_host("uk.indeed.co.uk"), SourcePlatform::Indeed);
        assert_eq!(SourcePlatform::from_host("www.linkedin.com"), SourcePlatform::LinkedIn);
        assert_eq!(SourcePlatform::from_host("www.seek.com.au"), SourcePlatform::Seek);
        assert_eq!(SourcePlatform::from_host("WWW.SEEK.CO.NZ"), SourcePlatform::Seek);
    }

    #[test]
    fn test_from_host_requires_whole_label() {
        assert_eq!(SourcePlatform::from_host("notindeed.com"), SourcePlatform::Generic);
        assert_eq!(SourcePlatform::from_host("hideandseek.io"), SourcePlatform::Generic);
        assert_eq!(SourcePlatform::from_host("careers.example.com"), SourcePlatform::Generic);
    }

    #[test]
    fn test_from_url() {
        let url = Url::parse("https://www.linkedin.com/jobs/view/123").unwrap();
        assert_eq!(SourcePlatform::from_url(&url), SourcePlatform::LinkedIn);
    }

    #[test]
    fn test_every_platform_has_ruleset() {
        for platform in [
            SourcePlatform::Indeed,
            SourcePlatform::LinkedIn,
            SourcePlatform::Seek,
            SourcePlatform::Generic,
        ] {
            assert_eq!(ruleset_for(platform).platform, platform);
        }
    }

    #[test]
    fn test_only_generic_uses_block_fallback() {
        assert!(ruleset_for(SourcePlatform::Generic).largest_block_fallback);
        assert!(!ruleset_for(SourcePlatform::Indeed).largest_block_fallback);
    }

    #[test]
    fn test_platform_serializes_seek_uppercase() {
        let json = serde_json::to_string(&SourcePlatform::Seek).unwrap();
        assert_eq!(json, r#""SEEK""#);
    }
}
