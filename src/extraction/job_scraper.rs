// src/extraction/job_scraper.rs
use std::sync::LazyLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, info, warn};

use super::page_signals::{
    detect_work_arrangement, extract_requirements, find_salary, find_technologies,
};
use super::platform::{ruleset_for, Ruleset, SourcePlatform};
use super::{Extraction, JobPosting};
use crate::error::{FetchError, JobField, ParseError};

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const RETRY_DELAY: Duration = Duration::from_millis(500);

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "section", "article", "header", "footer", "h1", "h2", "h3",
    "h4", "h5", "h6", "tr", "table", "blockquote", "pre",
];
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// One extra attempt on timeout or connection failure.
    pub retry_once: bool,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: BROWSER_USER_AGENT.to_string(),
            retry_once: false,
        }
    }
}

pub struct JobScraper {
    client: Client,
    retry_once: bool,
}

impl JobScraper {
    pub fn new(settings: &ScraperSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            retry_once: settings.retry_once,
        })
    }

    /// Fetches a posting and extracts it with the ruleset for its host.
    pub async fn extract(&self, url: &str) -> Result<Extraction, FetchError> {
        let parsed = parse_job_url(url)?;
        info!("Fetching job post: {}", parsed);

        let html = match self.fetch(&parsed).await {
            Err(e) if self.retry_once && e.is_transient() => {
                warn!("Retrying job post fetch after: {}", e);
                tokio::time::sleep(RETRY_DELAY).await;
                self.fetch(&parsed).await?
            }
            other => other?,
        };

        let extraction = extract_html(&html, &parsed);
        info!(
            "Extracted job: {} at {} ({})",
            extraction.posting.title,
            extraction.posting.company,
            extraction.posting.source_platform
        );
        Ok(extraction)
    }

    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status_code: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| transport_error(url, e))
    }
}

fn transport_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Accepts absolute `http`/`https` URLs only.
pub fn parse_job_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        "http" | "https" => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: "missing host".to_string(),
        }),
        scheme => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", scheme),
        }),
    }
}

/// Extracts a posting from already-fetched HTML. Missing fields come back empty and
/// are listed in `Extraction::issues`.
pub fn extract_html(html: &str, url: &Url) -> Extraction {
    let document = Html::parse_document(html);
    let platform = SourcePlatform::from_url(url);
    let rules = ruleset_for(platform);
    debug!("Using {} ruleset for {}", platform, url);

    let title = find_line_text(&document, rules.title);
    let company = find_line_text(&document, rules.company);
    let location = find_line_text(&document, rules.location).unwrap_or_default();
    let description = find_description(&document, rules);

    let mut issues = Vec::new();
    let mut take = |value: Option<String>, field: JobField| {
        value.unwrap_or_else(|| {
            warn!("No {} found on {}", field, url);
            issues.push(ParseError { field });
            String::new()
        })
    };
    let title = take(title, JobField::Title);
    let company = take(company, JobField::Company);
    let description = take(description, JobField::Description);

    let page_text = document
        .select(&BODY)
        .next()
        .map(collapse_text)
        .unwrap_or_default();
    let arrangement_text = format!("{}\n{}\n{}", title, location, description);

    let posting = JobPosting {
        salary: find_salary(&page_text),
        work_arrangement: detect_work_arrangement(&arrangement_text),
        requirements: extract_requirements(&description),
        technologies: find_technologies(&description),
        title,
        company,
        description,
        source_platform: platform,
        source_url: url.to_string(),
        location,
    };

    Extraction { posting, issues }
}

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid selector"));
static SECTIONS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article, main, section").expect("valid selector"));

/// Text of the first selector (in list order) whose first match (in document order) yields
/// non-empty text under `text_of`.
fn find_text(
    document: &Html,
    selectors: &[&str],
    text_of: fn(ElementRef<'_>) -> String,
) -> Option<String> {
    for css in selectors {
        let Ok(parsed) = Selector::parse(css) else {
            warn!("Skipping invalid selector: {}", css);
            continue;
        };
        if let Some(text) = document
            .select(&parsed)
            .map(text_of)
            .find(|text| !text.is_empty())
        {
            return Some(text);
        }
    }
    None
}

fn find_line_text(document: &Html, selectors: &[&str]) -> Option<String> {
    find_text(document, selectors, collapse_text)
}

fn find_description(document: &Html, rules: &Ruleset) -> Option<String> {
    find_text(document, rules.description, block_text).or_else(|| {
        if !rules.largest_block_fallback {
            return None;
        }
        largest_text_block(document)
            .map(block_text)
            .filter(|text| !text.is_empty())
    })
}

/// The parent whose `<p>` children carry the most text. Ties keep the earliest block;
/// pages without paragraphs fall back to the longest `article`/`main`/`section`.
fn largest_text_block(document: &Html) -> Option<ElementRef<'_>> {
    let mut blocks: Vec<(ElementRef<'_>, usize)> = Vec::new();

    for paragraph in document.select(&PARAGRAPH) {
        let Some(parent) = paragraph.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        let len = collapse_text(paragraph).len();
        match blocks.iter_mut().find(|(el, _)| el.id() == parent.id()) {
            Some((_, total)) => *total += len,
            None => blocks.push((parent, len)),
        }
    }

    let best = pick_longest(blocks);
    if best.is_some() {
        return best;
    }

    let sections = document
        .select(&SECTIONS)
        .map(|el| (el, collapse_text(el).len()))
        .collect();
    pick_longest(sections)
}

fn pick_longest(candidates: Vec<(ElementRef<'_>, usize)>) -> Option<ElementRef<'_>> {
    let mut best: Option<(ElementRef<'_>, usize)> = None;
    for (element, len) in candidates {
        if len == 0 {
            continue;
        }
        match best {
            Some((_, best_len)) if best_len >= len => {}
            _ => best = Some((element, len)),
        }
    }
    best.map(|(element, _)| element)
}

/// Whitespace-collapsed single-line text, without script or style content.
fn collapse_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_visible_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if SKIPPED_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    out.push(' ');
                    push_visible_text(child_element, out);
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Text with one line per block element; list items are prefixed with a bullet.
fn block_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_block_text(element, &mut raw);
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty() && line != "•")
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_block_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let is_block = BLOCK_TAGS.contains(&name);
                if is_block {
                    out.push('\n');
                }
                if name == "li" {
                    out.push_str("• ");
                }
                push_block_text(child_element, out);
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}
