// src/generation/templates.rs
//! Cover letter templates: `{{placeholder}}` values and `{{#list}}...{{/list}}` sections
//! that drop out when their list is empty.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::RenderError;
use crate::extraction::{contains_phrase, JobPosting, SourcePlatform};

pub const DEFAULT_TEMPLATE: &str = "default";

pub const SCALAR_PLACEHOLDERS: &[&str] = &[
    "name",
    "current_role",
    "target_role",
    "company_name",
    "job_title",
    "location",
    "platform",
];
pub const LIST_PLACEHOLDERS: &[&str] = &["matched_skills", "achievements", "portfolio"];

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (DEFAULT_TEMPLATE, include_str!("../../templates/default.txt")),
    (
        "infrastructure_plus",
        include_str!("../../templates/infrastructure_plus.txt"),
    ),
    (
        "automation_focused",
        include_str!("../../templates/automation_focused.txt"),
    ),
    (
        "linkedin_connection",
        include_str!("../../templates/linkedin_connection.txt"),
    ),
];

#[derive(Debug, Clone, Copy)]
pub enum RuleTrigger {
    /// Whole-word match against the lowercased job title.
    RoleKeyword(&'static str),
    Platform(SourcePlatform),
}

#[derive(Debug)]
pub struct SelectionRule {
    pub trigger: RuleTrigger,
    pub template: &'static str,
}

/// Checked top to bottom; the first rule that fires picks the template.
pub static SELECTION_RULES: &[SelectionRule] = &[
    SelectionRule {
        trigger: RuleTrigger::RoleKeyword("infrastructure"),
        template: "infrastructure_plus",
    },
    SelectionRule {
        trigger: RuleTrigger::RoleKeyword("devops"),
        template: "infrastructure_plus",
    },
    SelectionRule {
        trigger: RuleTrigger::RoleKeyword("site reliability"),
        template: "infrastructure_plus",
    },
    SelectionRule {
        trigger: RuleTrigger::RoleKeyword("sre"),
        template: "infrastructure_plus",
    },
    SelectionRule {
        trigger: RuleTrigger::RoleKeyword("systems administrator"),
        template: "infrastructure_plus",
    },
    SelectionRule {
        trigger: RuleTrigger::RoleKeyword("automation"),
        template: "automation_focused",
    },
    SelectionRule {
        trigger: RuleTrigger::RoleKeyword("machine learning"),
        template: "automation_focused",
    },
    SelectionRule {
        trigger: RuleTrigger::RoleKeyword("ai"),
        template: "automation_focused",
    },
    SelectionRule {
        trigger: RuleTrigger::RoleKeyword("developer"),
        template: "automation_focused",
    },
    SelectionRule {
        trigger: RuleTrigger::Platform(SourcePlatform::LinkedIn),
        template: "linkedin_connection",
    },
];

impl RuleTrigger {
    fn fires(&self, job: &JobPosting) -> bool {
        match self {
            RuleTrigger::RoleKeyword(keyword) => contains_phrase(&job.title, keyword),
            RuleTrigger::Platform(platform) => job.source_platform == *platform,
        }
    }
}

/// Template id for a posting: first matching rule, else `default`.
pub fn select_template_id(job: &JobPosting) -> &'static str {
    SELECTION_RULES
        .iter()
        .find(|rule| rule.trigger.fires(job))
        .map(|rule| rule.template)
        .unwrap_or(DEFAULT_TEMPLATE)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Value(String),
    SectionStart(String),
    SectionEnd,
}

#[derive(Debug, Clone)]
pub struct Template {
    pub id: String,
    tokens: Vec<Token>,
}

/// Values a template is filled with.
#[derive(Debug, Clone, Default)]
pub struct TemplateValues {
    scalars: BTreeMap<&'static str, String>,
    lists: BTreeMap<&'static str, Vec<String>>,
}

impl TemplateValues {
    pub fn scalar(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.scalars.insert(name, value.into());
        self
    }

    pub fn list(mut self, name: &'static str, items: Vec<String>) -> Self {
        self.lists.insert(name, items);
        self
    }

    fn items(&self, name: &str) -> &[String] {
        self.lists.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn value(&self, name: &str) -> String {
        if let Some(value) = self.scalars.get(name) {
            return value.clone();
        }
        self.items(name)
            .iter()
            .map(|item| format!("• {}", item))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Template {
    pub fn parse(id: &str, source: &str) -> Result<Self, RenderError> {
        let mut tokens = Vec::new();
        let mut open_sections: Vec<String> = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                return Err(RenderError::UnterminatedTag {
                    template: id.to_string(),
                    offset: source.len() - rest.len() + start,
                });
            };
            if start > 0 {
                tokens.push(Token::Text(rest[..start].to_string()));
            }
            let tag = rest[start + 2..start + 2 + len].trim();
            rest = &rest[start + 4 + len..];

            if let Some(name) = tag.strip_prefix('#') {
                let name = name.trim();
                if !LIST_PLACEHOLDERS.contains(&name) {
                    return Err(unknown(id, tag));
                }
                open_sections.push(name.to_string());
                tokens.push(Token::SectionStart(name.to_string()));
                rest = skip_line_break(rest);
            } else if let Some(name) = tag.strip_prefix('/') {
                match open_sections.pop() {
                    Some(open) if open == name.trim() => {}
                    Some(open) => {
                        return Err(RenderError::UnclosedSection {
                            template: id.to_string(),
                            section: open,
                        })
                    }
                    None => return Err(unknown(id, tag)),
                }
                tokens.push(Token::SectionEnd);
                rest = skip_line_break(rest);
            } else if SCALAR_PLACEHOLDERS.contains(&tag) || LIST_PLACEHOLDERS.contains(&tag) {
                tokens.push(Token::Value(tag.to_string()));
            } else {
                return Err(unknown(id, tag));
            }
        }

        if !rest.is_empty() {
            tokens.push(Token::Text(rest.to_string()));
        }
        if let Some(open) = open_sections.pop() {
            return Err(RenderError::UnclosedSection {
                template: id.to_string(),
                section: open,
            });
        }

        Ok(Self {
            id: id.to_string(),
            tokens,
        })
    }

    /// Plain interpolation; the only logic is dropping sections whose list is empty.
    pub fn render(&self, values: &TemplateValues) -> String {
        let mut out = String::new();
        let mut skipped: Vec<bool> = Vec::new();

        for token in &self.tokens {
            match token {
                Token::SectionStart(name) => skipped.push(values.items(name).is_empty()),
                Token::SectionEnd => {
                    skipped.pop();
                }
                _ if skipped.iter().any(|s| *s) => {}
                Token::Text(text) => out.push_str(text),
                Token::Value(name) => out.push_str(&values.value(name)),
            }
        }

        while out.contains("\n\n\n") {
            out = out.replace("\n\n\n", "\n\n");
        }
        out.trim().to_string()
    }
}

fn unknown(id: &str, tag: &str) -> RenderError {
    RenderError::UnknownPlaceholder {
        template: id.to_string(),
        placeholder: tag.to_string(),
    }
}

fn skip_line_break(rest: &str) -> &str {
    rest.strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest)
}

/// Validated set of letter templates. Always holds a `default` template.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    default: Template,
    named: BTreeMap<String, Template>,
}

impl TemplateLibrary {
    pub fn builtin() -> Result<Self, RenderError> {
        Self::from_sources(
            BUILTIN_TEMPLATES
                .iter()
                .map(|(id, source)| (id.to_string(), source.to_string())),
        )
    }

    /// Loads every `*.txt` in `dir`; the file stem is the template id. `default.txt` is required.
    pub fn from_dir(dir: &Path) -> Result<Self, RenderError> {
        info!("Loading templates from: {}", dir.display());
        let io_error = |e: std::io::Error| RenderError::Io {
            path: dir.to_path_buf(),
            message: e.to_string(),
        };

        let mut sources = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = std::fs::read_to_string(&path).map_err(|e| RenderError::Io {
                path: path.clone(),
                message: e.to_string(),
            })?;
            debug!("Read template {} from {}", id, path.display());
            sources.push((id.to_string(), source));
        }

        Self::from_sources(sources)
    }

    pub fn from_sources(
        sources: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, RenderError> {
        let mut named = BTreeMap::new();
        for (id, source) in sources {
            let template = Template::parse(&id, &source)?;
            named.insert(id, template);
        }

        let default = named
            .remove(DEFAULT_TEMPLATE)
            .ok_or_else(|| RenderError::MissingTemplate {
                id: DEFAULT_TEMPLATE.to_string(),
            })?;

        info!("Loaded {} templates", named.len() + 1);
        Ok(Self { default, named })
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        if id == DEFAULT_TEMPLATE {
            Some(&self.default)
        } else {
            self.named.get(id)
        }
    }

    pub fn list_templates(&self) -> Vec<String> {
        std::iter::once(self.default.id.clone())
            .chain(self.named.keys().cloned())
            .collect()
    }

    /// Template chosen by the selection rules; a rule naming a template this library
    /// lacks falls back to `default`.
    pub fn select(&self, job: &JobPosting) -> &Template {
        let id = select_template_id(job);
        self.get(id).unwrap_or_else(|| {
            warn!("Template '{}' not available, using default", id);
            &self.default
        })
    }
}
