// src/generation/mod.rs
pub mod generator;
pub mod matcher;
pub mod templates;

pub use generator::{ContentGenerator, FitAnalysis, GeneratedApplication};
pub use matcher::ScoreWeighting;
pub use templates::{select_template_id, Template, TemplateLibrary, DEFAULT_TEMPLATE};
