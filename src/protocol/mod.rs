//! Protocol generation pipeline
//!
//! Turns an [`ExperimentDescriptor`] into a sectioned [`Protocol`], either by
//! parsing what a completion service returns or by generating one locally.
//!
//! - `validator` - input checks run before any expensive call
//! - `prompt` - system/user instruction rendering
//! - `catalog` - analysis category dispatch table
//! - `fallback` - deterministic, offline protocol generator
//! - `parser` - free-text response segmentation
//! - `template` - data collection template derivation
//! - `orchestrator` - ties the above together with failure recovery

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub mod catalog;
pub mod fallback;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod template;
pub mod validator;

pub use fallback::{fallback_sections, generate_fallback};
pub use orchestrator::{GenerationOrchestrator, GenerationOutcome};
pub use parser::ResponseParser;
pub use prompt::{PromptBuilder, PromptPair};
pub use template::generate_template;
pub use validator::{validate_descriptor, validate_value, ValidationError};

/// Experiment metadata a protocol is generated from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentDescriptor {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_rationale: Option<String>,
    #[serde(default)]
    pub analysis_types: Vec<String>,
    /// Raw text of an uploaded reference document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
}

impl ExperimentDescriptor {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn with_design_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.design_rationale = Some(rationale.into());
        self
    }

    pub fn with_analysis_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.analysis_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_file_content(mut self, content: impl Into<String>) -> Self {
        self.file_content = Some(content.into());
        self
    }

    /// Purpose text, or `None` when absent or blank
    pub fn purpose_text(&self) -> Option<&str> {
        non_blank(self.purpose.as_deref())
    }

    /// Design rationale text, or `None` when absent or blank
    pub fn rationale_text(&self) -> Option<&str> {
        non_blank(self.design_rationale.as_deref())
    }

    /// Reference document text, or `None` when absent or blank
    pub fn reference_document(&self) -> Option<&str> {
        non_blank(self.file_content.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// One titled block of a protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// A generated laboratory protocol
///
/// Always carries at least one section. `ai_generated` records whether the
/// sections came from parsed model output or from the local generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub id: String,
    pub title: String,
    pub date: String,
    pub sections: Vec<Section>,
    pub ai_generated: bool,
    pub created: DateTime<Utc>,
}

impl Protocol {
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        sections: Vec<Section>,
        ai_generated: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            date: date.into(),
            sections,
            ai_generated,
            created: Utc::now(),
        }
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn has_section(&self, id: &str) -> bool {
        self.section(id).is_some()
    }

    /// Render as a Markdown document
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n_Date: {}_\n", self.title, self.date);
        for section in &self.sections {
            out.push_str(&format!("\n## {}\n", section.title));
            if !section.content.is_empty() {
                out.push('\n');
                out.push_str(&section.content);
                out.push('\n');
            }
        }
        out
    }
}

/// Declared type of a data template column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Date,
    Time,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(id: &str, name: &str, column_type: ColumnType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            column_type,
        }
    }
}

/// Tabular schema for recording measurements, derived from a [`Protocol`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTemplate {
    pub id: String,
    pub title: String,
    pub columns: Vec<Column>,
    pub suggested_rows: usize,
}

/// Today's local date as `YYYY-MM-DD`
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Lower-case `title` and collapse every run of non-alphanumeric characters
/// into a single `_`, with no leading or trailing separator.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(ch);
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Accumulates sections in order, assigning collision-free ids
///
/// Ids are the slugified title. When a slug is already taken the 1-based
/// position of the new section is appended (`data_analysis_3`).
#[derive(Debug, Default)]
pub struct SectionBuilder {
    sections: Vec<Section>,
    taken: HashSet<String>,
}

impl SectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, title: &str, content: &str) {
        let position = self.sections.len() + 1;
        let title = match title.trim() {
            "" => format!("Section {position}"),
            t => t.to_string(),
        };
        let id = self.allocate_id(&title, position);

        self.sections.push(Section {
            id,
            title,
            content: content.trim().to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn finish(self) -> Vec<Section> {
        self.sections
    }

    fn allocate_id(&mut self, title: &str, position: usize) -> String {
        let mut base = slugify(title);
        if base.is_empty() {
            base = format!("section_{position}");
        }

        let mut candidate = base.clone();
        let mut bump = 1;
        if self.taken.contains(&candidate) {
            candidate = format!("{base}_{position}");
        }
        while self.taken.contains(&candidate) {
            bump += 1;
            candidate = format!("{base}_{position}_{bump}");
        }

        self.taken.insert(candidate.clone());
        candidate
    }
}
