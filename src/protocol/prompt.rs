//! Generation request rendering
//!
//! Pure formatting: the same descriptor always yields the same prompt.

use super::ExperimentDescriptor;
use serde::{Deserialize, Serialize};

/// Symbol the model is asked to put in front of every section heading
pub const HEADING_MARKER: &str = "🔬";

/// Reference documents longer than this are cut before interpolation
pub const MAX_REFERENCE_CHARS: usize = 12_000;

/// System and user instructions for one completion call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, descriptor: &ExperimentDescriptor) -> PromptPair {
        PromptPair {
            system: system_instructions(),
            user: user_instructions(descriptor),
        }
    }
}

fn system_instructions() -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are an experienced laboratory scientist who writes clear, reproducible \
         experimental protocols.\n\n",
    );

    prompt.push_str("REQUIRED SECTIONS:\n");
    prompt.push_str(
        "1. Materials and Equipment - every reagent, consumable and instrument with \
         specific quantities, concentrations and grades.\n",
    );
    prompt.push_str(
        "2. Procedure - numbered step-by-step instructions with exact volumes, timings, \
         temperatures and speeds wherever they apply.\n",
    );
    prompt.push_str(
        "3. Data Analysis - what to record, how to process it and which statistical \
         methods to apply.\n",
    );
    prompt.push_str("4. Safety - hazards, required protective equipment and waste disposal.\n\n");

    prompt.push_str("FORMATTING RULES:\n");
    prompt.push_str(&format!(
        "- Put every section heading on its own line, starting with \"{HEADING_MARKER} \" \
         followed by the section name (for example \"{HEADING_MARKER} Procedure\").\n"
    ));
    prompt.push_str("- Use the same heading convention for every section.\n");
    prompt.push_str("- Do not use the heading marker anywhere except on heading lines.\n");
    prompt.push_str("- Write plain text under each heading; use numbered lists for steps.\n");

    prompt
}

fn user_instructions(descriptor: &ExperimentDescriptor) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Write a detailed laboratory protocol for the experiment \"{}\".\n",
        descriptor.title.trim()
    ));

    if let Some(purpose) = descriptor.purpose_text() {
        prompt.push_str(&format!("The purpose of the experiment is: {purpose}\n"));
    }

    if let Some(rationale) = descriptor.rationale_text() {
        prompt.push_str(&format!("The experimental design rationale is: {rationale}\n"));
    }

    let analyses: Vec<&str> = descriptor
        .analysis_types
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if analyses.is_empty() {
        prompt.push_str(
            "No analysis methods were selected; recommend the most appropriate ones.\n",
        );
    } else {
        prompt.push_str(&format!(
            "The data will be analysed using: {}.\n",
            analyses.join(", ")
        ));
    }

    if let Some(document) = descriptor.reference_document() {
        prompt.push_str(
            "\nA reference protocol document is provided below. Follow its existing step \
             order and use its parameters (quantities, timings, temperatures) exactly. \
             Do not invent new steps or change its values; restructure it into the \
             required sections and fill in only what is missing.\n",
        );
        prompt.push_str("\nREFERENCE DOCUMENT:\n");
        prompt.push_str(truncate_chars(document, MAX_REFERENCE_CHARS));
        prompt.push('\n');
    }

    prompt
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ExperimentDescriptor {
        ExperimentDescriptor::new("pH and Growth")
            .with_purpose("measure pH effect")
            .with_design_rationale("three pH levels, five replicates")
            .with_analysis_types(["statistical", "anova"])
    }

    #[test]
    fn test_system_prompt_requires_sections_and_marker() {
        let prompt = PromptBuilder::new().build(&descriptor());
        for needle in ["Materials and Equipment", "Procedure", "Data Analysis", "Safety"] {
            assert!(prompt.system.contains(needle), "missing {needle}");
        }
        assert!(prompt.system.contains(HEADING_MARKER));
        assert!(prompt.system.contains("temperatures"));
    }

    #[test]
    fn test_user_prompt_interpolates_fields() {
        let prompt = PromptBuilder::new().build(&descriptor());
        assert!(prompt.user.contains("\"pH and Growth\""));
        assert!(prompt.user.contains("measure pH effect"));
        assert!(prompt.user.contains("three pH levels, five replicates"));
        assert!(prompt.user.contains("statistical, anova"));
        assert!(!prompt.user.contains("REFERENCE DOCUMENT"));
    }

    #[test]
    fn test_reference_document_directs_model() {
        let with_doc = descriptor().with_file_content("1. Autoclave media at 121 C for 15 min");
        let prompt = PromptBuilder::new().build(&with_doc);
        assert!(prompt.user.contains("Follow its existing step order"));
        assert!(prompt.user.contains("121 C for 15 min"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::new();
        assert_eq!(builder.build(&descriptor()), builder.build(&descriptor()));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
