//! Deterministic protocol generator
//!
//! Builds a complete protocol from descriptor fields alone. This is the
//! backstop for every failed or unusable completion, so it has no failure
//! path. Section order is fixed:
//! Introduction, Design Rationale (only when a rationale is given), Materials
//! and Equipment, Methods, Data Collection and Analysis, Expected Results,
//! References.

use super::catalog::{self, AnalysisCategory};
use super::{ExperimentDescriptor, Protocol, Section, SectionBuilder};

const BASE_MATERIALS: &[&str] = &[
    "Laboratory notebook or electronic lab notebook",
    "Personal protective equipment: lab coat, nitrile gloves, safety glasses",
    "Calibrated pipettes (P10, P200, P1000) and sterile tips",
    "Labelled sample containers and permanent marker",
    "Analytical balance (0.1 mg resolution)",
    "Timer",
];

const REFERENCES: &[&str] = &[
    "Institutional laboratory safety manual and relevant safety data sheets (SDS).",
    "Manufacturer instructions for every instrument and reagent kit used.",
    "Cumming G, Fidler F, Vaux DL. Error bars in experimental biology. \
     J Cell Biol. 2007;177(1):7-11.",
];

/// Generate a protocol locally with `ai_generated = false`
pub fn generate_fallback(descriptor: &ExperimentDescriptor, date: &str) -> Protocol {
    Protocol::new(
        descriptor.title.trim(),
        date,
        fallback_sections(descriptor),
        false,
    )
}

/// The sections [`generate_fallback`] produces, without id or timestamp
pub fn fallback_sections(descriptor: &ExperimentDescriptor) -> Vec<Section> {
    let categories = catalog::resolve(&descriptor.analysis_types);
    let mut sections = SectionBuilder::new();

    sections.push("Introduction", &introduction(descriptor));
    if let Some(rationale) = descriptor.rationale_text() {
        sections.push("Design Rationale", rationale);
    }
    sections.push("Materials and Equipment", &materials(&categories));
    sections.push("Methods", &methods(descriptor));
    sections.push(
        "Data Collection and Analysis",
        &data_analysis(descriptor, &categories),
    );
    sections.push("Expected Results", &expected_results(descriptor, &categories));
    sections.push("References", &bullets(REFERENCES));

    sections.finish()
}

fn introduction(descriptor: &ExperimentDescriptor) -> String {
    let title = descriptor.title.trim();
    let mut text = format!("This protocol describes the experiment \"{title}\".");
    match descriptor.purpose_text() {
        Some(purpose) => {
            text.push_str(&format!("\n\nObjective: {purpose}"));
        }
        None => {
            text.push_str(
                "\n\nObjective: characterise the effect of the manipulated variable under \
                 controlled conditions.",
            );
        }
    }
    text.push_str(
        "\n\nRead the complete protocol before starting and prepare all materials in advance.",
    );
    text
}

fn materials(categories: &[&'static AnalysisCategory]) -> String {
    let mut items: Vec<&str> = BASE_MATERIALS.to_vec();
    for category in categories {
        for item in category.equipment {
            if !items.contains(item) {
                items.push(item);
            }
        }
    }
    bullets(&items)
}

fn methods(descriptor: &ExperimentDescriptor) -> String {
    let mut steps = vec![
        "Preparation: label all containers, equilibrate reagents to room temperature \
         (20-25 °C) for 30 minutes and calibrate instruments."
            .to_string(),
        "Controls: set up a negative control and, where available, a positive control \
         alongside every experimental condition."
            .to_string(),
        "Sample allocation: assign samples to conditions at random, with at least three \
         biological replicates per condition."
            .to_string(),
        "Execution: apply each condition, keeping all other variables (temperature, \
         timing, volumes) constant between replicates."
            .to_string(),
        "Measurement: record each reading immediately, including date, time and any \
         deviation from the protocol."
            .to_string(),
        "Clean-up: dispose of waste according to institutional guidelines and \
         decontaminate work surfaces."
            .to_string(),
    ];

    if descriptor.reference_document().is_some() {
        steps.insert(
            1,
            "Reference procedure: follow the step order and parameters of the supplied \
             reference document where it applies."
                .to_string(),
        );
    }

    numbered(&steps)
}

fn data_analysis(
    descriptor: &ExperimentDescriptor,
    categories: &[&'static AnalysisCategory],
) -> String {
    let mut blocks = vec![
        "Data collection:\n\
         - Enter raw values into the data template on the day they are measured.\n\
         - Keep unprocessed data separate from any transformed or normalised values."
            .to_string(),
    ];
    blocks.extend(categories.iter().map(|c| (c.analysis)(descriptor)));
    blocks.join("\n\n")
}

fn expected_results(
    descriptor: &ExperimentDescriptor,
    categories: &[&'static AnalysisCategory],
) -> String {
    let mut text = match descriptor.purpose_text() {
        Some(purpose) => format!(
            "Results should provide evidence to {}.",
            lower_first(purpose.trim_end_matches('.'))
        ),
        None => "Results should show whether the manipulated variable has a measurable \
                 effect compared with controls."
            .to_string(),
    };

    let labels: Vec<&str> = categories.iter().map(|c| c.label).collect();
    text.push_str(&format!(
        "\n\nFindings will be summarised using: {}.",
        labels.join(", ")
    ));
    text.push_str(
        "\n\nUnexpected results should be documented in full and repeated before \
         drawing conclusions.",
    );
    text
}

fn bullets<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
