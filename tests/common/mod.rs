//! Common test utilities and helpers

#![allow(dead_code)]

use protocol_forge::ExperimentDescriptor;

/// Descriptor with every optional field populated
pub fn full_descriptor() -> ExperimentDescriptor {
    ExperimentDescriptor::new("Temperature and Enzyme Activity")
        .with_purpose("Measure catalase activity between 20C and 50C")
        .with_design_rationale("Five temperature levels, three replicates each")
        .with_analysis_types(["anova", "regression"])
}

/// Descriptor with only the required title
pub fn minimal_descriptor() -> ExperimentDescriptor {
    ExperimentDescriptor::new("Seed Germination")
}

/// Model output using the requested heading marker
pub const MARKED_RESPONSE: &str = "\
🔬 Materials and Equipment
- Catalase solution
- Water baths

🔬 Procedure
1. Equilibrate samples
2. Add substrate

🔬 Data Analysis
Fit an Arrhenius curve.
";
