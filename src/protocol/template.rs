//! Data collection template derivation

use super::{slugify, Column, ColumnType, DataTemplate, Protocol};

const BASE_ROWS: usize = 10;
const REPLICATE_ROWS: usize = 20;

/// Extra columns added when a protocol has a section whose id contains one
/// of the keywords
struct ColumnRule {
    keywords: &'static [&'static str],
    columns: &'static [(&'static str, &'static str, ColumnType)],
}

const RULES: &[ColumnRule] = &[
    ColumnRule {
        keywords: &["methods", "procedure", "steps"],
        columns: &[
            ("condition", "Treatment / Condition", ColumnType::Text),
            ("replicate", "Replicate", ColumnType::Number),
        ],
    },
    ColumnRule {
        keywords: &["materials", "reagents"],
        columns: &[("reagent_lot", "Reagent Lot", ColumnType::Text)],
    },
    ColumnRule {
        keywords: &["analysis", "data_collection"],
        columns: &[("units", "Units", ColumnType::Text)],
    },
    ColumnRule {
        keywords: &["safety"],
        columns: &[("operator", "Operator Initials", ColumnType::Text)],
    },
];

fn baseline_columns() -> Vec<Column> {
    vec![
        Column::new("sample_id", "Sample ID", ColumnType::Text),
        Column::new("date", "Date", ColumnType::Date),
        Column::new("time", "Time", ColumnType::Time),
        Column::new("measurement", "Measurement", ColumnType::Number),
        Column::new("notes", "Notes", ColumnType::Text),
    ]
}

/// Derive a data template from a finished protocol
///
/// The five baseline columns are always present. Rule columns are inserted
/// before `notes` in rule order.
pub fn generate_template(protocol: &Protocol) -> DataTemplate {
    let mut columns = baseline_columns();
    let notes = columns.pop();

    let mut has_replicates = false;
    for rule in RULES {
        let matched = protocol
            .sections
            .iter()
            .any(|s| rule.keywords.iter().any(|k| s.id.contains(k)));
        if !matched {
            continue;
        }
        for (id, name, column_type) in rule.columns {
            if *id == "replicate" {
                has_replicates = true;
            }
            columns.push(Column::new(id, name, *column_type));
        }
    }
    columns.extend(notes);

    let title = format!("{} Data Collection", protocol.title.trim());
    DataTemplate {
        id: format!("template_{}", slugify(&protocol.title)),
        title,
        columns,
        suggested_rows: if has_replicates {
            REPLICATE_ROWS
        } else {
            BASE_ROWS
        },
    }
}
