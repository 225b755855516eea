//! Free-form research questions
//!
//! The model is asked to close its answer with `Insights:` and
//! `Suggestions:` lists, which are lifted out into separate fields.

use crate::protocol::PromptPair;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReply {
    pub result: String,
    pub insights: Vec<String>,
    pub suggestions: Vec<String>,
}

pub(crate) fn analysis_prompt(query: &str) -> PromptPair {
    PromptPair {
        system: "You are a research assistant for laboratory scientists. Answer the \
                 question directly, then finish with a line reading 'Insights:' \
                 followed by '-' bullets, and a line reading 'Suggestions:' followed \
                 by '-' bullets."
            .to_string(),
        user: query.trim().to_string(),
    }
}

#[derive(Clone, Copy, PartialEq)]
enum List {
    Insights,
    Suggestions,
}

fn list_header(line: &str) -> Option<List> {
    let label = line
        .trim()
        .trim_start_matches('#')
        .trim_matches(|c| c == '*' || c == '_')
        .trim()
        .trim_end_matches(':')
        .trim_end_matches(|c| c == '*' || c == '_')
        .trim_end_matches(':')
        .trim()
        .to_lowercase();

    match label.as_str() {
        "insights" | "key insights" => Some(List::Insights),
        "suggestions" | "next steps" => Some(List::Suggestions),
        _ => None,
    }
}

fn bullet_text(line: &str) -> Option<&str> {
    let line = line.trim();
    let rest = if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
    {
        rest
    } else {
        let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        line[digits..]
            .strip_prefix(". ")
            .or_else(|| line[digits..].strip_prefix(") "))?
    };

    let rest = rest.trim();
    (!rest.is_empty()).then_some(rest)
}

/// Split bulleted `Insights:` and `Suggestions:` lists out of an answer
///
/// A list runs until the next non-bullet line. Missing lists come back empty.
pub fn extract_insights(answer: &str) -> (Vec<String>, Vec<String>) {
    let mut insights = Vec::new();
    let mut suggestions = Vec::new();
    let mut current = None;

    for line in answer.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(list) = list_header(line) {
            current = Some(list);
            continue;
        }
        match (current, bullet_text(line)) {
            (Some(List::Insights), Some(text)) => insights.push(text.to_string()),
            (Some(List::Suggestions), Some(text)) => suggestions.push(text.to_string()),
            _ => current = None,
        }
    }

    (insights, suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_both_lists() {
        let answer = "Enzyme activity peaks near 37C.\n\n\
                      Insights:\n- Activity doubles per 10C\n- Denaturation above 45C\n\n\
                      **Suggestions:**\n1. Run a finer gradient\n2. Add a replicate\n";
        let (insights, suggestions) = extract_insights(answer);
        assert_eq!(
            insights,
            vec!["Activity doubles per 10C", "Denaturation above 45C"]
        );
        assert_eq!(suggestions, vec!["Run a finer gradient", "Add a replicate"]);
    }

    #[test]
    fn test_missing_lists_are_empty() {
        let (insights, suggestions) = extract_insights("Just prose.\n- a stray bullet");
        assert!(insights.is_empty());
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_list_stops_at_prose() {
        let answer = "## Insights\n- first\nThat is all.\n- not part of it";
        let (insights, _) = extract_insights(answer);
        assert_eq!(insights, vec!["first"]);
    }

    #[test]
    fn test_prompt_carries_query() {
        let prompt = analysis_prompt("  Why do cells clump?  ");
        assert_eq!(prompt.user, "Why do cells clump?");
        assert!(prompt.system.contains("Insights:"));
    }
}
