//! Free-text response segmentation
//!
//! Model output is split into sections by trying an ordered list of
//! [`HeadingMatcher`]s against every line. The first matcher that accepts a
//! line wins; no line is tested against a later matcher once an earlier one
//! has claimed it. Text is never dropped: if nothing looks like a heading the
//! whole response becomes a single "Protocol Content" section.

use super::prompt::HEADING_MARKER;
use super::{Section, SectionBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

/// Title of the section opened by content that precedes any heading
pub const LEADING_SECTION_TITLE: &str = "Introduction";

/// Title of the single section produced when no structure is found
pub const FALLBACK_SECTION_TITLE: &str = "Protocol Content";

static MARKDOWN_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s{0,3}#{1,6}\s+(.+?)(?:\s+#+)?\s*$").expect("Valid regex pattern"));

static NUMBERED_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,3})\.\s+(\S.*)$").expect("Valid regex pattern"));

static BOLD_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\*\*(.+?)\*\*|__(.+?)__)\s*:?\s*$").expect("Valid regex pattern")
});

/// Symbols accepted in front of a heading, besides [`HEADING_MARKER`]
const EXTRA_MARKERS: &[&str] = &[
    "🧪", "🧫", "🧬", "⚗", "📋", "📊", "📈", "📝", "⚠", "🛡", "✅", "▶", "►", "■", "◆", "§",
];

/// Longest line still considered a standalone caps/title heading
const MAX_STANDALONE_HEADING: usize = 60;

/// Longest numbered line still considered a heading
const MAX_NUMBERED_HEADING: usize = 80;

/// What the parser knows about the surroundings of a line
#[derive(Debug, Clone, Copy, Default)]
pub struct LineContext {
    /// Previous line was blank, or this is the first line
    pub after_blank: bool,
}

/// One heading convention
pub trait HeadingMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Heading title if `line` is a heading under this convention
    fn match_heading(&self, line: &str, context: &LineContext) -> Option<String>;
}

/// `## Materials`
pub struct MarkdownHeading;

impl HeadingMatcher for MarkdownHeading {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn match_heading(&self, line: &str, _context: &LineContext) -> Option<String> {
        MARKDOWN_HEADING
            .captures(line)
            .map(|caps| clean_title(&caps[1]))
    }
}

/// `1. Materials`, only after a blank line or at the start of input
pub struct NumberedHeading;

impl HeadingMatcher for NumberedHeading {
    fn name(&self) -> &'static str {
        "numbered"
    }

    fn match_heading(&self, line: &str, context: &LineContext) -> Option<String> {
        if !context.after_blank {
            return None;
        }
        let trimmed = line.trim();
        if trimmed.chars().count() > MAX_NUMBERED_HEADING {
            return None;
        }
        let caps = NUMBERED_HEADING.captures(trimmed)?;
        let text = caps[2].trim_end();
        if text.ends_with('.') || text.ends_with(';') {
            return None;
        }
        Some(clean_title(&format!("{}. {}", &caps[1], text)))
    }
}

/// `🔬 Materials`, the convention the prompt asks for
pub struct MarkerHeading {
    markers: Vec<&'static str>,
}

impl MarkerHeading {
    pub fn new() -> Self {
        let mut markers = vec![HEADING_MARKER];
        markers.extend_from_slice(EXTRA_MARKERS);
        Self { markers }
    }
}

impl Default for MarkerHeading {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadingMatcher for MarkerHeading {
    fn name(&self) -> &'static str {
        "marker"
    }

    fn match_heading(&self, line: &str, _context: &LineContext) -> Option<String> {
        let trimmed = line.trim_start();
        let rest = self
            .markers
            .iter()
            .find_map(|marker| trimmed.strip_prefix(marker))?;
        // emoji variation selector
        let rest = rest.trim_start_matches('\u{FE0F}').trim();
        if rest.is_empty() {
            return None;
        }
        Some(clean_title(rest))
    }
}

/// `SAFETY PRECAUTIONS` or `Materials and Equipment:` on a line of its own
pub struct StandaloneHeading;

impl StandaloneHeading {
    fn is_all_caps(text: &str) -> bool {
        let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
        letters.len() >= 4 && letters.iter().all(|c| c.is_uppercase())
    }

    fn is_title_like(text: &str) -> bool {
        let Some(body) = text.strip_suffix(':') else {
            return false;
        };
        let words: Vec<&str> = body.split_whitespace().collect();
        if words.is_empty() || words.len() > 6 {
            return false;
        }
        let starts_upper = |w: &str| w.chars().next().is_some_and(char::is_uppercase);
        starts_upper(words[0])
            && words
                .iter()
                .all(|&w| w.chars().count() <= 3 || starts_upper(w))
    }
}

impl HeadingMatcher for StandaloneHeading {
    fn name(&self) -> &'static str {
        "standalone"
    }

    fn match_heading(&self, line: &str, _context: &LineContext) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.chars().count() > MAX_STANDALONE_HEADING {
            return None;
        }
        if trimmed.starts_with(['-', '*', '•', '+', '>', '|'])
            || trimmed.starts_with(|c: char| c.is_ascii_digit())
        {
            return None;
        }
        if trimmed.ends_with(['.', '!', '?', ',', ';']) {
            return None;
        }
        if Self::is_all_caps(trimmed) || Self::is_title_like(trimmed) {
            Some(clean_title(trimmed))
        } else {
            None
        }
    }
}

/// `**Materials**` on a line of its own
pub struct BoldHeading;

impl HeadingMatcher for BoldHeading {
    fn name(&self) -> &'static str {
        "bold"
    }

    fn match_heading(&self, line: &str, _context: &LineContext) -> Option<String> {
        let caps = BOLD_HEADING.captures(line)?;
        let inner = caps.get(1).or_else(|| caps.get(2))?;
        Some(clean_title(inner.as_str()))
    }
}

/// Strip emphasis wrappers and a trailing colon from a captured title
fn clean_title(raw: &str) -> String {
    let mut title = raw.trim();
    loop {
        let stripped = title
            .strip_prefix("**")
            .and_then(|t| t.strip_suffix("**"))
            .or_else(|| title.strip_prefix("__").and_then(|t| t.strip_suffix("__")))
            .map(str::trim);
        match stripped {
            Some(inner) => title = inner,
            None => break,
        }
    }
    title.trim_end_matches(':').trim().to_string()
}

struct OpenSection {
    title: String,
    lines: Vec<String>,
}

impl OpenSection {
    fn new(title: String) -> Self {
        Self {
            title,
            lines: Vec::new(),
        }
    }
}

/// Splits model output into ordered sections
pub struct ResponseParser {
    matchers: Vec<Box<dyn HeadingMatcher>>,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser {
    /// Parser with the standard matchers in precedence order:
    /// markdown, numbered, marker, standalone caps/title, bold
    pub fn new() -> Self {
        Self::with_matchers(vec![
            Box::new(MarkdownHeading),
            Box::new(NumberedHeading),
            Box::new(MarkerHeading::new()),
            Box::new(StandaloneHeading),
            Box::new(BoldHeading),
        ])
    }

    pub fn with_matchers(matchers: Vec<Box<dyn HeadingMatcher>>) -> Self {
        Self { matchers }
    }

    /// Add a matcher with the lowest precedence
    pub fn add_matcher(&mut self, matcher: Box<dyn HeadingMatcher>) {
        self.matchers.push(matcher);
    }

    /// The first matcher accepting `line`, with the captured title
    pub fn detect_heading(
        &self,
        line: &str,
        context: &LineContext,
    ) -> Option<(&'static str, String)> {
        self.matchers.iter().find_map(|matcher| {
            matcher
                .match_heading(line, context)
                .map(|title| (matcher.name(), title))
        })
    }

    /// Segment `text` into sections; always returns at least one
    pub fn parse(&self, text: &str) -> Vec<Section> {
        let mut builder = SectionBuilder::new();
        let mut current: Option<OpenSection> = None;
        let mut after_blank = true;

        for line in text.lines() {
            if line.trim().is_empty() {
                after_blank = true;
                continue;
            }

            let context = LineContext { after_blank };
            after_blank = false;

            if let Some((matcher, title)) = self.detect_heading(line, &context) {
                trace!("Heading {:?} matched by {} matcher", title, matcher);
                if let Some(open) = current.take() {
                    builder.push(&open.title, &open.lines.join("\n"));
                }
                current = Some(OpenSection::new(title));
            } else {
                current
                    .get_or_insert_with(|| OpenSection::new(LEADING_SECTION_TITLE.to_string()))
                    .lines
                    .push(line.to_string());
            }
        }

        if let Some(open) = current.take() {
            builder.push(&open.title, &open.lines.join("\n"));
        }

        if builder.is_empty() {
            debug!("No section structure found, using single fallback section");
            builder.push(FALLBACK_SECTION_TITLE, text.trim());
        }

        builder.finish()
    }
}
