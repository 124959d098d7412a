//! Instruction prompts sent alongside each page image.
//!
//! Each [`ProcessingMode`] has one complete template. They are not layered
//! or composed: the three differ in task description and output format, and
//! share only the `{languages}` placeholder, which [`build_prompt`] fills in.
//!
//! Keeping the templates here as constants lets unit tests inspect them
//! without a network round-trip.

use crate::config::{LanguageHint, ProcessingMode};

/// Placeholder substituted with the language list.
const LANGUAGES_PLACEHOLDER: &str = "{languages}";

/// Substituted when no language is hinted.
pub const AUTO_DETECT: &str = "Auto Detect";

/// Template for [`ProcessingMode::StructureAnalysis`].
pub const STRUCTURE_ANALYSIS_PROMPT: &str = r#"System: You are a precise document layout analysis engine. Your goal is to determine the grid structure of the document.
Task: Analyze the image and count the exact number of rows and columns in the main data table/grid.
Languages detected: {languages}.

Constraints:
- Do not count header rows separately from data rows; count total rows.
- If there are nested tables, count the outer grid structure.
- Output MUST be valid JSON.

Output Format:
{ "rows": integer, "cols": integer }"#;

/// Template for [`ProcessingMode::TableExtraction`].
pub const TABLE_EXTRACTION_PROMPT: &str = r#"System: You are a highly accurate OCR table extraction engine.
Task: Extract the table content from the image into a Markdown table.
Languages detected: {languages}.

Rules:
1. Do not add any introductory text.
2. Extract all rows and columns exactly as seen.
3. Use Markdown table format (| Col1 | Col2 |).
4. If a cell is empty, leave it blank but keep the column separator."#;

/// Template for [`ProcessingMode::FullPageReconstruction`].
pub const FULL_PAGE_RECONSTRUCTION_PROMPT: &str = r#"System: You are an intelligent document reconstruction engine.
Task: Reconstruct the document content EXACTLY as it appears visually, preserving layout.
Languages detected: {languages}.

Instructions:
1. If the content is a table or grid, output it as HTML <table>.
2. If it is text, preserve headers and paragraphs.
3. For tables: Wrap the HTML in a code block: ```html ... ```
4. Ensure all data is captured accurately."#;

/// Build the instruction text for one run.
///
/// Pure: the same mode and hints always give the same prompt.
pub fn build_prompt(mode: ProcessingMode, languages: &LanguageHint) -> String {
    let langs = if languages.is_empty() {
        AUTO_DETECT.to_string()
    } else {
        languages.as_slice().join(", ")
    };

    let template = match mode {
        ProcessingMode::StructureAnalysis => STRUCTURE_ANALYSIS_PROMPT,
        ProcessingMode::TableExtraction => TABLE_EXTRACTION_PROMPT,
        ProcessingMode::FullPageReconstruction => FULL_PAGE_RECONSTRUCTION_PROMPT,
    };

    template.replace(LANGUAGES_PLACEHOLDER, &langs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages_substituted_verbatim() {
        let prompt = build_prompt(
            ProcessingMode::TableExtraction,
            &LanguageHint::parse("English, Hindi"),
        );
        assert!(prompt.contains("Languages detected: English, Hindi."));
        assert!(!prompt.contains("{languages}"));
    }

    #[test]
    fn empty_hint_is_auto_detect() {
        let prompt = build_prompt(ProcessingMode::StructureAnalysis, &LanguageHint::auto());
        assert!(prompt.contains("Languages detected: Auto Detect."));
    }

    #[test]
    fn each_mode_has_its_own_template() {
        let langs = LanguageHint::auto();
        let structure = build_prompt(ProcessingMode::StructureAnalysis, &langs);
        let table = build_prompt(ProcessingMode::TableExtraction, &langs);
        let full = build_prompt(ProcessingMode::FullPageReconstruction, &langs);

        assert!(structure.contains(r#"{ "rows": integer, "cols": integer }"#));
        assert!(table.contains("Markdown table"));
        assert!(full.contains("```html ... ```"));
        assert_ne!(structure, table);
        assert_ne!(table, full);
    }

    #[test]
    fn deterministic() {
        let langs = LanguageHint::parse("German");
        assert_eq!(
            build_prompt(ProcessingMode::FullPageReconstruction, &langs),
            build_prompt(ProcessingMode::FullPageReconstruction, &langs)
        );
    }
}
