use anyhow::Result;
use regex::Regex;

use crate::models::Obligation;

/// The placeholder token marking an incomplete proof.
pub const MARKER: &str = "sorry";

const LINE_COMMENT: &str = "--";

/// Line-oriented scanner that attributes each `sorry` occurrence to the
/// nearest preceding declaration header.
///
/// Declarations do not nest in this model: every header line overwrites the
/// previous context. Markers inside multi-line strings or block comments are
/// not detected specially; only the same-line `--` exclusion applies.
pub struct Scanner {
    decl_re: Regex,
    name_re: Regex,
}

impl Scanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            decl_re: Regex::new(
                r"^(?:private|protected)?\s*(?:noncomputable)?\s*(?:theorem|lemma|def|instance|example|opaque|abbrev|inductive|structure)\s+",
            )?,
            name_re: Regex::new(
                r"^.*?(?:theorem|lemma|def|instance|example|opaque|abbrev|inductive|structure)\s+([^\s({:]+)",
            )?,
        })
    }

    /// Produce one record per qualifying marker line in `text`.
    ///
    /// The returned records carry everything except `imports_context`, which
    /// the tree walker fills in once per file.
    pub fn scan(&self, file_path: &str, text: &str) -> Vec<Obligation> {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();

        let mut header = String::new();
        let mut header_line = 0usize;
        let mut obligations = Vec::new();

        for (idx, raw) in lines.iter().enumerate() {
            let line_number = idx + 1;

            if self.decl_re.is_match(raw) {
                header = raw.trim().to_string();
                header_line = line_number;
            }

            let Some(marker_pos) = raw.find(MARKER) else {
                continue;
            };

            // A marker after a line-comment start is commentary, not an obligation.
            if let Some(comment_pos) = raw.find(LINE_COMMENT) {
                if marker_pos > comment_pos {
                    continue;
                }
            }

            let declaration_name = self
                .name_re
                .captures(&header)
                .map(|caps| caps[1].to_string())
                .unwrap_or_default();

            let start_line = if header_line > 0 { header_line } else { line_number };
            let snippet: String = lines[start_line - 1..line_number].concat();

            obligations.push(Obligation {
                file_path: file_path.to_string(),
                line_number,
                declaration_name,
                snippet,
                full_file_text: text.to_string(),
                imports_context: String::new(),
            });
        }

        obligations
    }
}
