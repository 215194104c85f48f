use serde::Serialize;

/// One proof obligation: a single `sorry` occurrence attributed to the nearest
/// preceding declaration (or to none).
///
/// `snippet` is always non-empty and always ends with the line containing the
/// marker; when no declaration header precedes the marker it degenerates to the
/// marker's line alone and `declaration_name` is empty.
#[derive(Debug, Clone, Serialize)]
pub struct Obligation {
    /// Path relative to the repository root, forward slashes.
    pub file_path: String,
    /// 1-based line of the marker.
    pub line_number: usize,
    pub declaration_name: String,
    /// Verbatim text from the start of the enclosing declaration through the
    /// marker line, inclusive.
    pub snippet: String,
    #[serde(skip)]
    pub full_file_text: String,
    /// Concatenated labeled content of the file's resolved imports. Filled by
    /// the tree walker once per file, not by the scanner.
    #[serde(skip)]
    pub imports_context: String,
}

/// An obligation plus its analysis text; `analysis` is empty when the analysis
/// call failed.
#[derive(Debug)]
pub struct EnrichedObligation {
    pub obligation: Obligation,
    pub analysis: String,
}

/// Outcome counts for the publish phase.
#[derive(Debug, Default)]
pub struct PublishStats {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}
