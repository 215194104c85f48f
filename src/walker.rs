use std::path::Path;

use colored::Colorize;
use walkdir::{DirEntry, WalkDir};

use crate::models::Obligation;
use crate::resolver::ImportResolver;
use crate::scanner::Scanner;
use crate::services::gemini::WebSearch;

const SOURCE_EXTENSION: &str = "lean";

fn is_excluded(entry: &DirEntry, exclude_dirs: &[String]) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclude_dirs.iter().any(|dir| dir == name))
}

/// Walk `search_path` and return every obligation found, in deterministic
/// order (entries sorted by file name, directories descended in place).
///
/// Build and dependency-cache directories are pruned before descent. A file
/// that cannot be read aborts only that file's processing. The resolver runs
/// once per file with records; its output is attached to every record from
/// that file.
pub async fn collect_obligations(
    search_path: &Path,
    repo_root: &Path,
    scanner: &Scanner,
    resolver: &ImportResolver,
    web: Option<&WebSearch>,
    exclude_dirs: &[String],
) -> Vec<Obligation> {
    let mut obligations = Vec::new();

    let walk = WalkDir::new(search_path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry, exclude_dirs));

    for entry in walk {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                eprintln!(" {} unreadable directory entry: {}", "⚠".yellow(), err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXTENSION) {
            continue;
        }

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!(" {} could not read {}: {}", "⚠".yellow(), path.display(), err);
                continue;
            }
        };

        let mut records = scanner.scan(&display_path(path, repo_root), &text);
        if records.is_empty() {
            continue;
        }

        let imports_context = resolver.resolve(&text, web).await;
        for record in &mut records {
            record.imports_context = imports_context.clone();
        }
        obligations.extend(records);
    }

    obligations
}

/// Path as shown in issue titles and GitHub links: relative to the repository
/// root, forward slashes.
fn display_path(path: &Path, repo_root: &Path) -> String {
    let relative = path.strip_prefix(repo_root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
