use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use regex::Regex;

use crate::services::gemini::WebSearch;

/// Map from a capitalized top-level import segment to the directory of the
/// dependency package providing it, built by listing `.lake/packages`.
///
/// Built once per repository root and passed into the resolver explicitly.
pub struct PackageMap {
    packages: HashMap<String, PathBuf>,
}

impl PackageMap {
    /// List `<repo_root>/.lake/packages`; a missing directory yields an empty map.
    pub fn build(repo_root: &Path) -> Self {
        let mut packages = HashMap::new();
        let cache = repo_root.join(".lake").join("packages");

        if let Ok(entries) = std::fs::read_dir(&cache) {
            for entry in entries.flatten() {
                if !entry.path().is_dir() {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    packages.insert(capitalize(name), entry.path());
                }
            }
        }

        Self { packages }
    }

    pub fn get(&self, segment: &str) -> Option<&Path> {
        self.packages.get(segment).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// First character uppercased, the rest lowercased — package directories are
/// lowercase on disk ("mathlib") but imported capitalized ("Mathlib").
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Resolves the import statements of one file to concrete `.lean` files and
/// concatenates their content, each section labeled with its import path.
///
/// Search order is fixed: dependency packages are authoritative for a known
/// first segment, then the project root, then `src/`. Resolution failures are
/// never fatal.
pub struct ImportResolver {
    import_re: Regex,
    repo_root: PathBuf,
    packages: PackageMap,
    max_import_bytes: usize,
}

impl ImportResolver {
    pub fn new(repo_root: &Path, packages: PackageMap, max_import_bytes: usize) -> Result<Self> {
        Ok(Self {
            import_re: Regex::new(r"^import\s+(\S+)")?,
            repo_root: repo_root.to_path_buf(),
            packages,
            max_import_bytes,
        })
    }

    /// Resolve every import in `file_text` and return the concatenated labeled
    /// content. Repeated import paths are resolved per occurrence.
    pub async fn resolve(&self, file_text: &str, web: Option<&WebSearch>) -> String {
        let mut out = String::new();

        for line in file_text.lines() {
            let Some(caps) = self.import_re.captures(line) else {
                continue;
            };
            let import_path = &caps[1];

            match self.locate(import_path) {
                Some(path) => match std::fs::read_to_string(&path) {
                    Ok(content) if content.len() < self.max_import_bytes => {
                        out.push_str(&format!(
                            "\n---\n-- Content from: {import_path}\n---\n{content}"
                        ));
                    }
                    Ok(_) => {
                        // Oversized imports are excluded to bound context size.
                        eprintln!(" {} skipping large import: {}", "⚠".yellow(), import_path);
                    }
                    Err(err) => {
                        eprintln!(
                            " {} could not read import file {}: {}",
                            "⚠".yellow(),
                            path.display(),
                            err
                        );
                    }
                },
                None => {
                    if let Some(web) = web {
                        eprintln!(" {} searching the web for '{}'...", "→".cyan(), import_path);
                        match web.lookup(&format!("lean 4 {import_path}")).await {
                            Ok(result) => out.push_str(&format!(
                                "\n---\n-- Web search result for: {import_path}\n---\n{result}"
                            )),
                            Err(err) => eprintln!(
                                " {} web search failed for '{}': {}",
                                "✗".red(),
                                import_path,
                                err
                            ),
                        }
                    } else {
                        eprintln!(
                            " {} could not find imported file for: {}",
                            "⚠".yellow(),
                            import_path
                        );
                    }
                }
            }
        }

        out
    }

    /// Map a dotted import path to the first existing file in search order.
    fn locate(&self, import_path: &str) -> Option<PathBuf> {
        let segments: Vec<&str> = import_path.split('.').collect();
        let mut relative: PathBuf = segments.iter().copied().collect();
        relative.set_extension("lean");

        if let Some(first) = segments.first() {
            if let Some(package_root) = self.packages.get(first) {
                let candidate = package_root.join(&relative);
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }

        let candidate = self.repo_root.join(&relative);
        if candidate.exists() {
            return Some(candidate);
        }

        let candidate = self.repo_root.join("src").join(&relative);
        if candidate.exists() {
            return Some(candidate);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn resolver(root: &Path, max_bytes: usize) -> ImportResolver {
        ImportResolver::new(root, PackageMap::build(root), max_bytes).unwrap()
    }

    #[test]
    fn test_package_map_capitalizes_directory_names() {
        let temp = TempDir::new().unwrap();
        create(temp.path(), ".lake/packages/mathlib/lakefile.lean", "");
        create(temp.path(), ".lake/packages/proofWidgets/lakefile.lean", "");

        let map = PackageMap::build(temp.path());
        assert_eq!(map.len(), 2);
        assert!(map.get("Mathlib").is_some());
        assert!(map.get("mathlib").is_none());
        // Python-style capitalization: rest of the name is lowercased.
        assert!(map.get("Proofwidgets").is_some());
    }

    #[test]
    fn test_package_map_missing_cache_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(PackageMap::build(temp.path()).is_empty());
    }

    #[tokio::test]
    async fn test_dependency_root_shadows_project_root() {
        let temp = TempDir::new().unwrap();
        create(
            temp.path(),
            ".lake/packages/mathlib/Mathlib/Data.lean",
            "dependency copy",
        );
        create(temp.path(), "Mathlib/Data.lean", "project copy");

        let out = resolver(temp.path(), 25_000)
            .resolve("import Mathlib.Data\n", None)
            .await;
        assert!(out.contains("dependency copy"));
        assert!(!out.contains("project copy"));
        assert!(out.contains("-- Content from: Mathlib.Data"));
    }

    #[tokio::test]
    async fn test_project_root_then_src_fallback() {
        let temp = TempDir::new().unwrap();
        create(temp.path(), "Foo/Bar.lean", "at project root");
        create(temp.path(), "src/Baz/Qux.lean", "under src");

        let r = resolver(temp.path(), 25_000);
        let out = r.resolve("import Foo.Bar\nimport Baz.Qux\n", None).await;
        assert!(out.contains("at project root"));
        assert!(out.contains("under src"));
    }

    #[tokio::test]
    async fn test_oversized_import_is_excluded() {
        let temp = TempDir::new().unwrap();
        create(temp.path(), "Big.lean", &"x".repeat(30_000));
        create(temp.path(), "Small.lean", "small enough");

        let out = resolver(temp.path(), 25_000)
            .resolve("import Big\nimport Small\n", None)
            .await;
        assert!(!out.contains("xxx"));
        assert!(!out.contains("-- Content from: Big"));
        assert!(out.contains("small enough"));
    }

    #[tokio::test]
    async fn test_size_threshold_is_exclusive() {
        let temp = TempDir::new().unwrap();
        create(temp.path(), "Edge.lean", &"y".repeat(100));

        let out = resolver(temp.path(), 100).resolve("import Edge\n", None).await;
        assert!(out.is_empty());

        let out = resolver(temp.path(), 101).resolve("import Edge\n", None).await;
        assert!(out.contains("yyy"));
    }

    #[tokio::test]
    async fn test_unresolved_import_is_omitted() {
        let temp = TempDir::new().unwrap();
        let out = resolver(temp.path(), 25_000)
            .resolve("import Does.Not.Exist\n", None)
            .await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_import_appended_per_occurrence() {
        let temp = TempDir::new().unwrap();
        create(temp.path(), "Dup.lean", "dup body");

        let out = resolver(temp.path(), 25_000)
            .resolve("import Dup\nimport Dup\n", None)
            .await;
        assert_eq!(out.matches("-- Content from: Dup").count(), 2);
    }

    #[tokio::test]
    async fn test_non_import_lines_are_ignored() {
        let temp = TempDir::new().unwrap();
        create(temp.path(), "Real.lean", "real import");

        let text = "-- import Fake\nimport Real\ntheorem t : True := trivial\n";
        let out = resolver(temp.path(), 25_000).resolve(text, None).await;
        assert!(out.contains("real import"));
        assert!(!out.contains("Fake"));
    }
}
