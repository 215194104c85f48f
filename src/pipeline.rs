use std::collections::HashSet;

use anyhow::Result;
use colored::Colorize;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;

use crate::models::{EnrichedObligation, Obligation, PublishStats};
use crate::services::{gemini, github};

/// Analysis calls kept in flight at once.
fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Run the analysis service over every obligation, bounded batches at a time.
///
/// A failed call yields an empty analysis for that record and never aborts or
/// blocks the others. Results are re-attached to their record by position
/// within the batch, so attribution holds regardless of completion order.
pub async fn enrich_all(
    client: &Client,
    api_key: &str,
    model: &str,
    reference_context: &str,
    obligations: Vec<Obligation>,
    quiet: bool,
) -> Result<Vec<EnrichedObligation>> {
    let pb = if !quiet {
        let pb = ProgressBar::new(obligations.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut enriched: Vec<EnrichedObligation> = obligations
        .into_iter()
        .map(|obligation| EnrichedObligation {
            obligation,
            analysis: String::new(),
        })
        .collect();

    for batch in enriched.chunks_mut(worker_count()) {
        let futures: Vec<_> = batch
            .iter()
            .map(|item| {
                let client = client.clone();
                async move {
                    let record = &item.obligation;
                    match gemini::generate_analysis(
                        &client,
                        api_key,
                        model,
                        &record.snippet,
                        &record.full_file_text,
                        &record.imports_context,
                        reference_context,
                    )
                    .await
                    {
                        Ok(text) => text,
                        Err(err) => {
                            eprintln!(
                                " {} analysis failed for {}:{}: {}",
                                "⚠".yellow(),
                                record.file_path,
                                record.line_number,
                                err
                            );
                            String::new()
                        }
                    }
                }
            })
            .collect();

        let results = join_all(futures).await;

        for (item, analysis) in batch.iter_mut().zip(results) {
            item.analysis = analysis;
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    Ok(enriched)
}

/// Single-threaded commit phase: dedupe titles within the batch, then
/// check-then-create serially per record.
///
/// A failed existence check is treated as "no duplicate found" and creation
/// proceeds; a failed creation is reported for that record only.
pub async fn publish_all(
    enriched: &[EnrichedObligation],
    repo: &github::RepoInfo,
    label: &str,
) -> PublishStats {
    let mut stats = PublishStats::default();

    let (unique, duplicates) = dedupe_batch(enriched);
    stats.skipped += duplicates;

    for item in unique {
        let title = issue_title(&item.obligation);

        match github::issue_exists(&repo.name_with_owner, &title).await {
            Ok(true) => {
                eprintln!(" {} issue already exists for '{}', skipping", "⚠".yellow(), title);
                stats.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(err) => {
                eprintln!(" {} could not check for existing issues: {}", "✗".red(), err);
            }
        }

        let body = issue_body(&item.obligation, &item.analysis, repo);
        match github::create_issue(&repo.name_with_owner, &title, &body, label).await {
            Ok(()) => {
                eprintln!(" {} created issue: '{}'", "✓".green(), title);
                stats.created += 1;
            }
            Err(err) => {
                eprintln!(" {} failed to create issue '{}': {}", "✗".red(), title, err);
                stats.failed += 1;
            }
        }
    }

    stats
}

/// Drop records whose title duplicates an earlier record in the same run,
/// keeping the first occurrence. Returns the survivors and the drop count.
fn dedupe_batch(enriched: &[EnrichedObligation]) -> (Vec<&EnrichedObligation>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();
    let mut dropped = 0;

    for item in enriched {
        let title = issue_title(&item.obligation);
        if seen.insert(title.clone()) {
            unique.push(item);
        } else {
            eprintln!(" {} duplicate title within this run, skipping: '{}'", "⚠".yellow(), title);
            dropped += 1;
        }
    }

    (unique, dropped)
}

pub fn issue_title(obligation: &Obligation) -> String {
    if obligation.declaration_name.is_empty() {
        format!(
            "Proof obligation in `{}` near line {}",
            obligation.file_path, obligation.line_number
        )
    } else {
        format!(
            "Proof obligation for `{}` in `{}`",
            obligation.declaration_name, obligation.file_path
        )
    }
}

pub fn issue_body(obligation: &Obligation, analysis: &str, repo: &github::RepoInfo) -> String {
    // Never emit the analysis header with nothing under it.
    let analysis_section = if analysis.is_empty() {
        String::new()
    } else {
        format!("\n\n**AI Analysis:**\n{analysis}")
    };

    format!(
        "A proof in `{file}` contains a `sorry`.{analysis_section}\n\n\
         **Goal:** Replace the `sorry` with a complete proof.\n\n\
         [Link to the sorry on GitHub](https://github.com/{repo}/blob/{branch}/{file}#L{line})\n\n\
         **Code Snippet:**\n```lean\n{snippet}\n```",
        file = obligation.file_path,
        repo = repo.name_with_owner,
        branch = repo.default_branch,
        line = obligation.line_number,
        snippet = obligation.snippet,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obligation(name: &str, file: &str, line: usize) -> Obligation {
        Obligation {
            file_path: file.to_string(),
            line_number: line,
            declaration_name: name.to_string(),
            snippet: "theorem x : True := by\n  sorry\n".to_string(),
            full_file_text: String::new(),
            imports_context: String::new(),
        }
    }

    fn repo() -> github::RepoInfo {
        github::RepoInfo {
            name_with_owner: "acme/lean-proofs".to_string(),
            default_branch: "main".to_string(),
        }
    }

    #[test]
    fn test_title_uses_declaration_name() {
        let title = issue_title(&obligation("foo", "A.lean", 2));
        assert_eq!(title, "Proof obligation for `foo` in `A.lean`");
    }

    #[test]
    fn test_title_falls_back_to_file_and_line() {
        let title = issue_title(&obligation("", "A.lean", 7));
        assert_eq!(title, "Proof obligation in `A.lean` near line 7");
    }

    #[test]
    fn test_body_omits_empty_analysis_section() {
        let body = issue_body(&obligation("foo", "A.lean", 2), "", &repo());
        assert!(!body.contains("AI Analysis"));
        assert!(body.contains("**Goal:** Replace the `sorry` with a complete proof."));
    }

    #[test]
    fn test_body_includes_analysis_when_present() {
        let body = issue_body(&obligation("foo", "A.lean", 2), "use induction", &repo());
        assert!(body.contains("**AI Analysis:**\nuse induction"));
    }

    #[test]
    fn test_body_deep_link_targets_default_branch_and_line() {
        let body = issue_body(&obligation("foo", "Sub/A.lean", 42), "", &repo());
        assert!(body.contains("https://github.com/acme/lean-proofs/blob/main/Sub/A.lean#L42"));
    }

    #[test]
    fn test_body_embeds_snippet_verbatim() {
        let body = issue_body(&obligation("foo", "A.lean", 2), "", &repo());
        assert!(body.contains("```lean\ntheorem x : True := by\n  sorry\n"));
    }

    #[test]
    fn test_dedupe_batch_keeps_first_occurrence() {
        let enriched = vec![
            EnrichedObligation {
                obligation: obligation("foo", "A.lean", 2),
                analysis: "first".to_string(),
            },
            EnrichedObligation {
                obligation: obligation("foo", "A.lean", 9),
                analysis: "second".to_string(),
            },
            EnrichedObligation {
                obligation: obligation("bar", "A.lean", 12),
                analysis: String::new(),
            },
        ];

        let (unique, dropped) = dedupe_batch(&enriched);
        assert_eq!(dropped, 1);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].analysis, "first");
        assert_eq!(issue_title(&unique[1].obligation), "Proof obligation for `bar` in `A.lean`");
    }

    #[test]
    fn test_worker_count_is_positive() {
        assert!(worker_count() >= 1);
    }
}
