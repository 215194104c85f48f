use std::path::Path;
use std::process::Output;

use anyhow::{bail, Context, Result};
use tokio::process::Command;

/// Repository identity resolved once at startup.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    pub name_with_owner: String,
    pub default_branch: String,
}

/// Check that the GitHub CLI is installed and on the PATH.
pub async fn check_cli() -> Result<()> {
    match Command::new("gh").arg("--version").output().await {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => bail!("`gh --version` failed: {}", stderr_of(&output)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            bail!("the GitHub CLI (`gh`) is not installed or not in your PATH")
        }
        Err(err) => Err(err).context("failed to run `gh`"),
    }
}

/// Resolve the repository name and default branch via `gh repo view`.
pub async fn repo_info(repo_path: &Path) -> Result<RepoInfo> {
    let output = Command::new("gh")
        .args(["repo", "view", "--json", "nameWithOwner,defaultBranchRef"])
        .current_dir(repo_path)
        .output()
        .await
        .context("failed to run `gh repo view`")?;
    if !output.status.success() {
        bail!("`gh repo view` failed: {}", stderr_of(&output));
    }

    let data: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let name_with_owner = data
        .get("nameWithOwner")
        .and_then(|v| v.as_str())
        .context("`gh repo view` returned no nameWithOwner")?
        .to_string();
    let default_branch = data
        .get("defaultBranchRef")
        .and_then(|r| r.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or("master")
        .to_string();

    Ok(RepoInfo {
        name_with_owner,
        default_branch,
    })
}

/// Exact-title search among open issues. Any listed result counts as a hit.
pub async fn issue_exists(repo: &str, title: &str) -> Result<bool> {
    let query = format!("\"{title}\" in:title is:open");
    let output = Command::new("gh")
        .args(["issue", "list", "--repo", repo, "--search", &query])
        .output()
        .await
        .context("failed to run `gh issue list`")?;
    if !output.status.success() {
        bail!("`gh issue list` failed: {}", stderr_of(&output));
    }

    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

pub async fn create_issue(repo: &str, title: &str, body: &str, label: &str) -> Result<()> {
    let output = Command::new("gh")
        .args([
            "issue", "create", "--repo", repo, "--title", title, "--body", body, "--label", label,
        ])
        .output()
        .await
        .context("failed to run `gh issue create`")?;
    if !output.status.success() {
        bail!("`gh issue create` failed: {}", stderr_of(&output));
    }

    Ok(())
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}
