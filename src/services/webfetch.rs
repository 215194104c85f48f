use anyhow::Result;
use colored::Colorize;
use futures::future::join_all;
use reqwest::Client;

/// Fetch every reference URL and concatenate the responses with per-URL
/// labels. An empty URL list returns an empty string without any network call.
/// Per-URL failures are logged and that URL's section omitted.
pub async fn fetch_reference_urls(client: &Client, urls: &[String]) -> String {
    if urls.is_empty() {
        return String::new();
    }

    eprintln!(" {} fetching {} reference URL(s)...", "→".cyan(), urls.len());

    let futures: Vec<_> = urls.iter().map(|url| fetch_one(client, url)).collect();
    let results = join_all(futures).await;

    let mut sections = Vec::new();
    for (url, result) in urls.iter().zip(results) {
        match result {
            Ok(text) => sections.push(format!("--- Content from {url} ---\n{text}")),
            Err(err) => eprintln!(" {} failed to fetch {}: {}", "✗".red(), url, err),
        }
    }

    sections.join("\n\n")
}

async fn fetch_one(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("status {status}");
    }
    Ok(response.text().await?)
}
