use anyhow::{anyhow, Result};
use reqwest::Client;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Call the Gemini API for a guidance comment on one proof obligation.
pub async fn generate_analysis(
    client: &Client,
    api_key: &str,
    model: &str,
    snippet: &str,
    full_file_text: &str,
    imports_context: &str,
    reference_context: &str,
) -> Result<String> {
    let prompt = build_prompt(snippet, full_file_text, imports_context, reference_context);
    generate(client, api_key, model, &prompt, false).await
}

/// Web-lookup fallback used by the import resolver for definitions that
/// cannot be found on disk: the same endpoint with the search tool enabled.
pub struct WebSearch {
    client: Client,
    api_key: String,
    model: String,
}

impl WebSearch {
    pub fn new(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    pub async fn lookup(&self, query: &str) -> Result<String> {
        let prompt = format!(
            "Search the web for `{query}` and summarize the relevant definition or theorem statement."
        );
        generate(&self.client, &self.api_key, &self.model, &prompt, true).await
    }
}

async fn generate(
    client: &Client,
    api_key: &str,
    model: &str,
    prompt: &str,
    web_search: bool,
) -> Result<String> {
    let mut body = serde_json::json!({
        "contents": [{ "parts": [{ "text": prompt }] }]
    });
    if web_search {
        body["tools"] = serde_json::json!([{ "google_search": {} }]);
    }

    let response = client
        .post(format!("{API_BASE}/{model}:generateContent"))
        .header("x-goog-api-key", api_key)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("Gemini API returned {}", status));
    }

    let data: serde_json::Value = response.json().await?;
    let text = data
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| anyhow!("Gemini response contained no text"))?;

    Ok(text.trim().to_string())
}

fn build_prompt(
    snippet: &str,
    full_file_text: &str,
    imports_context: &str,
    reference_context: &str,
) -> String {
    // The section is omitted entirely when no reference content was fetched.
    let reference_section = if reference_context.is_empty() {
        String::new()
    } else {
        format!("**External Reference Content:**\n```\n{reference_context}\n```\n\n")
    };

    format!(
        "You are an expert in Lean 4 and formal mathematics. Your task is to help a user by \
         providing a detailed comment for a proof obligation marked with `sorry`.\n\n\
         Your response must be a markdown-formatted comment with exactly three sections. \
         **Do not write the full proof.** Your goal is to guide the user.\n\n\
         1. `### Statement Explanation`: Explain what the theorem/definition states in clear, \
         simple terms. Describe the goal and the hypotheses.\n\
         2. `### Context`: Explain how this statement relates to other definitions or theorems \
         in the file, imported files, or any provided external references.\n\
         3. `### Proof Suggestion`: Provide a high-level, step-by-step suggestion for how to \
         approach the proof. Mention relevant tactics (like `simp`, `rw`, `cases`, `induction`) \
         and specific lemmas from the provided file content that might be useful. Do not write \
         the full proof code.\n\n\
         ---\n\n\
         **Full File Content:**\n```lean\n{full_file_text}\n```\n\n\
         **Imported Files Content:**\n```lean\n{imports_context}\n```\n\n\
         {reference_section}\
         **Declaration with `sorry`:**\n```lean\n{snippet}\n```"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_omits_empty_reference_section() {
        let prompt = build_prompt("sorry", "full", "imports", "");
        assert!(!prompt.contains("External Reference Content"));
    }

    #[test]
    fn test_prompt_includes_reference_section() {
        let prompt = build_prompt("sorry", "full", "imports", "paper text");
        assert!(prompt.contains("External Reference Content"));
        assert!(prompt.contains("paper text"));
    }

    #[test]
    fn test_prompt_embeds_all_contexts() {
        let prompt = build_prompt("the snippet", "the file", "the imports", "");
        assert!(prompt.contains("the snippet"));
        assert!(prompt.contains("the file"));
        assert!(prompt.contains("the imports"));
    }
}
