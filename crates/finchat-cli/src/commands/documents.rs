use anyhow::{Context, Result};
use colored::Colorize;
use finchat_application::ChatClient;
use std::path::Path;

pub async fn upload(client: &ChatClient, path: &Path, title: Option<String>) -> Result<()> {
    let document = client
        .chat()
        .upload_document(path, title)
        .await
        .with_context(|| format!("Failed to upload {}", path.display()))?;

    println!(
        "{}",
        document
            .message
            .as_deref()
            .unwrap_or("Document uploaded")
            .green()
    );
    if let Some(id) = &document.document_id {
        println!("{} {}", "Document:".bold(), id);
    }
    if let Some(title) = &document.title {
        println!("{} {}", "Title:".bold(), title);
    }
    Ok(())
}

pub async fn search(client: &ChatClient, query: &str, top_k: usize) -> Result<()> {
    let found = client.gateway().search_documents(query, top_k).await?;
    if found.results.is_empty() {
        println!("{}", format!("No documents match '{}'", query).dimmed());
        return Ok(());
    }

    for result in found.results {
        let title = if result.title.is_empty() {
            result.id.as_str()
        } else {
            result.title.as_str()
        };
        println!("{} {}", format!("[{:.2}]", result.score).cyan(), title.bold());
        if !result.content.is_empty() {
            println!("  {}", result.content);
        }
    }
    Ok(())
}
