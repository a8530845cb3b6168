use anyhow::{Result, bail};
use colored::Colorize;
use finchat_application::{ChatClient, SendOutcome};
use finchat_core::conversation::{Message, MessageRole};

pub async fn ask(client: &ChatClient, message: &str, category: Option<&str>) -> Result<()> {
    let chat = client.chat();
    if let Some(category) = category {
        chat.select_category(category).await;
    }

    // Continue the session's conversation if it already exists.
    let session = client.session().state().await;
    if let Some(session_id) = session.session_id() {
        let exists = client
            .conversations()
            .conversations()
            .await
            .iter()
            .any(|c| c.id == session_id);
        if exists {
            client.conversations().load_conversation(session_id).await;
        }
    }

    match chat.send_message(message).await {
        Ok(SendOutcome::Answered(answer)) => {
            print_message(&answer);
            Ok(())
        }
        Ok(SendOutcome::Discarded) => bail!("The session changed before the answer arrived"),
        Err(err) => {
            tracing::debug!("send failed: {}", err);
            let error = client.conversations().state().await.error.unwrap_or_default();
            bail!("{}", error)
        }
    }
}

pub async fn history(client: &ChatClient) -> Result<()> {
    let conversations = client.conversations().conversations().await;
    if conversations.is_empty() {
        println!("{}", "No conversations yet".dimmed());
        return Ok(());
    }

    for conversation in conversations {
        println!(
            "{} {} {}",
            conversation.title.bold(),
            conversation.id.dimmed(),
            conversation.updated_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
        for message in &conversation.messages {
            print_message(message);
        }
        println!();
    }
    Ok(())
}

pub async fn categories(client: &ChatClient) -> Result<()> {
    let categories = client.chat().load_categories().await?;
    for category in categories {
        println!("{} {}", category.name.cyan(), category.description);
    }
    Ok(())
}

pub async fn delete(client: &ChatClient, id: &str) -> Result<()> {
    let known = client
        .conversations()
        .conversations()
        .await
        .iter()
        .any(|c| c.id == id);
    if !known {
        bail!("No conversation with id {}", id);
    }

    client.chat().delete_conversation(id).await;
    println!("{}", format!("Deleted conversation {}", id).green());
    Ok(())
}

fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => println!("{} {}", "you>".green().bold(), message.content),
        MessageRole::Assistant => {
            println!("{} {}", "finchat>".blue().bold(), message.content);
            if let Some(sources) = &message.sources {
                for source in sources {
                    println!("  {} {}", "source:".dimmed(), source.dimmed());
                }
            }
        }
    }
}
