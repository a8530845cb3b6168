use anyhow::{Context, Result, bail};
use colored::Colorize;
use finchat_application::ChatClient;

pub async fn status(client: &ChatClient) -> Result<()> {
    let session = client.session().state().await;
    let conversations = client.conversations().state().await;

    println!("{} {:?}", "Status:".bold(), session.status);
    if let Some(user) = &session.user {
        println!("{} {}", "Session:".bold(), user.session_id);
        println!("{} {}", "User type:".bold(), user.user_type);
    }
    if let Some(info) = &session.session {
        if let Some(email) = &info.email {
            println!("{} {}", "Email:".bold(), email);
        }
        if !info.session_duration.is_empty() {
            println!("{} {}", "Duration:".bold(), info.session_duration);
        }
    }
    println!(
        "{} {}",
        "Conversations:".bold(),
        conversations.conversations.len()
    );
    if let Some(error) = conversations.error.or(session.error) {
        println!("{}", error.red());
    }

    match client.gateway().health_check().await {
        Ok(health) => println!("{} {}", "Backend:".bold(), health.to_string().green()),
        Err(err) => println!("{} {}", "Backend:".bold(), err.to_string().red()),
    }
    Ok(())
}

pub async fn login(
    client: &ChatClient,
    email: Option<String>,
    password: Option<String>,
    demo: bool,
) -> Result<()> {
    let (email, password) = if demo {
        let demo = client
            .gateway()
            .get_demo_credentials()
            .await
            .context("Failed to fetch demo credentials")?
            .context("Backend offers no demo account")?;
        (demo.email, demo.password)
    } else {
        match (email, password) {
            (Some(email), Some(password)) => (email, password),
            _ => bail!("Provide EMAIL and PASSWORD, or use --demo"),
        }
    };

    if client.session().login(&email, &password).await {
        println!("{}", format!("Logged in as {}", email).green());
        Ok(())
    } else {
        let error = client.session().state().await.error.unwrap_or_default();
        bail!("{}", error)
    }
}

pub async fn logout(client: &ChatClient) -> Result<()> {
    client.session().logout().await;
    let state = client.session().state().await;
    match state.session_id() {
        Some(session_id) => println!(
            "{}",
            format!("Logged out. Continuing anonymously ({})", session_id).green()
        ),
        None => println!("{}", "Logged out, but no anonymous session is available".yellow()),
    }
    Ok(())
}

pub async fn demo_credentials(client: &ChatClient) -> Result<()> {
    let Some(demo) = client.gateway().get_demo_credentials().await? else {
        println!("{}", "The backend advertises no demo account".yellow());
        return Ok(());
    };

    println!("{} {}", "Email:".bold(), demo.email);
    println!("{} {}", "Password:".bold(), demo.password);
    if !demo.note.is_empty() {
        println!("{}", demo.note.dimmed());
    }
    for account in demo.accounts.iter().skip(1) {
        println!("  {} {} / {}", account.role.cyan(), account.email, account.password);
    }
    Ok(())
}
