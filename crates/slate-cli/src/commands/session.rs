use std::path::PathBuf;

use slate_core::models::User;
use slate_core::sync::HttpSyncClient;
use slate_core::util::now_ms;

use crate::commands::common::open_store;
use crate::error::CliError;
use crate::profile::{default_profile_path, Profile};

pub fn run_login(
    api_url: &str,
    token: &str,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<(), CliError> {
    // Validates the URL shape and token the same way the sync transport will.
    HttpSyncClient::new(api_url, Some(token.to_string())).map_err(slate_core::Error::Sync)?;

    let user = username.map(|name| User {
        id: name.to_string(),
        username: name.to_string(),
        email: email.unwrap_or_default().to_string(),
        created_at: now_ms(),
    });
    let profile = Profile {
        api_base_url: Some(api_url.trim_end_matches('/').to_string()),
        token: Some(token.to_string()),
        user,
    };
    let path = profile.save()?;
    println!("Logged in; profile saved to {}", path.display());
    Ok(())
}

pub async fn run_logout(db_path: Option<PathBuf>) -> Result<(), CliError> {
    Profile::delete_at_path(&default_profile_path())?;
    // The next login may be a different account; its first sync must pull
    // everything rather than resume from this account's cursor.
    open_store(db_path)?.clear_last_sync().await?;
    println!("Logged out");
    Ok(())
}

pub fn run_whoami() -> Result<(), CliError> {
    let profile = Profile::load()?;
    if !profile.is_authenticated() {
        return Err(CliError::NotLoggedIn);
    }
    if let Some(user) = &profile.user {
        if user.email.is_empty() {
            println!("{}", user.username);
        } else {
            println!("{} <{}>", user.username, user.email);
        }
    } else {
        println!("(anonymous token)");
    }
    if let Some(url) = &profile.api_base_url {
        println!("Server: {url}");
    }
    Ok(())
}
