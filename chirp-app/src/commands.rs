use std::path::PathBuf;

use anyhow::{Context, Result};
use chirp_twitter::{Credential, Cursor, SearchQuery, TimelineQuery, TwitterApi};
use clap::Subcommand;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show a user's profile.
    User { screen_name: String },
    /// One page of the accounts a user follows.
    Friends {
        screen_name: String,
        #[arg(long, allow_hyphen_values = true)]
        cursor: Option<i64>,
    },
    /// One page of a user's followers.
    Followers {
        screen_name: String,
        #[arg(long, allow_hyphen_values = true)]
        cursor: Option<i64>,
    },
    /// A user's recent tweets.
    Tweets {
        screen_name: String,
        #[arg(long, default_value_t = 20)]
        count: i32,
        /// Only tweets older than this id.
        #[arg(long)]
        max_id: Option<u64>,
        /// Only tweets newer than this id.
        #[arg(long)]
        since_id: Option<u64>,
    },
    /// Search recent tweets.
    Search {
        query: String,
        #[arg(long, default_value_t = 20)]
        count: i32,
        #[arg(long)]
        since_id: Option<u64>,
    },
    /// Search accounts.
    Users {
        query: String,
        #[arg(long, default_value_t = 20)]
        per_page: i32,
    },
    /// Post a status as the configured account.
    Post { text: String },
    /// Download a profile image.
    Avatar { url: String, out: PathBuf },
    /// Exchange a username and password for an access token.
    Xauth { username: String, password: String },
    /// Print the URL a user visits to authorize this application.
    AuthorizeUrl { callback: String },
    /// Exchange an authorized request token and verifier for an access token.
    AccessToken { token: String, verifier: String },
}

pub async fn run(api: &TwitterApi, command: Command) -> Result<()> {
    match command {
        Command::User { screen_name } => print_json(&api.get_user(&screen_name).await?),
        Command::Friends {
            screen_name,
            cursor,
        } => print_json(&api.get_friends(&screen_name, cursor.map(Cursor)).await?),
        Command::Followers {
            screen_name,
            cursor,
        } => print_json(&api.get_followers(&screen_name, cursor.map(Cursor)).await?),
        Command::Tweets {
            screen_name,
            count,
            max_id,
            since_id,
        } => {
            let query = TimelineQuery {
                count,
                max_id,
                since_id,
            };
            print_json(&api.get_tweets_with(&screen_name, query).await?)
        }
        Command::Search {
            query,
            count,
            since_id,
        } => {
            let options = SearchQuery { count, since_id };
            print_json(&api.search_tweets_with(&query, options).await?)
        }
        Command::Users { query, per_page } => {
            print_json(&api.search_users_with(&query, per_page).await?)
        }
        Command::Post { text } => {
            if api.default_credential().is_none() {
                tracing::warn!("no access token configured; the post will be rejected");
            }
            print_json(&api.update_status(&text).await?)
        }
        Command::Avatar { url, out } => {
            let bytes = api.get_profile_image(&url).await?;
            tokio::fs::write(&out, &bytes)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), bytes = bytes.len(), "chirp.avatar.saved");
            Ok(())
        }
        Command::Xauth { username, password } => {
            print_credential(&api.xauth_access_token(&username, &password).await?)
        }
        Command::AuthorizeUrl { callback } => {
            println!("{}", api.authorize_url(&callback).await?);
            Ok(())
        }
        Command::AccessToken { token, verifier } => {
            print_credential(&api.access_token(&token, &verifier).await?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Printed in the shape of the `twitter` config section so it can be pasted back.
fn print_credential(credential: &Credential) -> Result<()> {
    print_json(&json!({
        "access_token": credential.token(),
        "access_token_secret": credential.expose_token_secret(),
        "screen_name": credential.username(),
    }))
}
