use std::sync::Arc;

use clap::{Parser, Subcommand};

use slate_server::auth::issue_token;
use slate_server::config::AppConfig;
use slate_server::reconciler::Reconciler;
use slate_server::routes::{app_router, AppState};
use slate_server::store::ServerDb;

#[derive(Debug, Parser)]
#[command(name = "slate-server", version, about = "Authoritative sync server for Slate")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Mint a bearer token for a provisioned user id and print it.
    ///
    /// Uses `SLATE_JWT_SECRET` and `SLATE_TOKEN_TTL_SECS` from the
    /// environment, the same way the serving path validates tokens.
    IssueToken { user_id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Only load .env in development; production uses platform-native env injection.
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Arc::new(AppConfig::from_env()?);

    if let Some(Command::IssueToken { user_id }) = args.command {
        let token = issue_token(&config.jwt_secret, &user_id, config.token_ttl)?;
        println!("{token}");
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slate_server=info".parse().expect("valid directive")),
        )
        .init();
    tracing::info!("Starting slate-server with config: {:?}", config);

    let db = ServerDb::open(&config.db_path)?;
    let state = AppState::new(config.clone(), Reconciler::new(db));
    let router = app_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("slate-server listening on {}", config.bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use serde::Deserialize;
    use slate_server::auth::verify_token;

    use super::*;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn issue_token_subcommand_parses() {
        let args = Args::try_parse_from(["slate-server", "issue-token", "user-7"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::IssueToken { ref user_id }) if user_id == "user-7"
        ));
    }

    #[test]
    fn minted_token_honors_configured_ttl() {
        #[derive(Deserialize)]
        struct RawClaims {
            sub: String,
            iat: i64,
            exp: i64,
        }

        let config = AppConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            db_path: ":memory:".to_string(),
            jwt_secret: "operator-signing-secret".to_string(),
            token_ttl: std::time::Duration::from_secs(600),
        };
        let token = issue_token(&config.jwt_secret, "user-7", config.token_ttl).unwrap();
        assert_eq!(
            verify_token(&config.jwt_secret, &token).unwrap().user_id,
            "user-7"
        );

        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = false;
        let claims = jsonwebtoken::decode::<RawClaims>(
            &token,
            &jsonwebtoken::DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims;
        assert_eq!(claims.sub, "user-7");
        assert_eq!(claims.exp - claims.iat, 600);
    }
}
