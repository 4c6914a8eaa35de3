//! `login` and `logout`.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};

use asvzwatch_core::auth::CredentialStore;

use crate::app::App;

/// Environment variable read before prompting for a password
const PASSWORD_ENV_VAR: &str = "ASVZWATCH_PASSWORD";

#[derive(Debug, Parser)]
pub struct LoginArgs {
    /// Account email (defaults to the last one used)
    pub email: Option<String>,

    /// Store the password in the OS keychain for next time
    #[arg(long)]
    pub remember: bool,
}

#[derive(Debug, Parser)]
pub struct LogoutArgs {
    /// Also delete the password stored in the OS keychain
    #[arg(long)]
    pub forget: bool,
}

fn resolve_password(email: &str) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV_VAR) {
        if !password.is_empty() {
            return Ok(password);
        }
    }

    match CredentialStore::get_password(email) {
        Ok(password) => {
            debug!(email = email, "Using password from keychain");
            return Ok(password);
        }
        Err(e) => debug!(email = email, error = %e, "No stored password"),
    }

    rpassword::prompt_password(format!("Password for {}: ", email))
        .context("Failed to read password")
}

pub async fn login(app: &mut App, args: LoginArgs) -> Result<()> {
    let email = args
        .email
        .or_else(|| app.config.last_email.clone())
        .ok_or_else(|| anyhow::anyhow!("No email given and no previous login to reuse"))?;

    let password = resolve_password(&email)?;

    let data = app
        .client
        .authenticate(&email, &password)
        .await
        .context("Login failed")?;

    app.client.set_token(data.token.clone());
    app.session.update(data);
    app.session.save().context("Failed to save session")?;

    app.config.last_email = Some(email.clone());
    if let Err(e) = app.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    if args.remember {
        CredentialStore::store(&email, &password)?;
    }

    println!("Logged in as {}", email);
    Ok(())
}

pub fn logout(app: &mut App, args: LogoutArgs) -> Result<()> {
    let email = app.session.email().map(str::to_string);
    app.session.clear()?;

    if args.forget {
        if let Some(ref email) = email.or_else(|| app.config.last_email.clone()) {
            if let Err(e) = CredentialStore::delete(email) {
                warn!(error = %e, "Failed to delete stored password");
            }
        }
    }

    println!("Logged out");
    Ok(())
}
