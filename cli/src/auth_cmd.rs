//! `login`, `logout`, `signup` and `whoami`.

use std::io::{BufRead, Write};

use taskpad_core::{GateDecision, Route};

use crate::LoginArgs;
use crate::context::{AppContext, NOT_SIGNED_IN};

pub(crate) const SIGNUP_PLACEHOLDER: &str = "Sign-up is not available from the CLI yet. \
Create an account in the web app, then run `taskpad login`.";

fn prompt(label: &str) -> Result<String, String> {
    eprint!("{label}: ");
    std::io::stderr().flush().map_err(|e| e.to_string())?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| format!("Failed to read {label}: {e}"))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Takes the password from `$var` when given, otherwise from `read`.
fn password_from(
    env_var: Option<&str>,
    read: impl FnOnce() -> std::io::Result<String>,
) -> Result<String, String> {
    match env_var {
        Some(var) => std::env::var(var).map_err(|_| format!("${var} is not set")),
        None => read().map_err(|e| format!("Failed to read password: {e}")),
    }
}

pub(crate) async fn cmd_login(ctx: &AppContext, args: &LoginArgs) -> Result<(), String> {
    let email = match &args.email {
        Some(email) => email.clone(),
        None => prompt("Email")?,
    };
    // No echo on the terminal.
    let password = password_from(args.password_env.as_deref(), || {
        rpassword::prompt_password("Password: ")
    })?;

    let session = ctx
        .sessions
        .login(&email, &password)
        .await
        .map_err(|e| e.to_string())?;
    println!(
        "Signed in as {}",
        session.user.email.as_deref().unwrap_or(session.user_id())
    );
    Ok(())
}

pub(crate) async fn cmd_logout(ctx: &AppContext) -> Result<(), String> {
    let had_session = ctx.sessions.logout().await.map_err(|e| e.to_string())?;
    if had_session {
        println!("Signed out");
    } else {
        println!("Not signed in");
    }
    Ok(())
}

/// Placeholder; performs no request.
pub(crate) fn cmd_signup() -> Result<(), String> {
    println!("{SIGNUP_PLACEHOLDER}");
    Ok(())
}

pub(crate) async fn cmd_whoami(ctx: &AppContext, json: bool) -> Result<(), String> {
    let session = match ctx.services.gate().mount(Route::Dashboard).await {
        GateDecision::Allow(Some(session)) => session,
        GateDecision::Allow(None) | GateDecision::Redirect(_) => {
            return Err(NOT_SIGNED_IN.to_string());
        }
    };
    if json {
        let value = serde_json::json!({
            "id": session.user.id,
            "email": session.user.email,
            "expires_at": session.expires_at,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!(
            "{} ({})",
            session.user.email.as_deref().unwrap_or("(no email)"),
            session.user.id
        );
    }
    Ok(())
}
