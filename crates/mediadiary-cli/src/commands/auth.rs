use mediadiary_core::User;

use crate::app::AppContext;
use crate::cli::LoginArgs;
use crate::errors::CliError;

pub async fn handle_login(ctx: &AppContext<'_>, args: &LoginArgs) -> anyhow::Result<()> {
    let uid = args.uid.trim();
    if uid.is_empty() || uid.contains('/') {
        return Err(CliError::invalid_input(format!("Invalid user id '{}'", args.uid)).into());
    }

    let store = ctx.open_store()?;
    let mut user = User::new(uid);
    if let Some(name) = args.name.as_deref() {
        user = user.with_display_name(name);
    }
    if let Some(email) = args.email.as_deref() {
        user = user.with_email(email);
    }

    store.identity().sign_in(&user)?;
    store.load_preferences_for_user(user.clone()).await?;

    if !ctx.quiet() {
        let name = user.display_name.as_deref().unwrap_or(&user.uid);
        println!("Signed in as {}", name);
    }
    Ok(())
}

pub async fn handle_logout(ctx: &AppContext<'_>) -> anyhow::Result<()> {
    let (store, user) = ctx.signed_in_store().await?;
    store.logout().await?;
    if !ctx.quiet() {
        println!("Signed out {}", user.uid);
    }
    Ok(())
}
