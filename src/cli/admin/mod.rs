//! Client commands - drive the admin views against a running API

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::bail;

use super::{ClientArgs, UsersCommand};
use crate::client::{
    AdminDashboard, FormField, HttpUserApi, Notice, Session, UserApi, UserManagement,
};
use crate::config::{LogFormat, LoggingConfig};
use crate::domain::UserId;
use crate::infrastructure::logging;

fn connect(args: &ClientArgs) -> (Arc<dyn UserApi>, Arc<Session>) {
    logging::init_logging(&LoggingConfig {
        level: "warn".to_string(),
        format: LogFormat::Pretty,
    });

    let session = Arc::new(match &args.token {
        Some(token) => Session::with_token(token.clone()),
        None => Session::new(),
    });
    let api: Arc<dyn UserApi> = Arc::new(HttpUserApi::new(args.api_url.clone(), session.clone()));

    (api, session)
}

/// Render the dashboard once its stats are fetched
pub async fn dashboard(args: &ClientArgs) -> anyhow::Result<()> {
    let (api, session) = connect(args);
    let mut view = AdminDashboard::new(api, session);

    view.mount().await;
    println!("{}", view.render());

    Ok(())
}

pub async fn logout(args: &ClientArgs) -> anyhow::Result<()> {
    let (api, session) = connect(args);
    let mut view = AdminDashboard::new(api, session);

    let route = view.logout().await?;
    println!("Logged out, continue at {}", route.path());

    Ok(())
}

pub async fn users(args: &ClientArgs, command: UsersCommand) -> anyhow::Result<()> {
    let (api, _) = connect(args);
    let mut view = UserManagement::new(api);

    match command {
        UsersCommand::List { page } => {
            view.mount_page(page).await;
            println!("{}", view.render());

            if view.error().is_some() {
                bail!("failed to load users");
            }
        }
        UsersCommand::Edit {
            id,
            name,
            email,
            role,
            page,
        } => {
            load(&mut view, page).await?;

            let id = UserId::new(id);
            if !view.begin_edit(id) {
                bail!("User {} is not listed on page {}", id, page);
            }

            for (field, value) in [
                (FormField::Name, name),
                (FormField::Email, email),
                (FormField::Role, role),
            ] {
                if let Some(value) = value {
                    view.set_field(field, value);
                }
            }

            view.submit_edit().await;
            report(&view)?;
        }
        UsersCommand::Delete { id, yes, page } => {
            load(&mut view, page).await?;

            let id = UserId::new(id);
            view.request_delete(id);

            if yes || confirm(&format!("Delete user {}?", id))? {
                view.confirm_delete(id).await;
            } else {
                view.cancel_delete();
                println!("Cancelled");
                return Ok(());
            }

            report(&view)?;
        }
    }

    Ok(())
}

async fn load(view: &mut UserManagement, page: usize) -> anyhow::Result<()> {
    view.mount_page(page).await;

    match view.error() {
        Some(error) => bail!("Error loading users: {}", error),
        None => Ok(()),
    }
}

/// Print the table and the outcome, failing on an error notice
fn report(view: &UserManagement) -> anyhow::Result<()> {
    println!("{}", view.render());

    match view.notice() {
        Some(Notice::Error(message)) => bail!("{}", message),
        _ => Ok(()),
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
