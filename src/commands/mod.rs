/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `account`: login, signup, logout, status
- `materials`: material listing
- `sessions`: session listing, detail and creation
- `workspace`: interactive workspace shell

Handlers build an [`AppContext`] from configuration and drive the library
components: the credential store, the gateway, the auth service and the
workspace controller.
*/

use std::sync::Arc;

use crate::api::{HttpLearningApi, LearningApi};
use crate::auth::AuthService;
use crate::config::Config;
use crate::credentials;
use crate::error::{LearnmapError, Result};
use crate::gateway::Gateway;
use crate::workspace::LOGIN_REQUIRED_MESSAGE;

// Parser for the interactive workspace shell
pub mod shell_commands;

/// Everything a command handler needs, built once from configuration.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    gateway: Gateway,
}

impl AppContext {
    /// Build the credential store and gateway selected by `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let store = credentials::from_config(&config.credentials)?;
        let gateway = Gateway::from_config(&config, store)?;
        Ok(Self { config, gateway })
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.gateway.clone())
    }

    pub fn api(&self) -> Arc<dyn LearningApi> {
        Arc::new(HttpLearningApi::new(self.gateway.clone()))
    }
}

/// Replace a server-side 401 with a message that tells the user what to do.
fn explain_auth_failure(err: anyhow::Error) -> anyhow::Error {
    if crate::error::is_auth_failure(&err) {
        return login_required();
    }
    err
}

fn login_required() -> anyhow::Error {
    LearnmapError::Authentication(format!(
        "{} Run `learnmap login` first.",
        LOGIN_REQUIRED_MESSAGE
    ))
    .into()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// Account command handlers
pub mod account {
    //! Login, signup, logout and status.

    use super::*;
    use crate::auth::LogoutOutcome;
    use colored::Colorize;
    use rustyline::DefaultEditor;

    /// Log in and store the credential
    ///
    /// The password is prompted for when `password` is `None`.
    pub async fn login(ctx: &AppContext, email: &str, password: Option<String>) -> Result<()> {
        let password = match password {
            Some(p) => p,
            None => prompt_password()?,
        };
        ctx.auth().login(email, &password).await?;
        println!("{}", format!("Logged in as {}", email).green());
        Ok(())
    }

    /// Create an account and store the credential
    pub async fn signup(
        ctx: &AppContext,
        email: &str,
        name: Option<&str>,
        password: Option<String>,
    ) -> Result<()> {
        let password = match password {
            Some(p) => p,
            None => prompt_password()?,
        };
        ctx.auth().signup(email, &password, name).await?;
        println!("{}", format!("Account created for {}", email).green());
        Ok(())
    }

    /// Log out; the local credential is always removed
    pub async fn logout(ctx: &AppContext) -> Result<()> {
        let outcome = ctx.auth().logout().await?;
        report_logout(outcome);
        Ok(())
    }

    pub(crate) fn report_logout(outcome: LogoutOutcome) {
        match outcome {
            LogoutOutcome::Invalidated | LogoutOutcome::NothingToInvalidate => {
                println!("{}", "Logged out.".green())
            }
            LogoutOutcome::InvalidationFailed => println!(
                "{}",
                "Logged out locally; the server could not be reached to end the session."
                    .yellow()
            ),
        }
    }

    /// Show whether a credential is stored
    pub fn status(ctx: &AppContext) -> Result<()> {
        let state = if ctx.auth().is_logged_in() {
            "logged in".green()
        } else {
            "not logged in".yellow()
        };
        println!(
            "Server:  {}\nProfile: {}\nStatus:  {}",
            ctx.config.api.base_url, ctx.config.credentials.profile, state
        );
        Ok(())
    }

    fn prompt_password() -> Result<String> {
        eprintln!(
            "{}",
            "Input is visible; set LEARNMAP_PASSWORD to avoid typing it.".dimmed()
        );
        let mut rl = DefaultEditor::new()?;
        let password = rl.readline("Password: ")?;
        if password.is_empty() {
            return Err(LearnmapError::Validation("Password cannot be empty".to_string()).into());
        }
        Ok(password)
    }
}

// Material command handlers
pub mod materials {
    //! Material listing.

    use super::*;
    use crate::render;

    /// List uploaded materials
    pub async fn list(ctx: &AppContext, json: bool) -> Result<()> {
        let materials = ctx
            .api()
            .list_materials()
            .await
            .map_err(explain_auth_failure)?;
        if json {
            return print_json(&materials);
        }
        render::print_materials(&materials, |_| false);
        Ok(())
    }
}

// Session command handlers
pub mod sessions {
    //! Session listing, detail and creation.

    use std::collections::BTreeSet;

    use super::*;
    use crate::render;
    use crate::tree::build_forest;
    use crate::workspace::SessionForm;

    /// List sessions
    pub async fn list(ctx: &AppContext, json: bool) -> Result<()> {
        let sessions = ctx
            .api()
            .list_sessions()
            .await
            .map_err(explain_auth_failure)?;
        if json {
            return print_json(&sessions);
        }
        render::print_sessions(&sessions, None);
        Ok(())
    }

    /// Show a session and its prerequisite tree
    pub async fn show(ctx: &AppContext, id: i64, json: bool) -> Result<()> {
        let detail = ctx
            .api()
            .get_session(id)
            .await
            .map_err(explain_auth_failure)?;
        if json {
            return print_json(&detail);
        }
        let forest = build_forest(&detail.prerequisites);
        render::print_session(&detail, &forest);
        Ok(())
    }

    /// Create a session from the given materials
    ///
    /// The form is validated the same way the interactive shell validates
    /// it, and nothing is sent without a stored credential.
    pub async fn create(
        ctx: &AppContext,
        title: &str,
        objective: Option<&str>,
        material_ids: &[i64],
    ) -> Result<()> {
        let form = SessionForm {
            title: title.to_string(),
            objective: objective.unwrap_or_default().to_string(),
        };
        let selected: BTreeSet<i64> = material_ids.iter().copied().collect();
        let request = form.to_request(&selected)?;

        if !ctx.auth().is_logged_in() {
            return Err(login_required());
        }

        let detail = ctx
            .api()
            .create_session(&request)
            .await
            .map_err(explain_auth_failure)?;
        tracing::info!("Created session {} ({})", detail.id, detail.title);

        let forest = build_forest(&detail.prerequisites);
        render::print_session(&detail, &forest);
        Ok(())
    }
}

// Interactive workspace handler
pub mod workspace {
    //! Interactive workspace shell.
    //!
    //! Runs the workspace controller behind a readline prompt. The shell
    //! ends on `exit`, on `logout`, or as soon as the workspace reaches the
    //! authentication-error view.

    use super::shell_commands::{parse_shell_command, print_help, ShellCommand};
    use super::*;
    use crate::render;
    use crate::workspace::{Workspace, WorkspaceView};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Whether the shell loop keeps going after a command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Flow {
        Continue,
        Stop,
    }

    /// Start the interactive workspace
    pub async fn run_workspace(ctx: &AppContext) -> Result<()> {
        tracing::info!("Starting interactive workspace");
        let auth = ctx.auth();
        let mut workspace = Workspace::new(ctx.api(), ctx.config.workspace.auth_failure);

        workspace.initial_load().await;
        if report_auth_error(&workspace) {
            return Ok(());
        }
        show_form_error(&workspace);

        println!(
            "{}",
            "Learning workspace. Type 'help' for commands.".bold()
        );
        render::print_materials(workspace.materials(), |id| workspace.is_selected(id));
        render::print_sessions(workspace.sessions(), None);

        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline("learnmap> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        rl.add_history_entry(trimmed)?;
                    }
                    let command = match parse_shell_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            println!("{}", e.to_string().red());
                            continue;
                        }
                    };
                    if execute(&mut workspace, &auth, command).await? == Flow::Stop {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Apply one shell command to the workspace and print the result.
    pub async fn execute(
        workspace: &mut Workspace,
        auth: &AuthService,
        command: ShellCommand,
    ) -> Result<Flow> {
        match command {
            ShellCommand::Empty => {}
            ShellCommand::Help => print_help(),
            ShellCommand::Exit => return Ok(Flow::Stop),
            ShellCommand::Materials => {
                render::print_materials(workspace.materials(), |id| workspace.is_selected(id))
            }
            ShellCommand::Sessions => render::print_sessions(
                workspace.sessions(),
                workspace.active_session().map(|s| s.id),
            ),
            ShellCommand::Toggle(ids) => {
                for id in ids {
                    let state = if workspace.toggle_material(id) {
                        "selected"
                    } else {
                        "deselected"
                    };
                    println!("Material {} {}", id, state);
                }
            }
            ShellCommand::Title(title) => workspace.set_title(title),
            ShellCommand::Objective(objective) => workspace.set_objective(objective),
            ShellCommand::Form => print_form(workspace),
            ShellCommand::Create => {
                println!("{}", "Creating session...".dimmed());
                workspace.create_session().await;
                if workspace.form_error().is_none() && workspace.view() == WorkspaceView::Ready {
                    print_active(workspace);
                }
            }
            ShellCommand::Select(id) => {
                workspace.select_session(id).await;
                if workspace.form_error().is_none() && workspace.view() == WorkspaceView::Ready {
                    print_active(workspace);
                }
            }
            ShellCommand::Tree => print_active(workspace),
            ShellCommand::Refresh => {
                workspace.refresh().await;
                if workspace.form_error().is_none() && workspace.view() == WorkspaceView::Ready {
                    println!("{}", "Refreshed.".green());
                }
            }
            ShellCommand::Logout => {
                let outcome = workspace.logout(auth).await?;
                super::account::report_logout(outcome);
                return Ok(Flow::Stop);
            }
        }

        if report_auth_error(workspace) {
            return Ok(Flow::Stop);
        }
        show_form_error(workspace);
        Ok(Flow::Continue)
    }

    fn print_form(workspace: &Workspace) {
        let form = workspace.form();
        let title = if form.title.is_empty() {
            "(none)"
        } else {
            form.title.as_str()
        };
        let objective = if form.objective.is_empty() {
            "(none)"
        } else {
            form.objective.as_str()
        };
        let selected = workspace.selected_material_ids();
        println!("Title:     {}", title);
        println!("Objective: {}", objective);
        if selected.is_empty() {
            println!("Materials: (none selected)");
        } else {
            let ids: Vec<String> = selected.iter().map(|id| id.to_string()).collect();
            println!("Materials: {}", ids.join(", "));
        }
    }

    fn print_active(workspace: &Workspace) {
        match workspace.active_session() {
            Some(detail) => render::print_session(detail, workspace.forest()),
            None => println!(
                "{}",
                "Create or select a session to view its prerequisite map.".yellow()
            ),
        }
    }

    fn show_form_error(workspace: &Workspace) {
        if let Some(message) = workspace.form_error() {
            println!("{}", message.red());
        }
    }

    fn report_auth_error(workspace: &Workspace) -> bool {
        if workspace.view() != WorkspaceView::AuthError {
            return false;
        }
        let message = workspace.auth_error().unwrap_or(LOGIN_REQUIRED_MESSAGE);
        println!("{}", message.yellow());
        println!("Run {} to continue.", "learnmap login --email <EMAIL>".cyan());
        true
    }
}
