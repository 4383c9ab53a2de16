//! `hosteladm` - CLI for hostel-admin
//!
//! This binary provides the command-line admin dashboard for the hostel
//! report service.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, ensure, Context};
use clap::Parser;
use tracing::{debug, error};

use hostel_admin::cli::{
    AccountArgs, AdminsCommand, Cli, Command, ConfigCommand, DashboardCommand, FormsCommand,
    LoginCommand, ReportCommand, TeachersCommand, WhoamiCommand,
};
use hostel_admin::render::{self, DashboardView};
use hostel_admin::{
    init_logging, ApiClient, Claims, Config, ConsoleNotifier, Dashboard, Error,
    NewTeacher, Notifier, ReportRange, SilentNotifier, TokenStore,
};

type AdminDashboard = Dashboard<ApiClient, Arc<dyn Notifier>>;

/// Resolved settings shared by every command.
struct Session {
    config: Config,
    store: TokenStore,
    token: Option<String>,
    quiet: bool,
}

impl Session {
    fn client(&self) -> anyhow::Result<ApiClient> {
        Ok(ApiClient::new(self.config.base_url(), self.config.timeout())?
            .with_token(self.token.clone()))
    }

    fn dashboard(&self) -> anyhow::Result<AdminDashboard> {
        let notifier: Arc<dyn Notifier> = if self.quiet {
            Arc::new(SilentNotifier)
        } else {
            Arc::new(ConsoleNotifier)
        };
        let mut dashboard = Dashboard::new(
            self.client()?,
            notifier,
            self.config.auth.privileged_username.clone(),
        );
        dashboard.select_range(self.config.report.default_range);
        Ok(dashboard)
    }

    fn say(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{message}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.api.base_url.clone_from(base_url);
        config.validate()?;
    }

    let store = TokenStore::new(config.token_path());
    let token = match cli.token.clone().or_else(|| config.auth.token.clone()) {
        Some(token) => Some(token),
        None => store.load()?,
    };

    let ctx = Session {
        config,
        store,
        token,
        quiet: cli.quiet,
    };

    let succeeded = match cli.command {
        Command::Dashboard(cmd) => handle_dashboard(&ctx, cmd).await?,
        Command::Login(cmd) => handle_login(&ctx, cmd).await?,
        Command::Logout => handle_logout(&ctx)?,
        Command::Whoami(cmd) => handle_whoami(&ctx, &cmd)?,
        Command::Forms(cmd) => handle_forms(&ctx, cmd).await?,
        Command::Teachers(cmd) => handle_teachers(&ctx, cmd).await?,
        Command::Admins(cmd) => handle_admins(&ctx, cmd).await?,
        Command::Report(cmd) => handle_report(&ctx, cmd).await?,
        Command::Config(cmd) => handle_config(&ctx.config, cmd)?,
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn handle_dashboard(ctx: &Session, cmd: DashboardCommand) -> anyhow::Result<bool> {
    let mut dashboard = ctx.dashboard()?;
    if let Some(range) = cmd.range {
        dashboard.select_range(range.into());
    }
    let loaded = dashboard.load(ctx.token.as_deref()).await;

    let view = DashboardView {
        forms: dashboard.forms(),
        teachers: dashboard.teachers(),
        privileged: dashboard.is_privileged(),
        range: dashboard.range(),
        report_url: dashboard.report_url(),
    };
    print!("{}", render::dashboard(&view, cmd.format)?);
    Ok(loaded)
}

async fn handle_login(ctx: &Session, cmd: LoginCommand) -> anyhow::Result<bool> {
    let password = resolve_password(cmd.password)?;
    let token = ctx.client()?.login(&cmd.admin_id, &password).await?;
    ctx.store.save(&token)?;
    ctx.say(format!(
        "Logged in as {} (token stored at {})",
        cmd.admin_id,
        ctx.store.path().display()
    ));
    Ok(true)
}

fn handle_logout(ctx: &Session) -> anyhow::Result<bool> {
    if ctx.store.clear()? {
        ctx.say("Logged out.");
    } else {
        ctx.say("No stored token.");
    }
    Ok(true)
}

fn handle_whoami(ctx: &Session, cmd: &WhoamiCommand) -> anyhow::Result<bool> {
    let Some(token) = ctx.token.as_deref() else {
        bail!(Error::MissingToken);
    };
    let claims = Claims::decode_unverified(token)?;
    let privileged = claims.is_user(&ctx.config.auth.privileged_username);
    let expired = claims.is_expired_at(chrono::Utc::now());

    if cmd.json {
        let status = serde_json::json!({
            "username": claims.username,
            "user_type": claims.user_type,
            "expires_at": claims.expires_at().map(|t| t.to_rfc3339()),
            "expired": expired,
            "privileged": privileged,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let or_unknown = |v: Option<&str>| v.unwrap_or("(unknown)").to_string();
        println!("Username:    {}", or_unknown(claims.username.as_deref()));
        println!("Role:        {}", or_unknown(claims.user_type.as_deref()));
        match claims.expires_at() {
            Some(at) if expired => println!("Expires:     {at} (expired)"),
            Some(at) => println!("Expires:     {at}"),
            None => println!("Expires:     never"),
        }
        println!("Form delete: {}", if privileged { "shown" } else { "hidden" });
    }
    Ok(true)
}

async fn handle_forms(ctx: &Session, cmd: FormsCommand) -> anyhow::Result<bool> {
    let mut dashboard = ctx.dashboard()?;
    dashboard.check_privileged(ctx.token.as_deref());

    match cmd {
        FormsCommand::List { format } => {
            let fetched = dashboard.refresh_forms().await;
            print!(
                "{}",
                render::forms(dashboard.forms(), dashboard.is_privileged(), format)?
            );
            Ok(fetched)
        }
        FormsCommand::Delete { id } => {
            if !dashboard.is_privileged() {
                debug!("Deleting form {id} without the privileged token; the service decides");
            }
            Ok(dashboard.delete_form(id).await)
        }
    }
}

async fn handle_teachers(ctx: &Session, cmd: TeachersCommand) -> anyhow::Result<bool> {
    let mut dashboard = ctx.dashboard()?;

    match cmd {
        TeachersCommand::List { format } => {
            let fetched = dashboard.refresh_teachers().await;
            print!("{}", render::teachers(dashboard.teachers(), format)?);
            Ok(fetched)
        }
        TeachersCommand::Add(args) => {
            *dashboard.draft_mut() = account(args)?;
            Ok(dashboard.add_teacher().await)
        }
        TeachersCommand::Delete { id } => Ok(dashboard.delete_teacher(id).await),
    }
}

async fn handle_admins(ctx: &Session, cmd: AdminsCommand) -> anyhow::Result<bool> {
    let client = ctx.client()?;

    let result = match cmd {
        AdminsCommand::List { format } => client.list_admins().await.and_then(|admins| {
            print!("{}", render::admins(&admins, format)?);
            Ok(())
        }),
        AdminsCommand::Add(args) => {
            let admin = account(args)?;
            client
                .add_admin(&admin)
                .await
                .map(|()| ctx.say("Admin added successfully"))
        }
        AdminsCommand::Delete { id } => client
            .delete_admin(id)
            .await
            .map(|()| ctx.say("Admin deleted successfully")),
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) => {
            error!("Error managing admins: {e}");
            Ok(false)
        }
    }
}

async fn handle_report(ctx: &Session, cmd: ReportCommand) -> anyhow::Result<bool> {
    let mut dashboard = ctx.dashboard()?;

    match cmd {
        ReportCommand::Url { range } => {
            dashboard.select_range(range.map_or(ctx.config.report.default_range, ReportRange::from));
            println!("{}", dashboard.report_url());
            Ok(true)
        }
        ReportCommand::Download { range, output } => {
            dashboard.select_range(range.map_or(ctx.config.report.default_range, ReportRange::from));
            let dir = output.unwrap_or_else(|| ctx.config.output_dir());
            match dashboard.download_report(&dir).await {
                Some(path) => {
                    ctx.say(format!("Saved {}", path.display()));
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<bool> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                let mut shown = config.clone();
                if shown.auth.token.is_some() {
                    shown.auth.token = Some("<redacted>".to_string());
                }
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[API]");
                println!("  Base URL:            {}", config.base_url());
                match config.timeout() {
                    Some(t) => println!("  Timeout:             {}s", t.as_secs()),
                    None => println!("  Timeout:             none"),
                }
                println!();
                println!("[Auth]");
                println!("  Token file:          {}", config.token_path().display());
                println!(
                    "  Token override:      {}",
                    if config.auth.token.is_some() { "set" } else { "not set" }
                );
                println!("  Privileged user:     {}", config.auth.privileged_username);
                println!();
                println!("[Report]");
                println!("  Default range:       {}", config.report.default_range);
                println!("  Output directory:    {}", config.output_dir().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}

fn account(args: AccountArgs) -> anyhow::Result<NewTeacher> {
    let password = resolve_password(args.password)?;
    Ok(NewTeacher::new(args.name, password))
}

/// Use the given password or read one line from stdin.
fn resolve_password(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    ensure!(!password.is_empty(), "password cannot be empty");
    Ok(password)
}
