use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use skein_proto::AuthMethod;
use skein_server::{AllowAllAuth, AuthProvider, ServerConfig, SkeinServer, StaticTokenAuth};
use skein_store::InMemoryContentStore;
use skein_sync::{HttpRemote, ProjectSync, SyncManager};

use crate::auth::{DeviceFlow, DeviceFlowOutcome};
use crate::cli::*;
use crate::config::{CliConfig, SyncOptions};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let opts = SyncOptions::from_env();
    match cli.command {
        Command::Auth(args) => match args.action {
            AuthAction::Login => cmd_login(opts).await,
            AuthAction::Logout => cmd_logout(),
            AuthAction::Status => cmd_status(),
        },
        Command::Pull(args) => cmd_pull(opts, args).await,
        Command::PullFile(args) => cmd_pull_file(opts, args).await,
        Command::Push(args) => cmd_push(opts, args).await,
        Command::Sync(args) => cmd_sync(opts, args).await,
        Command::Config(_) => cmd_config(opts),
        Command::Serve(args) => cmd_serve(args).await,
    }
}

fn project_sync(opts: &SyncOptions) -> anyhow::Result<ProjectSync> {
    let auth = match &opts.token {
        Some(token) => AuthMethod::Bearer(token.clone()),
        None => AuthMethod::Anonymous,
    };
    let remote = Arc::new(HttpRemote::new(&opts.api_url, auth)?);
    Ok(ProjectSync::new(
        Arc::new(InMemoryContentStore::new()),
        remote,
    ))
}

async fn cmd_login(opts: SyncOptions) -> anyhow::Result<()> {
    let flow = DeviceFlow::new(&opts.api_url)?;
    let outcome = flow
        .run(|grant| {
            println!("To log in, open {}", grant.verification_url.blue().bold());
            println!("and enter the code {}", grant.user_code.yellow().bold());
            println!("Waiting for approval...");
        })
        .await?;

    match outcome {
        DeviceFlowOutcome::Authenticated { token, user } => {
            CliConfig {
                token,
                user: user.clone(),
            }
            .save()?;
            println!("{} Logged in as {}", "✓".green().bold(), user.bold());
            Ok(())
        }
        DeviceFlowOutcome::Denied => anyhow::bail!("login denied"),
        DeviceFlowOutcome::Expired => anyhow::bail!("login code expired, try again"),
        DeviceFlowOutcome::Cancelled => anyhow::bail!("login cancelled"),
    }
}

fn cmd_logout() -> anyhow::Result<()> {
    if CliConfig::remove()? {
        println!("{} Logged out.", "✓".green());
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

fn cmd_status() -> anyhow::Result<()> {
    match CliConfig::load()? {
        Some(config) => println!("Logged in as {}", config.user.bold()),
        None => println!("Not logged in."),
    }
    Ok(())
}

async fn cmd_pull(opts: SyncOptions, args: PullArgs) -> anyhow::Result<()> {
    let opts = with_project(opts, args.project);
    let project = opts.require_project()?.to_string();
    let dir = args.output.unwrap_or_else(|| opts.output_dir.clone());

    let sync = project_sync(&opts)?;
    sync.pull_all(&project, Path::new(&dir)).await?;
    println!(
        "{} Pulled {} into {}",
        "✓".green().bold(),
        format!("{} files", sync.tree().len()).bold(),
        dir.bold(),
    );
    Ok(())
}

async fn cmd_pull_file(opts: SyncOptions, args: PullFileArgs) -> anyhow::Result<()> {
    let opts = with_project(opts, args.project);
    let project = opts.require_project()?.to_string();
    let target = match args.target {
        Some(target) => PathBuf::from(target),
        None => {
            let name = args
                .path
                .rsplit('/')
                .next()
                .filter(|name| !name.is_empty())
                .context("path has no file name")?;
            PathBuf::from(name)
        }
    };

    let sync = project_sync(&opts)?;
    sync.pull_file(&project, &args.path, &target).await?;
    println!(
        "{} Pulled {} to {}",
        "✓".green().bold(),
        args.path.bold(),
        target.display().to_string().bold(),
    );
    Ok(())
}

async fn cmd_push(opts: SyncOptions, args: PushArgs) -> anyhow::Result<()> {
    let opts = with_project(opts, args.project);
    let project = opts.require_project()?.to_string();
    let dir = args.dir.unwrap_or_else(|| opts.output_dir.clone());

    let sync = project_sync(&opts)?;
    sync.push_all(&project, Path::new(&dir)).await?;
    println!("{} Pushed {} to {}", "✓".green().bold(), dir.bold(), project.bold());
    Ok(())
}

async fn cmd_sync(opts: SyncOptions, args: SyncArgs) -> anyhow::Result<()> {
    let opts = with_project(opts, args.project);
    let project = opts.require_project()?.to_string();
    let dir = args.dir.unwrap_or_else(|| opts.output_dir.clone());
    let interval = Duration::from_millis(args.interval.unwrap_or(opts.sync_interval_ms));

    let sync = Arc::new(project_sync(&opts)?);
    let manager = SyncManager::new(sync, project.clone(), &dir, interval);

    let cancel = manager.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    println!(
        "Syncing {} every {}s, Ctrl-C to stop.",
        project.bold(),
        interval.as_secs(),
    );
    manager.run().await;
    println!("{} Sync stopped.", "✓".green());
    Ok(())
}

fn cmd_config(opts: SyncOptions) -> anyhow::Result<()> {
    println!("api_url        = {}", opts.api_url.bold());
    println!(
        "project_id     = {}",
        opts.project_id.as_deref().unwrap_or("(not set)"),
    );
    println!(
        "token          = {}",
        if opts.token.is_some() { "(set)" } else { "(not set)" },
    );
    println!("output_dir     = {}", opts.output_dir);
    println!("sync_interval  = {}ms", opts.sync_interval_ms);
    Ok(())
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = ServerConfig::default();
    config.bind_addr = args.bind.parse().context("invalid --bind address")?;

    let auth: Arc<dyn AuthProvider> = match args.token {
        Some(token) => Arc::new(StaticTokenAuth::single(token, "local")),
        None => Arc::new(AllowAllAuth),
    };

    println!("Skein server on {}", args.bind.bold());
    SkeinServer::new(config, auth).serve().await?;
    Ok(())
}

fn with_project(mut opts: SyncOptions, flag: Option<String>) -> SyncOptions {
    if flag.is_some() {
        opts.project_id = flag;
    }
    opts
}
