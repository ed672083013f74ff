use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "skein",
    about = "Skein — CRDT-backed project file sync",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in, log out, or show the current session
    Auth(AuthArgs),
    /// Pull the full project into a local directory
    Pull(PullArgs),
    /// Pull a single file from the project
    PullFile(PullFileArgs),
    /// Push local directory contents to the project
    Push(PushArgs),
    /// Run periodic pull+push sync in the foreground
    Sync(SyncArgs),
    /// Show the effective configuration
    Config(ConfigArgs),
    /// Start a Skein sync server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthAction,
}

#[derive(Subcommand)]
pub enum AuthAction {
    /// Authenticate this device via a browser code
    Login,
    /// Discard stored credentials
    Logout,
    /// Show who is logged in
    Status,
}

#[derive(Args)]
pub struct PullArgs {
    #[arg(short, long)]
    pub project: Option<String>,
    /// Directory to materialize files into
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Args)]
pub struct PullFileArgs {
    /// Project-relative path, e.g. /notes/todo.md
    pub path: String,
    /// Where to write the file locally
    pub target: Option<String>,
    #[arg(short, long)]
    pub project: Option<String>,
}

#[derive(Args)]
pub struct PushArgs {
    #[arg(short, long)]
    pub project: Option<String>,
    /// Directory to scan for local changes
    #[arg(short, long)]
    pub dir: Option<String>,
}

#[derive(Args)]
pub struct SyncArgs {
    #[arg(short, long)]
    pub project: Option<String>,
    #[arg(short, long)]
    pub dir: Option<String>,
    /// Milliseconds between sync cycles
    #[arg(long)]
    pub interval: Option<u64>,
}

#[derive(Args)]
pub struct ConfigArgs {}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1:8787")]
    pub bind: String,
    /// Require this bearer token on every request
    #[arg(long)]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_auth_login() {
        let cli = Cli::try_parse_from(["skein", "auth", "login"]).unwrap();
        if let Command::Auth(args) = cli.command {
            assert!(matches!(args.action, AuthAction::Login));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_auth_status() {
        let cli = Cli::try_parse_from(["skein", "auth", "status"]).unwrap();
        if let Command::Auth(args) = cli.command {
            assert!(matches!(args.action, AuthAction::Status));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_pull_with_project() {
        let cli = Cli::try_parse_from(["skein", "pull", "-p", "proj-1", "-o", "out"]).unwrap();
        if let Command::Pull(args) = cli.command {
            assert_eq!(args.project, Some("proj-1".into()));
            assert_eq!(args.output, Some("out".into()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_pull_file() {
        let cli =
            Cli::try_parse_from(["skein", "pull-file", "/notes/todo.md", "todo.md"]).unwrap();
        if let Command::PullFile(args) = cli.command {
            assert_eq!(args.path, "/notes/todo.md");
            assert_eq!(args.target, Some("todo.md".into()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_push() {
        let cli = Cli::try_parse_from(["skein", "push", "--dir", "workspace"]).unwrap();
        if let Command::Push(args) = cli.command {
            assert_eq!(args.dir, Some("workspace".into()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_sync_interval() {
        let cli = Cli::try_parse_from(["skein", "sync", "--interval", "60000"]).unwrap();
        if let Command::Sync(args) = cli.command {
            assert_eq!(args.interval, Some(60_000));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve() {
        let cli =
            Cli::try_parse_from(["skein", "serve", "--bind", "0.0.0.0:9000", "--token", "t"])
                .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, "0.0.0.0:9000");
            assert_eq!(args.token, Some("t".into()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["skein", "--verbose", "config"]).unwrap();
        assert!(cli.verbose);
    }
}
