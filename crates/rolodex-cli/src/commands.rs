use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use rolodex_server::{RolodexServer, ServerConfig};
use rolodex_service::{RequestContext, User, UserId, UserList, UserService};
use rolodex_store::JsonFileRepository;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(args) => cmd_init(args),
        Command::Serve(args) => cmd_serve(args),
        Command::User(args) => {
            let output = cmd_user(args, &cli.format)?;
            println!("{output}");
            Ok(())
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let repo = JsonFileRepository::open_or_init(&args.store)
        .with_context(|| format!("initializing {}", args.store.display()))?;
    println!(
        "{} User store ready at {}",
        "✓".green().bold(),
        repo.path().display().to_string().bold()
    );
    Ok(())
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = serve_config(args)?;
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(RolodexServer::new(config).serve())?;
    Ok(())
}

/// Config file (or defaults) with command-line overrides applied.
fn serve_config(args: ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind:?}"))?;
    }
    if let Some(store) = args.store {
        config.store_path = store;
    }
    debug!(
        bind = %config.bind_addr,
        store = %config.store_path.display(),
        "resolved server config"
    );
    Ok(config)
}

fn open_service(store: &Path) -> anyhow::Result<UserService> {
    let repo = JsonFileRepository::open(store).with_context(|| {
        format!(
            "opening {} (run `rolodex init --store {}` first?)",
            store.display(),
            store.display()
        )
    })?;
    Ok(UserService::new(Arc::new(repo)))
}

/// Run a `user` subcommand and render its result.
fn cmd_user(args: UserArgs, format: &OutputFormat) -> anyhow::Result<String> {
    let service = open_service(&args.store)?;
    let ctx = RequestContext::new();
    debug!(request_id = ctx.request_id(), store = %args.store.display(), "running user command");

    let output = match args.action {
        UserAction::Create { display_name, email } => {
            let user = service.create(&ctx, &display_name, &email)?;
            match format {
                OutputFormat::Json => serde_json::json!({ "user_id": user.id }).to_string(),
                OutputFormat::Text => format!(
                    "{} Created user {}",
                    "✓".green().bold(),
                    user.id.to_string().yellow()
                ),
            }
        }
        UserAction::Get { id } => {
            let user = service.get_by_id(&ctx, &UserId::new(id))?;
            match format {
                OutputFormat::Json => serde_json::to_string_pretty(&user)?,
                OutputFormat::Text => render_user(&user),
            }
        }
        UserAction::List => {
            let users = service.get_all(&ctx)?;
            match format {
                OutputFormat::Json => serde_json::to_string_pretty(&users)?,
                OutputFormat::Text => render_list(&users),
            }
        }
        UserAction::Update { id, display_name } => {
            let id = UserId::new(id);
            service.update(&ctx, &id, &display_name)?;
            format!("{} Updated user {}", "✓".green().bold(), id.to_string().yellow())
        }
        UserAction::Delete { id } => {
            let id = UserId::new(id);
            service.delete(&ctx, &id)?;
            format!("{} Deleted user {}", "✓".green().bold(), id.to_string().yellow())
        }
    };
    Ok(output)
}

fn render_user(user: &User) -> String {
    format!(
        "{}  {} <{}>  created {}",
        user.id.to_string().yellow().bold(),
        user.display_name.bold(),
        user.email.blue(),
        user.created_at.to_rfc3339().dimmed()
    )
}

fn render_list(users: &UserList) -> String {
    if users.is_empty() {
        return "No users.".into();
    }
    users.values().map(render_user).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn user_args(store: &Path, action: UserAction) -> UserArgs {
        UserArgs {
            store: store.to_path_buf(),
            action,
        }
    }

    fn init_store() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("users.json");
        cmd_init(InitArgs { store: store.clone() }).unwrap();
        (dir, store)
    }

    #[test]
    fn user_commands_against_store() {
        colored::control::set_override(false);
        let (_dir, store) = init_store();

        let out = cmd_user(
            user_args(&store, UserAction::Create {
                display_name: "Alice".into(),
                email: "alice@x.com".into(),
            }),
            &OutputFormat::Json,
        )
        .unwrap();
        assert_eq!(out, r#"{"user_id":"1"}"#);

        let out = cmd_user(
            user_args(&store, UserAction::Update { id: "1".into(), display_name: "Alicia".into() }),
            &OutputFormat::Text,
        )
        .unwrap();
        assert!(out.contains("Updated user 1"));

        let out = cmd_user(
            user_args(&store, UserAction::Get { id: "1".into() }),
            &OutputFormat::Text,
        )
        .unwrap();
        assert!(out.contains("Alicia"));
        assert!(out.contains("<alice@x.com>"));

        let out = cmd_user(user_args(&store, UserAction::List), &OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["1"]["display_name"], "Alicia");

        cmd_user(
            user_args(&store, UserAction::Delete { id: "1".into() }),
            &OutputFormat::Text,
        )
        .unwrap();
        let out = cmd_user(user_args(&store, UserAction::List), &OutputFormat::Text).unwrap();
        assert_eq!(out, "No users.");
    }

    #[test]
    fn missing_user_is_an_error() {
        let (_dir, store) = init_store();
        let err = cmd_user(
            user_args(&store, UserAction::Get { id: "9".into() }),
            &OutputFormat::Text,
        )
        .unwrap_err();
        assert!(err.to_string().contains("get user 9"));
    }

    #[test]
    fn missing_store_suggests_init() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_user(
            user_args(&dir.path().join("none.json"), UserAction::List),
            &OutputFormat::Text,
        )
        .unwrap_err();
        assert!(err.to_string().contains("rolodex init"));
    }

    #[test]
    fn serve_config_applies_overrides() {
        let config = serve_config(ServeArgs {
            config: None,
            bind: Some("0.0.0.0:8080".into()),
            store: Some(PathBuf::from("/data/users.json")),
        })
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.store_path, PathBuf::from("/data/users.json"));
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn serve_config_rejects_bad_bind() {
        let result = serve_config(ServeArgs {
            config: None,
            bind: Some("not-an-addr".into()),
            store: None,
        });
        assert!(result.is_err());
    }
}
