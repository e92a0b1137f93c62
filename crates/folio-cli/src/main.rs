//! `folio` - command-line client for the portfolio backend

mod commands;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use commands::App;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn resource_arg() -> Arg {
    Arg::new("resource")
        .required(true)
        .help("education, experience, skill, certificate, publication, project or home-section")
}

fn file_arg() -> Arg {
    Arg::new("file")
        .long("file")
        .short('f')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("JSON document with the record fields")
}

fn required(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn cli() -> Command {
    Command::new("folio")
        .version(folio_core::VERSION)
        .about("Manage portfolio content from the terminal")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a folio.toml configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v, -vv, -vvv)"),
        )
        .subcommand(
            Command::new("theme")
                .about("Show or change the stored theme preference")
                .subcommand(Command::new("toggle").about("Flip between light and dark"))
                .subcommand(
                    Command::new("accent")
                        .about("Select the accent scheme")
                        .arg(Arg::new("name").required(true).help("teal, purple, blue or rose")),
                )
                .subcommand(Command::new("tokens").about("Print style tokens for the current accent")),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in and store the session token")
                .arg(required("email", "Account email"))
                .arg(required("password", "Account password")),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account and sign in")
                .arg(required("email", "Account email"))
                .arg(required("password", "Account password"))
                .arg(required("name", "Display name")),
        )
        .subcommand(Command::new("logout").about("End the session and forget the token"))
        .subcommand(Command::new("whoami").about("Validate the stored token and show the user"))
        .subcommand(Command::new("content").about("Fetch every collection and print a summary"))
        .subcommand(
            Command::new("list")
                .about("Print records of a resource as JSON")
                .arg(resource_arg())
                .arg(Arg::new("id").help("Fetch a single record")),
        )
        .subcommand(
            Command::new("add")
                .about("Validate and create a record")
                .arg(resource_arg())
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("update")
                .about("Validate and update a record (no id for home-section)")
                .arg(resource_arg())
                .arg(Arg::new("id").help("Record identifier"))
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a record")
                .arg(resource_arg())
                .arg(Arg::new("id").required(true).help("Record identifier")),
        )
        .subcommand(
            Command::new("upload")
                .about("Upload a file and print its URL")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("File to upload"),
                ),
        )
        .subcommand(
            Command::new("change-password")
                .about("Change the signed-in account's password")
                .arg(required("current", "Current password"))
                .arg(required("new", "New password"))
                .arg(required("confirm", "New password again")),
        )
}

fn init_tracing(verbosity: u8) {
    let mut filter = EnvFilter::from_default_env();

    if std::env::var("RUST_LOG").is_err() {
        let level = match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        if let Ok(directive) = level.parse() {
            filter = filter.add_directive(directive);
        }
    }

    for noisy in ["hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = noisy.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn arg<'a>(args: &'a ArgMatches, name: &str) -> &'a str {
    args.get_one::<String>(name).map_or("", String::as_str)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    let app = App::open(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    match matches.subcommand() {
        Some(("theme", args)) => match args.subcommand() {
            Some(("toggle", _)) => app.theme_toggle(),
            Some(("accent", sub)) => app.theme_accent(arg(sub, "name")),
            Some(("tokens", _)) => app.theme_tokens(),
            _ => app.theme_show(),
        },
        Some(("login", args)) => app.login(arg(args, "email"), arg(args, "password")).await,
        Some(("register", args)) => {
            app.register(arg(args, "email"), arg(args, "password"), arg(args, "name"))
                .await
        }
        Some(("logout", _)) => app.logout().await,
        Some(("whoami", _)) => app.whoami().await,
        Some(("content", _)) => app.content().await,
        Some(("list", args)) => {
            app.list(arg(args, "resource"), args.get_one::<String>("id").cloned())
                .await
        }
        Some(("add", args)) => {
            let file = args.get_one::<PathBuf>("file").cloned().unwrap_or_default();
            app.add(arg(args, "resource"), &file).await
        }
        Some(("update", args)) => {
            let file = args.get_one::<PathBuf>("file").cloned().unwrap_or_default();
            app.update(
                arg(args, "resource"),
                args.get_one::<String>("id").map(String::as_str),
                &file,
            )
            .await
        }
        Some(("delete", args)) => app.delete(arg(args, "resource"), arg(args, "id")).await,
        Some(("upload", args)) => {
            let path = args.get_one::<PathBuf>("path").cloned().unwrap_or_default();
            app.upload(&path).await
        }
        Some(("change-password", args)) => {
            app.change_password(arg(args, "current"), arg(args, "new"), arg(args, "confirm"))
                .await
        }
        _ => unreachable!("subcommand_required is set"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn update_accepts_hero_without_id() {
        let matches = cli()
            .try_get_matches_from(["folio", "update", "home-section", "--file", "hero.json"])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "update");
        assert!(args.get_one::<String>("id").is_none());
    }

    #[test]
    fn config_flag_is_global() {
        let matches = cli()
            .try_get_matches_from(["folio", "whoami", "--config", "folio.toml", "-vv"])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("folio.toml"))
        );
        assert_eq!(matches.get_count("verbose"), 2);
    }

    #[test]
    fn change_password_requires_confirmation() {
        let result = cli().try_get_matches_from([
            "folio",
            "change-password",
            "--current",
            "a",
            "--new",
            "b",
        ]);
        assert!(result.is_err());
    }
}
