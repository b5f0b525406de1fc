use clap::{Arg, ArgAction, ArgMatches, Command};
use radiolist::api_client::CleanupMode;
use radiolist::configuration::{create_config, get_configuration, ConfigFolder, Settings};
use radiolist::startup::{run_authorize, run_cleanup, run_render, RenderRequest};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Command::new("radiolist")
        .about("📻 Radio station playlist snapshots and Spotify cleanup 📻")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Path to config.yaml (defaults to ~/.radiolist/config.yaml)"),
        )
        .subcommand(
            Command::new("render")
                .about("🖼️  Render the static playlist page from scraped records")
                .arg(
                    Arg::new("input")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Line-delimited JSON records, or '-' for stdin"),
                )
                .arg(
                    Arg::new("from-dump")
                        .long("from-dump")
                        .action(ArgAction::SetTrue)
                        .help("Treat the input as a previously written playlist dump"),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Where to write the HTML page"),
                )
                .arg(
                    Arg::new("dump")
                        .long("dump")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Where to write the JSON dump"),
                ),
        )
        .subcommand(
            Command::new("dedupe").about("🧹 Delete older copies of duplicated Spotify playlists"),
        )
        .subcommand(
            Command::new("purge").about("🗑️  Delete every Spotify playlist created by radiolist"),
        )
        .subcommand(
            Command::new("authorize").about("🔑 Authorize with Spotify and print a refresh token"),
        )
        .subcommand(
            Command::new("config").about("🛠️ Create or update the configuration file"),
        )
        .get_matches();

    let cfg_folder = match args.get_one::<PathBuf>("config") {
        Some(path) => ConfigFolder::with_file(path),
        None => ConfigFolder::new()?,
    };

    match args.subcommand() {
        Some(("render", sub)) => {
            let settings = load_settings(&cfg_folder)?;
            run_render(&settings, &render_request(sub))?;
            Ok(())
        }
        Some(("dedupe", _)) => {
            println!("\x1b[1m\x1b[34mLooking for duplicate playlists...\x1b[0m");
            let settings = load_settings(&cfg_folder)?;
            run_cleanup(&settings, CleanupMode::Duplicates).await?;
            Ok(())
        }
        Some(("purge", _)) => {
            println!("\x1b[1m\x1b[34mLooking for radiolist playlists...\x1b[0m");
            let settings = load_settings(&cfg_folder)?;
            run_cleanup(&settings, CleanupMode::AllMatching).await?;
            Ok(())
        }
        Some(("authorize", _)) => {
            let settings = load_settings(&cfg_folder)?;
            run_authorize(&settings).await?;
            Ok(())
        }
        Some(("config", _)) => {
            println!("\x1b[1m\x1b[34mConfiguring radiolist...\x1b[0m");
            create_config(cfg_folder)
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn load_settings(cfg_folder: &ConfigFolder) -> Result<Settings, Box<dyn std::error::Error>> {
    if !cfg_folder.config_file.exists() {
        log::debug!(
            "No configuration at {}, using defaults and environment",
            cfg_folder.config_file.display()
        );
    }
    get_configuration(&cfg_folder.config_file)
        .map_err(|e| format!("Unable to parse configuration file: {e}").into())
}

fn render_request(args: &ArgMatches) -> RenderRequest {
    RenderRequest {
        input: args.get_one::<PathBuf>("input").cloned(),
        from_dump: args.get_flag("from-dump"),
        html_path: args.get_one::<PathBuf>("html").cloned(),
        dump_path: args.get_one::<PathBuf>("dump").cloned(),
    }
}

fn print_usage() {
    println!("\x1b[1m\x1b[31mInvalid command!\x1b[0m\n");
    println!("📖 Available Commands:");
    println!("  \x1b[1m\x1b[32mradiolist render [INPUT]\x1b[0m - 🖼️  Render the playlist page");
    println!("  \x1b[1m\x1b[32mradiolist dedupe\x1b[0m         - 🧹 Remove duplicate Spotify playlists");
    println!("  \x1b[1m\x1b[32mradiolist purge\x1b[0m          - 🗑️  Remove all radiolist playlists");
    println!("  \x1b[1m\x1b[32mradiolist authorize\x1b[0m      - 🔑 Obtain a Spotify refresh token");
    println!("  \x1b[1m\x1b[32mradiolist config\x1b[0m         - 🛠️  Create or update configuration file");
}
