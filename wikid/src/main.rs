// This file is part of the product Wikid.
// SPDX-FileCopyrightText: 2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{LevelFilter, info};
use std::io::Write;
use std::sync::Arc;

mod api;
mod app_state;
mod config;
mod runtime_paths;
mod store;
mod tags;
mod util;
mod wiki;

use app_state::AppState;
use config::{Config, ValidatedConfig};
use runtime_paths::RuntimePaths;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    if parsed_args.show_help {
        print!("{}", help_text());
        return 0;
    }

    let config = match Config::load(&parsed_args.runtime_root).and_then(Config::validate) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ Invalid configuration: {}", error);
            return 1;
        }
    };

    let runtime_paths = match RuntimePaths::from_root(&parsed_args.runtime_root) {
        Ok(paths) => paths,
        Err(error) => {
            eprintln!("❌ Invalid runtime directory: {}", error);
            return 1;
        }
    };

    let result = System::new().block_on(run_server(config, runtime_paths));
    match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    }
}

async fn run_server(
    config: ValidatedConfig,
    runtime_paths: RuntimePaths,
) -> std::io::Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    // Stable log line format across environments
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    log_startup_info(&config, &runtime_paths);

    let app_state = Arc::new(AppState::new(runtime_paths, &config));
    match app_state.wiki.warm_index() {
        Ok(page_count) => info!("✅ Tag index warmed over {} pages", page_count),
        Err(error) => {
            eprintln!("❌ Failed to build tag index: {}", error);
            return Err(std::io::Error::other(error.to_string()));
        }
    }

    let workers = config.server.workers;
    let bind_address = (config.server.host.clone(), config.server.port);

    let factory = {
        let app_state = app_state.clone();
        move || {
            App::new()
                .app_data(web::Data::from(app_state.clone()))
                .wrap(Logger::new(
                    r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
                ))
                .configure(api::configure)
        }
    };

    HttpServer::new(factory)
        .workers(workers)
        .bind(bind_address)?
        .run()
        .await
}

fn log_startup_info(config: &ValidatedConfig, runtime_paths: &RuntimePaths) {
    info!("Starting {}", config.app.name);
    info!("Workers: {}", config.server.workers);
    info!(
        "Listening on http://{}:{}",
        config.server.host, config.server.port
    );
    info!("Runtime root: {}", runtime_paths.root.display());
    info!(
        "Pages directory (canonical): {}",
        runtime_paths.pages_dir.display()
    );
    info!("Config file: {}", runtime_paths.config_file.display());
    info!("Page extension: .{}", config.storage.extension);

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {}", current_dir.display());
    }
}

struct ParsedArgs {
    runtime_root: std::path::PathBuf,
    show_help: bool,
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.iter().any(|arg| is_help_flag(arg)) {
        return Ok(ParsedArgs {
            runtime_root: std::path::PathBuf::from("."),
            show_help: true,
        });
    }

    let mut args = args.into_iter();
    let mut runtime_root = std::path::PathBuf::from(".");

    while let Some(arg) = args.next() {
        if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "-C requires a directory argument".to_string())?;
            runtime_root = std::path::PathBuf::from(value);
        } else {
            return Err(format!("unrecognized argument '{}'", arg));
        }
    }

    Ok(ParsedArgs {
        runtime_root,
        show_help: false,
    })
}

fn is_help_flag(arg: &str) -> bool {
    matches!(arg, "-h" | "--help" | "help")
}

fn help_text() -> String {
    [
        "wikid - file-backed personal wiki server",
        "",
        "Usage: wikid [-C <root>]",
        "",
        "  -C <root>   Runtime directory holding config.yaml and pages/ (default: .)",
        "  -h, --help  Show this help",
        "",
        "The PORT environment variable overrides the configured listen port.",
        "",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args_defaults_to_current_dir() {
        let parsed = parse_args_from(Vec::new()).unwrap();
        assert!(!parsed.show_help);
        assert_eq!(parsed.runtime_root, std::path::PathBuf::from("."));
    }

    #[test]
    fn parse_args_reads_runtime_root() {
        let parsed =
            parse_args_from(vec!["-C".to_string(), "/srv/wiki".to_string()]).unwrap();
        assert_eq!(parsed.runtime_root, std::path::PathBuf::from("/srv/wiki"));
    }

    #[test]
    fn parse_args_detects_help() {
        let parsed = parse_args_from(vec!["--help".to_string()]).unwrap();
        assert!(parsed.show_help);
    }

    #[test]
    fn parse_args_rejects_dangling_root_flag() {
        assert!(parse_args_from(vec!["-C".to_string()]).is_err());
    }

    #[test]
    fn parse_args_rejects_unknown_flags() {
        assert!(parse_args_from(vec!["--daemon".to_string()]).is_err());
    }
}
