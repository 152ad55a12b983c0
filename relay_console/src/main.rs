// Legend for various fix-this comments:
//   * "TODO" - bug or missing crucial feature.
//   * "Improvement potential" - missing nice-to-have feature or an opportunity
//       to make code better or faster.
//   * "Rust-upgrade" - place where code can be improved using a Rust feature
//       that is not implemented or stabilized yet.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod client_main;
mod database;
mod http_server_state;
mod server_config;
mod server_main;

use clap::{Command, arg};


fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .filter_module("sqlx::query", log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let matches = Command::new("Chess relay")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about("Two-player chess move relay: server and polling console client")
        .subcommand_required(true)
        .subcommand(Command::new("server").about("Run as server").arg(
            arg!(<config_file> "Path to the configuration file: yaml-serialized ServerConfig."),
        ))
        .subcommand(
            Command::new("client")
                .about("Join a game as a console client")
                .arg(arg!(<server_url> "Relay URL, e.g. http://localhost:38618/"))
                .arg(
                    arg!(--"poll-interval" <interval> "How often to poll the server, e.g. 500ms")
                        .value_parser(humantime::parse_duration)
                        .default_value("1s"),
                ),
        )
        .subcommand(
            Command::new("reset")
                .about("Clear session markers so that a new game can be requested")
                .arg(arg!(<config_file> "Path to the server configuration file.")),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("server", sub_matches)) => {
            let config = server_config::read_config_file(
                sub_matches.get_one::<String>("config_file").unwrap(),
            )?;
            server_main::run(config);
            Ok(())
        }
        Some(("client", sub_matches)) => client_main::run(client_main::ClientConfig {
            server_url: sub_matches.get_one::<String>("server_url").unwrap().clone(),
            poll_interval: *sub_matches.get_one("poll-interval").unwrap(),
        }),
        Some(("reset", sub_matches)) => server_main::reset(server_config::read_config_file(
            sub_matches.get_one::<String>("config_file").unwrap(),
        )?),
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    }
}
