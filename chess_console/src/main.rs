#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod play;
mod stress_test;
mod tui;

use anyhow::Context;
use chess_board::ChessRules;
use clap::{Command, arg};


fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let matches = Command::new("Chess")
        .version(clap::crate_version!())
        .about("Chess board console app")
        .subcommand_required(true)
        .subcommand(
            Command::new("play").about("Play a game in the terminal").arg(
                arg!(--"rules" <rules_file> "Path to a yaml-serialized ChessRules. Classic if omitted.")
                    .required(false),
            ),
        )
        .subcommand(
            Command::new("stress-test")
                .about("Play random games and verify internal consistency after every move")
                .arg(
                    arg!(-'n' --"games" <n> "Number of games to play")
                        .value_parser(1..=10_000)
                        .default_value("100"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("play", sub_matches)) => {
            let rules = match sub_matches.get_one::<String>("rules") {
                Some(filename) => read_rules_file(filename)?,
                None => ChessRules::classic(),
            };
            play::run(rules)
        }
        Some(("stress-test", sub_matches)) => stress_test::run(stress_test::StressTestConfig {
            num_games: *sub_matches.get_one::<i64>("games").unwrap() as usize,
        }),
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    }
}

fn read_rules_file(filename: &str) -> anyhow::Result<ChessRules> {
    let contents = std::fs::read_to_string(filename)
        .with_context(|| format!("Reading rules file {filename}"))?;
    serde_yaml::from_str(&contents).with_context(|| format!("Parsing rules file {filename}"))
}
