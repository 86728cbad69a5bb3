use number_guesser::cli::{CliInterface, parse_cli};
use number_guesser::logging::init_logging;
use number_guesser::tui::TuiInterface;
use number_guesser::{GameSession, game_loop, info_log};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = parse_cli();
    if let Err(e) = init_logging(&cli.log_target()) {
        eprintln!("Failed to set up logging: {e}");
    }
    info_log!("Starting with {:?}", cli);

    let defaults = cli.default_range();
    let mut session = GameSession::new();

    if cli.tui {
        let mut interface = match TuiInterface::new() {
            Ok(interface) => interface,
            Err(e) => {
                eprintln!("Failed to start the terminal interface: {e}");
                return ExitCode::FAILURE;
            }
        };
        game_loop(&mut session, defaults, &mut interface);
    } else {
        let stdin = io::stdin();
        let mut interface = CliInterface::new(stdin.lock());
        let stats = game_loop(&mut session, defaults, &mut interface);
        println!(
            "Goodbye! Games won: {}, games failed: {}",
            stats.games_won, stats.games_failed
        );
    }
    ExitCode::SUCCESS
}
