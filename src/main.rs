use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::thread;
use std::time::SystemTime;

use log::LevelFilter;
use numquest::events::{Channel, EventHandler};
use numquest::game::{FileStore, Session, SessionDeps, Settings};
use numquest::model::{ProfileUpdate, SessionCommand, SessionEvent};

enum Input {
    Command(SessionCommand),
    Stats,
    Status,
    Help,
    Quit,
}

fn init_logging() {
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        let level = if Settings::is_debug_mode() {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        };
        builder.filter_level(level);
    }
    builder.init();
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if let Ok(guess) = line.parse::<i64>() {
        return Some(Input::Command(SessionCommand::MakeGuess(guess)));
    }
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let input = match word {
        "new" => Input::Command(SessionCommand::StartNewGame),
        "continue" | "c" => Input::Command(SessionCommand::ContinueGame),
        "pause" => Input::Command(SessionCommand::PauseGame),
        "resume" => Input::Command(SessionCommand::ResumeGame),
        "restart" => Input::Command(SessionCommand::RestartLevel),
        "menu" => Input::Command(SessionCommand::GoToMainMenu),
        "reset" => Input::Command(SessionCommand::ResetProgress),
        "profile" => Input::Command(SessionCommand::UpdateProfile(ProfileUpdate {
            display_name: Some(rest.to_string()),
            ..ProfileUpdate::default()
        })),
        "stats" => Input::Stats,
        "status" | "" => Input::Status,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => return None,
    };
    Some(input)
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::GuessEvaluated(result) => match &result.hint {
            Some(hint) => println!("{}: {} ({})", result.guess, result.feedback.as_str(), hint),
            None => println!("{}: {}", result.guess, result.feedback.as_str()),
        },
        SessionEvent::LevelCompleted(result) => {
            let outcome = if result.won { "Solved" } else { "Failed" };
            println!(
                "{} level {} in {} attempts and {}s (accuracy {:.0}%). The number was {}.",
                outcome,
                result.level_number,
                result.attempts_used,
                result.time_used,
                result.accuracy * 100.0,
                result.target_number
            );
        }
        SessionEvent::LevelNumberChanged(level_number) => println!("Level {}", level_number),
        SessionEvent::ProfileChanged(profile) => println!("Playing as {}", profile.display_name),
        SessionEvent::ProgressReset => println!("Progress cleared."),
        _ => (),
    }
}

fn print_status(session: &Session) {
    let state = session.game_state();
    print!("[{}] level {}", session.phase(), session.level_number());
    if let Some(level) = &state.current_level {
        print!(
            ", {} mode, range [{}, {}], {} of {} attempts left, {}s",
            level.game_mode,
            level.range_min,
            level.range_max,
            state.attempts_remaining(),
            level.max_attempts,
            state.elapsed_time()
        );
        if let Some(limit) = level.time_limit {
            print!(" / {}s", limit);
        }
    }
    println!();
}

fn print_stats(session: &Session) {
    let stats = session.stats();
    let metrics = session.metrics();
    println!(
        "{} played, {} won ({:.0}%), streak {} (best {}), highest level {}",
        stats.levels_played,
        stats.levels_won,
        stats.win_rate() * 100.0,
        stats.current_streak,
        stats.best_streak,
        stats.highest_level
    );
    println!(
        "skill {:.2}, efficiency {:.2}, speed {:.2}, consistency {:.2}",
        metrics.skill_rating, metrics.efficiency, metrics.speed, metrics.consistency
    );
}

fn print_help() {
    println!("new | continue | <number> | pause | resume | restart | menu");
    println!("profile <name> | stats | status | reset | quit");
}

/// Waits out a deferred completion so its result shows before the next prompt.
fn settle(session: &mut Session) {
    while session.has_pending_completion() {
        if let Some(due) = session.next_wakeup() {
            if let Ok(wait) = due.duration_since(SystemTime::now()) {
                thread::sleep(wait);
            }
        }
        session.poll();
    }
}

fn main() {
    init_logging();

    let data_dir = Settings::data_dir();
    let settings = Settings::load(&data_dir).with_env_overrides();
    let store = Rc::new(FileStore::new(&data_dir));
    log::info!("Using data directory {:?}", data_dir);

    let (event_emitter, event_observer) = Channel::<SessionEvent>::new();
    let _printer = event_observer.subscribe(print_event);
    let mut session = Session::load(SessionDeps::standard(store), settings, event_emitter);

    println!("Hello, {}.", session.profile().display_name);
    if session.has_saved_game() {
        println!("A saved game is waiting; type 'continue'.");
    }
    print_help();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        // a failed flush only delays the prompt
        let _ = io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            break;
        };

        session.poll();
        match parse_input(&line) {
            Some(Input::Command(command)) => session.handle_event(&command),
            Some(Input::Stats) => print_stats(&session),
            Some(Input::Status) => print_status(&session),
            Some(Input::Help) => print_help(),
            Some(Input::Quit) => break,
            None => println!("Unknown command; type 'help'."),
        }
        settle(&mut session);
    }

    session.go_to_main_menu();
}
