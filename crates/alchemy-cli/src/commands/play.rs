//! Interactive alchemy session on top of [`SessionController`].

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use alchemy_application::{FusionOutcome, FusionService, SessionController, SkipReason};
use alchemy_core::catalog;
use alchemy_core::config::SessionConfig;
use alchemy_core::selection::ToggleOutcome;
use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::render;

const COMMANDS: [&str; 7] = [
    "/fuse", "/reset", "/history", "/catalog", "/status", "/help", "/quit",
];

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Fuse,
    Reset,
    History,
    Catalog,
    Status,
    Help,
    Quit,
    Empty,
    /// Anything else is a symbol or catalog number to toggle.
    Select(String),
    Unknown(String),
}

fn parse_command(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    match trimmed {
        "" => ReplCommand::Empty,
        "/fuse" => ReplCommand::Fuse,
        "/reset" => ReplCommand::Reset,
        "/history" => ReplCommand::History,
        "/catalog" => ReplCommand::Catalog,
        "/status" => ReplCommand::Status,
        "/help" => ReplCommand::Help,
        "/quit" | "quit" | "exit" => ReplCommand::Quit,
        other if other.starts_with('/') => ReplCommand::Unknown(other.to_string()),
        other => ReplCommand::Select(other.to_string()),
    }
}

/// Completion, highlighting and hints for slash commands.
struct AlchemyHelper;

impl Helper for AlchemyHelper {}

impl Completer for AlchemyHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for AlchemyHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for AlchemyHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            COMMANDS
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for AlchemyHelper {}

fn print_help() {
    println!("{}", "输入符号或编号选择素材（再次输入取消），选满两个后 /fuse 融合。".bright_black());
    println!("{}", format!("Commands: {}", COMMANDS.join(" ")).bright_black());
}

pub async fn run(service: Arc<FusionService>, config: SessionConfig) -> Result<()> {
    let controller = SessionController::with_config(service, config);

    let mut rl = Editor::new()?;
    rl.set_helper(Some(AlchemyHelper));

    println!("{}", "=== 表情包炼金术 ===".bright_magenta().bold());
    println!("{}", render::catalog_grid());
    print_help();
    println!();

    loop {
        let readline = rl.readline("⚗️ >> ");

        let line = match readline {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        };

        let command = parse_command(&line);
        if command != ReplCommand::Empty {
            let _ = rl.add_history_entry(line.as_str());
        }

        match command {
            ReplCommand::Empty => {}
            ReplCommand::Quit => break,
            ReplCommand::Help => print_help(),
            ReplCommand::Catalog => println!("{}", render::catalog_grid()),
            ReplCommand::History => println!("{}", render::history(&controller.history().await)),
            ReplCommand::Status => {
                println!("{}", render::slots(&controller.selection().await));
            }
            ReplCommand::Reset => {
                controller.reset().await;
                println!("{}", render::slots(&controller.selection().await));
            }
            ReplCommand::Select(input) => select(&controller, &input).await,
            ReplCommand::Fuse => fuse(&controller).await,
            ReplCommand::Unknown(cmd) => {
                println!("{}", format!("Unknown command: {cmd}").bright_black());
            }
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

async fn select(controller: &SessionController, input: &str) {
    if controller.current_result().await.is_some() {
        println!("{}", "Use /reset to start a new fusion.".yellow());
        return;
    }
    let symbol = match catalog::resolve(input) {
        Ok(symbol) => symbol,
        Err(err) => {
            println!("{}", err.to_string().red());
            return;
        }
    };
    match controller.toggle_select(symbol).await {
        ToggleOutcome::Rejected => println!("{}", "Both slots are taken.".yellow()),
        ToggleOutcome::Locked => println!("{}", "A fusion is in progress.".yellow()),
        ToggleOutcome::Added | ToggleOutcome::Removed => {}
    }
    println!("{}", render::slots(&controller.selection().await));
}

async fn fuse(controller: &SessionController) {
    if let Some(pair) = controller.selection().await.pair() {
        println!(
            "{}",
            format!("正在融合元素... {}", render::pair(&pair[0], &pair[1])).bright_black()
        );
    }
    match controller.run_fusion().await {
        FusionOutcome::Completed(entry) => println!("{}", render::result_card(&entry.result)),
        FusionOutcome::Failed(message) => {
            println!("{}", format!("⚠ {message}").red());
        }
        FusionOutcome::Skipped(SkipReason::IncompleteSelection(count)) => {
            println!("{}", format!("Select two symbols first ({count}/2).").yellow());
        }
        FusionOutcome::Skipped(SkipReason::InFlight) => {
            println!("{}", "A fusion is already in progress.".yellow());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("  /fuse "), ReplCommand::Fuse);
        assert_eq!(parse_command("quit"), ReplCommand::Quit);
        assert_eq!(parse_command(""), ReplCommand::Empty);
        assert_eq!(parse_command("🔥"), ReplCommand::Select("🔥".to_string()));
        assert_eq!(parse_command("12"), ReplCommand::Select("12".to_string()));
        assert_eq!(
            parse_command("/dance"),
            ReplCommand::Unknown("/dance".to_string())
        );
    }

    #[test]
    fn test_every_command_parses() {
        for cmd in COMMANDS {
            assert!(
                !matches!(parse_command(cmd), ReplCommand::Unknown(_)),
                "{cmd}"
            );
        }
    }
}
