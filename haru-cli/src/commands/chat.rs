use anyhow::Result;
use chrono::Local;
use dialoguer::Input;
use haru_core::Compiler;
use owo_colors::OwoColorize;
use tracing::debug;

use crate::commands::{ask, list, memory, remove};
use crate::config::HaruConfig;
use crate::store::Store;

const HELP: &str = "\
  20일 9시 면접, 1시 시험         register events
  6월 20일 시험까지 수학 2 영어 1  spread study hours before an exam
  토익 공부계획 14일 하루 2시간    daily study plan
  시험까지 며칠 남았어?           D-day
  list | memory | memory reset | remove <id> | exit";

/// Session commands handled without the compiler.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ChatCommand {
    Help,
    List,
    Memory,
    ResetMemory,
    Remove(u64),
    Exit,
}

impl ChatCommand {
    fn parse(line: &str) -> Option<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["help" | "도움말" | "?"] => Some(ChatCommand::Help),
            ["list" | "목록" | "일정" | "보여" | "보여줘"] | ["일정", "보여줘"] => {
                Some(ChatCommand::List)
            }
            ["memory" | "기억"] => Some(ChatCommand::Memory),
            ["memory", "reset"] | ["기억", "초기화"] => Some(ChatCommand::ResetMemory),
            ["remove" | "rm", id] | [id, "삭제"] => {
                id.trim_start_matches('#').parse().ok().map(ChatCommand::Remove)
            }
            ["exit" | "quit" | "종료"] => Some(ChatCommand::Exit),
            _ => None,
        }
    }
}

pub fn run(config: &HaruConfig, store: &Store, verbose: bool) -> Result<()> {
    let compiler = Compiler::new(config.planner.clone());
    println!("{}", "haru chat. Type help for examples, exit to leave.".dimmed());

    loop {
        let line: String = match Input::new()
            .with_prompt("haru")
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            // stdin closed or interrupted
            Err(e) => {
                debug!(error = %e, "prompt closed");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = match ChatCommand::parse(line) {
            Some(ChatCommand::Exit) => break,
            Some(ChatCommand::Help) => {
                println!("{}", HELP.dimmed());
                Ok(())
            }
            Some(ChatCommand::List) => list::run(store, None),
            Some(ChatCommand::Memory) => memory::show(store),
            Some(ChatCommand::ResetMemory) => memory::reset(store),
            Some(ChatCommand::Remove(id)) => remove::run(store, id),
            None => {
                let now = Local::now().naive_local();
                ask::handle(&compiler, store, line, now, verbose).map(|lines| {
                    for line in lines.into_iter().flatten() {
                        println!("{line}");
                    }
                })
            }
        };

        // storage errors end this turn, not the session
        if let Err(e) = result {
            println!("{}", format!("Error: {e:#}").red());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_commands() {
        assert_eq!(ChatCommand::parse("help"), Some(ChatCommand::Help));
        assert_eq!(ChatCommand::parse("도움말"), Some(ChatCommand::Help));
        assert_eq!(ChatCommand::parse("list"), Some(ChatCommand::List));
        assert_eq!(ChatCommand::parse("일정 보여줘"), Some(ChatCommand::List));
        assert_eq!(ChatCommand::parse("memory"), Some(ChatCommand::Memory));
        assert_eq!(ChatCommand::parse("memory reset"), Some(ChatCommand::ResetMemory));
        assert_eq!(ChatCommand::parse("  종료 "), Some(ChatCommand::Exit));
    }

    #[test]
    fn remove_takes_an_id() {
        assert_eq!(ChatCommand::parse("remove 3"), Some(ChatCommand::Remove(3)));
        assert_eq!(ChatCommand::parse("rm #12"), Some(ChatCommand::Remove(12)));
        assert_eq!(ChatCommand::parse("3 삭제"), Some(ChatCommand::Remove(3)));
        assert_eq!(ChatCommand::parse("remove 면접"), None);
    }

    #[test]
    fn utterances_go_to_the_compiler() {
        assert_eq!(ChatCommand::parse("20일 9시 면접"), None);
        assert_eq!(ChatCommand::parse("시험까지 며칠 남았어?"), None);
        assert_eq!(ChatCommand::parse("일정 추가해줘"), None);
    }
}
