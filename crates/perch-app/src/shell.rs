//! 대화형 셸.
//!
//! 표준 입력의 한 줄을 런타임 명령으로 바꿔 보내고, 화면 상태를 출력한다.

use chrono::{Local, NaiveDate};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::console::render_screen;
use crate::lifecycle::LifecycleManager;
use crate::runtime::{RuntimeCommand, ScreenState};

pub const HELP: &str = "\
commands:
  apps                         show the launcher screen
  hide|unhide|pin|uninstall|launch <package>
  show-hidden on|off
  resume | pause               simulate returning to / leaving the launcher
  dismiss                      close the assistant notification
  refresh                      refresh the app catalog
  todo add <text> | todo done <n> | todo rm <n>
  countdown add <name> <YYYY-MM-DD> | countdown rm <n>
  help | quit";

/// 입력 한 줄의 해석 결과
#[derive(Debug, PartialEq, Eq)]
pub enum ShellAction {
    Command(RuntimeCommand),
    Show,
    Help,
    Quit,
}

/// 입력 한 줄 해석. 빈 줄은 `Ok(None)`
pub fn parse_line(line: &str) -> Result<Option<ShellAction>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let package = |rest: &str| -> Result<String, String> {
        if rest.is_empty() || rest.contains(char::is_whitespace) {
            Err(format!("usage: {word} <package>"))
        } else {
            Ok(rest.to_string())
        }
    };

    let action = match word {
        "apps" | "ls" => ShellAction::Show,
        "help" | "?" => ShellAction::Help,
        "quit" | "exit" => ShellAction::Quit,
        "hide" => ShellAction::Command(RuntimeCommand::Hide(package(rest)?)),
        "unhide" => ShellAction::Command(RuntimeCommand::Unhide(package(rest)?)),
        "pin" => ShellAction::Command(RuntimeCommand::Pin(package(rest)?)),
        "uninstall" => ShellAction::Command(RuntimeCommand::Uninstall(package(rest)?)),
        "launch" | "open" => ShellAction::Command(RuntimeCommand::Launch(package(rest)?)),
        "resume" => ShellAction::Command(RuntimeCommand::Resume),
        "pause" => ShellAction::Command(RuntimeCommand::Pause),
        "dismiss" => ShellAction::Command(RuntimeCommand::Dismiss),
        "refresh" => ShellAction::Command(RuntimeCommand::Refresh),
        "show-hidden" => {
            let show = match rest {
                "on" | "true" | "yes" => true,
                "off" | "false" | "no" => false,
                _ => return Err("usage: show-hidden on|off".to_string()),
            };
            ShellAction::Command(RuntimeCommand::ShowHidden(show))
        }
        "todo" => parse_todo(rest)?,
        "countdown" => parse_countdown(rest)?,
        other => return Err(format!("unknown command: {other} (try 'help')")),
    };
    Ok(Some(action))
}

fn parse_todo(rest: &str) -> Result<ShellAction, String> {
    let usage = || "usage: todo add <text> | todo done <n> | todo rm <n>".to_string();
    let (sub, arg) = rest.split_once(char::is_whitespace).ok_or_else(usage)?;
    let arg = arg.trim();
    match sub {
        "add" if !arg.is_empty() => Ok(ShellAction::Command(RuntimeCommand::TodoAdd(
            arg.to_string(),
        ))),
        "done" => arg
            .parse()
            .map(|n| ShellAction::Command(RuntimeCommand::TodoToggle(n)))
            .map_err(|_| usage()),
        "rm" | "remove" => arg
            .parse()
            .map(|n| ShellAction::Command(RuntimeCommand::TodoRemove(n)))
            .map_err(|_| usage()),
        _ => Err(usage()),
    }
}

fn parse_countdown(rest: &str) -> Result<ShellAction, String> {
    let usage = || "usage: countdown add <name> <YYYY-MM-DD> | countdown rm <n>".to_string();
    let (sub, arg) = rest.split_once(char::is_whitespace).ok_or_else(usage)?;
    let arg = arg.trim();
    match sub {
        "add" => {}
        "rm" | "remove" => {
            return arg
                .parse()
                .map(|n| ShellAction::Command(RuntimeCommand::CountdownRemove(n)))
                .map_err(|_| usage());
        }
        _ => return Err(usage()),
    }
    let (name, date) = arg.rsplit_once(char::is_whitespace).ok_or_else(usage)?;
    let target = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| usage())?;
    Ok(ShellAction::Command(RuntimeCommand::CountdownAdd {
        name: name.trim().to_string(),
        target,
    }))
}

/// 표준 입력 루프. EOF 또는 quit 시 종료 신호를 보낸다
pub async fn run_shell(
    commands: mpsc::UnboundedSender<RuntimeCommand>,
    mut screen: watch::Receiver<ScreenState>,
    lifecycle: &LifecycleManager,
) -> std::io::Result<()> {
    // 구독 전에 보낸 종료 신호는 changed()로 깨어나지 않는다
    if lifecycle.is_shutting_down() {
        debug!("이미 종료 중, 셸 생략");
        return Ok(());
    }
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shutdown = lifecycle.subscribe();
    println!("{HELP}");

    loop {
        let line = tokio::select! {
            _ = shutdown.changed() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            debug!("표준 입력 종료");
            break;
        };

        match parse_line(&line) {
            Ok(None) => continue,
            Ok(Some(ShellAction::Show)) => {
                print!("{}", render_screen(&screen.borrow_and_update(), Local::now().date_naive()));
            }
            Ok(Some(ShellAction::Help)) => println!("{HELP}"),
            Ok(Some(ShellAction::Quit)) => break,
            Ok(Some(ShellAction::Command(command))) => {
                if commands.send(command).is_err() {
                    break;
                }
                // 처리 결과가 발행될 때까지 대기
                if screen.changed().await.is_err() {
                    break;
                }
                print!("{}", render_screen(&screen.borrow_and_update(), Local::now().date_naive()));
            }
            Err(usage) => eprintln!("{usage}"),
        }
    }

    lifecycle.shutdown();
    Ok(())
}
