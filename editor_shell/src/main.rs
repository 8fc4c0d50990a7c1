//! Codepad shell - drive an editing session from stdin.
//!
//! Usage: codepad [FILE]
//!
//! Reads one command per line (see `help`), applies it to the session,
//! and prints the document after every mutating command.

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};

use codepad_core::{ActionArg, Editor, User};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting codepad shell");

    let args: Vec<String> = env::args().collect();
    let mut editor = Editor::new(User::new("local", "Local", "#4aa3ff"));
    let mut acting = "local".to_string();

    if let Some(path) = args.get(1) {
        match fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Opening file: {path}");
                editor.set_value(&text);
            }
            Err(e) => log::error!("Failed to open '{path}': {e}"),
        }
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("stdin: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "quit" {
            break;
        }
        if !run_command(&mut editor, &mut acting, line) {
            continue;
        }
        print_value(&editor);
    }

    log::info!("codepad shell exited");
}

/// Executes one command. Returns true when the document should be
/// reprinted.
fn run_command(editor: &mut Editor, acting: &mut String, line: &str) -> bool {
    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or("").trim();

    let result = match command {
        "help" => {
            print_help();
            return false;
        }
        "show" => return true,
        "as" => {
            if editor.user(rest).is_some() {
                *acting = rest.to_string();
                log::info!("acting as {rest}");
            } else {
                log::error!("no such user: {rest}");
            }
            return false;
        }
        "user" => {
            let fields: Vec<&str> = rest.split_whitespace().collect();
            match fields.as_slice() {
                ["add", id, name] => {
                    editor.add_user(User::new(*id, *name, "#ff8844"));
                }
                ["add", id, name, color] => {
                    editor.add_user(User::new(*id, *name, *color));
                }
                ["list"] => {
                    for user in editor.users() {
                        println!(
                            "{} ({}) cursors={:?}",
                            user.id,
                            user.display_name,
                            editor.cursor_positions(&user.id)
                        );
                    }
                }
                _ => log::error!("usage: user add ID NAME [COLOR] | user list"),
            }
            return false;
        }
        "lang" => {
            editor.set_language(rest);
            return false;
        }
        "suggest" => {
            match editor.suggest(acting) {
                Some(hit) => println!("suggest: {:?}", hit.text),
                None => println!("suggest: none"),
            }
            return false;
        }
        "brackets" => {
            let offset = rest.parse().unwrap_or(0);
            match editor.find_complements(offset) {
                Some((open, close)) => println!("brackets: {open}..{close}"),
                None => println!("brackets: none"),
            }
            return false;
        }
        "snapshot" => {
            match serde_json::to_string_pretty(&editor.snapshot()) {
                Ok(json) => println!("{json}"),
                Err(e) => log::error!("snapshot: {e}"),
            }
            return false;
        }
        "undo" => editor.goto_history(acting, -1),
        "redo" => editor.goto_history(acting, 1),
        "insert" => perform(editor, acting, "InsertText", &[unescape(rest).into()]),
        "newline" => perform(editor, acting, "InsertText", &["\n".into()]),
        "remove" => match rest.parse::<i64>() {
            Ok(n) => perform(editor, acting, "RemoveText", &[n.into()]),
            Err(_) => {
                log::error!("usage: remove AMOUNT");
                return false;
            }
        },
        "select" => {
            let fields: Vec<i64> = rest
                .split_whitespace()
                .filter_map(|f| f.parse().ok())
                .collect();
            match fields.as_slice() {
                [pivot, position] => perform(
                    editor,
                    acting,
                    "Select",
                    &[(*pivot).into(), (*position).into()],
                ),
                _ => {
                    log::error!("usage: select PIVOT POSITION");
                    return false;
                }
            }
        }
        "move" => {
            let fields: Vec<&str> = rest.split_whitespace().collect();
            let (dir, amount) = match fields.as_slice() {
                [dir] => (*dir, 1i64),
                [dir, n] => (*dir, n.parse().unwrap_or(1)),
                _ => {
                    log::error!("usage: move DIR [N]");
                    return false;
                }
            };
            perform(editor, acting, "MoveCursors", &[dir.into(), amount.into()])
        }
        "word" => perform(editor, acting, "MoveCursorsByWord", &[rest.into()]),
        "line" => perform(editor, acting, "MoveCursorsByLine", &[rest.into()]),
        "doc" => perform(editor, acting, "MoveCursorsByDocument", &[rest.into()]),
        "cursor" => {
            let fields: Vec<&str> = rest.split_whitespace().collect();
            match fields.as_slice() {
                ["add"] => perform(editor, acting, "CreateCursor", &[]),
                ["add", pos] => match pos.parse::<i64>() {
                    Ok(n) => perform(editor, acting, "CreateCursor", &[n.into()]),
                    Err(_) => {
                        log::error!("usage: cursor add [POS]");
                        return false;
                    }
                },
                ["next"] => perform(editor, acting, "CreateNextCursor", &[]),
                ["drop"] => perform(editor, acting, "DestroyLastCursor", &[]),
                ["reset"] => perform(editor, acting, "ResetCursor", &[]),
                _ => {
                    log::error!("usage: cursor add [POS] | next | drop | reset");
                    return false;
                }
            }
        }
        "indent" => perform(editor, acting, "AddIndent", &[]),
        "unindent" => perform(editor, acting, "RemoveIndent", &[]),
        "comment" => perform(editor, acting, "ToggleComment", &[]),
        _ => {
            log::error!("unknown command: {command} (try `help`)");
            return false;
        }
    };

    match result {
        Ok(_) => true,
        Err(e) => {
            log::error!("{e}");
            false
        }
    }
}

fn perform(
    editor: &mut Editor,
    acting: &str,
    name: &str,
    args: &[ActionArg],
) -> Result<String, codepad_core::EditorError> {
    editor.perform_action(acting, name, args)
}

fn print_value(editor: &Editor) {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "--- {} chars ---", editor.value().chars().count());
    let _ = writeln!(out, "{}", editor.value());
    let _ = writeln!(out, "---");
}

fn print_help() {
    println!(
        "commands:\n\
         \x20 insert TEXT | newline | remove N\n\
         \x20 select P Q | move DIR [N] | word DIR | line DIR | doc DIR\n\
         \x20 cursor add [POS] | cursor next | cursor drop | cursor reset\n\
         \x20 indent | unindent | comment\n\
         \x20 undo | redo | lang ID | suggest | brackets OFFSET\n\
         \x20 user add ID NAME [COLOR] | user list | as ID\n\
         \x20 snapshot | show | help | quit"
    );
}

/// Turns `\n` and `\t` escapes in a command argument into real chars.
fn unescape(s: &str) -> String {
    s.replace("\\n", "\n").replace("\\t", "\t")
}
