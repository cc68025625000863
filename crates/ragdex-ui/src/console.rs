//! Terminal helpers shared by the indexing console and the agent prompt

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use ragdex_core::Result;

/// Display a boxed banner sized to the terminal
pub fn display_banner(title: &str, lines: &[&str]) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4)).max(24);
    let inner = banner_width - 2;

    let top_border = format!("┌{}┐", "─".repeat(inner));
    let bottom_border = format!("└{}┘", "─".repeat(inner));
    let empty_line = format!("│{}│", " ".repeat(inner));
    let padded = |text: &str| {
        let width = text.chars().count();
        format!("│  {}{}│", text, " ".repeat(inner.saturating_sub(width + 2)))
    };

    println!();
    println!("{}", top_border.blue());
    println!("{}", padded(title).blue().bold());
    println!("{}", empty_line.blue());
    for line in lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
        } else {
            println!("{}", padded(line).blue());
        }
    }
    println!("{}", bottom_border.blue());
    println!();
}

/// Read one line after printing `label`
pub fn prompt(label: &str) -> Result<String> {
    print!("{} ", format!("{}:", label).cyan());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Read lines until one holding a single `.`
pub fn prompt_multiline(label: &str) -> Result<String> {
    println!(
        "{} {}",
        format!("{}:", label).cyan(),
        "(finish with a line containing only '.')".dimmed()
    );

    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line == "." {
            break;
        }
        lines.push(line.to_string());
    }
    Ok(lines.join("\n"))
}

/// Line input with ↑/↓ history navigation; Esc returns an empty line.
///
/// Falls back to a plain line read when stdin is not a terminal.
pub fn read_input_with_history(label: &str, history: &mut Vec<String>) -> Result<String> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    let label = format!("{}>", label);
    enable_raw_mode()?;
    let result = edit_line(&label, history);
    disable_raw_mode()?;
    println!();

    let input = result?;
    if !input.is_empty() {
        history.push(input.clone());
    }
    Ok(input)
}

fn edit_line(label: &str, history: &[String]) -> Result<String> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    redraw(label, &input, 0)?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        let previous_width = input.chars().count();

        match key_event.code {
            KeyCode::Enter => return Ok(input),
            KeyCode::Esc => return Ok(String::new()),
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(String::new());
            }
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Up if !history.is_empty() => {
                let new_index = match history_index {
                    None => history.len() - 1,
                    Some(idx) => idx.saturating_sub(1),
                };
                history_index = Some(new_index);
                input = history[new_index].clone();
            }
            KeyCode::Down => match history_index {
                Some(idx) if idx + 1 < history.len() => {
                    history_index = Some(idx + 1);
                    input = history[idx + 1].clone();
                }
                Some(_) => {
                    history_index = None;
                    input.clear();
                }
                None => {}
            },
            _ => continue,
        }

        redraw(label, &input, previous_width)?;
    }
}

fn redraw(label: &str, input: &str, previous_width: usize) -> Result<()> {
    let clear = " ".repeat(previous_width + 1);
    print!(
        "\r{} {}\r{} {}",
        label.green().bold(),
        clear,
        label.green().bold(),
        input
    );
    io::stdout().flush()?;
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✅".green(), message);
}

pub fn print_failure(message: &str) {
    println!("{} {}", "❌".red(), message.red());
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠️".yellow(), message.yellow());
}
