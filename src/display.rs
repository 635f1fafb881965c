use console::style;
use termimad::MadSkin;

const EXAMPLE_PROMPTS: &[&str] = &[
    "Add a new todo to buy milk",
    "Mark todo #1 as complete",
    "Update the description of todo #2 to high priority",
    "Delete todo #3",
    "Show my pending todos",
    "What's on my todo list?",
];

fn is_wide(c: char) -> bool {
    matches!(c,
        '\u{1100}'..='\u{115F}'
        | '\u{2E80}'..='\u{A4CF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FE30}'..='\u{FE4F}'
        | '\u{FF00}'..='\u{FF60}'
        | '\u{FFE0}'..='\u{FFE6}'
        | '\u{1F300}'..='\u{1FAFF}'
        | '\u{20000}'..='\u{3FFFD}')
}

/// Terminal columns taken by `s`; CJK and emoji count double.
pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

/// Splits one line into pieces no wider than `max_width`, preferring to
/// break at spaces.
pub fn wrap_line(line: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut pieces = Vec::new();
    let mut remaining = line;

    while display_width(remaining) > max_width {
        let mut width = 0;
        let mut hard_end = 0;
        let mut last_space = None;
        for (pos, ch) in remaining.char_indices() {
            let w = if is_wide(ch) { 2 } else { 1 };
            if width + w > max_width {
                break;
            }
            if ch == ' ' {
                last_space = Some(pos);
            }
            width += w;
            hard_end = pos + ch.len_utf8();
        }

        match last_space.filter(|&pos| pos > 0) {
            Some(pos) => {
                pieces.push(remaining[..pos].to_string());
                remaining = remaining[pos + 1..].trim_start();
            }
            None => {
                // a single glyph wider than the box still has to move forward
                let end = if hard_end == 0 {
                    remaining.chars().next().map_or(0, char::len_utf8)
                } else {
                    hard_end
                };
                pieces.push(remaining[..end].to_string());
                remaining = &remaining[end..];
            }
        }
    }

    if !remaining.is_empty() || pieces.is_empty() {
        pieces.push(remaining.to_string());
    }
    pieces
}

fn terminal_width() -> usize {
    console::Term::stdout().size().1 as usize
}

/// Startup banner for the interactive modes.
pub fn display_banner(mode: &str, provider: &str, model: &str, store: &str, count: usize) {
    let rule = "=".repeat(56);
    println!("{}", style(&rule).dim());
    println!("{}", style(format!("todochat · {}", mode)).bold().cyan());
    println!("{}", style(&rule).dim());
    println!("{} {} ({})", style("Assistant:").bold(), provider, model);
    println!(
        "{} {} ({} todo{})",
        style("Store:").bold(),
        store,
        count,
        if count == 1 { "" } else { "s" }
    );
    println!("\nYou can now use natural language to manage your todos!");
    println!("Examples:");
    for example in EXAMPLE_PROMPTS {
        println!("  - {}", style(example).italic());
    }
    println!(
        "\nType {} for commands, {} to quit.",
        style("/help").bold(),
        style("exit").bold()
    );
    println!("{}", style("-".repeat(56)).dim());
}

/// Boxed plain-text reply.
pub fn display_response(response: &str) {
    let max_width = terminal_width().saturating_sub(4).clamp(40, 120);
    let inner = max_width.saturating_sub(4);

    let lines: Vec<String> = response
        .lines()
        .flat_map(|line| wrap_line(line, inner))
        .collect();
    let content_width = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);
    let box_width = max_width.min(content_width + 4).max(4);

    let top = format!("┌{}┐", "─".repeat(box_width - 2));
    let bottom = format!("└{}┘", "─".repeat(box_width - 2));

    println!("{}", style(&top).dim().blue());
    for line in &lines {
        let padding = box_width.saturating_sub(display_width(line) + 3);
        println!("│ {}{}│", style(line).white(), " ".repeat(padding));
    }
    println!("{}", style(&bottom).dim().blue());
}

pub fn display_markdown(response: &str) {
    let skin = MadSkin::default();
    skin.print_text(response);
}

fn looks_like_markdown(text: &str) -> bool {
    text.contains("```")
        || text.contains('`')
        || text.contains("**")
        || text.lines().any(|line| {
            let line = line.trim_start();
            line.starts_with('#') || line.starts_with("- ") || line.starts_with("* ")
        })
}

/// Prints an assistant reply, rendering markdown when the reply uses it.
pub fn display_reply(response: &str) {
    if looks_like_markdown(response) {
        display_markdown(response);
    } else {
        display_response(response);
    }
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("error:").bold().red(), message);
}
