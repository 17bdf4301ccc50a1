use crate::terminal::Terminal;
use crossterm::style::Color;

/// Keys handled by the shell regardless of the active view
pub const GLOBAL_HELP: &str = "\
GENERAL
─────────────────
v           Globe / map
t           Team menu
1-2         Pick batch (menu open)
?           Toggle help
q           Quit";

/// Centered help box drawn into the back buffer over whatever is there.
/// Sections in `help_text` are separated by blank lines.
pub fn render_help_overlay(term: &mut Terminal, width: u16, height: u16, help_text: &str) {
    if help_text.is_empty() {
        return;
    }

    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4;
    let box_height = lines.len() + 2;

    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;

    let border_color = Some(Color::White);
    let (x0, y0) = (start_x as i32, start_y as i32);
    let (x1, y1) = (x0 + box_width as i32 - 1, y0 + box_height as i32 - 1);

    term.set(x0, y0, '┌', border_color, false);
    term.set(x1, y0, '┐', border_color, false);
    term.set(x0, y1, '└', border_color, false);
    term.set(x1, y1, '┘', border_color, false);
    for x in x0 + 1..x1 {
        term.set(x, y0, '─', border_color, false);
        term.set(x, y1, '─', border_color, false);
    }

    for (i, line) in lines.iter().enumerate() {
        let y = y0 + 1 + i as i32;
        term.set(x0, y, '│', border_color, false);
        term.set(x1, y, '│', border_color, false);

        // section titles are the lines followed by a rule
        let heading = lines.get(i + 1).is_some_and(|next| next.starts_with('─'));
        let padded = format!(" {:<width$} ", line, width = max_width);
        term.set_str(x0 + 1, y, &padded, Some(if heading { Color::White } else { Color::Grey }), heading);
    }
}
