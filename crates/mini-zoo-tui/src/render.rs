use crate::app::{App, HOME_ITEMS, SETTINGS_ITEMS};
use crate::art::{shade, Art};
use crate::theme::Palette;
use crossterm::{
    cursor::{Hide, MoveTo},
    execute, queue,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use mini_zoo_core::catalog::MAX_PAWS;
use mini_zoo_core::progression::TITLE;
use mini_zoo_core::{ImageState, PuzzleSession, Screen};
use std::io::{self, Write};

pub fn render(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(stdout, Hide)?;

    match app.game.screen() {
        // Redrawn in full every frame, no clear needed
        Screen::Win => render_win_screen(stdout, app, term_width, term_height)?,
        screen => {
            execute!(
                stdout,
                SetBackgroundColor(app.palette.bg),
                Clear(ClearType::All)
            )?;
            match screen {
                Screen::Splash => render_splash(stdout, app, term_width, term_height)?,
                Screen::Home => render_home(stdout, app, term_width, term_height)?,
                Screen::ThemeSelect => render_theme_select(stdout, app, term_width, term_height)?,
                Screen::LevelSelect => render_level_select(stdout, app, term_width, term_height)?,
                Screen::Puzzle => render_puzzle(stdout, app, term_width, term_height)?,
                Screen::Collection => render_collection(stdout, app, term_width, term_height)?,
                Screen::Settings => render_settings(stdout, app, term_width, term_height)?,
                Screen::Win => {}
            }
        }
    }

    if let Some(ref msg) = app.message {
        render_message(stdout, &app.palette, msg, term_width)?;
    }

    if app.bell {
        queue!(stdout, Print('\x07'))?;
        app.bell = false;
    }

    stdout.flush()
}

fn text_width(text: &str) -> u16 {
    text.chars().count() as u16
}

fn centered(
    stdout: &mut io::Stdout,
    y: u16,
    text: &str,
    fg: Color,
    bg: Color,
    term_width: u16,
) -> io::Result<()> {
    let x = term_width.saturating_sub(text_width(text)) / 2;
    queue!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(fg),
        SetBackgroundColor(bg),
        Print(text)
    )
}

/// Key hints along the bottom row
fn render_controls(
    stdout: &mut io::Stdout,
    palette: &Palette,
    hints: &[(&str, &str)],
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let width: u16 = hints
        .iter()
        .map(|(k, label)| text_width(k) + text_width(label) + 5)
        .sum();
    let mut x = term_width.saturating_sub(width) / 2;
    let y = term_height.saturating_sub(1);

    queue!(stdout, SetBackgroundColor(palette.bg))?;
    for (key, label) in hints {
        queue!(
            stdout,
            MoveTo(x, y),
            SetForegroundColor(palette.key),
            Print(format!("[{}]", key)),
            SetForegroundColor(palette.info),
            Print(format!(" {}  ", label))
        )?;
        x += text_width(key) + text_width(label) + 5;
    }
    Ok(())
}

fn render_message(
    stdout: &mut io::Stdout,
    palette: &Palette,
    msg: &str,
    term_width: u16,
) -> io::Result<()> {
    let padded = format!("  {}  ", msg);
    let x = term_width.saturating_sub(text_width(&padded)) / 2;

    queue!(
        stdout,
        MoveTo(x, 0),
        SetForegroundColor(palette.fg),
        SetBackgroundColor(palette.selected_bg),
        Print(&padded)
    )
}

fn render_splash(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let p = &app.palette;
    let mid = term_height / 2;
    centered(stdout, mid.saturating_sub(1), TITLE, p.title, p.bg, term_width)?;

    // Paw prints walk across while the splash is up
    let steps = (app.game.now().as_millis() / 250) as usize % 6;
    let paws: Vec<&str> = (0..5).map(|i| if i < steps { "●" } else { "·" }).collect();
    centered(stdout, mid + 1, &paws.join(" "), p.paw, p.bg, term_width)?;
    centered(stdout, mid + 3, "press any key", p.info, p.bg, term_width)
}

fn render_home(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let p = &app.palette;
    let top = (term_height / 2).saturating_sub(5);
    centered(stdout, top, TITLE, p.title, p.bg, term_width)?;

    let collected = app.game.progress().unlocked_animals().len();
    let total = app.game.catalog().levels().len();
    let tally = format!("{} of {} animals found", collected, total);
    centered(stdout, top + 1, &tally, p.info, p.bg, term_width)?;

    for (i, item) in HOME_ITEMS.iter().enumerate() {
        let label = format!("  {:^14}  ", item);
        let bg = if i == app.selection { p.selected_bg } else { p.bg };
        centered(stdout, top + 4 + i as u16 * 2, &label, p.fg, bg, term_width)?;
    }

    render_controls(
        stdout,
        p,
        &[("↑↓", "Move"), ("Enter", "Choose"), ("q", "Quit")],
        term_width,
        term_height,
    )
}

fn render_theme_select(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let p = &app.palette;
    centered(stdout, 2, "Pick a world", p.title, p.bg, term_width)?;

    let catalog = app.game.catalog();
    for (i, theme) in catalog.themes().iter().enumerate() {
        let count = catalog.levels_for_theme(&theme.id).count();
        let unlocked = catalog
            .levels_for_theme(&theme.id)
            .filter(|l| app.game.progress().is_level_unlocked(&l.id))
            .count();
        let card = format!(
            "  {}  {} {:<10} {}/{} open  ",
            i + 1,
            theme.icon,
            theme.name,
            unlocked,
            count
        );
        let bg = if i == app.selection { p.selected_bg } else { p.bg };
        centered(
            stdout,
            5 + i as u16 * 2,
            &card,
            Palette::accent(theme.color),
            bg,
            term_width,
        )?;
    }

    render_controls(
        stdout,
        p,
        &[("1-9", "Pick"), ("Enter", "Open"), ("Esc", "Back")],
        term_width,
        term_height,
    )
}

fn render_level_select(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let p = &app.palette;
    let (title, accent) = match app.game.current_theme() {
        Some(theme) => (
            format!("{} {}", theme.icon, theme.name),
            Palette::accent(theme.color),
        ),
        None => ("Levels".to_string(), p.title),
    };
    centered(stdout, 2, &title, accent, p.bg, term_width)?;

    let tile_width: u16 = 18;
    let tiles = app.game.level_tiles();
    let per_row = (term_width / (tile_width + 2)).clamp(1, 4) as usize;
    let grid_width = per_row as u16 * (tile_width + 2);
    let left = term_width.saturating_sub(grid_width) / 2;

    for (i, tile) in tiles.iter().enumerate() {
        let x = left + (i % per_row) as u16 * (tile_width + 2);
        let y = 5 + (i / per_row) as u16 * 5;
        let bg = if i == app.selection { p.selected_bg } else { p.board_bg };
        let fg = if tile.unlocked { p.fg } else { p.locked };

        let name = if tile.unlocked {
            tile.animal_name.as_str()
        } else {
            "Locked"
        };
        let head = if tile.completed {
            format!("{} ✓", name)
        } else {
            name.to_string()
        };
        let pieces = format!("{} pieces", tile.piece_count);

        for (row, text) in [head.as_str(), pieces.as_str()].iter().enumerate() {
            queue!(
                stdout,
                MoveTo(x, y + row as u16),
                SetForegroundColor(fg),
                SetBackgroundColor(bg),
                Print(format!(" {:<w$}", text, w = tile_width as usize - 1))
            )?;
        }

        queue!(stdout, MoveTo(x, y + 2), SetBackgroundColor(bg), Print(" "))?;
        for paw in 0..MAX_PAWS {
            let color = if paw < tile.paws { p.paw } else { p.locked };
            queue!(stdout, SetForegroundColor(color), Print("● "))?;
        }
        let used = 1 + MAX_PAWS as u16 * 2;
        queue!(
            stdout,
            Print(" ".repeat(tile_width.saturating_sub(used) as usize))
        )?;
    }

    render_controls(
        stdout,
        p,
        &[("←→", "Move"), ("Enter", "Play"), ("Esc", "Back")],
        term_width,
        term_height,
    )
}

fn render_puzzle(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let p = &app.palette;
    let animal = app
        .game
        .current_level()
        .map(|l| l.animal_name.as_str())
        .unwrap_or("");

    match app.game.image_state() {
        ImageState::Failed(message) => {
            let mid = term_height / 2;
            for (i, line) in wrap_text(message, 40).iter().enumerate() {
                centered(stdout, mid + i as u16, line, p.error, p.bg, term_width)?;
            }
            return render_controls(
                stdout,
                p,
                &[("r", "Try again"), ("Esc", "Back")],
                term_width,
                term_height,
            );
        }
        ImageState::Ready(_) => {}
        _ => {
            let text = format!("Painting your {}...", animal);
            return centered(stdout, term_height / 2, &text, p.info, p.bg, term_width);
        }
    }

    let (Some(puzzle), Some(art)) = (app.game.puzzle(), app.art.as_ref()) else {
        return Ok(());
    };

    let header = format!("{}  ·  pieces left: {}", animal, puzzle.pieces_left());
    centered(stdout, 0, &header, p.title, p.bg, term_width)?;

    render_board(stdout, app, puzzle, art)?;

    render_controls(
        stdout,
        p,
        &[
            ("mouse", "Drag"),
            ("Tab", "Pick"),
            ("arrows", "Move"),
            ("Enter", "Drop"),
            ("h", "Hint"),
            ("Esc", "Back"),
        ],
        term_width,
        term_height,
    )
}

fn render_board(
    stdout: &mut io::Stdout,
    app: &App,
    puzzle: &PuzzleSession,
    art: &Art,
) -> io::Result<()> {
    let p = &app.palette;
    let view = app.viewport;
    let canvas = puzzle.canvas_size();
    let layout = puzzle.layout();
    let hint = app.game.hint_visible();

    // Background and slot grid
    for row in view.origin_row..view.origin_row + view.rows {
        queue!(stdout, MoveTo(view.origin_col, row))?;
        for col in view.origin_col..view.origin_col + view.cols {
            let (x, y) = view.to_canvas(col, row);
            let on_canvas = (0.0..canvas).contains(&x) && (0.0..canvas).contains(&y);
            if !on_canvas {
                queue!(stdout, SetBackgroundColor(p.bg), Print(' '))?;
            } else if hint {
                queue!(
                    stdout,
                    SetBackgroundColor(shade(art.color_at(x, y), 0.55)),
                    Print(' ')
                )?;
            } else {
                let edge = x % layout.piece_width < view.units_per_col
                    || y % layout.piece_height < view.units_per_row
                    || canvas - x < view.units_per_col
                    || canvas - y < view.units_per_row;
                let ch = if edge { '·' } else { ' ' };
                queue!(
                    stdout,
                    SetForegroundColor(p.border),
                    SetBackgroundColor(p.board_bg),
                    Print(ch)
                )?;
            }
        }
    }

    // Pieces, snapped ones first
    for index in puzzle.draw_order() {
        let state = &puzzle.states()[index];
        let spec = &puzzle.pieces()[index];
        let (c0, r0) = view.to_cell(state.x, state.y);
        let (c1, r1) = view.to_cell(state.x + spec.width, state.y + spec.height);
        let (sx, sy) = spec.source_origin();

        for row in r0..r1 {
            for col in c0..c1 {
                if !view.contains_cell(col, row) {
                    continue;
                }
                let (cx, cy) = view.to_canvas(col as u16, row as u16);
                let color = art.color_at(sx + cx - state.x, sy + cy - state.y);
                let edge = col == c0 || col == c1 - 1 || row == r0 || row == r1 - 1;
                let ch = if state.dragging && edge { '░' } else { ' ' };
                queue!(
                    stdout,
                    MoveTo(col as u16, row as u16),
                    SetForegroundColor(p.fg),
                    SetBackgroundColor(color),
                    Print(ch)
                )?;
            }
        }
    }

    if hint || puzzle.is_solved() {
        let (col, row) = view.to_cell(canvas / 2.0, canvas / 2.0);
        if view.contains_cell(col, row) {
            queue!(
                stdout,
                MoveTo(col as u16, row as u16),
                SetForegroundColor(Color::White),
                SetBackgroundColor(shade(art.color_at(canvas / 2.0, canvas / 2.0), 0.55)),
                Print(art.initial())
            )?;
        }
    }

    Ok(())
}

fn render_win_screen(
    stdout: &mut io::Stdout,
    app: &mut App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    app.win_screen.resize(term_width, term_height);
    let p = &app.palette;
    let bg = p.bg;

    queue!(stdout, SetBackgroundColor(bg), Clear(ClearType::All))?;

    for particle in app.win_screen.particles() {
        if particle.is_visible(term_width, term_height) {
            queue!(
                stdout,
                MoveTo(particle.x as u16, particle.y as u16),
                SetForegroundColor(particle.color),
                SetBackgroundColor(bg),
                Print(particle.char)
            )?;
        }
    }

    let lines: Vec<&str> = app
        .win_screen
        .banner()
        .lines()
        .filter(|l| !l.is_empty())
        .collect();
    let banner_width = lines.iter().map(|l| text_width(l)).max().unwrap_or(40);
    let banner_x = term_width.saturating_sub(banner_width) / 2;
    let banner_y = 2;
    for (i, line) in lines.iter().enumerate() {
        queue!(
            stdout,
            MoveTo(banner_x, banner_y + i as u16),
            SetForegroundColor(app.win_screen.line_color(i)),
            SetBackgroundColor(bg),
            Print(line)
        )?;
    }

    let mut y = banner_y + lines.len() as u16 + 2;
    let message = app.win_screen.current_message();
    centered(stdout, y, message, app.win_screen.line_color(7), bg, term_width)?;
    y += 2;

    let unlock = app.game.last_unlock();
    if let Some(animal) = &unlock.animal {
        let text = format!("You found the {}!", animal);
        centered(stdout, y, &text, p.success, bg, term_width)?;
        y += 1;
    }
    if let Some(level) = unlock.level.as_deref().and_then(|id| app.game.catalog().level(id)) {
        let text = format!("Next up: {} ({} pieces)", level.animal_name, level.piece_count);
        centered(stdout, y, &text, p.info, bg, term_width)?;
    }

    let mut hints = Vec::new();
    if app.game.next_level_available() {
        hints.push(("Enter", "Next level"));
    }
    hints.push(("c", "Collection"));
    hints.push(("h", "Home"));
    render_controls(stdout, p, &hints, term_width, term_height)
}

fn render_collection(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let p = &app.palette;
    let entries = app.game.collection();
    let found = entries.iter().filter(|e| e.unlocked).count();

    centered(stdout, 2, "My Zoo", p.title, p.bg, term_width)?;
    let tally = format!("{} / {} animals", found, entries.len());
    centered(stdout, 3, &tally, p.info, p.bg, term_width)?;

    let cell: u16 = 14;
    let per_row = (term_width / cell).clamp(1, 5) as usize;
    let left = term_width.saturating_sub(per_row as u16 * cell) / 2;
    for (i, entry) in entries.iter().enumerate() {
        let x = left + (i % per_row) as u16 * cell;
        let y = 6 + (i / per_row) as u16 * 2;
        let fg = if entry.unlocked { p.success } else { p.locked };
        queue!(
            stdout,
            MoveTo(x, y),
            SetForegroundColor(fg),
            SetBackgroundColor(p.bg),
            Print(format!("{:^w$}", entry.label(), w = cell as usize))
        )?;
    }

    render_controls(stdout, p, &[("Esc", "Back")], term_width, term_height)
}

fn render_settings(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let p = &app.palette;
    let settings = app.game.settings();
    centered(stdout, 2, "Settings", p.title, p.bg, term_width)?;

    for (i, item) in SETTINGS_ITEMS.iter().enumerate() {
        let state = match i {
            0 => Some(settings.music),
            1 => Some(settings.effects),
            _ => None,
        };
        let label = match state {
            Some(true) => format!("  {:<12} [ON ]  ", item),
            Some(false) => format!("  {:<12} [OFF]  ", item),
            None => format!("  {:<18}  ", item),
        };
        let bg = if i == app.selection { p.selected_bg } else { p.bg };
        centered(stdout, 5 + i as u16 * 2, &label, p.fg, bg, term_width)?;
    }

    if let Some(notice) = app.game.notice() {
        centered(stdout, 12, notice, p.success, p.bg, term_width)?;
    }

    if app.game.gate().is_some() {
        render_gate(stdout, app, term_width, term_height)?;
        return Ok(());
    }

    render_controls(
        stdout,
        p,
        &[("m", "Music"), ("e", "Effects"), ("a", "Ads"), ("Esc", "Back")],
        term_width,
        term_height,
    )
}

/// Grown-ups only box over the settings screen
fn render_gate(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let Some(gate) = app.game.gate() else {
        return Ok(());
    };
    let p = &app.palette;

    let width: u16 = 34;
    let height: u16 = 9;
    let x = term_width.saturating_sub(width) / 2;
    let y = term_height.saturating_sub(height) / 2;
    let bg = Color::Rgb { r: 30, g: 30, b: 40 };

    for row in 0..height {
        queue!(
            stdout,
            MoveTo(x, y + row),
            SetBackgroundColor(bg),
            Print(" ".repeat(width as usize))
        )?;
    }

    queue!(
        stdout,
        SetForegroundColor(p.border),
        MoveTo(x, y),
        Print("┌"),
        Print("─".repeat(width as usize - 2)),
        Print("┐")
    )?;
    for row in 1..height - 1 {
        queue!(stdout, MoveTo(x, y + row), Print("│"))?;
        queue!(stdout, MoveTo(x + width - 1, y + row), Print("│"))?;
    }
    queue!(
        stdout,
        MoveTo(x, y + height - 1),
        Print("└"),
        Print("─".repeat(width as usize - 2)),
        Print("┘")
    )?;

    centered(stdout, y + 1, "Ask a grown-up", p.title, bg, term_width)?;
    centered(stdout, y + 3, &gate.question(), p.fg, bg, term_width)?;
    let field = format!("[ {:<2} ]", gate.answer());
    centered(stdout, y + 4, &field, p.key, bg, term_width)?;
    if let Some(error) = gate.error() {
        centered(stdout, y + 5, error, p.error, bg, term_width)?;
    }
    centered(stdout, y + 7, "Enter: check   Esc: cancel", p.info, bg, term_width)
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text(mini_zoo_core::image::RETRY_MESSAGE, 20);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 20));
        assert_eq!(lines.join(" "), mini_zoo_core::image::RETRY_MESSAGE);
    }
}
