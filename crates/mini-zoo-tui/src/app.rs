use crate::animations::WinScreen;
use crate::art::Art;
use crate::images::ImageWorker;
use crate::theme::Palette;
use crate::viewport::Viewport;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use mini_zoo_core::{
    resolve_with_fallback, Cue, ImageRef, PlaceholderSource, PointerId, Progression, Screen,
};
use std::time::Duration;
use tracing::debug;

/// Pointer used for keyboard-driven drags
pub const KEYBOARD: PointerId = PointerId(1);

/// Canvas units moved per arrow key press
const KEY_STEP: f32 = 16.0;

/// How long a status message stays up
const MESSAGE_TIME: Duration = Duration::from_secs(3);

pub const HOME_ITEMS: [&str; 4] = ["Play", "Collection", "Settings", "Quit"];
pub const SETTINGS_ITEMS: [&str; 3] = ["Music", "Effects", "Remove Ads"];

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// The main application state
pub struct App {
    /// Game state machine
    pub game: Progression,
    pub palette: Palette,
    /// Board placement for the current terminal size
    pub viewport: Viewport,
    /// Win screen animation
    pub win_screen: WinScreen,
    /// Highlighted entry on menu-like screens
    pub selection: usize,
    /// Message to display
    pub message: Option<String>,
    message_left: Duration,
    /// Picture for the current puzzle
    pub art: Option<Art>,
    art_for: Option<ImageRef>,
    images: Option<ImageWorker>,
    /// Last cell seen during a mouse drag
    mouse_cell: Option<(u16, u16)>,
    /// Piece picked up with the keyboard
    pub keyboard_piece: Option<usize>,
    last_screen: Screen,
    /// A sound cue is waiting to be played
    pub bell: bool,
}

impl App {
    pub fn new(game: Progression, images: ImageWorker, term_size: (u16, u16)) -> Self {
        let canvas = mini_zoo_core::CANVAS_SIZE;
        let screen = game.screen();
        let mut win_screen = WinScreen::new();
        win_screen.resize(term_size.0, term_size.1);
        Self {
            game,
            palette: Palette::zoo(),
            viewport: Viewport::fit(term_size.0, term_size.1, canvas),
            win_screen,
            selection: 0,
            message: None,
            message_left: Duration::ZERO,
            art: None,
            art_for: None,
            images: Some(images),
            mouse_cell: None,
            keyboard_piece: None,
            last_screen: screen,
            bell: false,
        }
    }

    /// Get the tick rate based on current screen
    pub fn get_tick_rate(&self) -> Duration {
        match self.game.screen() {
            Screen::Win | Screen::Puzzle | Screen::Splash => Duration::from_millis(33),
            _ => Duration::from_millis(100),
        }
    }

    /// Advance game time, deliver pictures and update animations
    pub fn tick(&mut self, dt: Duration) {
        self.game.tick(dt);
        self.pump_images();
        self.sync_screen();

        for cue in self.game.take_cues() {
            if matches!(cue, Cue::Snap | Cue::Win) {
                self.bell = true;
            }
        }

        if let Some(image) = self.game.image() {
            if self.art_for.as_ref() != Some(image) {
                let animal = self
                    .game
                    .current_level()
                    .map(|l| l.animal_name.as_str())
                    .unwrap_or("?");
                self.art = Some(Art::new(&image.as_uri(), animal, self.canvas_size()));
                self.art_for = Some(image.clone());
            }
        }

        if self.game.screen() == Screen::Win {
            self.win_screen.update();
        }

        if self.message.is_some() {
            self.message_left = self.message_left.saturating_sub(dt);
            if self.message_left.is_zero() {
                self.message = None;
            }
        }
    }

    fn pump_images(&mut self) {
        let requests = self.game.take_image_requests();
        for request in requests {
            let queued = self
                .images
                .as_ref()
                .is_some_and(|worker| worker.queue(request.clone()));
            if !queued {
                let resolution = resolve_with_fallback(&PlaceholderSource, &request.animal);
                self.game.deliver_image(request.ticket, resolution);
            }
        }

        if let Some(worker) = self.images.as_ref() {
            for (ticket, resolution) in worker.poll() {
                self.game.deliver_image(ticket, resolution);
            }
        }
    }

    /// Reset per-screen UI state after a screen change
    fn sync_screen(&mut self) {
        let screen = self.game.screen();
        if screen == self.last_screen {
            return;
        }
        debug!(from = ?self.last_screen, to = ?screen, "ui screen change");
        self.last_screen = screen;
        self.selection = 0;
        self.mouse_cell = None;
        self.keyboard_piece = None;
        if screen == Screen::Win {
            self.win_screen.reset();
        }
    }

    pub fn canvas_size(&self) -> f32 {
        self.game
            .puzzle()
            .map(|p| p.canvas_size())
            .unwrap_or(mini_zoo_core::CANVAS_SIZE)
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_left = MESSAGE_TIME;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.cancel_pointers();
        self.viewport = Viewport::fit(width, height, self.canvas_size());
        self.win_screen.resize(width, height);
    }

    /// Release every drag, e.g. when the terminal loses focus
    pub fn cancel_pointers(&mut self) {
        self.game.pointer_cancel(PointerId::MOUSE);
        self.game.pointer_cancel(KEYBOARD);
        self.mouse_cell = None;
        self.keyboard_piece = None;
    }

    /// Stop the image worker
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.images.take() {
            worker.finish();
        }
    }

    // ==================== Mouse ====================

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        let cell = (event.column, event.row);
        match self.game.screen() {
            Screen::Splash => {
                if matches!(event.kind, MouseEventKind::Down(_)) {
                    self.game.skip_splash();
                }
            }
            Screen::Puzzle => match event.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    let (x, y) = self.viewport.to_canvas(cell.0, cell.1);
                    if self.game.pointer_down(PointerId::MOUSE, x, y).is_some() {
                        self.mouse_cell = Some(cell);
                    }
                }
                MouseEventKind::Drag(MouseButton::Left) => {
                    if let Some(prev) = self.mouse_cell {
                        let (dx, dy) = self.viewport.delta(prev, cell);
                        self.game.pointer_move(PointerId::MOUSE, dx, dy);
                        self.mouse_cell = Some(cell);
                    }
                }
                MouseEventKind::Up(MouseButton::Left) => {
                    self.game.pointer_up(PointerId::MOUSE);
                    self.mouse_cell = None;
                }
                _ => {}
            },
            _ => {}
        }
        self.sync_screen();
    }

    // ==================== Keyboard ====================

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        let action = match self.game.screen() {
            Screen::Splash => {
                self.game.skip_splash();
                AppAction::Continue
            }
            Screen::Home => self.handle_home_key(key),
            Screen::ThemeSelect => self.handle_theme_key(key),
            Screen::LevelSelect => self.handle_level_key(key),
            Screen::Puzzle => self.handle_puzzle_key(key),
            Screen::Win => self.handle_win_key(key),
            Screen::Collection => self.handle_collection_key(key),
            Screen::Settings => self.handle_settings_key(key),
        };
        self.sync_screen();
        action
    }

    fn move_selection(&mut self, delta: i32, len: usize) {
        if len == 0 {
            return;
        }
        let len = len as i32;
        self.selection = (self.selection as i32 + delta).rem_euclid(len) as usize;
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> AppAction {
        let choice = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1, HOME_ITEMS.len());
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1, HOME_ITEMS.len());
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => Some(self.selection),
            KeyCode::Char('p') => Some(0),
            KeyCode::Char('c') => Some(1),
            KeyCode::Char('s') => Some(2),
            KeyCode::Char('q') | KeyCode::Esc => Some(3),
            _ => None,
        };

        match choice {
            Some(0) => self.game.navigate(Screen::ThemeSelect),
            Some(1) => self.game.navigate(Screen::Collection),
            Some(2) => self.game.navigate(Screen::Settings),
            Some(_) => return AppAction::Quit,
            None => {}
        }
        AppAction::Continue
    }

    fn handle_theme_key(&mut self, key: KeyEvent) -> AppAction {
        let count = self.game.catalog().themes().len();
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Esc | KeyCode::Backspace => self.game.back(),
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => self.move_selection(-1, count),
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => self.move_selection(1, count),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < count {
                    self.selection = index;
                    self.choose_theme();
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.choose_theme(),
            _ => {}
        }
        AppAction::Continue
    }

    fn choose_theme(&mut self) {
        let id = self
            .game
            .catalog()
            .themes()
            .get(self.selection)
            .map(|t| t.id.clone());
        if let Some(id) = id {
            self.game.select_theme(&id);
        }
    }

    fn handle_level_key(&mut self, key: KeyEvent) -> AppAction {
        let tiles = self.game.level_tiles();
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Esc | KeyCode::Backspace => self.game.back(),
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => self.move_selection(-1, tiles.len()),
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => {
                self.move_selection(1, tiles.len())
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(tile) = tiles.get(self.selection) {
                    if tile.unlocked {
                        self.game.select_level(&tile.id);
                    } else {
                        self.show_message("Locked! Finish the level before it first.");
                    }
                }
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_puzzle_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => self.game.back(),
            KeyCode::Char('h') => {
                self.game.show_hint();
            }
            KeyCode::Char('r') => {
                if self.game.retry_image() {
                    self.show_message("Trying again...");
                }
            }
            KeyCode::Tab => self.pick_next_piece(),
            KeyCode::Up => self.nudge(0.0, -KEY_STEP),
            KeyCode::Down => self.nudge(0.0, KEY_STEP),
            KeyCode::Left => self.nudge(-KEY_STEP, 0.0),
            KeyCode::Right => self.nudge(KEY_STEP, 0.0),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.keyboard_piece.take().is_some() {
                    self.game.pointer_up(KEYBOARD);
                }
            }
            _ => {}
        }
        AppAction::Continue
    }

    /// Drop the held piece and pick up the next loose one
    fn pick_next_piece(&mut self) {
        let current = self.keyboard_piece.take();
        if current.is_some() {
            self.game.pointer_up(KEYBOARD);
        }

        let Some(puzzle) = self.game.puzzle() else {
            return;
        };
        let loose: Vec<usize> = puzzle
            .states()
            .iter()
            .filter(|s| !s.snapped && !s.dragging)
            .map(|s| s.id)
            .collect();
        let next = current
            .and_then(|cur| loose.iter().copied().find(|&id| id > cur))
            .or_else(|| loose.first().copied());

        if let Some(piece) = next {
            if self.game.pointer_down_piece(KEYBOARD, piece).is_some() {
                self.keyboard_piece = Some(piece);
            }
        }
    }

    fn nudge(&mut self, dx: f32, dy: f32) {
        if self.keyboard_piece.is_some() {
            self.game.pointer_move(KEYBOARD, dx, dy);
        }
    }

    fn handle_win_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Enter | KeyCode::Char('n') => {
                if !self.game.next_level() {
                    self.game.navigate(Screen::Home);
                }
            }
            KeyCode::Char('c') => self.game.navigate(Screen::Collection),
            KeyCode::Char('h') | KeyCode::Esc => self.game.navigate(Screen::Home),
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_collection_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Enter => self.game.back(),
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> AppAction {
        if self.game.gate().is_some() {
            self.handle_gate_key(key);
            return AppAction::Continue;
        }
        self.game.dismiss_notice();

        let choice = match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Esc | KeyCode::Backspace => {
                self.game.back();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1, SETTINGS_ITEMS.len());
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1, SETTINGS_ITEMS.len());
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => Some(self.selection),
            KeyCode::Char('m') => Some(0),
            KeyCode::Char('e') => Some(1),
            KeyCode::Char('a') => Some(2),
            _ => None,
        };

        match choice {
            Some(0) => self.game.toggle_music(),
            Some(1) => self.game.toggle_effects(),
            Some(_) => {
                self.game.open_gate();
            }
            None => {}
        }
        AppAction::Continue
    }

    fn handle_gate_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.game.close_gate(),
            KeyCode::Enter => {
                self.game.submit_gate();
            }
            KeyCode::Backspace => {
                if let Some(gate) = self.game.gate_mut() {
                    gate.pop_digit();
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(gate) = self.game.gate_mut() {
                    gate.push_digit(c);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use mini_zoo_core::{Catalog, ProgressStore};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> App {
        let game = Progression::new(Catalog::standard(), ProgressStore::in_memory(), 5);
        let worker = ImageWorker::spawn(Box::new(PlaceholderSource));
        App::new(game, worker, (120, 40))
    }

    fn wait_for_puzzle(app: &mut App) {
        for _ in 0..400 {
            app.tick(Duration::from_millis(5));
            if app.game.puzzle().is_some() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("puzzle never started");
    }

    #[test]
    fn test_menu_path_to_puzzle() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.game.screen(), Screen::Home);

        app.handle_key(key(KeyCode::Char('p')));
        assert_eq!(app.game.screen(), Screen::ThemeSelect);
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.game.screen(), Screen::LevelSelect);

        // Second tile is still locked
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.game.screen(), Screen::LevelSelect);
        assert!(app.message.is_some());

        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.game.screen(), Screen::Puzzle);

        wait_for_puzzle(&mut app);
        assert!(app.art.is_some());
        app.shutdown();
    }

    #[test]
    fn test_keyboard_drag_uses_its_own_pointer() {
        let mut app = app();
        app.game.skip_splash();
        app.game.navigate(Screen::ThemeSelect);
        app.game.select_theme("farm");
        app.game.select_level("farm-1");
        wait_for_puzzle(&mut app);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.keyboard_piece, Some(0));
        let before = app.game.puzzle().unwrap().states()[0].position();
        app.handle_key(key(KeyCode::Right));
        let after = app.game.puzzle().unwrap().states()[0].position();
        assert!((after.0 - before.0 - KEY_STEP).abs() < 1e-3);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.keyboard_piece, Some(1));
        assert_eq!(app.game.puzzle().unwrap().active_drags(), 1);

        app.cancel_pointers();
        assert_eq!(app.game.puzzle().unwrap().active_drags(), 0);
        app.shutdown();
    }

    #[test]
    fn test_gate_keys() {
        let mut app = app();
        app.game.skip_splash();
        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Char('a')));
        assert!(app.game.gate().is_some());

        app.handle_key(key(KeyCode::Char('0')));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.game.gate().unwrap().error().is_some());

        app.handle_key(key(KeyCode::Esc));
        assert!(app.game.gate().is_none());
        assert_eq!(app.game.screen(), Screen::Settings);
        app.shutdown();
    }
}
