//! Screen graph and unlock model
//!
//! `Progression` is the single owner of everything that outlives one puzzle:
//! the catalog, the persisted [`GameProgress`], the current screen and the
//! selected theme and level. Time only moves through [`Progression::tick`],
//! so the splash and completion delays are plain deadlines on that clock.

use crate::board::{PuzzleError, CANVAS_SIZE};
use crate::catalog::{Catalog, Level, Theme};
use crate::drag::{DragSession, PointerId};
use crate::gate::ParentalGate;
use crate::image::{
    resolve_with_fallback, ImageRef, ImageRequest, ImageResolution, ImageSource, ImageState,
    ImageTicket,
};
use crate::progress::{GameProgress, Settings, UnlockDelta};
use crate::puzzle::{DragEndReport, PuzzleSession};
use crate::store::ProgressStore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::{debug, error, info};

/// How long the splash screen is shown
pub const SPLASH_DURATION: Duration = Duration::from_millis(2500);

pub const TITLE: &str = "Mini Zoo Puzzles";

/// Shown once the parental gate is passed
pub const GATE_PASSED: &str = "Parental gate passed! Ads would be removed here.";

/// Every screen of the game. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Splash,
    Home,
    ThemeSelect,
    LevelSelect,
    Puzzle,
    Win,
    Collection,
    Settings,
}

impl Screen {
    /// Where the back action leads
    pub fn back_target(self) -> Screen {
        match self {
            Screen::Puzzle => Screen::LevelSelect,
            Screen::LevelSelect => Screen::ThemeSelect,
            _ => Screen::Home,
        }
    }
}

/// Sound effects for the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Click,
    Snap,
    Win,
}

/// One entry of the level select grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTile {
    pub id: String,
    pub animal_name: String,
    pub piece_count: usize,
    pub paws: usize,
    pub unlocked: bool,
    pub completed: bool,
}

/// One entry of the collection screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionEntry {
    pub animal: String,
    pub unlocked: bool,
}

impl CollectionEntry {
    /// Locked animals stay a mystery
    pub fn label(&self) -> &str {
        if self.unlocked {
            &self.animal
        } else {
            "???"
        }
    }
}

#[derive(Debug)]
pub struct Progression {
    catalog: Catalog,
    progress: GameProgress,
    store: ProgressStore,
    screen: Screen,
    theme: Option<String>,
    level: Option<String>,
    clock: Duration,
    splash_until: Option<Duration>,
    puzzle: Option<PuzzleSession>,
    next_session_id: u64,
    image: ImageState,
    next_ticket: u64,
    image_requests: Vec<ImageRequest>,
    cues: Vec<Cue>,
    gate: Option<ParentalGate>,
    notice: Option<String>,
    last_unlock: UnlockDelta,
    rng: ChaCha8Rng,
    canvas_size: f32,
}

impl Progression {
    /// Load progress and start on the splash screen
    pub fn new(catalog: Catalog, store: ProgressStore, seed: u64) -> Self {
        let progress = store.load(&catalog);
        info!(
            backend = store.backend_name(),
            levels = progress.unlocked_levels().len(),
            animals = progress.unlocked_animals().len(),
            "progress loaded"
        );

        Self {
            catalog,
            progress,
            store,
            screen: Screen::Splash,
            theme: None,
            level: None,
            clock: Duration::ZERO,
            splash_until: Some(SPLASH_DURATION),
            puzzle: None,
            next_session_id: 1,
            image: ImageState::Idle,
            next_ticket: 1,
            image_requests: Vec::new(),
            cues: Vec::new(),
            gate: None,
            notice: None,
            last_unlock: UnlockDelta::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            canvas_size: CANVAS_SIZE,
        }
    }

    /// Use a different canvas size for new puzzle sessions
    pub fn with_canvas_size(mut self, canvas_size: f32) -> Self {
        self.canvas_size = canvas_size;
        self
    }

    // ==================== Time ====================

    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Advance the clock and fire due timers
    pub fn tick(&mut self, dt: Duration) {
        self.clock += dt;

        if let Some(until) = self.splash_until {
            if self.clock >= until {
                self.splash_until = None;
                if self.screen == Screen::Splash {
                    self.enter(Screen::Home);
                }
            }
        }

        // The deadline lives in the session, so a torn-down session takes
        // its pending signal with it
        let due = self
            .active_puzzle()
            .and_then(PuzzleSession::completion_deadline)
            .is_some_and(|at| self.clock >= at);
        if due {
            self.complete_level();
        }
    }

    /// Leave the splash screen early
    pub fn skip_splash(&mut self) {
        if self.screen == Screen::Splash {
            self.splash_until = None;
            self.enter(Screen::Home);
        }
    }

    // ==================== Navigation ====================

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Move to a screen, redirecting when its selection context is missing
    pub fn navigate(&mut self, screen: Screen) {
        let target = match screen {
            Screen::Splash if self.splash_until.is_none() => Screen::Home,
            Screen::LevelSelect if self.theme.is_none() => Screen::ThemeSelect,
            Screen::Puzzle | Screen::Win if self.level.is_none() => Screen::Home,
            other => other,
        };
        if target != screen {
            debug!(?screen, ?target, "redirected");
        }
        self.enter(target);
    }

    pub fn back(&mut self) {
        self.navigate(self.screen.back_target());
    }

    pub fn select_theme(&mut self, id: &str) -> bool {
        if self.screen != Screen::ThemeSelect || self.catalog.theme(id).is_none() {
            return false;
        }
        self.theme = Some(id.to_string());
        self.cue(Cue::Click);
        self.enter(Screen::LevelSelect);
        true
    }

    /// Start a level; locked or unknown levels are inert
    pub fn select_level(&mut self, id: &str) -> bool {
        if self.screen != Screen::LevelSelect || !self.progress.is_level_unlocked(id) {
            return false;
        }
        let Some(level) = self.catalog.level(id) else {
            return false;
        };
        self.theme = Some(level.theme.clone());
        self.level = Some(level.id.clone());
        self.cue(Cue::Click);
        self.enter(Screen::Puzzle);
        true
    }

    /// The successor of the current level, if it exists and is unlocked
    pub fn next_level_available(&self) -> bool {
        self.unlocked_successor().is_some()
    }

    pub fn next_level(&mut self) -> bool {
        if self.screen != Screen::Win {
            return false;
        }
        let Some(next) = self.unlocked_successor() else {
            return false;
        };
        let (theme, id) = (next.theme.clone(), next.id.clone());
        self.theme = Some(theme);
        self.level = Some(id);
        self.cue(Cue::Click);
        self.enter(Screen::Puzzle);
        true
    }

    fn unlocked_successor(&self) -> Option<&Level> {
        let current = self.level.as_deref()?;
        self.catalog
            .successor(current)
            .filter(|next| self.progress.is_level_unlocked(&next.id))
    }

    fn enter(&mut self, screen: Screen) {
        if self.screen == Screen::Puzzle || screen == Screen::Puzzle {
            self.teardown_puzzle();
        }
        if screen != Screen::Settings {
            self.gate = None;
        }
        if screen != Screen::Splash {
            self.splash_until = None;
        }

        debug!(from = ?self.screen, to = ?screen, "screen change");
        self.screen = screen;

        if screen == Screen::Puzzle {
            self.request_image();
        }
    }

    fn teardown_puzzle(&mut self) {
        if let Some(mut puzzle) = self.puzzle.take() {
            let released = puzzle.release_all(self.clock);
            if !released.is_empty() {
                debug!(count = released.len(), "released drags on teardown");
            }
            if puzzle.completion_deadline().is_some() {
                debug!(session = puzzle.id(), "dropping pending completion signal");
            }
        }
        self.image = ImageState::Idle;
        self.image_requests.clear();
    }

    // ==================== Completion ====================

    fn complete_level(&mut self) {
        let Some(level) = self.level.as_deref().and_then(|id| self.catalog.level(id)) else {
            return;
        };
        let successor = self.catalog.successor(&level.id);
        let delta = self.progress.record_completion(level, successor);
        info!(level = %level.id, animal = %level.animal_name, "level complete");

        self.store.save(&self.progress);
        self.last_unlock = delta;
        self.enter(Screen::Win);
        self.cue(Cue::Win);
    }

    /// What the last completed level newly unlocked
    pub fn last_unlock(&self) -> &UnlockDelta {
        &self.last_unlock
    }

    // ==================== Images ====================

    fn request_image(&mut self) {
        let Some(animal) = self.current_level().map(|l| l.animal_name.clone()) else {
            return;
        };
        let ticket = ImageTicket(self.next_ticket);
        self.next_ticket += 1;
        self.image = ImageState::Loading(ticket);
        self.image_requests.push(ImageRequest { ticket, animal });
    }

    /// Drain the outstanding image requests for the host to answer
    pub fn take_image_requests(&mut self) -> Vec<ImageRequest> {
        std::mem::take(&mut self.image_requests)
    }

    /// Accept the answer to an image request; stale tickets are ignored
    pub fn deliver_image(&mut self, ticket: ImageTicket, resolution: ImageResolution) -> bool {
        if self.screen != Screen::Puzzle || self.image != ImageState::Loading(ticket) {
            debug!(?ticket, "ignoring stale image response");
            return false;
        }

        match resolution {
            ImageResolution::Ready { image, fallback } => {
                debug!(?ticket, fallback, "image ready");
                if let Err(e) = self.start_session() {
                    error!(error = %e, "could not build puzzle");
                    self.image = ImageState::Failed(e.to_string());
                    return true;
                }
                self.image = ImageState::Ready(image);
            }
            ImageResolution::Failed { message } => {
                self.image = ImageState::Failed(message);
            }
        }
        true
    }

    /// Answer every outstanding request synchronously from `source`
    pub fn resolve_pending_images(&mut self, source: &dyn ImageSource) {
        for request in self.take_image_requests() {
            let resolution = resolve_with_fallback(source, &request.animal);
            self.deliver_image(request.ticket, resolution);
        }
    }

    /// Issue a fresh request after a surfaced failure
    pub fn retry_image(&mut self) -> bool {
        if self.screen != Screen::Puzzle || !matches!(self.image, ImageState::Failed(_)) {
            return false;
        }
        self.request_image();
        true
    }

    pub fn image_state(&self) -> &ImageState {
        &self.image
    }

    pub fn image(&self) -> Option<&ImageRef> {
        match &self.image {
            ImageState::Ready(image) => Some(image),
            _ => None,
        }
    }

    fn start_session(&mut self) -> Result<(), PuzzleError> {
        let Some(level) = self.level.as_deref().and_then(|id| self.catalog.level(id)) else {
            return Ok(());
        };
        let id = self.next_session_id;
        self.next_session_id += 1;
        self.puzzle = Some(PuzzleSession::new(id, level, self.canvas_size, &mut self.rng)?);
        Ok(())
    }

    // ==================== Puzzle input ====================

    pub fn pointer_down(&mut self, pointer: PointerId, x: f32, y: f32) -> Option<DragSession> {
        self.active_puzzle_mut()?.pointer_down_at(pointer, x, y)
    }

    /// Pick up a piece by index, for hosts without a pointing device
    pub fn pointer_down_piece(&mut self, pointer: PointerId, piece: usize) -> Option<DragSession> {
        self.active_puzzle_mut()?.pointer_down(pointer, piece).ok()
    }

    pub fn pointer_move(&mut self, pointer: PointerId, dx: f32, dy: f32) -> bool {
        self.active_puzzle_mut()
            .is_some_and(|puzzle| puzzle.pointer_move(pointer, dx, dy))
    }

    pub fn pointer_up(&mut self, pointer: PointerId) -> Option<DragEndReport> {
        let now = self.clock;
        let report = self.active_puzzle_mut()?.pointer_up(pointer, now)?;
        self.after_drag_end(&report);
        Some(report)
    }

    pub fn pointer_cancel(&mut self, pointer: PointerId) -> Option<DragEndReport> {
        let now = self.clock;
        let report = self.active_puzzle_mut()?.pointer_cancel(pointer, now)?;
        self.after_drag_end(&report);
        Some(report)
    }

    fn after_drag_end(&mut self, report: &DragEndReport) {
        if report.outcome.is_snapped() {
            self.cue(Cue::Snap);
        }
    }

    pub fn show_hint(&mut self) -> bool {
        let now = self.clock;
        match self.active_puzzle_mut() {
            Some(puzzle) => {
                puzzle.show_hint(now);
                true
            }
            None => false,
        }
    }

    pub fn hint_visible(&self) -> bool {
        self.puzzle().is_some_and(|p| p.hint_visible(self.clock))
    }

    fn active_puzzle(&self) -> Option<&PuzzleSession> {
        if self.screen != Screen::Puzzle {
            return None;
        }
        self.puzzle.as_ref()
    }

    fn active_puzzle_mut(&mut self) -> Option<&mut PuzzleSession> {
        if self.screen != Screen::Puzzle {
            return None;
        }
        self.puzzle.as_mut()
    }

    pub fn puzzle(&self) -> Option<&PuzzleSession> {
        self.puzzle.as_ref()
    }

    /// Direct access to the live session. Completion raised through it is
    /// still picked up by [`Progression::tick`]; snap cues are not queued.
    pub fn puzzle_mut(&mut self) -> Option<&mut PuzzleSession> {
        self.active_puzzle_mut()
    }

    /// Deadline of the pending completion signal
    pub fn completion_deadline(&self) -> Option<Duration> {
        self.active_puzzle()
            .and_then(PuzzleSession::completion_deadline)
    }

    // ==================== Settings ====================

    pub fn settings(&self) -> Settings {
        self.progress.settings()
    }

    pub fn set_music(&mut self, on: bool) {
        self.progress.settings_mut().music = on;
        self.store.save(&self.progress);
    }

    pub fn set_effects(&mut self, on: bool) {
        self.progress.settings_mut().effects = on;
        self.store.save(&self.progress);
    }

    pub fn toggle_music(&mut self) {
        self.set_music(!self.settings().music);
    }

    pub fn toggle_effects(&mut self) {
        self.set_effects(!self.settings().effects);
    }

    /// Whether background music should be playing
    pub fn music_enabled(&self) -> bool {
        self.settings().music
    }

    fn cue(&mut self, cue: Cue) {
        if self.progress.settings().effects {
            self.cues.push(cue);
        }
    }

    /// Drain queued sound effects
    pub fn take_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    // ==================== Parental gate ====================

    pub fn open_gate(&mut self) -> bool {
        if self.screen != Screen::Settings {
            return false;
        }
        self.gate = Some(ParentalGate::new(&mut self.rng));
        true
    }

    pub fn close_gate(&mut self) {
        self.gate = None;
    }

    pub fn gate(&self) -> Option<&ParentalGate> {
        self.gate.as_ref()
    }

    pub fn gate_mut(&mut self) -> Option<&mut ParentalGate> {
        self.gate.as_mut()
    }

    /// Check the gate answer; passing closes the gate
    pub fn submit_gate(&mut self) -> bool {
        let passed = self.gate.as_mut().is_some_and(ParentalGate::submit);
        if passed {
            self.gate = None;
            self.notice = Some(GATE_PASSED.to_string());
        }
        passed
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // ==================== Views ====================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn progress(&self) -> &GameProgress {
        &self.progress
    }

    pub fn current_theme(&self) -> Option<&Theme> {
        self.theme.as_deref().and_then(|id| self.catalog.theme(id))
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.level.as_deref().and_then(|id| self.catalog.level(id))
    }

    /// Level grid of the selected theme
    pub fn level_tiles(&self) -> Vec<LevelTile> {
        let Some(theme) = self.theme.as_deref() else {
            return Vec::new();
        };
        self.catalog
            .levels_for_theme(theme)
            .map(|level| LevelTile {
                id: level.id.clone(),
                animal_name: level.animal_name.clone(),
                piece_count: level.piece_count,
                paws: level.paws(),
                unlocked: self.progress.is_level_unlocked(&level.id),
                completed: self.progress.is_level_completed(&level.id),
            })
            .collect()
    }

    /// Every animal in catalog order with its unlock flag
    pub fn collection(&self) -> Vec<CollectionEntry> {
        self.catalog
            .animals()
            .into_iter()
            .map(|animal| CollectionEntry {
                animal: animal.to_string(),
                unlocked: self.progress.is_animal_unlocked(animal),
            })
            .collect()
    }
}
