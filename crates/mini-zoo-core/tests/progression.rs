//! End-to-end play-throughs of the progression state machine

use mini_zoo_core::{
    Catalog, Cue, GameProgress, ImageRef, ImageResolution, MemoryBackend, PlaceholderSource,
    PointerId, Progression, ProgressStore, Screen, COMPLETION_DELAY, PROGRESS_KEY,
};
use std::sync::Arc;
use std::time::Duration;

const MOUSE: PointerId = PointerId::MOUSE;

fn started(backend: Arc<MemoryBackend>) -> Progression {
    let mut game = Progression::new(Catalog::standard(), ProgressStore::new(backend), 99);
    game.skip_splash();
    game
}

fn open_level(game: &mut Progression, theme: &str, level: &str) {
    game.navigate(Screen::ThemeSelect);
    assert!(game.select_theme(theme));
    assert!(game.select_level(level), "{} should be playable", level);
    game.resolve_pending_images(&PlaceholderSource);
    assert!(game.puzzle().is_some());
}

/// Drag every piece onto its slot
fn solve(game: &mut Progression) {
    let count = game.puzzle().map(|p| p.pieces().len()).unwrap_or(0);
    for piece in 0..count {
        game.pointer_down_piece(MOUSE, piece).unwrap();
        let puzzle = game.puzzle().unwrap();
        let (x, y) = puzzle.states()[piece].position();
        let (tx, ty) = puzzle.pieces()[piece].target();
        assert!(game.pointer_move(MOUSE, tx - x, ty - y));
        let report = game.pointer_up(MOUSE).unwrap();
        assert!(report.outcome.is_snapped());
    }
}

fn stored(backend: &MemoryBackend) -> serde_json::Value {
    serde_json::from_str(&backend.raw(PROGRESS_KEY).unwrap()).unwrap()
}

#[test]
fn first_level_unlocks_successor_and_animal() {
    let backend = Arc::new(MemoryBackend::new());
    let mut game = started(Arc::clone(&backend));

    open_level(&mut game, "farm", "farm-1");
    solve(&mut game);

    // Completion waits for the delay
    assert_eq!(game.screen(), Screen::Puzzle);
    game.tick(COMPLETION_DELAY - Duration::from_millis(1));
    assert_eq!(game.screen(), Screen::Puzzle);
    game.tick(Duration::from_millis(1));
    assert_eq!(game.screen(), Screen::Win);

    assert_eq!(game.progress().unlocked_levels(), ["farm-1", "farm-2"]);
    assert_eq!(game.progress().unlocked_animals(), ["Cow"]);
    assert!(game.next_level_available());

    let json = stored(&backend);
    assert_eq!(json["unlockedLevels"], serde_json::json!(["farm-1", "farm-2"]));
    assert_eq!(json["unlockedAnimals"], serde_json::json!(["Cow"]));
    assert_eq!(json["completedLevels"], serde_json::json!(["farm-1"]));

    let cues = game.take_cues();
    assert_eq!(cues.iter().filter(|c| **c == Cue::Snap).count(), 3);
    assert_eq!(cues.last(), Some(&Cue::Win));
}

#[test]
fn next_level_continues_in_catalog_order() {
    let payload = r#"{"unlockedLevels":["farm-1","farm-2","farm-3","jungle-1","jungle-2","sea-1","sea-2"],"unlockedAnimals":[]}"#;
    let backend = Arc::new(MemoryBackend::new().with_entry(PROGRESS_KEY, payload));
    let mut game = started(backend);

    open_level(&mut game, "sea", "sea-2");
    solve(&mut game);
    game.tick(COMPLETION_DELAY);
    assert_eq!(game.screen(), Screen::Win);

    assert!(game.next_level());
    assert_eq!(game.screen(), Screen::Puzzle);
    assert_eq!(game.current_level().map(|l| l.id.as_str()), Some("farm-4"));
    assert_eq!(game.current_theme().map(|t| t.id.as_str()), Some("farm"));
}

#[test]
fn last_level_offers_no_next() {
    let levels: Vec<String> = Catalog::standard().levels().iter().map(|l| l.id.clone()).collect();
    let payload = serde_json::json!({ "unlockedLevels": levels, "unlockedAnimals": [] }).to_string();
    let backend = Arc::new(MemoryBackend::new().with_entry(PROGRESS_KEY, &payload));
    let mut game = started(Arc::clone(&backend));

    open_level(&mut game, "jungle", "jungle-4");
    solve(&mut game);
    game.tick(COMPLETION_DELAY);

    assert_eq!(game.screen(), Screen::Win);
    assert!(game.last_unlock().level.is_none());
    assert_eq!(game.last_unlock().animal.as_deref(), Some("Parrot"));
    assert!(!game.next_level_available());
    assert!(!game.next_level());
    assert_eq!(game.progress().unlocked_levels().len(), 10);
}

#[test]
fn replaying_a_level_changes_nothing() {
    let backend = Arc::new(MemoryBackend::new());
    let mut game = started(Arc::clone(&backend));

    open_level(&mut game, "farm", "farm-1");
    solve(&mut game);
    game.tick(COMPLETION_DELAY);
    let after_first = game.progress().clone();

    game.navigate(Screen::Home);
    open_level(&mut game, "farm", "farm-1");
    solve(&mut game);
    game.tick(COMPLETION_DELAY);

    assert_eq!(game.screen(), Screen::Win);
    assert_eq!(game.progress(), &after_first);
    assert!(game.last_unlock().is_empty());
}

#[test]
fn corrupt_payload_starts_fresh_and_reaches_home() {
    let backend = Arc::new(MemoryBackend::new().with_entry(PROGRESS_KEY, "][ definitely not json"));
    let mut game = Progression::new(Catalog::standard(), ProgressStore::new(backend), 1);

    assert_eq!(game.progress(), &GameProgress::initial("farm-1"));
    game.tick(Duration::from_millis(2500));
    assert_eq!(game.screen(), Screen::Home);
}

#[test]
fn redirects_without_selection_context() {
    let mut game = started(Arc::new(MemoryBackend::new()));

    game.navigate(Screen::LevelSelect);
    assert_eq!(game.screen(), Screen::ThemeSelect);

    game.navigate(Screen::Puzzle);
    assert_eq!(game.screen(), Screen::Home);

    game.navigate(Screen::Win);
    assert_eq!(game.screen(), Screen::Home);

    // The splash only shows once
    game.navigate(Screen::Splash);
    assert_eq!(game.screen(), Screen::Home);
}

#[test]
fn back_from_puzzle_discards_session() {
    let mut game = started(Arc::new(MemoryBackend::new()));
    open_level(&mut game, "farm", "farm-1");

    game.pointer_down_piece(MOUSE, 0).unwrap();
    game.back();

    assert_eq!(game.screen(), Screen::LevelSelect);
    assert!(game.puzzle().is_none());
    // Input outside the puzzle screen goes nowhere
    assert!(!game.pointer_move(MOUSE, 1.0, 1.0));
    assert!(game.pointer_up(MOUSE).is_none());
}

#[test]
fn completion_through_direct_session_access_still_wins() {
    let mut game = started(Arc::new(MemoryBackend::new()));
    open_level(&mut game, "farm", "farm-1");

    let puzzle = game.puzzle_mut().unwrap();
    for piece in 0..puzzle.pieces().len() {
        puzzle.pointer_down(MOUSE, piece).unwrap();
        let (x, y) = puzzle.states()[piece].position();
        let (tx, ty) = puzzle.pieces()[piece].target();
        puzzle.pointer_move(MOUSE, tx - x, ty - y);
        puzzle.pointer_up(MOUSE, Duration::ZERO).unwrap();
    }
    assert!(game.puzzle().unwrap().is_solved());
    assert!(game.completion_deadline().is_some());

    game.tick(COMPLETION_DELAY);
    assert_eq!(game.screen(), Screen::Win);
    assert_eq!(game.progress().unlocked_levels(), ["farm-1", "farm-2"]);
}

#[test]
fn stale_completion_signal_is_ignored() {
    let backend = Arc::new(MemoryBackend::new());
    let mut game = started(Arc::clone(&backend));

    open_level(&mut game, "farm", "farm-1");
    solve(&mut game);
    assert!(game.completion_deadline().is_some());

    // Leave before the signal fires
    game.back();
    game.tick(COMPLETION_DELAY * 2);

    assert_eq!(game.screen(), Screen::LevelSelect);
    assert_eq!(game.progress().unlocked_levels(), ["farm-1"]);
    assert!(backend.raw(PROGRESS_KEY).is_none());
}

#[test]
fn image_response_for_previous_entry_is_discarded() {
    let mut game = started(Arc::new(MemoryBackend::new()));
    game.navigate(Screen::ThemeSelect);
    game.select_theme("farm");
    game.select_level("farm-1");
    let old = game.take_image_requests().remove(0);

    game.back();
    game.select_level("farm-1");
    let fresh = game.take_image_requests().remove(0);

    let picture = ImageResolution::Ready {
        image: ImageRef::Url("https://example.invalid/cow.png".into()),
        fallback: false,
    };
    assert!(!game.deliver_image(old.ticket, picture.clone()));
    assert!(game.deliver_image(fresh.ticket, picture));
    assert_eq!(game.puzzle().map(|p| p.id()), Some(1));
}

#[test]
fn settings_persist_immediately() {
    let backend = Arc::new(MemoryBackend::new());
    let mut game = started(Arc::clone(&backend));

    game.navigate(Screen::Settings);
    game.toggle_music();
    assert_eq!(stored(&backend)["settings"]["music"], serde_json::json!(false));

    game.set_effects(false);
    let reloaded = Progression::new(Catalog::standard(), ProgressStore::new(Arc::clone(&backend)), 1);
    assert!(!reloaded.settings().music);
    assert!(!reloaded.settings().effects);
}

#[test]
fn failed_save_does_not_block_progress() {
    let backend = Arc::new(MemoryBackend::new());
    let mut game = started(Arc::clone(&backend));
    backend.set_available(false);

    open_level(&mut game, "farm", "farm-1");
    solve(&mut game);
    game.tick(COMPLETION_DELAY);

    assert_eq!(game.screen(), Screen::Win);
    assert!(game.progress().is_level_unlocked("farm-2"));
    assert!(backend.raw(PROGRESS_KEY).is_none());
}

#[test]
fn level_tiles_reflect_progress() {
    let backend = Arc::new(MemoryBackend::new());
    let mut game = started(backend);
    open_level(&mut game, "farm", "farm-1");
    solve(&mut game);
    game.tick(COMPLETION_DELAY);

    game.navigate(Screen::LevelSelect);
    let tiles = game.level_tiles();
    let summary: Vec<(&str, bool, bool)> = tiles
        .iter()
        .map(|t| (t.id.as_str(), t.unlocked, t.completed))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("farm-1", true, true),
            ("farm-2", true, false),
            ("farm-3", false, false),
            ("farm-4", false, false),
        ]
    );

    let collection = game.collection();
    assert_eq!(collection[0].label(), "Cow");
    assert_eq!(collection[1].label(), "???");
}
