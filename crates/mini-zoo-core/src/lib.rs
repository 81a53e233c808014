//! Mini Zoo Puzzles engine
//!
//! This crate holds everything behind the game's screens: cutting a picture
//! into a grid of pieces, scattering them, per-pointer drag sessions, the
//! snap decision, completion detection, and the screen/unlock state machine
//! with its persisted progress. It has no terminal or windowing dependency;
//! hosts feed it pointer events and clock ticks and read back state to draw.
//!
//! # Example
//!
//! ```
//! use mini_zoo_core::{Catalog, PlaceholderSource, Progression, ProgressStore, Screen};
//!
//! let mut game = Progression::new(Catalog::standard(), ProgressStore::in_memory(), 42);
//! game.skip_splash();
//! game.navigate(Screen::ThemeSelect);
//! game.select_theme("farm");
//! game.select_level("farm-1");
//! game.resolve_pending_images(&PlaceholderSource);
//! assert_eq!(game.puzzle().map(|p| p.pieces_left()), Some(3));
//! ```

pub mod board;
pub mod catalog;
pub mod completion;
pub mod drag;
pub mod gate;
pub mod image;
pub mod progress;
pub mod progression;
pub mod puzzle;
pub mod snap;
pub mod store;

pub use board::{partition, scatter, GridLayout, PieceDragState, PieceSpec, PuzzleError, CANVAS_SIZE};
pub use catalog::{Catalog, CatalogError, Level, Theme};
pub use completion::{CompletionDetector, COMPLETION_DELAY};
pub use drag::{DragRejected, DragSession, DragTracker, PointerId, StackCounter};
pub use gate::ParentalGate;
pub use image::{
    resolve_with_fallback, GallerySource, ImageError, ImageRef, ImageRequest, ImageResolution,
    ImageSource, ImageState, ImageTicket, PlaceholderSource,
};
pub use progress::{GameProgress, Settings, UnlockDelta};
pub use progression::{CollectionEntry, Cue, LevelTile, Progression, Screen, SPLASH_DURATION};
pub use puzzle::{DragEndReport, PuzzleSession, HINT_DURATION};
pub use snap::{snap_threshold, SnapOutcome, SNAP_THRESHOLD};
pub use store::{
    Environment, FileBackend, KeyValueBackend, MemoryBackend, ProgressStore, StoreError,
    PROGRESS_KEY,
};
