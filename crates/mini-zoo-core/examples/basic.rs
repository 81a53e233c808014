//! Basic example of driving the puzzle engine without a screen

use mini_zoo_core::{
    Catalog, PlaceholderSource, PointerId, Progression, ProgressStore, Screen, COMPLETION_DELAY,
};

fn main() {
    let mut game = Progression::new(Catalog::standard(), ProgressStore::in_memory(), 2024);
    game.skip_splash();

    // Pick the first farm level
    game.navigate(Screen::ThemeSelect);
    game.select_theme("farm");
    for tile in game.level_tiles() {
        println!(
            "{:<8} {:<8} pieces={} paws={} {}",
            tile.id,
            tile.animal_name,
            tile.piece_count,
            tile.paws,
            if tile.unlocked { "open" } else { "locked" }
        );
    }

    game.select_level("farm-1");
    game.resolve_pending_images(&PlaceholderSource);
    if let Some(image) = game.image() {
        println!("\nPicture: {}", image.as_uri());
    }

    let Some(puzzle) = game.puzzle() else {
        println!("No puzzle was started");
        return;
    };
    let layout = *puzzle.layout();
    println!(
        "Grid: {} x {} ({} pieces of {:.0} x {:.0})\n",
        layout.cols,
        layout.rows,
        puzzle.pieces().len(),
        layout.piece_width,
        layout.piece_height
    );

    // Drag each piece straight onto its slot
    let mouse = PointerId::MOUSE;
    let count = puzzle.pieces().len();
    for piece in 0..count {
        let Some(puzzle) = game.puzzle() else {
            break;
        };
        let (x, y) = puzzle.states()[piece].position();
        let (tx, ty) = puzzle.pieces()[piece].target();
        if game.pointer_down_piece(mouse, piece).is_none() {
            continue;
        }
        game.pointer_move(mouse, tx - x, ty - y);

        if let Some(report) = game.pointer_up(mouse) {
            println!(
                "piece {} from ({:.0}, {:.0}) -> {:?}",
                piece, x, y, report.outcome
            );
        }
    }

    game.tick(COMPLETION_DELAY);
    println!("\nScreen: {:?}", game.screen());
    println!("Unlocked levels: {:?}", game.progress().unlocked_levels());
    println!("Collection:");
    for entry in game.collection() {
        println!("  {}", entry.label());
    }
}
