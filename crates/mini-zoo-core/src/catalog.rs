//! Static catalog of themes and levels
//!
//! The catalog is built once at start-up and never mutated. Level order
//! matters: the level that follows another in the list is the one unlocked
//! when the earlier one is completed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest number of difficulty paws shown on a level tile
pub const MAX_PAWS: usize = 5;

/// A group of levels sharing a look
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    /// Accent colour (RGB)
    pub color: (u8, u8, u8),
    /// Glyph shown on the theme card
    pub icon: char,
}

/// One puzzle in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub theme: String,
    pub animal_name: String,
    pub piece_count: usize,
}

impl Level {
    pub fn new(id: &str, theme: &str, animal_name: &str, piece_count: usize) -> Self {
        Self {
            id: id.to_string(),
            theme: theme.to_string(),
            animal_name: animal_name.to_string(),
            piece_count,
        }
    }

    /// Difficulty shown as filled paws out of [`MAX_PAWS`]
    pub fn paws(&self) -> usize {
        self.piece_count.saturating_sub(2).min(MAX_PAWS)
    }
}

/// Problems found while validating a catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog has no levels")]
    Empty,
    #[error("duplicate level id {0}")]
    DuplicateLevel(String),
    #[error("duplicate theme id {0}")]
    DuplicateTheme(String),
    #[error("level {level} refers to unknown theme {theme}")]
    UnknownTheme { level: String, theme: String },
    #[error("level {0} has no pieces")]
    NoPieces(String),
}

/// Ordered themes and levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    themes: Vec<Theme>,
    levels: Vec<Level>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// Build a catalog, rejecting inconsistent definitions
    pub fn new(themes: Vec<Theme>, levels: Vec<Level>) -> Result<Self, CatalogError> {
        let catalog = Self { themes, levels };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The shipped set of three themes and ten levels
    pub fn standard() -> Self {
        let theme = |id: &str, name: &str, color: (u8, u8, u8), icon: char| Theme {
            id: id.to_string(),
            name: name.to_string(),
            color,
            icon,
        };

        Self {
            themes: vec![
                theme("farm", "Farm", (239, 68, 68), '⌂'),
                theme("jungle", "Jungle", (34, 197, 94), '♣'),
                theme("sea", "Sea", (59, 130, 246), '≈'),
            ],
            levels: vec![
                Level::new("farm-1", "farm", "Cow", 3),
                Level::new("farm-2", "farm", "Pig", 3),
                Level::new("farm-3", "farm", "Chicken", 4),
                Level::new("jungle-1", "jungle", "Lion", 4),
                Level::new("jungle-2", "jungle", "Monkey", 4),
                Level::new("sea-1", "sea", "Fish", 3),
                Level::new("sea-2", "sea", "Turtle", 4),
                Level::new("farm-4", "farm", "Rabbit", 5),
                Level::new("jungle-3", "jungle", "Elephant", 5),
                Level::new("jungle-4", "jungle", "Parrot", 6),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.levels.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (i, theme) in self.themes.iter().enumerate() {
            if self.themes[..i].iter().any(|t| t.id == theme.id) {
                return Err(CatalogError::DuplicateTheme(theme.id.clone()));
            }
        }

        for (i, level) in self.levels.iter().enumerate() {
            if self.levels[..i].iter().any(|l| l.id == level.id) {
                return Err(CatalogError::DuplicateLevel(level.id.clone()));
            }
            if self.theme(&level.theme).is_none() {
                return Err(CatalogError::UnknownTheme {
                    level: level.id.clone(),
                    theme: level.theme.clone(),
                });
            }
            if level.piece_count < 1 {
                return Err(CatalogError::NoPieces(level.id.clone()));
            }
        }

        Ok(())
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn theme(&self, id: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id == id)
    }

    pub fn level(&self, id: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// The level every new installation starts with
    pub fn first_level(&self) -> Option<&Level> {
        self.levels.first()
    }

    /// The level after `id` in catalog order
    pub fn successor(&self, id: &str) -> Option<&Level> {
        let index = self.levels.iter().position(|l| l.id == id)?;
        self.levels.get(index + 1)
    }

    /// Levels belonging to a theme, in catalog order
    pub fn levels_for_theme<'a>(&'a self, theme_id: &'a str) -> impl Iterator<Item = &'a Level> + 'a {
        self.levels.iter().filter(move |l| l.theme == theme_id)
    }

    /// Every collectible animal, first appearance wins
    pub fn animals(&self) -> Vec<&str> {
        let mut animals: Vec<&str> = Vec::new();
        for level in &self.levels {
            if !animals.contains(&level.animal_name.as_str()) {
                animals.push(&level.animal_name);
            }
        }
        animals
    }
}
