pub use shakmaty::Color;

pub const BOTH_COLORS: [Color; 2] = [Color::White, Color::Black];

/// Per-side conventions the variant layer needs beyond shakmaty's `Color`.
pub trait ColorExt {
    /// Index into per-side arrays, white first.
    fn slot(self) -> usize;
    fn label(self) -> &'static str;
    /// Rank delta pawns of this colour advance by.
    fn pawn_dir(self) -> i32;
    /// Zero-based rank holding this side's pieces at the start of the game.
    fn home_rank(self) -> u32;
}

impl ColorExt for Color {
    fn slot(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }

    fn pawn_dir(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    fn home_rank(self) -> u32 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

pub fn parse_label(text: &str) -> Option<Color> {
    match text.trim().to_ascii_lowercase().as_str() {
        "white" | "w" => Some(Color::White),
        "black" | "b" => Some(Color::Black),
        _ => None,
    }
}

/// `#[serde(with = ...)]` adapter writing a colour as `"white"` / `"black"`.
pub mod by_label {
    use super::{Color, ColorExt, parse_label};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(color.label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_label(&text).ok_or_else(|| D::Error::custom(format!("unknown colour `{text}`")))
    }
}
