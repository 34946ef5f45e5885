//! # Text Rendering
//!
//! Plain-text views of lists and details, driven by the `CharacterField`
//! tables so every surface shows the same fields in the same order.

use crate::catalog::Listing;
use charadex_core::{Character, CharacterField, FavoritesStore, FilterSelection, Point, Size};

/// Placeholder for the empty list state.
pub const EMPTY_LIST: &str = "No characters found";

/// One list row: star marker, then the row fields separated by two spaces.
#[must_use]
pub fn character_row(character: &Character, starred: bool) -> String {
    let marker = if starred { '*' } else { ' ' };
    let fields: Vec<String> = CharacterField::ROW
        .iter()
        .filter_map(|f| match f {
            CharacterField::Id => f.value(character).map(|v| format!("#{v:<4}")),
            _ => f.value(character),
        })
        .collect();
    format!("{marker} {}", fields.join("  "))
}

/// A labelled detail block, with the comment last when present.
#[must_use]
pub fn character_detail(character: &Character, comment: Option<&str>) -> String {
    let width = CharacterField::DETAIL
        .iter()
        .map(|f| f.label().len())
        .max()
        .unwrap_or(0);
    let mut lines: Vec<String> = CharacterField::DETAIL
        .iter()
        .filter_map(|f| {
            f.value(character)
                .map(|v| format!("{:<width$}  {}", f.label(), v, width = width))
        })
        .collect();
    if let Some(text) = comment {
        lines.push(format!("{:<width$}  {}", "Comment", text, width = width));
    }
    lines.join("\n")
}

/// A full list view.
#[must_use]
pub fn listing(listing: &Listing, favorites: &FavoritesStore) -> String {
    if listing.characters.is_empty() {
        return EMPTY_LIST.to_string();
    }
    let mut out: Vec<String> = listing
        .characters
        .iter()
        .map(|c| character_row(c, favorites.is_starred(c.id)))
        .collect();
    out.push(String::new());
    out.push(format!(
        "{} shown, {} matched across {} page(s){}",
        listing.characters.len(),
        listing.info.count,
        listing.info.pages,
        listing
            .info
            .next
            .map(|n| format!(", next page {n}"))
            .unwrap_or_default()
    ));
    out.join("\n")
}

/// Favorites with their comments indented under each row.
#[must_use]
pub fn favorites(characters: &[Character], store: &FavoritesStore) -> String {
    if characters.is_empty() {
        return "No starred characters".to_string();
    }
    characters
        .iter()
        .map(|c| match store.comment(c.id) {
            Some(text) => format!("{}\n      \"{}\"", character_row(c, true), text),
            None => character_row(c, true),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The filter panel as drawn in the browse session.
#[must_use]
pub fn filter_panel(selection: &FilterSelection) -> Vec<String> {
    vec![
        format!("relation  {}", selection.relation),
        format!("species   {}", selection.species),
        format!("gender    {}", selection.gender),
        format!("search    {}", selection.search),
        format!("sort      {}", selection.sort),
        "[apply] [cancel]".to_string(),
    ]
}

/// Bounding size of a block of lines, in terminal cells.
#[must_use]
pub fn block_size(lines: &[String]) -> Size {
    Size {
        width: lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32,
        height: lines.len() as i32,
    }
}

/// Paint lines at an absolute cell position using ANSI cursor moves.
#[must_use]
pub fn at_position(lines: &[String], origin: Point) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(row, line)| {
            // ANSI positions are 1-based.
            format!("\x1b[{};{}H{}", origin.y + row as i32 + 1, origin.x + 1, line)
        })
        .collect()
}
