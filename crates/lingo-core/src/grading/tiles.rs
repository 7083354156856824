//! Tile splitting and positional scoring for shuffle tests.
//!
//! Shuffle-sentence and shuffle-paragraph tests present content as
//! draggable tiles. Tiles keep their generated ids (`item_1` onward, in
//! original order); the submitted ordering is graded positionally.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, LingoError, LingoResult};

/// One draggable unit of a shuffle test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// `item_N`, numbered in original content order.
    pub id: String,
    pub content: String,
}

/// Positional grading outcome for one tile of a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedTile {
    pub id: String,
    pub content: String,
    pub is_correct_position: bool,
}

/// Grading outcome for a submitted tile ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrade {
    /// Tiles in the user's submitted order.
    pub tiles: Vec<GradedTile>,
    pub score: u32,
    pub total: u32,
}

/// Split content into sentence tiles.
///
/// Sentences end after `.`, `!`, or `?` followed by whitespace; sentences
/// never span lines.
pub fn sentence_tiles(content: &str) -> Vec<Tile> {
    let sentences: Vec<String> = content
        .lines()
        .flat_map(|line| split_sentences(line.trim()))
        .collect();
    number_tiles(sentences)
}

/// Split content into paragraph tiles (blank-line separated).
pub fn paragraph_tiles(content: &str) -> Vec<Tile> {
    let paragraphs: Vec<String> = content
        .split("\n\n")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    number_tiles(paragraphs)
}

/// Randomize tile presentation order.
pub fn shuffle_tiles<R: Rng + ?Sized>(tiles: &mut [Tile], rng: &mut R) {
    tiles.shuffle(rng);
}

/// Grade a submitted ordering against the original tiles.
///
/// `submitted` is the list of tile ids in the user's order. A submission
/// whose length differs from the original, or that names an unknown tile,
/// is a validation error and mutates nothing.
pub fn grade_tile_order(original: &[Tile], submitted: &[String]) -> LingoResult<TileGrade> {
    if submitted.len() != original.len() {
        return Err(LingoError::validation_with_code(
            format!(
                "submitted order has {} items, content has {}",
                submitted.len(),
                original.len()
            ),
            ErrorCode::ValTileOrderMismatch,
        ));
    }

    let contents: HashMap<&str, &str> = original
        .iter()
        .map(|tile| (tile.id.as_str(), tile.content.as_str()))
        .collect();

    let mut tiles = Vec::new();
    let mut score = 0u32;
    for (index, id) in submitted.iter().enumerate() {
        let content = contents.get(id.as_str()).ok_or_else(|| {
            LingoError::validation_with_code(
                format!("unknown tile id '{}'", id),
                ErrorCode::ValTileOrderMismatch,
            )
        })?;
        let is_correct_position = original[index].id == *id;
        if is_correct_position {
            score += 1;
        }
        tiles.push(GradedTile {
            id: id.clone(),
            content: content.to_string(),
            is_correct_position,
        });
    }

    Ok(TileGrade {
        total: tiles.len() as u32,
        tiles,
        score,
    })
}

fn number_tiles(contents: Vec<String>) -> Vec<Tile> {
    contents
        .into_iter()
        .filter(|c| !c.is_empty())
        .enumerate()
        .map(|(index, content)| Tile {
            id: format!("item_{}", index + 1),
            content,
        })
        .collect()
}

/// Split one line into sentences after terminal punctuation + whitespace.
fn split_sentences(line: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            let sentence = current.trim().to_string();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            current.clear();
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}
