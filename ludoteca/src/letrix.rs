//! Letrix, a six-letter word guessing game in eight tries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{normalize::normalize_char, words::SecretWord, Phase};

pub const WORD_LENGTH: usize = 6;
pub const MAX_TRIES: usize = 8;

/// How a guessed letter relates to the secret word.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Right letter, right position.
    Exact,
    /// The letter is in the secret word, elsewhere.
    Present,
    /// The letter is not in the secret word, or all its occurrences are
    /// already accounted for.
    Absent,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tile {
    pub letter: char,
    pub verdict: Verdict,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LetrixError {
    #[error("guess has {guess} letters but the secret word has {secret}")]
    LengthMismatch { guess: usize, secret: usize },
    #[error("a row needs exactly {WORD_LENGTH} letters, got {0}")]
    Incomplete(usize),
    #[error("letrix words must be {WORD_LENGTH} plain letters - {0} is not")]
    InvalidWord(String),
    #[error("{0:?} is not a letter")]
    InvalidLetter(char),
}

/// Score a guess against the secret word.
///
/// Exact matches are settled first and use up their secret letter. Each
/// remaining guess letter, left to right, then claims the leftmost unused
/// occurrence in the secret. A letter is therefore never marked exact or
/// present more often than it occurs in the secret.
pub fn score(guess: &str, secret: &str) -> Result<Vec<Tile>, LetrixError> {
    let guess: Vec<char> = guess.chars().collect();
    let mut unused: Vec<Option<char>> = secret.chars().map(Some).collect();

    if guess.len() != unused.len() {
        return Err(LetrixError::LengthMismatch {
            guess: guess.len(),
            secret: unused.len(),
        });
    }

    let mut verdicts = vec![Verdict::Absent; guess.len()];

    for ((&letter, slot), verdict) in guess.iter().zip(unused.iter_mut()).zip(&mut verdicts) {
        if *slot == Some(letter) {
            *slot = None;
            *verdict = Verdict::Exact;
        }
    }

    for (&letter, verdict) in guess.iter().zip(&mut verdicts) {
        if *verdict == Verdict::Exact {
            continue;
        }
        if let Some(slot) = unused.iter_mut().find(|slot| **slot == Some(letter)) {
            *slot = None;
            *verdict = Verdict::Present;
        }
    }

    Ok(guess
        .into_iter()
        .zip(verdicts)
        .map(|(letter, verdict)| Tile { letter, verdict })
        .collect())
}

/// One line of the board.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Row {
    letters: Vec<char>,
    tiles: Option<Vec<Tile>>,
}

impl Row {
    pub fn letters(&self) -> String {
        self.letters.iter().collect()
    }

    /// Verdicts for a submitted row, `None` while the row is still open.
    pub fn tiles(&self) -> Option<&[Tile]> {
        self.tiles.as_deref()
    }

    pub fn is_submitted(&self) -> bool {
        self.tiles.is_some()
    }
}

/// Outcome of submitting the current row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Submission {
    Scored(Vec<Tile>),
    /// The game is already won or lost; nothing changed.
    GameOver,
}

/// A Letrix board: [`MAX_TRIES`] rows of [`WORD_LENGTH`] letters.
///
/// Only the current row can be edited. Submitted rows keep their letters and
/// verdicts for the rest of the game.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Letrix {
    secret: SecretWord,
    rows: Vec<Row>,
    row: usize,
    phase: Phase,
}

impl Letrix {
    pub fn new(secret: SecretWord) -> Result<Self, LetrixError> {
        if !is_playable(secret.as_str()) {
            return Err(LetrixError::InvalidWord(secret.to_string()));
        }

        Ok(Self {
            secret,
            rows: vec![Row::default(); MAX_TRIES],
            row: 0,
            phase: Phase::Playing,
        })
    }

    /// Type a letter into the next free column of the current row. Does
    /// nothing once the row is full or the game is over.
    pub fn type_letter(&mut self, letter: char) -> Result<(), LetrixError> {
        let letter = normalize_char(letter)
            .filter(char::is_ascii_alphabetic)
            .ok_or(LetrixError::InvalidLetter(letter))?;

        if self.phase.is_over() {
            return Ok(());
        }

        let row = &mut self.rows[self.row];
        if row.letters.len() < WORD_LENGTH {
            row.letters.push(letter);
        }
        Ok(())
    }

    /// Erase the last typed letter of the current row.
    pub fn backspace(&mut self) {
        if !self.phase.is_over() {
            self.rows[self.row].letters.pop();
        }
    }

    /// Score the current row.
    ///
    /// Guessing the secret wins; otherwise using up the last row loses, and
    /// any other submission moves on to the next, empty row.
    pub fn submit(&mut self) -> Result<Submission, LetrixError> {
        if self.phase.is_over() {
            return Ok(Submission::GameOver);
        }

        let row = &mut self.rows[self.row];
        if row.letters.len() != WORD_LENGTH {
            return Err(LetrixError::Incomplete(row.letters.len()));
        }

        let guess = row.letters();
        let tiles = score(&guess, self.secret.as_str())?;
        row.tiles = Some(tiles.clone());

        if guess == self.secret.as_str() {
            self.phase = Phase::Won;
        } else if self.row + 1 == MAX_TRIES {
            self.phase = Phase::Lost;
        } else {
            self.row += 1;
        }

        Ok(Submission::Scored(tiles))
    }

    /// Replace whatever is typed in the current row with `word` and submit it.
    pub fn submit_word(&mut self, word: &str) -> Result<Submission, LetrixError> {
        if self.phase.is_over() {
            return Ok(Submission::GameOver);
        }

        let letters: Vec<char> = word
            .chars()
            .map(|c| normalize_char(c).filter(char::is_ascii_alphabetic))
            .collect::<Option<_>>()
            .ok_or_else(|| LetrixError::InvalidWord(word.to_owned()))?;

        if letters.len() != WORD_LENGTH {
            return Err(LetrixError::InvalidWord(word.to_owned()));
        }

        self.rows[self.row].letters = letters;
        self.submit()
    }

    pub fn reset(&mut self, secret: SecretWord) -> Result<(), LetrixError> {
        *self = Self::new(secret)?;
        Ok(())
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Index of the row being edited, or of the last submitted row once the
    /// game is over.
    pub fn current_row(&self) -> usize {
        self.row
    }

    pub fn tries_remaining(&self) -> usize {
        MAX_TRIES - self.rows.iter().filter(|row| row.is_submitted()).count()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn secret(&self) -> &SecretWord {
        &self.secret
    }
}

fn is_playable(word: &str) -> bool {
    word.len() == WORD_LENGTH && word.bytes().all(|u| u.is_ascii_uppercase())
}
