//! Hangman ("Jogo da Forca") rules.

use thiserror::Error;

use crate::{normalize::normalize_char, words::SecretWord, Phase};

/// Distinct incorrect letters allowed before the game is lost: head, torso,
/// two arms, two legs.
pub const MAX_ERRORS: usize = 6;

/// Shown in place of each letter the player has not found yet.
pub const PLACEHOLDER: char = '_';

/// Outcome of a single guess.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Response {
    /// The letter occurs `count` times in the secret word.
    Hit { count: usize },
    /// The letter does not occur in the secret word.
    Miss,
    /// The letter was guessed before; nothing changed.
    AlreadyGuessed,
    /// The game is already won or lost; nothing changed.
    GameOver,
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum GuessError {
    #[error("{0:?} is not a letter")]
    Invalid(char),
}

/// A game of Hangman.
///
/// Only the secret word, the guesses in submission order and the phase are
/// stored. Everything else is derived from the first two on demand.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Forca {
    word: SecretWord,
    guesses: Vec<char>,
    phase: Phase,
}

impl Forca {
    pub fn new(word: SecretWord) -> Self {
        Self {
            word,
            guesses: Vec::new(),
            phase: Phase::Playing,
        }
    }

    /// Submit a guess.
    ///
    /// The letter is normalized first, so `'ã'` counts as `'A'`. Guessing in a
    /// terminal phase or repeating a letter leaves the game untouched.
    pub fn guess(&mut self, letter: char) -> Result<Response, GuessError> {
        let letter = normalize_char(letter).ok_or(GuessError::Invalid(letter))?;

        if self.phase.is_over() {
            return Ok(Response::GameOver);
        }
        if self.guesses.contains(&letter) {
            return Ok(Response::AlreadyGuessed);
        }

        self.guesses.push(letter);
        self.phase = self.evaluate();

        match self.occurrences(letter) {
            0 => Ok(Response::Miss),
            count => Ok(Response::Hit { count }),
        }
    }

    /// Start over with a new secret word.
    pub fn reset(&mut self, word: SecretWord) {
        *self = Self::new(word);
    }

    // Victory is checked before defeat.
    fn evaluate(&self) -> Phase {
        let letters = self.word.chars().filter(|&c| c != ' ').count();
        if letters > 0 && self.correct_count() == letters {
            Phase::Won
        } else if self.wrong_count() >= MAX_ERRORS {
            Phase::Lost
        } else {
            Phase::Playing
        }
    }

    fn occurrences(&self, letter: char) -> usize {
        self.word.chars().filter(|&c| c == letter).count()
    }

    /// The secret word with every unguessed character replaced by
    /// [`PLACEHOLDER`]. Spaces are always shown.
    pub fn masked(&self) -> String {
        self.word
            .chars()
            .map(|c| {
                if c == ' ' || self.guesses.contains(&c) {
                    c
                } else {
                    PLACEHOLDER
                }
            })
            .collect()
    }

    /// Number of guessed letters absent from the secret word.
    pub fn wrong_count(&self) -> usize {
        self.guesses
            .iter()
            .filter(|&&letter| self.occurrences(letter) == 0)
            .count()
    }

    /// Number of revealed positions: every correct guess counts once per
    /// occurrence in the secret word.
    pub fn correct_count(&self) -> usize {
        self.guesses
            .iter()
            .map(|&letter| self.occurrences(letter))
            .sum()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn guesses(&self) -> &[char] {
        &self.guesses
    }

    pub fn word(&self) -> &SecretWord {
        &self.word
    }
}
