use std::fmt;

use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

use crate::normalize::normalize;

/// Builtin secret words for the Hangman game.
pub static FORCA_WORDS: &[&str] = &[
    "ABACATE", "ALGORITMO", "BANANA", "BRASIL", "CACHORRO", "CAMPO", "DADO", "ELEFANTE",
    "FLAMINGO", "FOGUETE", "GATO", "GIRASSOL", "HACKER", "IGLU", "JOGO", "KARATE", "LIVRO",
    "MELANCIA", "NINJA", "ORBITA", "PICOLE", "QUEIJO", "ROBOTO", "SOLDADO", "TEXTO",
    "UNICORNIO", "VALOR", "WEB", "XADREZ", "YOUTUBE", "ZEBRA",
];

/// Builtin six-letter secret words for Letrix.
pub static LETRIX_WORDS: &[&str] = &[
    "CAMADA", "BANANA", "BRINCO", "PAPAGA", "ROSTOS", "FLORES", "JARDIM", "CORPOS", "BOLADO",
    "MESTRE", "LETRAS", "VENTOS", "PORTAS", "CINEMA", "SOMBRI", "LIVROS", "GIRASS", "AMIGOS",
];

/// Theme names drawn from when a player asks for any theme.
pub static THEMES: &[&str] = &[
    "Animais",
    "Frutas",
    "Países",
    "Profissões",
    "Esportes",
    "Instrumentos Musicais",
    "Comidas Típicas",
    "Cidades Brasileiras",
    "Harry Potter",
    "Mitologia Grega",
    "Astronomia",
    "Tecnologia",
];

/// Theme labels that stand for "pick one for me".
const ANY_THEME: [&str; 2] = ["qualquer", "any"];

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum WordError {
    #[error("secret words must contain at least one letter")]
    Empty,
    #[error("difficulty must be between 1 and 5, got {0}")]
    Difficulty(i64),
}

/// The normalized word or phrase a player must guess.
///
/// Only uppercase ASCII letters, single spaces and hyphens survive, and at least
/// one letter is always present.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SecretWord(String);

impl SecretWord {
    pub fn new(raw: &str) -> Result<Self, WordError> {
        let word = normalize(raw);
        if word.bytes().any(|u| u.is_ascii_alphabetic()) {
            Ok(Self(word))
        } else {
            Err(WordError::Empty)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars()
    }
}

impl fmt::Display for SecretWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How obscure a generated word should be, from 1 (common, short) to 5 (rare,
/// long, proper noun).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: Difficulty = Difficulty(1);
    pub const MAX: Difficulty = Difficulty(5);

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = WordError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        match u8::try_from(level) {
            Ok(level @ 1..=5) => Ok(Difficulty(level)),
            _ => Err(WordError::Difficulty(level)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fixed list of candidate secret words.
#[derive(Clone, Debug)]
pub struct WordList {
    words: Vec<SecretWord>,
}

impl WordList {
    /// Build a list from raw entries, normalizing each and skipping any that
    /// normalize to nothing.
    pub fn new<I, S>(words: I) -> Result<Self, WordError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<_> = words
            .into_iter()
            .filter_map(|word| SecretWord::new(word.as_ref()).ok())
            .collect();

        if words.is_empty() {
            return Err(WordError::Empty);
        }
        Ok(Self { words })
    }

    pub fn forca() -> Self {
        Self::builtin(FORCA_WORDS)
    }

    pub fn letrix() -> Self {
        Self::builtin(LETRIX_WORDS)
    }

    fn builtin(words: &[&str]) -> Self {
        Self {
            words: words.iter().copied().map(|word| SecretWord(word.to_owned())).collect(),
        }
    }

    /// Uniformly pick one word.
    pub fn choose(&self, rng: &mut impl Rng) -> SecretWord {
        self.words
            .choose(rng)
            .cloned()
            .expect("word lists are never empty")
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Resolve a requested theme, replacing "any" with a random catalog entry.
pub fn resolve_theme(theme: &str, rng: &mut impl Rng) -> String {
    let theme = theme.trim();
    if ANY_THEME.iter().any(|any| any.eq_ignore_ascii_case(theme)) {
        THEMES
            .choose(rng)
            .copied()
            .expect("theme catalog is not empty")
            .to_owned()
    } else {
        theme.to_owned()
    }
}
