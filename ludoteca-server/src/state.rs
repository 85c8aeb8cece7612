use std::sync::{Mutex, MutexGuard};

use hashbrown::HashMap;
use ludoteca::{forca::Forca, letrix::Letrix, Difficulty, SecretWord, WordList};
use squirrel_rng::SquirrelRng;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    generator::Generator,
};

pub struct AppState {
    shared: Mutex<Shared>,
    pub forca_words: WordList,
    pub letrix_words: WordList,
    pub generator: Generator,
}

pub struct Shared {
    pub rng: SquirrelRng,
    pub forca: HashMap<Uuid, ForcaSession>,
    pub letrix: HashMap<Uuid, Letrix>,
}

impl AppState {
    pub fn new(forca_words: WordList, letrix_words: WordList, generator: Generator) -> Self {
        Self {
            shared: Mutex::new(Shared {
                rng: SquirrelRng::new(),
                forca: HashMap::new(),
                letrix: HashMap::new(),
            }),
            forca_words,
            letrix_words,
            generator,
        }
    }

    /// Lock the session tables. Never hold the guard across an `.await`.
    pub fn shared(&self) -> Result<MutexGuard<'_, Shared>> {
        self.shared
            .lock()
            .map_err(|_| Error::Unexpected("session lock is poisoned".into()))
    }
}

/// Where a Hangman session gets its secret words from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// The builtin (or configured) word list.
    Offline,
    /// The language model, asked about `theme` at `level`.
    Online { theme: String, level: Difficulty },
}

/// A Hangman game plus the bookkeeping needed to reset it safely.
///
/// Online resets wait on the word generator without holding the session lock.
/// `generation` counts resets, so a word that arrives after a newer reset has
/// started is recognized as stale and dropped.
#[derive(Clone, Debug)]
pub struct ForcaSession {
    pub game: Forca,
    pub source: Source,
    generation: u64,
}

impl ForcaSession {
    pub fn new(game: Forca, source: Source) -> Self {
        Self {
            game,
            source,
            generation: 0,
        }
    }

    /// Mark the start of a reset, returning the ticket to hand back to
    /// [`ForcaSession::finish_reset`].
    pub fn begin_reset(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Apply a freshly drawn word if no other reset started since `ticket` was
    /// issued. Returns whether the word was applied.
    pub fn finish_reset(&mut self, ticket: u64, word: SecretWord) -> bool {
        if ticket != self.generation {
            return false;
        }
        self.game.reset(word);
        true
    }
}
