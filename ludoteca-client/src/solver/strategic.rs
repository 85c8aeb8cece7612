use std::{fs, io};

use hashbrown::{HashMap, HashSet};
use ludoteca::{forca::PLACEHOLDER, normalize, ForcaResponse};
use rand::seq::{IteratorRandom, SliceRandom};
use regex::Regex;
use squirrel_rng::SquirrelRng;

use super::{mistakes_left, Solver, ALPHABET};

/// Narrows a dictionary down to the words that fit what has been revealed so
/// far, then guesses the symbol most of them share.
#[derive(Debug)]
pub struct StrategicSolver {
    dictionary: Vec<String>,
    submitted: HashSet<char>,
    rng: SquirrelRng,
}

impl StrategicSolver {
    pub fn from_path(dictionary: &str) -> io::Result<Self> {
        let text = fs::read_to_string(dictionary)?;
        Ok(Self::from_words(text.lines()))
    }

    fn from_words<'a>(words: impl Iterator<Item = &'a str>) -> Self {
        let mut dictionary: Vec<_> = words
            .map(normalize)
            .filter(|word| !word.is_empty())
            .collect();

        dictionary.sort_unstable();
        dictionary.dedup();

        Self {
            dictionary,
            submitted: HashSet::new(),

            // Chosen by mashing keyboard. Plenty random.
            rng: SquirrelRng::with_seed(3408509824),
        }
    }

    fn choose(&mut self, word: &str) -> char {
        let shape = Shape::new(word, &self.submitted);

        let mut frequency = HashMap::new();
        for c in self
            .dictionary
            .iter()
            .filter(|candidate| shape.matches(candidate))
            .flat_map(|candidate| candidate.chars())
            .filter(|c| *c != ' ' && !self.submitted.contains(c))
        {
            *frequency.entry(c).or_insert(0usize) += 1;
        }

        let best = frequency.values().copied().max();
        let mut first_rank: Vec<_> = frequency
            .into_iter()
            .filter(|&(_, count)| Some(count) == best)
            .map(|(c, _)| c)
            .collect();
        first_rank.sort_unstable();

        let selected = match first_rank.choose(&mut self.rng) {
            Some(&c) => c,
            None => ALPHABET
                .chars()
                .filter(|c| !self.submitted.contains(c))
                .choose(&mut self.rng)
                .unwrap_or('A'),
        };

        self.submitted.insert(selected);
        selected
    }
}

impl Solver for StrategicSolver {
    fn next_letter(&mut self, game: &ForcaResponse) -> char {
        println!("{} ({} left)", game.palavra, mistakes_left(game));
        // The server's list also covers guesses it refused as repeats.
        self.submitted.extend(game.chutes.chars());
        self.choose(&game.palavra)
    }
}

/// The masked word as a filter over dictionary entries.
struct Shape<'a> {
    expr: Option<Regex>,
    masked: Vec<char>,
    submitted: &'a HashSet<char>,
}

impl<'a> Shape<'a> {
    fn new(word: &str, submitted: &'a HashSet<char>) -> Self {
        Self {
            expr: build_expr(word),
            masked: word.chars().collect(),
            submitted,
        }
    }

    /// A candidate fits when it has the revealed letters in place and no
    /// hidden position holds a symbol that was already guessed, since a
    /// correct guess reveals every occurrence.
    fn matches(&self, candidate: &str) -> bool {
        let Some(expr) = &self.expr else {
            return false;
        };

        expr.is_match(candidate)
            && candidate
                .chars()
                .zip(&self.masked)
                .all(|(c, &m)| m != PLACEHOLDER || !self.submitted.contains(&c))
    }
}

fn build_expr(word: &str) -> Option<Regex> {
    let body: String = word
        .chars()
        .map(|c| match c {
            PLACEHOLDER => "[A-Z-]".to_owned(),
            c => regex::escape(&c.to_string()),
        })
        .collect();
    Regex::new(&format!("^{body}$")).ok()
}
