use ludoteca::ForcaResponse;
use rand::seq::SliceRandom;
use squirrel_rng::SquirrelRng;

use super::{mistakes_left, Solver, ALPHABET};

/// Guesses every symbol once, in a shuffled order.
pub struct RandomSolver {
    idx: usize,
    alpha: Vec<char>,
}

impl RandomSolver {
    pub fn new() -> Self {
        let mut alpha: Vec<_> = ALPHABET.chars().collect();
        alpha.shuffle(&mut SquirrelRng::new());
        Self { idx: 0, alpha }
    }

    fn next(&mut self) -> char {
        if self.idx >= self.alpha.len() {
            self.idx = 0;
        }

        let next = self.alpha[self.idx];
        self.idx += 1;
        next
    }
}

impl Solver for RandomSolver {
    fn next_letter(&mut self, game: &ForcaResponse) -> char {
        println!("{} ({} left)", game.palavra, mistakes_left(game));
        self.next()
    }
}
