use ludoteca::ForcaResponse;

mod random;
mod strategic;
mod user;

pub use random::RandomSolver;
pub use strategic::StrategicSolver;
pub use user::UserInputSolver;

/// Every symbol a hangman secret can hide.
pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ-";

pub trait Solver {
    fn next_letter(&mut self, game: &ForcaResponse) -> char;
}

fn mistakes_left(game: &ForcaResponse) -> usize {
    game.max_erros.saturating_sub(game.erros)
}
