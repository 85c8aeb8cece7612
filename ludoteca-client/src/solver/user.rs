use ludoteca::{normalize::normalize_char, ForcaResponse};
use read_input::{shortcut::input, InputBuild};

use super::{mistakes_left, Solver};

/// Reads each guess from the terminal.
pub struct UserInputSolver;

impl Solver for UserInputSolver {
    fn next_letter(&mut self, game: &ForcaResponse) -> char {
        println!("{}", board(game));

        let guessed = game.chutes.clone();
        input::<char>()
            .msg("Letter: ")
            .add_err_test(
                |c| normalize_char(*c).is_some(),
                "Letters and hyphens only, accents are fine",
            )
            .add_err_test(
                move |c| normalize_char(*c).map_or(true, |c| !guessed.contains(c)),
                "Already guessed, try another one",
            )
            .err("Type a single letter")
            .get()
    }
}

/// The masked word spread out, followed by the mistakes left and every letter
/// tried so far.
fn board(game: &ForcaResponse) -> String {
    let word: Vec<_> = game.palavra.chars().map(String::from).collect();
    let guessed = if game.chutes.is_empty() {
        "none".to_owned()
    } else {
        game.chutes.chars().map(String::from).collect::<Vec<_>>().join(" ")
    };

    format!(
        "{}\nMistakes left: {}  Guessed: {guessed}",
        word.join(" "),
        mistakes_left(game),
    )
}
