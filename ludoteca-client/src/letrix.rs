use ludoteca::{
    letrix::{Verdict, WORD_LENGTH},
    LetrixResponse, Phase, RowRequest, RowResponse,
};
use read_input::{shortcut::input, InputBuild};
use reqwest::{blocking::Client, StatusCode};

use crate::read;

pub fn play(client: &Client, server: &str) -> anyhow::Result<()> {
    let mut game: LetrixResponse = read(client.post(format!("{server}/letrix")).send()?)?;
    let game_url = format!("{server}/letrix/{}", game.id);

    loop {
        for row in &game.linhas {
            println!("{}", render_row(row));
        }

        if game.fase != Phase::Playing {
            break;
        }

        let palavra: String = input()
            .msg(format!("Guess ({} left): ", game.tentativas_restantes))
            .get();

        let response = client
            .put(&game_url)
            .json(&RowRequest { palavra })
            .send()?;

        if response.status() == StatusCode::BAD_REQUEST {
            println!("Guesses must be exactly {WORD_LENGTH} letters.");
            continue;
        }

        game = read(response)?;
    }

    let word = game.segredo.unwrap_or_default();
    if game.fase == Phase::Won {
        println!("You got it: {word}!");
    } else {
        println!("The word was {word}.");
    }

    Ok(())
}

/// `[X]` marks an exact letter, `(X)` a misplaced one and ` X ` an absent one.
/// Rows not yet submitted show their typed letters padded with dots.
fn render_row(row: &RowResponse) -> String {
    match &row.veredictos {
        Some(verdicts) => row
            .letras
            .chars()
            .zip(verdicts)
            .map(|(c, verdict)| match verdict {
                Verdict::Exact => format!("[{c}]"),
                Verdict::Present => format!("({c})"),
                Verdict::Absent => format!(" {c} "),
            })
            .collect(),
        None => row
            .letras
            .chars()
            .chain(std::iter::repeat('.'))
            .take(WORD_LENGTH)
            .map(|c| format!(" {c} "))
            .collect(),
    }
}
