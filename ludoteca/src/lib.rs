use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod forca;
pub mod letrix;
pub mod normalize;
pub mod words;

use forca::Forca;
use letrix::{Letrix, Verdict};

pub use normalize::normalize;
pub use words::{Difficulty, SecretWord, WordError, WordList};

/// Where a game stands. `Won` and `Lost` are terminal until the game is reset.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Playing,
    Won,
    Lost,
}

impl Phase {
    pub fn is_over(self) -> bool {
        self != Phase::Playing
    }
}

/// Body of `POST /api/palavra`, also used to start an online Hangman game.
///
/// Both fields are optional on the wire so that the server can answer a
/// missing field with its own validation message.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct WordRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nivel: Option<i64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WordResponse {
    pub resposta: String,
}

/// Error payload of every route.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub erro: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detalhes: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GuessRequest {
    pub letra: String,
}

/// What a Hangman player is allowed to see.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ForcaResponse {
    pub id: Uuid,
    pub palavra: String,
    pub chutes: String,
    pub erros: usize,
    pub max_erros: usize,
    pub fase: Phase,
    /// Revealed once the game is over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segredo: Option<String>,
}

impl ForcaResponse {
    pub fn new(id: Uuid, game: &Forca) -> Self {
        Self {
            id,
            palavra: game.masked(),
            chutes: game.guesses().iter().collect(),
            erros: game.wrong_count(),
            max_erros: forca::MAX_ERRORS,
            fase: game.phase(),
            segredo: game.phase().is_over().then(|| game.word().to_string()),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RowRequest {
    pub palavra: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RowResponse {
    pub letras: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veredictos: Option<Vec<Verdict>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LetrixResponse {
    pub id: Uuid,
    pub linhas: Vec<RowResponse>,
    pub linha_atual: usize,
    pub tentativas_restantes: usize,
    pub fase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segredo: Option<String>,
}

impl LetrixResponse {
    pub fn new(id: Uuid, game: &Letrix) -> Self {
        let linhas = game
            .rows()
            .iter()
            .map(|row| RowResponse {
                letras: row.letters(),
                veredictos: row
                    .tiles()
                    .map(|tiles| tiles.iter().map(|tile| tile.verdict).collect()),
            })
            .collect();

        Self {
            id,
            linhas,
            linha_atual: game.current_row(),
            tentativas_restantes: game.tries_remaining(),
            fase: game.phase(),
            segredo: game.phase().is_over().then(|| game.secret().to_string()),
        }
    }
}
