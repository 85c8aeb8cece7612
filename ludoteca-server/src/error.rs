use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use ludoteca::ErrorResponse;
use uuid::Uuid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything a route can fail with. The display text is the `erro` field the
/// front end shows to players.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Tema não fornecido. Inclua um campo 'tema' no corpo da requisição.")]
    MissingTheme,
    #[error("Nível inválido. O campo 'nivel' deve estar entre 1 e 5.")]
    InvalidLevel,
    #[error("Requisição inválida.")]
    BadRequest(String),
    #[error("O chute deve ser uma única letra - {0:?} não é válido.")]
    IllegalGuess(String),
    #[error("A palavra deve ter exatamente 6 letras - {0:?} não é válida.")]
    IllegalRow(String),
    #[error("Jogo não encontrado: {0}")]
    GameNotFound(Uuid),
    #[error("Erro na API Groq (status {status}). Verifique o log para detalhes.")]
    UpstreamStatus { status: u16, body: String },
    #[error("Não foi possível contatar a API Groq.")]
    UpstreamTransport(#[source] reqwest::Error),
    #[error("A API Groq não retornou uma resposta válida.")]
    UpstreamEmpty,
    #[error("Ocorreu um erro inesperado ao processar sua solicitação.")]
    Unexpected(String),
}

impl Error {
    fn details(&self) -> Option<String> {
        match self {
            Error::BadRequest(details) | Error::Unexpected(details) => Some(details.clone()),
            Error::UpstreamStatus { body, .. } => Some(body.clone()),
            Error::UpstreamTransport(e) => Some(e.to_string()),
            _ => None,
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingTheme
            | Error::InvalidLevel
            | Error::BadRequest(_)
            | Error::IllegalGuess(_)
            | Error::IllegalRow(_) => StatusCode::BAD_REQUEST,
            Error::GameNotFound(_) => StatusCode::NOT_FOUND,
            Error::UpstreamStatus { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Error::UpstreamTransport(_) | Error::UpstreamEmpty => StatusCode::BAD_GATEWAY,
            Error::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            erro: self.to_string(),
            detalhes: self.details(),
        })
    }
}
