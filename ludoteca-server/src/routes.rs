use actix_web::{
    web::{self, Data},
    Responder,
};
use ludoteca::{
    forca::Forca,
    letrix::{Letrix, LetrixError},
    words::resolve_theme,
    Difficulty, ForcaResponse, GuessRequest, LetrixResponse, RowRequest, SecretWord, WordRequest,
    WordResponse,
};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    state::{AppState, ForcaSession, Source},
};

/// Register every route.
///
/// A request body that is not valid JSON for its route is answered with 400
/// and `Requisição inválida.`, with the decoder's message in `detalhes`,
/// rather than falling through to the 500 catch-all.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|e, _| Error::BadRequest(e.to_string()).into()),
    )
    .route("/api/palavra", web::post().to(generate_word))
    .route("/forca", web::post().to(create_forca))
    .route("/forca/{game}", web::get().to(read_forca))
    .route("/forca/{game}", web::put().to(update_forca))
    .route("/forca/{game}/reiniciar", web::post().to(reset_forca))
    .route("/letrix", web::post().to(create_letrix))
    .route("/letrix/{game}", web::get().to(read_letrix))
    .route("/letrix/{game}", web::put().to(update_letrix))
    .route("/letrix/{game}/reiniciar", web::post().to(reset_letrix));
}

fn validate(request: &WordRequest) -> Result<(String, Difficulty)> {
    let theme = request
        .tema
        .as_deref()
        .map(str::trim)
        .filter(|theme| !theme.is_empty())
        .ok_or(Error::MissingTheme)?;

    let level = request
        .nivel
        .and_then(|level| Difficulty::try_from(level).ok())
        .ok_or(Error::InvalidLevel)?;

    Ok((theme.to_owned(), level))
}

async fn generate_word(
    request: web::Json<WordRequest>,
    data: Data<AppState>,
) -> Result<impl Responder> {
    let (theme, level) = validate(&request).map_err(|e| {
        log::debug!("rejected word request {request:?}: {e}");
        e
    })?;

    let theme = resolve_theme(&theme, &mut data.shared()?.rng);
    let resposta = data.generator.generate(&theme, level).await?;

    Ok(web::Json(WordResponse { resposta }))
}

async fn draw_word(data: &AppState, source: &Source) -> Result<SecretWord> {
    match source {
        Source::Offline => Ok(data.forca_words.choose(&mut data.shared()?.rng)),
        Source::Online { theme, level } => {
            let theme = resolve_theme(theme, &mut data.shared()?.rng);
            let raw = data.generator.generate(&theme, *level).await?;
            SecretWord::new(&raw).map_err(|_| {
                log::error!("generated word {raw:?} has no letters");
                Error::UpstreamEmpty
            })
        }
    }
}

async fn create_forca(
    request: web::Json<WordRequest>,
    data: Data<AppState>,
) -> Result<impl Responder> {
    let request = request.into_inner();

    // Either field asks for a generated word; the pair must then be valid.
    let source = if request.tema.is_some() || request.nivel.is_some() {
        let (theme, level) = validate(&request)?;
        Source::Online { theme, level }
    } else {
        Source::Offline
    };

    let game = Forca::new(draw_word(&data, &source).await?);
    let id = Uuid::new_v4();
    let response = ForcaResponse::new(id, &game);

    data.shared()?
        .forca
        .insert(id, ForcaSession::new(game, source));

    Ok(web::Json(response))
}

async fn read_forca(id: web::Path<Uuid>, data: Data<AppState>) -> Result<impl Responder> {
    let id = id.into_inner();
    let shared = data.shared()?;
    let session = shared.forca.get(&id).ok_or(Error::GameNotFound(id))?;

    Ok(web::Json(ForcaResponse::new(id, &session.game)))
}

async fn update_forca(
    id: web::Path<Uuid>,
    request: web::Json<GuessRequest>,
    data: Data<AppState>,
) -> Result<impl Responder> {
    // A guess can only be legal if it is a single character; whether that
    // character is a letter is up to the game.

    let id = id.into_inner();
    let GuessRequest { letra } = request.into_inner();

    let mut chars = letra.chars();
    let letter = match (chars.next(), chars.next()) {
        (Some(letter), None) => letter,
        _ => return Err(Error::IllegalGuess(letra)),
    };

    let mut shared = data.shared()?;
    let session = shared.forca.get_mut(&id).ok_or(Error::GameNotFound(id))?;

    // Repeated guesses and guesses after the game ended change nothing; the
    // player simply gets the current state back.

    let response = session
        .game
        .guess(letter)
        .map_err(|_| Error::IllegalGuess(letra))?;
    log::debug!("game {id}: {letter:?} -> {response:?}");

    Ok(web::Json(ForcaResponse::new(id, &session.game)))
}

async fn reset_forca(id: web::Path<Uuid>, data: Data<AppState>) -> Result<impl Responder> {
    let id = id.into_inner();

    let (source, ticket) = {
        let mut shared = data.shared()?;
        let session = shared.forca.get_mut(&id).ok_or(Error::GameNotFound(id))?;
        (session.source.clone(), session.begin_reset())
    };

    // The lock is released while the word is drawn, which may mean waiting on
    // the generator. Another reset may overtake this one in the meantime.

    let word = draw_word(&data, &source).await?;

    let mut shared = data.shared()?;
    let session = shared.forca.get_mut(&id).ok_or(Error::GameNotFound(id))?;
    if !session.finish_reset(ticket, word) {
        log::warn!("game {id}: discarded a word from a superseded reset");
    }

    Ok(web::Json(ForcaResponse::new(id, &session.game)))
}

fn build_letrix(data: &AppState) -> Result<Letrix> {
    let secret = data.letrix_words.choose(&mut data.shared()?.rng);
    Letrix::new(secret).map_err(|e| Error::Unexpected(e.to_string()))
}

async fn create_letrix(data: Data<AppState>) -> Result<impl Responder> {
    let game = build_letrix(&data)?;
    let id = Uuid::new_v4();
    let response = LetrixResponse::new(id, &game);

    data.shared()?.letrix.insert(id, game);

    Ok(web::Json(response))
}

async fn read_letrix(id: web::Path<Uuid>, data: Data<AppState>) -> Result<impl Responder> {
    let id = id.into_inner();
    let shared = data.shared()?;
    let game = shared.letrix.get(&id).ok_or(Error::GameNotFound(id))?;

    Ok(web::Json(LetrixResponse::new(id, game)))
}

async fn update_letrix(
    id: web::Path<Uuid>,
    request: web::Json<RowRequest>,
    data: Data<AppState>,
) -> Result<impl Responder> {
    let id = id.into_inner();
    let RowRequest { palavra } = request.into_inner();

    let mut shared = data.shared()?;
    let game = shared.letrix.get_mut(&id).ok_or(Error::GameNotFound(id))?;

    match game.submit_word(&palavra) {
        Ok(submission) => log::debug!("game {id}: {palavra:?} -> {submission:?}"),
        Err(LetrixError::InvalidWord(word)) => return Err(Error::IllegalRow(word)),
        Err(e) => return Err(Error::Unexpected(e.to_string())),
    }

    Ok(web::Json(LetrixResponse::new(id, game)))
}

async fn reset_letrix(id: web::Path<Uuid>, data: Data<AppState>) -> Result<impl Responder> {
    let id = id.into_inner();
    let fresh = build_letrix(&data)?;

    let mut shared = data.shared()?;
    let game = shared.letrix.get_mut(&id).ok_or(Error::GameNotFound(id))?;
    *game = fresh;

    Ok(web::Json(LetrixResponse::new(id, game)))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::{
        http::StatusCode,
        test::{self, TestRequest},
        App, HttpResponse, HttpServer,
    };
    use ludoteca::{letrix::Verdict, ErrorResponse, Phase, WordList};
    use serde_json::json;

    use super::*;
    use crate::generator::{Generator, GeneratorConfig};

    // Nothing listens here, so any request to it fails to connect.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn state(api_url: &str, forca: &[&str], letrix: &[&str]) -> Data<AppState> {
        state_with_timeout(api_url, forca, letrix, Duration::from_secs(5))
    }

    fn state_with_timeout(
        api_url: &str,
        forca: &[&str],
        letrix: &[&str],
        timeout: Duration,
    ) -> Data<AppState> {
        let generator = Generator::new(GeneratorConfig {
            api_url: api_url.into(),
            model: "test-model".into(),
            api_key: Some("test-key".into()),
            timeout,
        })
        .unwrap();

        Data::new(AppState::new(
            WordList::new(forca.iter().copied()).unwrap(),
            WordList::new(letrix.iter().copied()).unwrap(),
            generator,
        ))
    }

    /// Serve a canned chat-completions answer on a random local port.
    fn upstream(status: u16, body: &'static str) -> String {
        let server = HttpServer::new(move || {
            App::new().route(
                "/chat/completions",
                web::post().to(move || async move {
                    HttpResponse::build(StatusCode::from_u16(status).unwrap())
                        .content_type("application/json")
                        .body(body)
                }),
            )
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{addr}")
    }

    /// Serve a chat-completions endpoint that only answers after `delay`.
    fn slow_upstream(delay: Duration) -> String {
        let server = HttpServer::new(move || {
            App::new().route(
                "/chat/completions",
                web::post().to(move || async move {
                    actix_web::rt::time::sleep(delay).await;
                    HttpResponse::Ok()
                        .content_type("application/json")
                        .body(r#"{"choices":[{"message":{"content":"tarde"}}]}"#)
                }),
            )
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{addr}")
    }

    macro_rules! app {
        ($data:expr) => {
            test::init_service(App::new().app_data($data.clone()).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn palavra_requires_a_theme() {
        let data = state(UNREACHABLE, &["ABC"], &["CINEMA"]);
        let app = app!(data);

        for body in [json!({ "nivel": 2 }), json!({ "tema": "", "nivel": 2 })] {
            let request = TestRequest::post()
                .uri("/api/palavra")
                .set_json(body)
                .to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body: ErrorResponse = test::read_body_json(response).await;
            assert!(body.erro.starts_with("Tema não fornecido"));
        }
    }

    #[actix_web::test]
    async fn palavra_requires_a_level_in_range() {
        let data = state(UNREACHABLE, &["ABC"], &["CINEMA"]);
        let app = app!(data);

        for body in [
            json!({ "tema": "Animais" }),
            json!({ "tema": "Animais", "nivel": 0 }),
            json!({ "tema": "Animais", "nivel": 6 }),
        ] {
            let request = TestRequest::post()
                .uri("/api/palavra")
                .set_json(body)
                .to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body: ErrorResponse = test::read_body_json(response).await;
            assert!(body.erro.starts_with("Nível inválido"));
        }
    }

    #[actix_web::test]
    async fn malformed_body_is_a_bad_request() {
        let data = state(UNREACHABLE, &["ABC"], &["CINEMA"]);
        let app = app!(data);

        let request = TestRequest::post()
            .uri("/api/palavra")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ tema: ")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(response).await;
        assert!(body.detalhes.is_some());
    }

    #[actix_web::test]
    async fn palavra_returns_the_generated_text() {
        let api = upstream(
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":"  Pé-de-Moleque \n"}}]}"#,
        );
        let data = state(&api, &["ABC"], &["CINEMA"]);
        let app = app!(data);

        let request = TestRequest::post()
            .uri("/api/palavra")
            .set_json(json!({ "tema": "Comidas Típicas", "nivel": 3 }))
            .to_request();
        let body: WordResponse = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body.resposta, "Pé-de-Moleque");
        assert_eq!(
            data.generator.used_words().unwrap(),
            vec!["pé-de-moleque".to_owned()]
        );
    }

    #[actix_web::test]
    async fn palavra_propagates_upstream_failures() {
        let api = upstream(429, r#"{"error":"slow down"}"#);
        let data = state(&api, &["ABC"], &["CINEMA"]);
        let app = app!(data);

        let request = TestRequest::post()
            .uri("/api/palavra")
            .set_json(json!({ "tema": "qualquer", "nivel": 1 }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let body: ErrorResponse = test::read_body_json(response).await;
        assert!(body.erro.contains("status 429"));
        assert_eq!(body.detalhes.as_deref(), Some(r#"{"error":"slow down"}"#));
        assert!(data.generator.used_words().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn empty_upstream_answer_is_a_bad_gateway() {
        for payload in [
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"content":"   "}}]}"#,
            r#"not json at all"#,
        ] {
            let api = upstream(200, payload);
            let data = state(&api, &["ABC"], &["CINEMA"]);
            let app = app!(data);

            let request = TestRequest::post()
                .uri("/api/palavra")
                .set_json(json!({ "tema": "Animais", "nivel": 2 }))
                .to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::BAD_GATEWAY, "{payload}");

            let body: ErrorResponse = test::read_body_json(response).await;
            assert_eq!(body.erro, "A API Groq não retornou uma resposta válida.");
        }
    }

    #[actix_web::test]
    async fn unreachable_upstream_is_a_bad_gateway() {
        let data = state(UNREACHABLE, &["ABC"], &["CINEMA"]);
        let app = app!(data);

        let request = TestRequest::post()
            .uri("/api/palavra")
            .set_json(json!({ "tema": "Animais", "nivel": 2 }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body: ErrorResponse = test::read_body_json(response).await;
        assert!(body.detalhes.is_some());
    }

    #[actix_web::test]
    async fn slow_upstream_times_out_as_a_bad_gateway() {
        let api = slow_upstream(Duration::from_secs(3));
        let data = state_with_timeout(&api, &["ABC"], &["CINEMA"], Duration::from_secs(1));
        let app = app!(data);

        let request = TestRequest::post()
            .uri("/api/palavra")
            .set_json(json!({ "tema": "Animais", "nivel": 2 }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body: ErrorResponse = test::read_body_json(response).await;
        let details = body.detalhes.unwrap_or_default();
        assert!(details.contains("timed out"), "{details}");
        assert!(data.generator.used_words().unwrap().is_empty());
    }

    macro_rules! guess {
        ($app:expr, $id:expr, $letra:expr) => {{
            let request = TestRequest::put()
                .uri(&format!("/forca/{}", $id))
                .set_json(json!({ "letra": $letra }))
                .to_request();
            let view: ForcaResponse = test::call_and_read_body_json(&$app, request).await;
            view
        }};
    }

    #[actix_web::test]
    async fn forca_can_be_won() {
        let data = state(UNREACHABLE, &["abc"], &["CINEMA"]);
        let app = app!(data);

        let request = TestRequest::post()
            .uri("/forca")
            .set_json(json!({}))
            .to_request();
        let game: ForcaResponse = test::call_and_read_body_json(&app, request).await;
        assert_eq!(game.palavra, "___");
        assert_eq!(game.fase, Phase::Playing);
        assert_eq!(game.max_erros, 6);
        assert_eq!(game.segredo, None);

        let view = guess!(app, game.id, "a");
        assert_eq!(view.palavra, "A__");
        let view = guess!(app, game.id, "a");
        assert_eq!(view.chutes, "A");
        guess!(app, game.id, "B");
        let view = guess!(app, game.id, "C");
        assert_eq!(view.fase, Phase::Won);
        assert_eq!(view.segredo.as_deref(), Some("ABC"));

        let request = TestRequest::get()
            .uri(&format!("/forca/{}", game.id))
            .to_request();
        let view: ForcaResponse = test::call_and_read_body_json(&app, request).await;
        assert_eq!(view.palavra, "ABC");
        assert_eq!(view.fase, Phase::Won);
    }

    #[actix_web::test]
    async fn forca_can_be_lost_and_reset() {
        let data = state(UNREACHABLE, &["abc"], &["CINEMA"]);
        let app = app!(data);

        let request = TestRequest::post()
            .uri("/forca")
            .set_json(json!({}))
            .to_request();
        let game: ForcaResponse = test::call_and_read_body_json(&app, request).await;

        for letter in ["X", "Y", "Z", "Q", "R"] {
            assert_eq!(guess!(app, game.id, letter).fase, Phase::Playing);
        }
        let view = guess!(app, game.id, "S");
        assert_eq!(view.fase, Phase::Lost);
        assert_eq!(view.erros, 6);

        let view = guess!(app, game.id, "A");
        assert_eq!(view.chutes, "XYZQRS");
        assert_eq!(view.fase, Phase::Lost);

        let request = TestRequest::post()
            .uri(&format!("/forca/{}/reiniciar", game.id))
            .to_request();
        let view: ForcaResponse = test::call_and_read_body_json(&app, request).await;
        assert_eq!(view.fase, Phase::Playing);
        assert_eq!(view.chutes, "");
        assert_eq!(view.erros, 0);
        assert_eq!(view.palavra, "___");
    }

    #[actix_web::test]
    async fn forca_rejects_bad_guesses() {
        let data = state(UNREACHABLE, &["abc"], &["CINEMA"]);
        let app = app!(data);

        let request = TestRequest::post()
            .uri("/forca")
            .set_json(json!({}))
            .to_request();
        let game: ForcaResponse = test::call_and_read_body_json(&app, request).await;

        for letra in ["AB", "", "7", " "] {
            let request = TestRequest::put()
                .uri(&format!("/forca/{}", game.id))
                .set_json(json!({ "letra": letra }))
                .to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{letra:?}");
        }
    }

    #[actix_web::test]
    async fn unknown_games_are_not_found() {
        let data = state(UNREACHABLE, &["abc"], &["CINEMA"]);
        let app = app!(data);

        for uri in [
            format!("/forca/{}", Uuid::nil()),
            format!("/letrix/{}", Uuid::nil()),
        ] {
            let request = TestRequest::get().uri(&uri).to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);

            let body: ErrorResponse = test::read_body_json(response).await;
            assert!(body.erro.starts_with("Jogo não encontrado"));
        }
    }

    #[actix_web::test]
    async fn online_forca_uses_the_normalized_generated_word() {
        let api = upstream(
            200,
            r#"{"choices":[{"message":{"content":"São Paulo!"}}]}"#,
        );
        let data = state(&api, &["abc"], &["CINEMA"]);
        let app = app!(data);

        let request = TestRequest::post()
            .uri("/forca")
            .set_json(json!({ "tema": "Cidades Brasileiras", "nivel": 1 }))
            .to_request();
        let game: ForcaResponse = test::call_and_read_body_json(&app, request).await;
        assert_eq!(game.palavra, "___ _____");

        let view = guess!(app, game.id, "ã");
        assert_eq!(view.palavra, "_A_ _A___");

        let request = TestRequest::post()
            .uri(&format!("/forca/{}/reiniciar", game.id))
            .to_request();
        let view: ForcaResponse = test::call_and_read_body_json(&app, request).await;
        assert_eq!(view.palavra, "___ _____");
        assert_eq!(view.chutes, "");
    }

    #[actix_web::test]
    async fn online_forca_needs_a_valid_level() {
        let data = state(UNREACHABLE, &["abc"], &["CINEMA"]);
        let app = app!(data);

        let request = TestRequest::post()
            .uri("/forca")
            .set_json(json!({ "tema": "Animais", "nivel": 9 }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn failed_generation_keeps_the_old_game() {
        let api = upstream(503, "unavailable");
        let data = state(&api, &["abc"], &["CINEMA"]);
        let app = app!(data);

        let id = Uuid::new_v4();
        data.shared().unwrap().forca.insert(
            id,
            ForcaSession::new(
                Forca::new(SecretWord::new("GATO").unwrap()),
                Source::Online {
                    theme: "Animais".into(),
                    level: Difficulty::MIN,
                },
            ),
        );
        guess!(app, id, "G");

        let request = TestRequest::post()
            .uri(&format!("/forca/{id}/reiniciar"))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let request = TestRequest::get().uri(&format!("/forca/{id}")).to_request();
        let view: ForcaResponse = test::call_and_read_body_json(&app, request).await;
        assert_eq!(view.palavra, "G___");
        assert_eq!(view.fase, Phase::Playing);
    }

    #[actix_web::test]
    async fn letrix_rows_are_scored() {
        let data = state(UNREACHABLE, &["abc"], &["CINEMA"]);
        let app = app!(data);

        let request = TestRequest::post().uri("/letrix").to_request();
        let game: LetrixResponse = test::call_and_read_body_json(&app, request).await;
        assert_eq!(game.linhas.len(), 8);
        assert_eq!(game.tentativas_restantes, 8);

        let request = TestRequest::put()
            .uri(&format!("/letrix/{}", game.id))
            .set_json(json!({ "palavra": "flores" }))
            .to_request();
        let view: LetrixResponse = test::call_and_read_body_json(&app, request).await;
        assert_eq!(view.linhas[0].letras, "FLORES");
        assert_eq!(
            view.linhas[0].veredictos,
            Some(vec![
                Verdict::Absent,
                Verdict::Absent,
                Verdict::Absent,
                Verdict::Absent,
                Verdict::Present,
                Verdict::Absent,
            ])
        );
        assert_eq!(view.linha_atual, 1);

        let request = TestRequest::put()
            .uri(&format!("/letrix/{}", game.id))
            .set_json(json!({ "palavra": "Cinema" }))
            .to_request();
        let view: LetrixResponse = test::call_and_read_body_json(&app, request).await;
        assert_eq!(view.fase, Phase::Won);
        assert_eq!(view.segredo.as_deref(), Some("CINEMA"));

        let request = TestRequest::post()
            .uri(&format!("/letrix/{}/reiniciar", game.id))
            .to_request();
        let view: LetrixResponse = test::call_and_read_body_json(&app, request).await;
        assert_eq!(view.fase, Phase::Playing);
        assert_eq!(view.tentativas_restantes, 8);
        assert!(view.linhas.iter().all(|row| row.letras.is_empty()));
    }

    #[actix_web::test]
    async fn letrix_rejects_malformed_rows() {
        let data = state(UNREACHABLE, &["abc"], &["CINEMA"]);
        let app = app!(data);

        let request = TestRequest::post().uri("/letrix").to_request();
        let game: LetrixResponse = test::call_and_read_body_json(&app, request).await;

        for palavra in ["gato", "cinemas", "cin3ma"] {
            let request = TestRequest::put()
                .uri(&format!("/letrix/{}", game.id))
                .set_json(json!({ "palavra": palavra }))
                .to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{palavra}");
        }
    }
}
