use std::{fs, io, time::Duration};

use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use clap::Parser;
use generator::{Generator, GeneratorConfig};
use ludoteca::WordList;
use state::AppState;

mod error;
mod generator;
mod routes;
mod state;

#[derive(Clone, Debug, Parser)]
struct Args {
    /// address to listen on
    #[clap(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// path to a hangman word list, one word per line
    #[clap(long)]
    words: Option<String>,

    /// base url of the chat completions api used to generate words
    #[clap(long, default_value = "https://api.groq.com/openai/v1")]
    api_url: String,

    /// model asked for generated words
    #[clap(long, default_value = "openai/gpt-oss-120b")]
    model: String,

    /// seconds to wait for a generated word
    #[clap(long, default_value_t = 30)]
    timeout: u64,

    /// key for the chat completions api
    #[clap(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let forca_words = match &args.words {
        Some(path) => read_words(path)?,
        None => WordList::forca(),
    };

    if args.api_key.is_none() {
        log::warn!("GROQ_API_KEY is not set; word generation requests will be rejected upstream");
    }

    let generator = Generator::new(GeneratorConfig {
        api_url: args.api_url.clone(),
        model: args.model.clone(),
        api_key: args.api_key.clone(),
        timeout: Duration::from_secs(args.timeout),
    })
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let data = Data::new(AppState::new(forca_words, WordList::letrix(), generator));

    log::info!("listening on {}", args.bind);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind(&args.bind)?
    .run()
    .await
}

fn read_words(path: &str) -> io::Result<WordList> {
    let text = fs::read_to_string(path)?;
    let words = WordList::new(text.lines()).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("{path}: {e}"))
    })?;

    log::info!("loaded {} words from {path}", words.len());
    Ok(words)
}
