use std::{io, process};

use clap::{Parser, Subcommand};
use ludoteca::{ErrorResponse, ForcaResponse, GuessRequest, Phase, WordRequest};
use reqwest::{
    blocking::{Client, Response},
    StatusCode,
};
use serde::de::DeserializeOwned;
use solver::{RandomSolver, Solver, StrategicSolver, UserInputSolver};

mod letrix;
mod solver;

#[derive(Debug, Parser)]
struct Args {
    /// ludoteca server url
    server: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// play hangman
    Forca(ForcaConfig),
    /// play letrix
    Letrix,
}

#[derive(Debug, Parser)]
struct ForcaConfig {
    /// theme for a generated word; without it the word comes from the builtin list
    #[clap(long)]
    tema: Option<String>,

    /// difficulty of the generated word, from 1 to 5
    #[clap(long, default_value_t = 1)]
    nivel: i64,

    #[clap(subcommand)]
    solver: SolverCommand,
}

#[derive(Debug, Subcommand)]
enum SolverCommand {
    Random,
    Strategic(SolverConfig),
    User,
}

#[derive(Debug, Parser)]
struct SolverConfig {
    /// path to dictionary
    dictionary: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run(&Args::parse()) {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let client = Client::builder()
        .user_agent(concat!("ludoteca-client v", env!("CARGO_PKG_VERSION")))
        .build()?;
    let server = args.server.trim_end_matches('/');

    match &args.command {
        Command::Forca(config) => play_forca(&client, server, config),
        Command::Letrix => letrix::play(&client, server),
    }
}

fn play_forca(client: &Client, server: &str, config: &ForcaConfig) -> anyhow::Result<()> {
    let request = WordRequest {
        tema: config.tema.clone(),
        nivel: config.tema.as_ref().map(|_| config.nivel),
    };

    let mut game: ForcaResponse = read(client.post(format!("{server}/forca")).json(&request).send()?)?;
    let game_url = format!("{server}/forca/{}", game.id);
    let mut solver = build_solver(&config.solver)?;

    while game.fase == Phase::Playing {
        let letra = solver.next_letter(&game).to_string();
        log::debug!("PUT {game_url} {letra:?}");

        let response = client
            .put(&game_url)
            .json(&GuessRequest { letra })
            .send()?;

        // The server refuses anything that is not a single letter. That only
        // happens with typed guesses, so just ask again.
        if response.status() == StatusCode::BAD_REQUEST {
            continue;
        }

        game = read(response)?;
    }

    let word = game.segredo.unwrap_or(game.palavra);
    if game.fase == Phase::Won {
        println!("The word was: {word}\nWe win! {} mistakes.", game.erros);
    } else {
        println!("The word was: {word}\nWe lose. :( Hanged after {} mistakes.", game.erros);
    }

    Ok(())
}

/// Decode a successful response, or turn the server's error payload into an
/// error.
pub(crate) fn read<T: DeserializeOwned>(response: Response) -> anyhow::Result<T> {
    let status = response.status();
    log::debug!("{} answered {status}", response.url());

    if status.is_success() {
        return Ok(response.json()?);
    }

    match response.json::<ErrorResponse>() {
        Ok(ErrorResponse {
            erro,
            detalhes: Some(detalhes),
        }) => anyhow::bail!("{status}: {erro} ({detalhes})"),
        Ok(ErrorResponse { erro, .. }) => anyhow::bail!("{status}: {erro}"),
        Err(_) => anyhow::bail!("server answered {status}"),
    }
}

fn build_solver(command: &SolverCommand) -> io::Result<Box<dyn Solver>> {
    match command {
        SolverCommand::Random => Ok(Box::new(RandomSolver::new())),
        SolverCommand::Strategic(config) => {
            Ok(Box::new(StrategicSolver::from_path(&config.dictionary)?))
        }
        SolverCommand::User => Ok(Box::new(UserInputSolver)),
    }
}
