//! Secret word generation through a hosted chat-completions API.

use std::{sync::Mutex, time::Duration};

use hashbrown::HashSet;
use ludoteca::Difficulty;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const SYSTEM_PROMPT: &str = "\
Você é uma IA que gera palavras para um jogo da forca.

Função:
- O usuário fornecerá um tema e um nível de dificuldade (1 a 5).
- Você deve responder com **apenas uma palavra** ou **nome composto** em português relacionado ao tema, respeitando a dificuldade.

Regras:
1. A resposta deve ser **somente uma palavra** ou um **nome composto com espaços**, como \"Acampamento Meio-Sangue\" ou \"Você Sabe Quem\".
2. A palavra deve ter **relação direta e clara** com o tema informado.
3. **Não inclua explicações, frases, listas ou definições.**
4. Responda apenas com a palavra, sem aspas, pontuação ou qualquer outro texto adicional.
5. Evite repetir palavras já utilizadas anteriormente.
6. Sempre responda em português, tanto os conectivos como os nomes.
7. Escolha a palavra conforme o nível de dificuldade:
   - Nível 1 → Palavras simples, curtas e muito conhecidas.
   - Nível 2 → Palavras um pouco mais específicas, mas ainda populares.
   - Nível 3 → Palavras mais raras, com 2 ou mais sílabas, ou nomes compostos médios.
   - Nível 4 → Palavras complexas, longas, mágicas, científicas ou muito específicas do tema.
   - Nível 5 → Nomes próprios ou termos extremamente específicos, longos ou pouco conhecidos (ex: \"Alvo Percival Wulfrico Brian Dumbledore\").
";

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Base url of an OpenAI compatible API, without the trailing
    /// `/chat/completions`.
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Asks a language model for secret words, remembering every word it handed
/// out for as long as the process lives.
#[derive(Debug)]
pub struct Generator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    used: Mutex<HashSet<String>>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    top_p: f32,
    max_completion_tokens: u32,
    reasoning_effort: &'a str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ludoteca-server v", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_url.trim_end_matches('/')),
            model: config.model,
            api_key: config.api_key,
            used: Mutex::new(HashSet::new()),
        })
    }

    /// Request one word or short name about `theme`.
    ///
    /// Returns the raw, trimmed model output. Callers normalize it before using
    /// it as a secret word.
    pub async fn generate(&self, theme: &str, level: Difficulty) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_owned(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(theme, level, &self.used_words()?),
                },
            ],
            temperature: 1.0,
            top_p: 1.0,
            max_completion_tokens: 512,
            reasoning_effort: "medium",
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            log::error!("word generator unreachable: {e}");
            Error::UpstreamTransport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("word generator answered {status}: {body}");
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ChatResponse = response.json().await.map_err(|e| {
            log::error!("word generator sent an unreadable payload: {e}");
            Error::UpstreamEmpty
        })?;

        let word = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_owned())
            .filter(|content| !content.is_empty())
            .ok_or(Error::UpstreamEmpty)?;

        self.record(&word)?;
        log::info!("generated {word:?} for theme {theme:?} at level {level}");
        Ok(word)
    }

    /// Every word handed out so far, lowercased and sorted.
    pub fn used_words(&self) -> Result<Vec<String>> {
        let used = self
            .used
            .lock()
            .map_err(|_| Error::Unexpected("used word set is poisoned".into()))?;
        let mut words: Vec<_> = used.iter().cloned().collect();
        words.sort_unstable();
        Ok(words)
    }

    // Duplicates are tolerated; the set only keeps one copy.
    fn record(&self, word: &str) -> Result<()> {
        self.used
            .lock()
            .map_err(|_| Error::Unexpected("used word set is poisoned".into()))?
            .insert(word.to_lowercase());
        Ok(())
    }
}

fn user_prompt(theme: &str, level: Difficulty, used: &[String]) -> String {
    let used = if used.is_empty() {
        "nenhuma".to_owned()
    } else {
        used.join(", ")
    };
    format!("Tema: {theme}\nNível de dificuldade: {level}\nPalavras já usadas: {used}")
}
