//! Abstracción sobre Rig para trabajar con distintos proveedores de LLM.
//! De momento se implementa OpenAI; Gemini/Ollama quedan preparados para el
//! futuro.
//!
//! Las dos llamadas de red del pipeline quedan detrás de interfaces estrechas
//! (`Embedder`, `Generator`) para poder superponer reintentos o sustituir el
//! proveedor sin tocar la orquestación. El núcleo no reintenta.

use crate::config::{AppConfig, LlmProvider};
use crate::errors::{RagError, Result};

/// Servicio de embeddings: texto → vector de longitud fija.
#[allow(async_fn_in_trait)]
pub trait Embedder {
    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>>;
}

/// Servicio de generación: (pregunta, contexto) → respuesta en lenguaje
/// natural, condicionada sólo al contexto suministrado.
#[allow(async_fn_in_trait)]
pub trait Generator {
    async fn answer_with_context(&self, question: &str, context: &str) -> Result<String>;
}

const SYSTEM_PROMPT: &str = r#"
Eres un asistente que responde preguntas basándose en el contexto proporcionado.
Usa únicamente la información del contexto para responder a la pregunta.
Si el contexto no contiene la respuesta, di explícitamente que no la sabes;
no inventes una respuesta.
Responde siempre de forma clara y concisa.
"#;

/// Gestor de LLMs y embeddings respaldado por Rig.
#[derive(Debug, Clone)]
pub struct LlmManager {
    pub provider: LlmProvider,
    pub embedding_model: String,
    pub chat_model: String,
    pub temperature: f64,
}

impl LlmManager {
    /// Construye el manager a partir de la configuración. Falla rápido con
    /// `Configuration` si falta la credencial del proveedor.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        if matches!(cfg.llm_provider, LlmProvider::OpenAI)
            && std::env::var("OPENAI_API_KEY").is_err()
        {
            return Err(RagError::Configuration(
                "Falta OPENAI_API_KEY en el entorno (defínela en tu fichero .env)".to_string(),
            ));
        }

        Ok(Self {
            provider: cfg.llm_provider.clone(),
            embedding_model: cfg.llm_embedding_model.clone(),
            chat_model: cfg.llm_chat_model.clone(),
            temperature: cfg.temperature,
        })
    }

    // ---------------------------------------------------------------------
    // EMBEDDINGS
    // ---------------------------------------------------------------------

    async fn embed_with_openai(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>> {
        use rig::client::EmbeddingsClient as _;
        use rig::embeddings::EmbeddingModel as _;
        use rig::providers::openai::{self, TEXT_EMBEDDING_3_SMALL};

        let client = openai::Client::from_env();

        let model_name = if self.embedding_model.is_empty() {
            TEXT_EMBEDDING_3_SMALL
        } else {
            self.embedding_model.as_str()
        };
        let embedding_model = client.embedding_model(model_name);

        let expected = texts.len();
        let embeddings = embedding_model.embed_texts(texts).await.map_err(|e| {
            RagError::TransientService {
                service: "embeddings",
                message: e.to_string(),
            }
        })?;

        if embeddings.len() != expected {
            return Err(RagError::TransientService {
                service: "embeddings",
                message: format!(
                    "Número de embeddings ({}) distinto al número de textos ({})",
                    embeddings.len(),
                    expected
                ),
            });
        }

        Ok(embeddings.into_iter().map(|e| e.vec).collect())
    }

    // ---------------------------------------------------------------------
    // CHAT / COMPLETION
    // ---------------------------------------------------------------------

    async fn answer_with_openai(&self, question: &str, context: &str) -> Result<String> {
        use rig::client::CompletionClient as _;
        use rig::completion::Prompt;
        use rig::providers::openai;

        let client = openai::Client::from_env();

        let model_name = if self.chat_model.is_empty() {
            "gpt-4o-mini"
        } else {
            self.chat_model.as_str()
        };

        let full_context = format!(
            "Contexto:\n{}\n\nPregunta del usuario:\n{}",
            context, question
        );

        let agent = client
            .agent(model_name)
            .preamble(SYSTEM_PROMPT)
            .context(&full_context)
            .temperature(self.temperature)
            .build();

        agent
            .prompt(question)
            .await
            .map_err(|e| RagError::TransientService {
                service: "generación",
                message: e.to_string(),
            })
    }
}

impl Embedder for LlmManager {
    /// Calcula embeddings en bloque para una lista de textos.
    ///
    /// Nota: sólo implementado para OpenAI. Para otros proveedores se
    /// podrían añadir ramas adicionales al `match`.
    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>> {
        match self.provider {
            LlmProvider::OpenAI => self.embed_with_openai(texts).await,
            ref other => Err(RagError::Configuration(format!(
                "Proveedor LLM {:?} aún no implementado para embeddings",
                other
            ))),
        }
    }
}

impl Generator for LlmManager {
    /// Genera una respuesta a partir de una pregunta y un contexto
    /// (concatenación de chunks relevantes).
    async fn answer_with_context(&self, question: &str, context: &str) -> Result<String> {
        match self.provider {
            LlmProvider::OpenAI => self.answer_with_openai(question, context).await,
            ref other => Err(RagError::Configuration(format!(
                "Proveedor LLM {:?} aún no implementado para chat",
                other
            ))),
        }
    }
}
