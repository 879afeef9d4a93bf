//! Carga y gestión de configuración de la aplicación (pipeline RAG + LLM).

use std::env;
use std::path::PathBuf;

use crate::errors::{RagError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAI,
    Gemini,
    Ollama,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(RagError::Configuration(format!(
                "Proveedor LLM no soportado: {other}"
            ))),
        }
    }
}

/// Configuración completa de la aplicación, validada en el arranque.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Directorio con los documentos a indexar.
    pub data_dir: PathBuf,
    /// Fichero donde se persiste el índice vectorial.
    pub index_path: PathBuf,
    /// Tamaño máximo de cada chunk, en caracteres.
    pub chunk_size: usize,
    /// Solape entre chunks consecutivos, en caracteres.
    pub chunk_overlap: usize,
    /// Número de chunks a recuperar por consulta.
    pub top_k: usize,
    /// Temperatura de generación (0.0 = determinista).
    pub temperature: f64,
    /// Extensiones de fichero admitidas en la ingesta.
    pub extensions: Vec<String>,

    pub llm_provider: LlmProvider,
    pub llm_embedding_model: String,
    pub llm_chat_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            index_path: PathBuf::from("rag_index.json"),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
            temperature: 0.0,
            extensions: vec!["txt".to_string()],
            llm_provider: LlmProvider::OpenAI,
            llm_embedding_model: "text-embedding-3-small".to_string(),
            llm_chat_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let data_dir = env::var("RAG_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let index_path = env::var("RAG_INDEX_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.index_path);

        let chunk_size = parse_var("RAG_CHUNK_SIZE", defaults.chunk_size)?;
        let chunk_overlap = parse_var("RAG_CHUNK_OVERLAP", defaults.chunk_overlap)?;
        let top_k = parse_var("RAG_TOP_K", defaults.top_k)?;
        let temperature = parse_var("RAG_TEMPERATURE", defaults.temperature)?;

        let extensions = match env::var("RAG_EXTENSIONS") {
            Ok(raw) => raw
                .split(',')
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            Err(_) => defaults.extensions,
        };

        let llm_provider_str =
            env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let llm_provider = LlmProvider::from_str(&llm_provider_str)?;

        let llm_embedding_model =
            env::var("LLM_EMBEDDING_MODEL").unwrap_or(defaults.llm_embedding_model);
        let llm_chat_model =
            env::var("LLM_CHAT_MODEL").unwrap_or(defaults.llm_chat_model);

        let cfg = Self {
            data_dir,
            index_path,
            chunk_size,
            chunk_overlap,
            top_k,
            temperature,
            extensions,
            llm_provider,
            llm_embedding_model,
            llm_chat_model,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Valida los parámetros del pipeline. Falla rápido con `Configuration`
    /// antes de tocar ningún servicio externo.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Configuration(
                "RAG_CHUNK_SIZE debe ser mayor que cero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Configuration(format!(
                "RAG_CHUNK_OVERLAP ({}) debe ser menor que RAG_CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::Configuration(
                "RAG_TOP_K debe ser un entero positivo".to_string(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(RagError::Configuration(
                "RAG_EXTENSIONS no puede estar vacío".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| {
            RagError::Configuration(format!("Valor inválido para {name}: '{raw}'"))
        }),
        Err(_) => Ok(default),
    }
}
