//! Sistema RAG (Retrieval-Augmented Generation) de línea de comandos:
//! carga documentos de un directorio, los trocea en chunks solapados, los
//! embebe con OpenAI a través de Rig, los guarda en un índice vectorial
//! local persistente y responde preguntas recuperando los chunks más
//! similares y pasándoselos como contexto a un modelo de chat.

pub mod config;
pub mod errors;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod rag;
pub mod splitter;
pub mod vector_store;

pub use config::{AppConfig, LlmProvider};
pub use errors::{RagError, Result};
pub use ingest::IngestionSummary;
pub use llm::{Embedder, Generator, LlmManager};
pub use models::{Document, RagAnswer, ScoredChunk, StoredChunk};
pub use rag::{InitOutcome, RagEngine, NO_CONTEXT_ANSWER};
pub use vector_store::VectorIndex;
