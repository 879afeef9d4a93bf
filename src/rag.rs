//! Orquestación del pipeline RAG.
//!
//! Flujo:
//!   - `initialize`: cargar el índice persistido si existe (camino rápido) o
//!     ingerir el corpus, embeber los chunks y persistir un índice nuevo.
//!   - `ask`: embeber la pregunta, recuperar los `top_k` chunks más
//!     similares, concatenarlos como contexto y pedirle la respuesta al LLM.
//!   - `similarity_search`: recuperación pura, sin generación, para depurar
//!     la calidad de la recuperación por separado.
//!
//! El motor tiene dos estados, sin inicializar y listo, con una única
//! transición hacia delante en `initialize`. Consultar antes de inicializar
//! es `NotInitialized`.

use std::collections::HashSet;

use tracing::info;

use crate::config::AppConfig;
use crate::errors::{RagError, Result};
use crate::ingest::{self, IngestionSummary};
use crate::llm::{Embedder, Generator};
use crate::models::{RagAnswer, ScoredChunk};
use crate::vector_store::VectorIndex;

/// Respuesta fija cuando el índice no contiene ningún chunk. Política
/// elegida: cortocircuitar sin llamar a embeddings ni a generación.
pub const NO_CONTEXT_ANSWER: &str =
    "No se encontró información relevante en los documentos para responder a esta pregunta.";

/// Separador entre chunks dentro del bloque de contexto del prompt.
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Resultado de una inicialización: de dónde salió el índice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// Había un índice persistido y se cargó directamente, sin re-ingesta.
    LoadedFromDisk,
    /// Se ingirió el corpus y se persistió un índice nuevo.
    Ingested(IngestionSummary),
}

/// Motor RAG: configuración, cliente de LLM y el índice vectorial una vez
/// inicializado.
///
/// `ask` y `similarity_search` toman `&self` y son seguras para uso
/// concurrente de sólo lectura; `initialize` toma `&mut self` y es la única
/// ruta de escritura.
pub struct RagEngine<L> {
    cfg: AppConfig,
    llm: L,
    index: Option<VectorIndex>,
}

impl<L: Embedder + Generator> RagEngine<L> {
    pub fn new(cfg: AppConfig, llm: L) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            llm,
            index: None,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// Inicializa el motor: carga el índice persistido si existe y
    /// `force_reload` es falso; en caso contrario ingiere el corpus completo
    /// y REEMPLAZA el índice persistido por el resultado.
    pub async fn initialize(&mut self, force_reload: bool) -> Result<InitOutcome> {
        if self.cfg.index_path.exists() && !force_reload {
            info!(
                "Índice persistido encontrado en {}. Cargando...",
                self.cfg.index_path.display()
            );
            self.index = Some(VectorIndex::load(&self.cfg.index_path)?);
            return Ok(InitOutcome::LoadedFromDisk);
        }

        info!("Creando índice vectorial nuevo...");
        let (index, summary) = ingest::ingest_corpus(&self.cfg, &self.llm).await?;
        index.save(&self.cfg.index_path)?;
        self.index = Some(index);
        Ok(InitOutcome::Ingested(summary))
    }

    /// Lanza una consulta RAG completa: recuperación más generación, con
    /// atribución de fuentes ordenada y sin duplicados.
    pub async fn ask(&self, question: &str) -> Result<RagAnswer> {
        let index = self.index.as_ref().ok_or(RagError::NotInitialized)?;

        if index.is_empty() {
            return Ok(RagAnswer {
                question: question.to_string(),
                answer: NO_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let retrieved = self.retrieve(index, question, self.cfg.top_k).await?;
        if retrieved.is_empty() {
            return Ok(RagAnswer {
                question: question.to_string(),
                answer: NO_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let context = retrieved
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        let answer = self.llm.answer_with_context(question, &context).await?;

        // Fuentes en orden de primera aparición, sin duplicados.
        let mut seen = HashSet::new();
        let sources = retrieved
            .iter()
            .filter(|c| seen.insert(c.source.clone()))
            .map(|c| c.source.clone())
            .collect();

        Ok(RagAnswer {
            question: question.to_string(),
            answer,
            sources,
        })
    }

    /// Recuperación pura: devuelve los `k` chunks más similares a la
    /// consulta, sin invocar al servicio de generación.
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 {
            return Err(RagError::InvalidArgument(
                "k debe ser un entero positivo".to_string(),
            ));
        }
        let index = self.index.as_ref().ok_or(RagError::NotInitialized)?;
        self.retrieve(index, query, k).await
    }

    async fn retrieve(
        &self,
        index: &VectorIndex,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if index.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = self.llm.embed_texts(vec![query.to_string()]).await?;
        if embeddings.is_empty() {
            return Err(RagError::TransientService {
                service: "embeddings",
                message: "No se pudo generar el embedding de la consulta".to_string(),
            });
        }
        let query_embedding = embeddings.swap_remove(0);

        index.search(&query_embedding, k)
    }
}
