//! Modelos de dominio del pipeline RAG (documentos, chunks y resultados).

use serde::{Deserialize, Serialize};

/// Un documento crudo leído del directorio de datos.
/// Se descarta tras el troceado; sólo sobreviven sus chunks.
#[derive(Debug, Clone)]
pub struct Document {
    /// Ruta del fichero de origen, usada como identificador de fuente.
    pub source: String,
    pub content: String,
}

/// Entrada persistida en el índice vectorial: el texto de un chunk junto a
/// su embedding y su fuente. Invariante: embedding y texto provienen del
/// mismo chunk. Los chunks consecutivos de un mismo documento comparten una
/// ventana de solape por diseño.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub id: String,
    pub source: String,
    pub index: usize,
    pub text: String,
    pub embedding: Vec<f64>,
}

/// Un chunk recuperado junto con su puntuación de similitud coseno.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub score: f64,
    pub text: String,
    pub source: String,
}

/// Resultado de una consulta RAG completa: respuesta generada más la lista
/// ordenada y sin duplicados de fuentes que la sustentan.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<String>,
}
