//! Taxonomía de errores del sistema RAG.
//!
//! Todos los errores se devuelven al llamante inmediato; el núcleo no los
//! traga ni reintenta. Los fallos de red de embeddings/chat se marcan como
//! transitorios para que un llamante pueda envolverlos con backoff si quiere.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Debug, Error)]
pub enum RagError {
    /// Configuración ausente o inválida (credenciales, rutas, parámetros).
    /// Fatal en el arranque, sin reintento.
    #[error("Configuración inválida: {0}")]
    Configuration(String),

    /// La ingesta no encontró ningún documento que indexar.
    #[error("No se encontraron documentos que indexar en {0}")]
    NoDocuments(PathBuf),

    /// Se intentó consultar antes de un `initialize()` exitoso.
    #[error("El motor RAG no está inicializado. Llama a initialize() primero")]
    NotInitialized,

    /// Parámetro mal formado (ej: k = 0). No se hace trabajo parcial.
    #[error("Argumento inválido: {0}")]
    InvalidArgument(String),

    /// Fallo de red / timeout / cuota de un servicio externo (embeddings o
    /// generación). No se reintenta internamente.
    #[error("Fallo transitorio del servicio de {service}: {message}")]
    TransientService { service: &'static str, message: String },

    /// Fallo de lectura/escritura del índice persistido. Fatal: no se cae
    /// en silencio a un modo sólo-en-memoria.
    #[error("Error de persistencia del índice en {path}: {message}")]
    Persistence { path: PathBuf, message: String },
}
