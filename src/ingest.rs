//! Ingesta de un directorio del sistema de archivos en el índice vectorial:
//! enumerar documentos, trocearlos en chunks solapados y embeberlos por lotes.

use std::fs;
use std::path::Path;

use tracing::{info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::AppConfig;
use crate::errors::{RagError, Result};
use crate::llm::Embedder;
use crate::models::{Document, StoredChunk};
use crate::splitter::split_text;
use crate::vector_store::VectorIndex;

/// Resumen de los resultados de una operación de ingesta.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestionSummary {
    pub files_scanned: u32,
    pub files_ingested: u32,
    pub files_skipped: u32,
    pub chunks_created: usize,
}

impl std::fmt::Display for IngestionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Resumen: {} ficheros escaneados, {} ingeridos, {} omitidos. {} chunks creados.",
            self.files_scanned, self.files_ingested, self.files_skipped, self.chunks_created
        )
    }
}

/// Enumera y lee los documentos de `root` cuya extensión esté en
/// `extensions`. El identificador de fuente de cada documento es su ruta
/// relativa a `root`.
///
/// Falla con `Configuration` si `root` no es un directorio y con
/// `NoDocuments` si ningún fichero pasa el filtro de extensiones.
pub fn load_documents(root: &Path, extensions: &[String]) -> Result<Vec<Document>> {
    if !root.is_dir() {
        return Err(RagError::Configuration(format!(
            "El directorio de datos no existe o no es un directorio: {}",
            root.display()
        )));
    }

    let mut documents = Vec::new();
    // Orden por nombre de fichero para que la ingesta sea determinista.
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let extension = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("")
            .to_lowercase();
        if !extensions.iter().any(|e| e == &extension) {
            continue;
        }

        let content = match read_file_text(path, &extension) {
            Some(text) => text,
            None => continue,
        };

        let source = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();
        documents.push(Document { source, content });
    }

    if documents.is_empty() {
        return Err(RagError::NoDocuments(root.to_path_buf()));
    }

    info!(
        "Cargados {} documentos de {}",
        documents.len(),
        root.display()
    );
    Ok(documents)
}

fn read_file_text(path: &Path, extension: &str) -> Option<String> {
    match extension {
        "pdf" => match pdf_extract::extract_text(path) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!(
                    "No se pudo extraer texto del PDF {}: {}. Saltando fichero.",
                    path.display(),
                    e
                );
                None
            }
        },
        _ => match fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(_) => {
                warn!("Saltando fichero no-texto o no-UTF8: {}", path.display());
                None
            }
        },
    }
}

/// Ejecuta la ingesta completa: carga los documentos del directorio
/// configurado, los trocea, embebe los chunks de cada documento en bloque y
/// construye un índice vectorial nuevo.
pub async fn ingest_corpus<E: Embedder>(
    cfg: &AppConfig,
    embedder: &E,
) -> Result<(VectorIndex, IngestionSummary)> {
    let documents = load_documents(&cfg.data_dir, &cfg.extensions)?;

    let mut summary = IngestionSummary::default();
    let mut index = VectorIndex::new(&cfg.llm_embedding_model);
    let total = documents.len();

    for (position, doc) in documents.into_iter().enumerate() {
        summary.files_scanned += 1;

        let chunks = split_text(&doc.content, cfg.chunk_size, cfg.chunk_overlap);
        if chunks.is_empty() {
            warn!("Fichero vacío o sin texto útil: {}", doc.source);
            summary.files_skipped += 1;
            continue;
        }

        info!(
            "[{}/{}] Embebiendo {} chunks de {}...",
            position + 1,
            total,
            chunks.len(),
            doc.source
        );
        let embeddings = embedder.embed_texts(chunks.clone()).await?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::TransientService {
                service: "embeddings",
                message: format!(
                    "Número de embeddings ({}) distinto al número de chunks ({}) para {}",
                    embeddings.len(),
                    chunks.len(),
                    doc.source
                ),
            });
        }

        let entries: Vec<StoredChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(chunk_index, (text, embedding))| StoredChunk {
                id: Uuid::new_v4().to_string(),
                source: doc.source.clone(),
                index: chunk_index,
                text,
                embedding,
            })
            .collect();

        summary.chunks_created += entries.len();
        summary.files_ingested += 1;
        index.upsert(entries)?;
    }

    info!("{summary}");
    Ok((index, summary))
}
