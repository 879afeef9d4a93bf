//! Índice vectorial local sobre los chunks embebidos.
//!
//! Sustituye a un motor vectorial externo por lo más simple que cumple el
//! contrato: similitud coseno por fuerza bruta sobre las entradas, con
//! persistencia a disco en JSON.
//!
//! API pública:
//!   - `upsert(entries)` — añade entradas (append-only dentro de una ingesta).
//!   - `search(&embedding, k)` — top-k por similitud coseno descendente.
//!   - `save(path)` / `load(path)` — durabilidad en disco.
//!
//! Desempate: a igualdad de puntuación gana la entrada ingerida antes. El
//! orden de inserción se conserva porque la ordenación es estable.

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{RagError, Result};
use crate::models::{ScoredChunk, StoredChunk};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    /// Modelo de embeddings con el que se crearon los vectores. Un índice
    /// sólo es consultable con embeddings del mismo modelo.
    pub embedding_model: String,
    pub created_at: String,
    /// Dimensionalidad de los vectores; 0 hasta la primera inserción.
    pub dimensions: usize,
    entries: Vec<StoredChunk>,
}

impl VectorIndex {
    pub fn new(embedding_model: &str) -> Self {
        Self {
            embedding_model: embedding_model.to_string(),
            created_at: Utc::now().to_rfc3339(),
            dimensions: 0,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Añade entradas al índice. Todas deben compartir dimensionalidad con
    /// las ya presentes.
    pub fn upsert(&mut self, entries: Vec<StoredChunk>) -> Result<()> {
        for entry in entries {
            if entry.embedding.is_empty() {
                return Err(RagError::InvalidArgument(format!(
                    "Embedding vacío para el chunk {} de {}",
                    entry.index, entry.source
                )));
            }
            if self.dimensions == 0 {
                self.dimensions = entry.embedding.len();
            } else if entry.embedding.len() != self.dimensions {
                return Err(RagError::InvalidArgument(format!(
                    "Dimensionalidad inconsistente: el índice usa {} y el chunk {} de {} trae {}",
                    self.dimensions,
                    entry.index,
                    entry.source,
                    entry.embedding.len()
                )));
            }
            self.entries.push(entry);
        }
        Ok(())
    }

    /// Devuelve los `k` chunks más similares al embedding dado, en orden de
    /// similitud coseno descendente.
    pub fn search(&self, embedding: &[f64], k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 {
            return Err(RagError::InvalidArgument(
                "k debe ser un entero positivo".to_string(),
            ));
        }
        if self.is_empty() {
            return Ok(Vec::new());
        }
        if embedding.len() != self.dimensions {
            return Err(RagError::InvalidArgument(format!(
                "El embedding de la consulta tiene {} dimensiones y el índice {}",
                embedding.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<(f64, &StoredChunk)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(embedding, &entry.embedding), entry))
            .collect();
        // Orden estable: los empates conservan el orden de ingesta.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, entry)| ScoredChunk {
                score,
                text: entry.text.clone(),
                source: entry.source.clone(),
            })
            .collect())
    }

    /// Persiste el índice completo en `path`, sobreescribiendo lo que hubiera.
    pub fn save(&self, path: &Path) -> Result<()> {
        let persist = |path: &Path| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let json = serde_json::to_string(self)?;
            fs::write(path, json)
        };

        persist(path).map_err(|e| RagError::Persistence {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        info!(
            "Índice vectorial persistido en {} ({} entradas)",
            path.display(),
            self.len()
        );
        Ok(())
    }

    /// Carga un índice previamente persistido.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| RagError::Persistence {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let index: Self = serde_json::from_str(&json).map_err(|e| RagError::Persistence {
            path: path.to_path_buf(),
            message: format!("JSON inválido: {e}"),
        })?;
        info!(
            "Índice vectorial cargado de {} ({} entradas, modelo '{}')",
            path.display(),
            index.len(),
            index.embedding_model
        );
        Ok(index)
    }
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entrada(source: &str, index: usize, embedding: Vec<f64>) -> StoredChunk {
        StoredChunk {
            id: uuid::Uuid::new_v4().to_string(),
            source: source.to_string(),
            index,
            text: format!("chunk {index} de {source}"),
            embedding,
        }
    }

    #[test]
    fn busca_por_similitud_coseno_descendente() {
        let mut index = VectorIndex::new("test-model");
        index
            .upsert(vec![
                entrada("a.txt", 0, vec![1.0, 0.0, 0.0]),
                entrada("b.txt", 0, vec![0.0, 1.0, 0.0]),
                entrada("c.txt", 0, vec![0.9, 0.1, 0.0]),
            ])
            .unwrap();

        let resultados = index.search(&[1.0, 0.0, 0.0], 3).unwrap();
        assert_eq!(resultados.len(), 3);
        assert_eq!(resultados[0].source, "a.txt");
        assert_eq!(resultados[1].source, "c.txt");
        assert_eq!(resultados[2].source, "b.txt");
        assert!(resultados[0].score > resultados[1].score);
    }

    #[test]
    fn respeta_el_limite_k() {
        let mut index = VectorIndex::new("test-model");
        index
            .upsert(vec![
                entrada("a.txt", 0, vec![1.0, 0.0]),
                entrada("a.txt", 1, vec![0.9, 0.1]),
                entrada("a.txt", 2, vec![0.8, 0.2]),
                entrada("a.txt", 3, vec![0.7, 0.3]),
            ])
            .unwrap();

        assert_eq!(index.search(&[1.0, 0.0], 2).unwrap().len(), 2);
        assert_eq!(index.search(&[1.0, 0.0], 4).unwrap().len(), 4);
        // Con menos entradas que k se devuelven las que haya.
        assert_eq!(index.search(&[1.0, 0.0], 10).unwrap().len(), 4);
    }

    #[test]
    fn k_cero_es_argumento_invalido() {
        let index = VectorIndex::new("test-model");
        assert!(matches!(
            index.search(&[1.0], 0),
            Err(RagError::InvalidArgument(_))
        ));
    }

    #[test]
    fn empata_a_favor_de_la_entrada_mas_antigua() {
        let mut index = VectorIndex::new("test-model");
        // Vectores idénticos: misma puntuación exacta para los tres.
        index
            .upsert(vec![
                entrada("primero.txt", 0, vec![1.0, 1.0]),
                entrada("segundo.txt", 0, vec![1.0, 1.0]),
                entrada("tercero.txt", 0, vec![1.0, 1.0]),
            ])
            .unwrap();

        let resultados = index.search(&[1.0, 1.0], 3).unwrap();
        assert_eq!(resultados[0].source, "primero.txt");
        assert_eq!(resultados[1].source, "segundo.txt");
        assert_eq!(resultados[2].source, "tercero.txt");
    }

    #[test]
    fn rechaza_dimensionalidad_inconsistente() {
        let mut index = VectorIndex::new("test-model");
        index.upsert(vec![entrada("a.txt", 0, vec![1.0, 0.0])]).unwrap();

        let err = index.upsert(vec![entrada("b.txt", 0, vec![1.0, 0.0, 0.0])]);
        assert!(matches!(err, Err(RagError::InvalidArgument(_))));

        let err = index.search(&[1.0, 0.0, 0.0], 1);
        assert!(matches!(err, Err(RagError::InvalidArgument(_))));
    }

    #[test]
    fn indice_vacio_devuelve_cero_resultados() {
        let index = VectorIndex::new("test-model");
        assert!(index.search(&[1.0, 0.0], 3).unwrap().is_empty());
    }

    #[test]
    fn persiste_y_recarga_sin_perdidas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indice.json");

        let mut index = VectorIndex::new("test-model");
        index
            .upsert(vec![
                entrada("a.txt", 0, vec![1.0, 0.0]),
                entrada("b.txt", 0, vec![0.0, 1.0]),
            ])
            .unwrap();
        index.save(&path).unwrap();

        let recargado = VectorIndex::load(&path).unwrap();
        assert_eq!(recargado.len(), 2);
        assert_eq!(recargado.dimensions, 2);
        assert_eq!(recargado.embedding_model, "test-model");

        let resultados = recargado.search(&[1.0, 0.0], 1).unwrap();
        assert_eq!(resultados[0].source, "a.txt");
    }

    #[test]
    fn cargar_ruta_inexistente_es_error_de_persistencia() {
        let err = VectorIndex::load(Path::new("/no/existe/indice.json"));
        assert!(matches!(err, Err(RagError::Persistence { .. })));
    }
}
