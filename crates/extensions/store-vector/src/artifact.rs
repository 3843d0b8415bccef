//! On-disk vector artifact.
//!
//! Two raw little-endian files plus a manifest:
//!
//! - `<prefix>.ids.bin`       - `i64[N]`
//! - `<prefix>.vectors.bin`   - `f32[N×D]`, row-major
//! - `<prefix>.manifest.json` - count, width and FNV-1a checksum of each file
//!
//! Every file is written to a `.tmp` sibling and renamed into place, the
//! manifest last. A data file that does not match the manifest (an
//! interrupted write, a stale copy) fails the load with `CorruptArtifact`
//! instead of pairing ids with another generation's rows.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use starsearch_protocols::RetrievalError;

use crate::embedding::fnv1a;

const ID_BYTES: usize = std::mem::size_of::<i64>();
const FLOAT_BYTES: usize = std::mem::size_of::<f32>();

/// Paths of a persisted id/vector pair.
#[derive(Debug, Clone)]
pub struct VectorArtifact {
    ids_path: PathBuf,
    vectors_path: PathBuf,
    manifest_path: PathBuf,
}

/// Commit record of one written generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Manifest {
    count: usize,
    width: usize,
    ids_checksum: u64,
    vectors_checksum: u64,
}

impl VectorArtifact {
    /// `prefix` of `data/stars` gives `data/stars.ids.bin` and `data/stars.vectors.bin`.
    pub fn from_prefix(prefix: impl AsRef<Path>) -> Self {
        let prefix = prefix.as_ref().to_string_lossy().to_string();
        Self {
            ids_path: PathBuf::from(format!("{}.ids.bin", prefix)),
            vectors_path: PathBuf::from(format!("{}.vectors.bin", prefix)),
            manifest_path: PathBuf::from(format!("{}.manifest.json", prefix)),
        }
    }

    pub fn ids_path(&self) -> &Path {
        &self.ids_path
    }

    pub fn vectors_path(&self) -> &Path {
        &self.vectors_path
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Write both arrays. Callers validate the pair first.
    pub fn write(&self, ids: &[i64], vectors: &[f32]) -> Result<(), RetrievalError> {
        if let Some(parent) = self.ids_path.parent() {
            fs::create_dir_all(parent).map_err(storage_error)?;
        }

        let mut id_bytes = Vec::with_capacity(ids.len() * ID_BYTES);
        for id in ids {
            id_bytes.extend_from_slice(&id.to_le_bytes());
        }
        let mut vector_bytes = Vec::with_capacity(vectors.len() * FLOAT_BYTES);
        for v in vectors {
            vector_bytes.extend_from_slice(&v.to_le_bytes());
        }

        let manifest = Manifest {
            count: ids.len(),
            width: if ids.is_empty() { 0 } else { vectors.len() / ids.len() },
            ids_checksum: fnv1a(&id_bytes),
            vectors_checksum: fnv1a(&vector_bytes),
        };
        let manifest_bytes = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| RetrievalError::Storage(e.to_string()))?;

        let ids_tmp = tmp_path(&self.ids_path);
        let vectors_tmp = tmp_path(&self.vectors_path);
        let manifest_tmp = tmp_path(&self.manifest_path);
        fs::write(&ids_tmp, &id_bytes).map_err(storage_error)?;
        fs::write(&vectors_tmp, &vector_bytes).map_err(storage_error)?;
        fs::write(&manifest_tmp, &manifest_bytes).map_err(storage_error)?;
        fs::rename(&ids_tmp, &self.ids_path).map_err(storage_error)?;
        fs::rename(&vectors_tmp, &self.vectors_path).map_err(storage_error)?;
        // Commit point.
        fs::rename(&manifest_tmp, &self.manifest_path).map_err(storage_error)?;

        debug!(
            "Wrote vector artifact: {} ids to {}",
            ids.len(),
            self.ids_path.display()
        );
        Ok(())
    }

    /// Read both arrays, or `None` when no artifact has been written yet.
    pub fn read(&self, dimension: usize) -> Result<Option<(Vec<i64>, Vec<f32>)>, RetrievalError> {
        let id_bytes = read_optional(&self.ids_path)?;
        let vector_bytes = read_optional(&self.vectors_path)?;
        let manifest_bytes = read_optional(&self.manifest_path)?;

        let (id_bytes, vector_bytes) = match (id_bytes, vector_bytes) {
            (None, None) if manifest_bytes.is_none() => return Ok(None),
            (None, None) => {
                return Err(RetrievalError::CorruptArtifact(format!(
                    "{} exists but both data files are missing",
                    self.manifest_path.display()
                )));
            }
            (Some(ids), Some(vectors)) => (ids, vectors),
            (Some(_), None) => {
                return Err(RetrievalError::CorruptArtifact(format!(
                    "{} is missing",
                    self.vectors_path.display()
                )));
            }
            (None, Some(_)) => {
                return Err(RetrievalError::CorruptArtifact(format!(
                    "{} is missing",
                    self.ids_path.display()
                )));
            }
        };

        let manifest_bytes = manifest_bytes.ok_or_else(|| {
            RetrievalError::CorruptArtifact(format!(
                "{} is missing, the last write did not complete",
                self.manifest_path.display()
            ))
        })?;
        self.check_manifest(&manifest_bytes, &id_bytes, &vector_bytes)?;

        if id_bytes.len() % ID_BYTES != 0 {
            return Err(RetrievalError::CorruptArtifact(format!(
                "{} has a truncated entry ({} bytes)",
                self.ids_path.display(),
                id_bytes.len()
            )));
        }
        if vector_bytes.len() % FLOAT_BYTES != 0 {
            return Err(RetrievalError::CorruptArtifact(format!(
                "{} has a truncated entry ({} bytes)",
                self.vectors_path.display(),
                vector_bytes.len()
            )));
        }

        let ids: Vec<i64> = id_bytes
            .chunks_exact(ID_BYTES)
            .map(|chunk| {
                let mut buf = [0u8; ID_BYTES];
                buf.copy_from_slice(chunk);
                i64::from_le_bytes(buf)
            })
            .collect();
        let vectors: Vec<f32> = vector_bytes
            .chunks_exact(FLOAT_BYTES)
            .map(|chunk| {
                let mut buf = [0u8; FLOAT_BYTES];
                buf.copy_from_slice(chunk);
                f32::from_le_bytes(buf)
            })
            .collect();

        if ids.is_empty() {
            if !vectors.is_empty() {
                return Err(RetrievalError::CorruptArtifact(format!(
                    "{} floats stored for zero ids",
                    vectors.len()
                )));
            }
            return Ok(Some((ids, vectors)));
        }

        if vectors.len() % ids.len() != 0 {
            return Err(RetrievalError::CorruptArtifact(format!(
                "{} floats cannot be split evenly across {} ids",
                vectors.len(),
                ids.len()
            )));
        }
        let width = vectors.len() / ids.len();
        if width != dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: dimension,
                actual: width,
            });
        }

        Ok(Some((ids, vectors)))
    }

    fn check_manifest(
        &self,
        manifest_bytes: &[u8],
        id_bytes: &[u8],
        vector_bytes: &[u8],
    ) -> Result<(), RetrievalError> {
        let manifest: Manifest = serde_json::from_slice(manifest_bytes).map_err(|e| {
            RetrievalError::CorruptArtifact(format!(
                "{} is unreadable: {}",
                self.manifest_path.display(),
                e
            ))
        })?;

        if manifest.ids_checksum != fnv1a(id_bytes) {
            return Err(RetrievalError::CorruptArtifact(format!(
                "{} does not match {}",
                self.ids_path.display(),
                self.manifest_path.display()
            )));
        }
        if manifest.vectors_checksum != fnv1a(vector_bytes) {
            return Err(RetrievalError::CorruptArtifact(format!(
                "{} does not match {}",
                self.vectors_path.display(),
                self.manifest_path.display()
            )));
        }
        if manifest.count * ID_BYTES != id_bytes.len() {
            return Err(RetrievalError::CorruptArtifact(format!(
                "manifest records {} ids but {} holds {} bytes",
                manifest.count,
                self.ids_path.display(),
                id_bytes.len()
            )));
        }
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, RetrievalError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(storage_error(e)),
    }
}

fn storage_error(e: io::Error) -> RetrievalError {
    RetrievalError::Storage(e.to_string())
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
