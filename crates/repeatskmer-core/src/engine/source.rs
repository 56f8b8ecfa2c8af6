use crate::core::io::mmcif::MmcifFile;
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::StructureFile;
use crate::core::models::structure::Structure;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureFormat {
    Pdb,
    Mmcif,
}

impl StructureFormat {
    /// Primary format first, then its fallback.
    pub const LOOKUP_ORDER: [StructureFormat; 2] = [StructureFormat::Pdb, StructureFormat::Mmcif];

    pub fn extension(&self) -> &'static str {
        match self {
            StructureFormat::Pdb => "pdb",
            StructureFormat::Mmcif => "cif",
        }
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureFormat::Pdb => write!(f, "PDB"),
            StructureFormat::Mmcif => write!(f, "mmCIF"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Structure '{structure_id}' is not available in {format} format")]
    Unavailable {
        structure_id: String,
        format: StructureFormat,
    },
    #[error("Failed to read {format} file '{path}': {message}")]
    Unreadable {
        path: PathBuf,
        format: StructureFormat,
        message: String,
    },
}

/// Somewhere structures can be fetched from by identifier and format.
///
/// Implementations are shared across worker threads.
pub trait StructureSource: Send + Sync {
    fn fetch(
        &self,
        structure_id: &str,
        format: StructureFormat,
    ) -> Result<Arc<Structure>, SourceError>;
}

impl<S: StructureSource + ?Sized> StructureSource for &S {
    fn fetch(
        &self,
        structure_id: &str,
        format: StructureFormat,
    ) -> Result<Arc<Structure>, SourceError> {
        (**self).fetch(structure_id, format)
    }
}

/// Reads `<root>/<id>.pdb` and `<root>/<id>.cif`, trying the lowercase id
/// before the id as given.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, structure_id: &str, format: StructureFormat) -> Option<PathBuf> {
        let lower = structure_id.to_lowercase();
        let mut candidates = vec![lower.as_str()];
        if lower != structure_id {
            candidates.push(structure_id);
        }
        candidates
            .into_iter()
            .map(|stem| self.root.join(format!("{}.{}", stem, format.extension())))
            .find(|path| path.is_file())
    }
}

impl StructureSource for DirectorySource {
    fn fetch(
        &self,
        structure_id: &str,
        format: StructureFormat,
    ) -> Result<Arc<Structure>, SourceError> {
        let path = self
            .locate(structure_id, format)
            .ok_or_else(|| SourceError::Unavailable {
                structure_id: structure_id.to_string(),
                format,
            })?;
        debug!(structure = structure_id, path = %path.display(), "Reading structure file.");

        let unreadable = |message: String| SourceError::Unreadable {
            path: path.clone(),
            format,
            message,
        };
        let structure = match format {
            StructureFormat::Pdb => {
                PdbFile::read_from_path(structure_id, &path).map_err(|e| unreadable(e.to_string()))?
            }
            StructureFormat::Mmcif => MmcifFile::read_from_path(structure_id, &path)
                .map_err(|e| unreadable(e.to_string()))?,
        };
        Ok(Arc::new(structure))
    }
}

/// Holds pre-built structures keyed by identifier and format.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    structures: HashMap<(String, StructureFormat), Arc<Structure>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, format: StructureFormat, structure: Structure) -> &mut Self {
        self.structures
            .insert((structure.id().to_string(), format), Arc::new(structure));
        self
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}

impl StructureSource for InMemorySource {
    fn fetch(
        &self,
        structure_id: &str,
        format: StructureFormat,
    ) -> Result<Arc<Structure>, SourceError> {
        self.structures
            .get(&(structure_id.to_string(), format))
            .cloned()
            .ok_or_else(|| SourceError::Unavailable {
                structure_id: structure_id.to_string(),
                format,
            })
    }
}

/// Memoizes successful fetches of an inner source.
///
/// Regions of the same structure are common within a batch, so each file is
/// parsed once. Failures are not cached.
pub struct CachedSource<S> {
    inner: S,
    cache: Mutex<HashMap<(String, StructureFormat), Arc<Structure>>>,
}

impl<S: StructureSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl<S: StructureSource> StructureSource for CachedSource<S> {
    fn fetch(
        &self,
        structure_id: &str,
        format: StructureFormat,
    ) -> Result<Arc<Structure>, SourceError> {
        let key = (structure_id.to_string(), format);
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return Ok(Arc::clone(hit));
            }
        }
        let structure = self.inner.fetch(structure_id, format)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, Arc::clone(&structure));
        }
        Ok(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::structure::StructureBuilder;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    const PDB: &str =
        "ATOM      1  CA  ALA A   1       0.000   0.000   0.000  1.00  0.00           C\n";

    #[test]
    fn directory_source_prefers_lowercase_file_names() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("1abc.pdb"), PDB).unwrap();

        let source = DirectorySource::new(dir.path());
        let structure = source.fetch("1ABC", StructureFormat::Pdb).unwrap();
        assert_eq!(structure.id(), "1ABC");
        assert_eq!(structure.residue_count(), 1);
    }

    #[test]
    fn directory_source_reports_missing_and_unreadable_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("2bad.pdb"), "ATOM  short\n").unwrap();
        let source = DirectorySource::new(dir.path());

        assert!(matches!(
            source.fetch("1abc", StructureFormat::Mmcif),
            Err(SourceError::Unavailable {
                format: StructureFormat::Mmcif,
                ..
            })
        ));
        assert!(matches!(
            source.fetch("2bad", StructureFormat::Pdb),
            Err(SourceError::Unreadable { .. })
        ));
    }

    #[test]
    fn in_memory_source_keys_by_format() {
        let mut builder = StructureBuilder::new("1abc");
        builder.add_residue("A", 1, None, "ALA");
        let mut source = InMemorySource::new();
        source.insert(StructureFormat::Mmcif, builder.build());

        assert!(source.fetch("1abc", StructureFormat::Mmcif).is_ok());
        assert!(source.fetch("1abc", StructureFormat::Pdb).is_err());
        assert_eq!(source.len(), 1);
    }

    struct CountingSource {
        calls: AtomicUsize,
        inner: InMemorySource,
    }

    impl StructureSource for CountingSource {
        fn fetch(
            &self,
            structure_id: &str,
            format: StructureFormat,
        ) -> Result<Arc<Structure>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(structure_id, format)
        }
    }

    #[test]
    fn cached_source_hits_inner_once_per_structure() {
        let mut inner = InMemorySource::new();
        inner.insert(StructureFormat::Pdb, StructureBuilder::new("1abc").build());
        let source = CachedSource::new(CountingSource {
            calls: AtomicUsize::new(0),
            inner,
        });

        for _ in 0..3 {
            source.fetch("1abc", StructureFormat::Pdb).unwrap();
        }
        assert!(source.fetch("9zzz", StructureFormat::Pdb).is_err());
        assert!(source.fetch("9zzz", StructureFormat::Pdb).is_err());

        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 3);
        assert_eq!(source.cached_len(), 1);
    }
}
