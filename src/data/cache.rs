use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::loader::load_bytes;
use super::model::StudentTable;
use super::prepare::prepare;

/// What a source file contained when it was prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub len: u64,
    pub content_hash: u64,
}

impl SourceKey {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        SourceKey {
            len: bytes.len() as u64,
            content_hash: hasher.finish(),
        }
    }
}

struct CacheEntry {
    key: SourceKey,
    table: Arc<StudentTable>,
}

/// Memoized prepared tables, one per source path. An entry is replaced when
/// the file's content changes.
///
/// Tables are immutable once built, so callers share them through `Arc`.
#[derive(Default)]
pub struct PreparedCache {
    tables: HashMap<PathBuf, CacheEntry>,
}

impl PreparedCache {
    /// Return the prepared table for `path`, loading and preparing it only
    /// when its content changed since the last call. The flag is `true`
    /// when the table was freshly built.
    ///
    /// The file is read once; the same bytes are hashed and parsed.
    pub fn get_or_prepare(&mut self, path: &Path, today: NaiveDate) -> Result<(Arc<StudentTable>, bool)> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let key = SourceKey::from_bytes(&bytes);

        if let Some(entry) = self.tables.get(path).filter(|e| e.key == key) {
            log::debug!("Cache hit for {}", path.display());
            return Ok((Arc::clone(&entry.table), false));
        }

        log::info!("Cache miss for {}; preparing", path.display());
        let raw = load_bytes(path, bytes)?;
        log::info!(
            "Loaded {} raw rows with columns {:?}",
            raw.rows.len(),
            raw.columns
        );
        let table = Arc::new(prepare(&raw, today));
        self.tables.insert(
            path.to_path_buf(),
            CacheEntry {
                key,
                table: Arc::clone(&table),
            },
        );
        Ok((table, true))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "Código,RH,Color_Cabello,Barrio_Residencia,Fecha_Nacimiento,Estatura,Peso,Talla_Zapato";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn write_roster(dir: &Path, rows: &[&str]) -> PathBuf {
        let path = dir.join("roster.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        path
    }

    #[test]
    fn same_content_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_roster(dir.path(), &["A,O+,negro,centro,2000-01-01,1.7,60,40"]);
        let mut cache = PreparedCache::default();

        let (first, fresh) = cache.get_or_prepare(&path, today()).unwrap();
        assert!(fresh);
        let (second, fresh) = cache.get_or_prepare(&path, today()).unwrap();
        assert!(!fresh);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn changed_content_replaces_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_roster(dir.path(), &["A,O+,negro,centro,2000-01-01,1.7,60,40"]);
        let mut cache = PreparedCache::default();
        let (first, _) = cache.get_or_prepare(&path, today()).unwrap();

        write_roster(
            dir.path(),
            &[
                "A,O+,negro,centro,2000-01-01,1.7,60,40",
                "B,A-,rubio,norte,2001-01-01,1.6,50,37",
            ],
        );
        let (second, fresh) = cache.get_or_prepare(&path, today()).unwrap();
        assert!(fresh);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(cache.len(), 1);

        let (third, fresh) = cache.get_or_prepare(&path, today()).unwrap();
        assert!(!fresh);
        assert!(Arc::ptr_eq(&second, &third));
    }

    #[test]
    fn each_path_gets_its_own_entry() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let row = ["A,O+,negro,centro,2000-01-01,1.7,60,40"];
        let first = write_roster(a.path(), &row);
        let second = write_roster(b.path(), &row);
        let mut cache = PreparedCache::default();

        assert!(cache.get_or_prepare(&first, today()).unwrap().1);
        assert!(cache.get_or_prepare(&second, today()).unwrap().1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = PreparedCache::default();
        assert!(cache
            .get_or_prepare(&dir.path().join("nope.xlsx"), today())
            .is_err());
        assert!(cache.is_empty());
    }
}
