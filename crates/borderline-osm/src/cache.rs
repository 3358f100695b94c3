//! On-disk cache of extracted tables.
//!
//! Parsing a country-sized extract dominates run time, so the tables can
//! be stored with `bincode` next to the run and reused. The cache records
//! the source file's length and modification time; if either changed, it
//! is rebuilt.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

use crate::error::OsmError;
use crate::reader::read_tables;
use crate::tables::OsmTables;

/// Identity of the source file the cache was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct SourceKey {
    len: u64,
    modified_secs: u64,
    modified_nanos: u32,
}

impl SourceKey {
    fn of(path: &Path) -> Result<Self, OsmError> {
        let meta = std::fs::metadata(path)?;
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .unwrap_or_default();
        Ok(Self {
            len: meta.len(),
            modified_secs: modified.as_secs(),
            modified_nanos: modified.subsec_nanos(),
        })
    }
}

/// Load tables for `src` from `cache` if it is current, otherwise parse
/// `src` and write a fresh cache.
///
/// An unreadable or stale cache is not an error; failing to write the
/// new cache is only logged.
///
/// # Errors
///
/// Returns any error from reading or parsing `src`.
pub fn load_or_extract(src: &Path, cache: &Path) -> Result<OsmTables, OsmError> {
    let key = SourceKey::of(src)?;

    match load(cache, key) {
        Ok(Some(tables)) => {
            log::info!("using cached tables from {}", cache.display());
            return Ok(tables);
        }
        Ok(None) => log::debug!("no current cache at {}", cache.display()),
        Err(e) => log::warn!("ignoring unreadable cache {}: {e}", cache.display()),
    }

    let tables = read_tables(src)?;
    match store(cache, key, &tables) {
        Ok(()) => log::info!("cached tables to {}", cache.display()),
        Err(e) => log::warn!("could not write cache {}: {e}", cache.display()),
    }
    Ok(tables)
}

fn load(cache: &Path, key: SourceKey) -> Result<Option<OsmTables>, OsmError> {
    if !cache.exists() {
        return Ok(None);
    }
    let reader = BufReader::new(File::open(cache)?);
    let (stored, tables): (SourceKey, OsmTables) = bincode::deserialize_from(reader)?;
    Ok((stored == key).then_some(tables))
}

fn store(cache: &Path, key: SourceKey, tables: &OsmTables) -> Result<(), OsmError> {
    let mut writer = BufWriter::new(File::create(cache)?);
    bincode::serialize_into(&mut writer, &(key, tables))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ONE_WAY: &str = r#"<osm>
  <node id="1" lat="0.0" lon="0.0"/>
  <node id="2" lat="1.0" lon="1.0"/>
  <way id="10"><nd ref="1"/><nd ref="2"/></way>
</osm>"#;

    #[test]
    fn builds_then_reuses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.osm");
        let cache = dir.path().join("in.cache");
        std::fs::write(&src, ONE_WAY).unwrap();

        let first = load_or_extract(&src, &cache).unwrap();
        assert!(cache.exists());

        let key = SourceKey::of(&src).unwrap();
        let cached = load(&cache, key).unwrap();
        assert_eq!(cached, Some(first));
    }

    #[test]
    fn stale_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.osm");
        let cache = dir.path().join("in.cache");
        std::fs::write(&src, ONE_WAY).unwrap();
        load_or_extract(&src, &cache).unwrap();

        // A different length invalidates the cache.
        let stale = SourceKey {
            len: 1,
            modified_secs: 0,
            modified_nanos: 0,
        };
        assert_eq!(load(&cache, stale).unwrap(), None);
    }

    #[test]
    fn corrupt_cache_falls_back_to_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.osm");
        let cache = dir.path().join("in.cache");
        std::fs::write(&src, ONE_WAY).unwrap();
        std::fs::write(&cache, b"not bincode").unwrap();

        let tables = load_or_extract(&src, &cache).unwrap();
        assert_eq!(tables.ways[&10], vec![1, 2]);
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_or_extract(&dir.path().join("nope.osm"), &dir.path().join("c"));
        assert!(matches!(result, Err(OsmError::Io(_))));
    }
}
