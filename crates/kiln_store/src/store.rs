//! The on-disk analysis store: framed, checksummed, atomically replaced.

use std::path::{Path, PathBuf};

use kiln_analysis::{Analysis, SetupFingerprint};
use kiln_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Magic bytes identifying a Kiln analysis store file.
const STORE_MAGIC: [u8; 4] = *b"KILN";

/// Current store format version. Increment on breaking changes to the
/// header or payload format.
const STORE_FORMAT_VERSION: u32 = 1;

/// Header prepended to the persisted analysis for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreHeader {
    /// Magic bytes: must be `b"KILN"`.
    magic: [u8; 4],
    /// Store format version.
    format_version: u32,
    /// Engine version string that produced this store.
    engine_version: String,
    /// Content hash of the payload (for integrity checks).
    checksum: ContentHash,
}

/// The serialized payload: one analysis plus its setup fingerprint.
#[derive(Serialize, Deserialize)]
struct StorePayload {
    analysis: Analysis,
    setup: SetupFingerprint,
}

/// Persists and loads [`Analysis`] snapshots at a fixed path.
///
/// An analysis is immutable once persisted, so concurrent readers need no
/// coordination. Writes replace the whole file atomically; serializing
/// concurrent *writers* to the same path is the caller's discipline.
pub struct AnalysisStore {
    /// Path of the store file.
    path: PathBuf,
    /// Engine version string recorded in and checked against the header.
    engine_version: String,
}

impl AnalysisStore {
    /// Creates a store handle for the given file path.
    pub fn new(path: impl Into<PathBuf>, engine_version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            engine_version: engine_version.into(),
        }
    }

    /// Returns the path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted analysis and setup fingerprint.
    ///
    /// Returns `None` if the file does not exist, is truncated, carries
    /// wrong magic bytes, an unknown format version, a different engine
    /// version, a checksum mismatch, or an undecodable payload. All of
    /// these degrade to a cold start rather than an error.
    pub fn get(&self) -> Option<(Analysis, SetupFingerprint)> {
        let raw = std::fs::read(&self.path).ok()?;

        if raw.len() < 4 {
            return None;
        }
        let header_len = u32::from_le_bytes(raw[..4].try_into().ok()?) as usize;
        if raw.len() < 4 + header_len {
            return None;
        }

        let header: StoreHeader =
            bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
                .ok()?
                .0;

        if header.magic != STORE_MAGIC {
            return None;
        }
        if header.format_version != STORE_FORMAT_VERSION {
            return None;
        }
        if header.engine_version != self.engine_version {
            return None;
        }

        let payload = &raw[4 + header_len..];
        if ContentHash::from_bytes(payload) != header.checksum {
            return None;
        }

        let decoded: StorePayload =
            bincode::serde::decode_from_slice(payload, bincode::config::standard())
                .ok()?
                .0;
        Some((decoded.analysis, decoded.setup))
    }

    /// Persists an analysis and its setup fingerprint atomically.
    ///
    /// The file is written next to its final path and renamed into place,
    /// so a concurrent reader observes either the old store or the new one,
    /// never a partial write.
    pub fn set(&self, analysis: &Analysis, setup: SetupFingerprint) -> Result<(), StoreError> {
        let payload_bytes = bincode::serde::encode_to_vec(
            StorePayload {
                analysis: analysis.clone(),
                setup,
            },
            bincode::config::standard(),
        )
        .map_err(|e| StoreError::Serialization {
            reason: e.to_string(),
        })?;

        let header = StoreHeader {
            magic: STORE_MAGIC,
            format_version: STORE_FORMAT_VERSION,
            engine_version: self.engine_version.clone(),
            checksum: ContentHash::from_bytes(&payload_bytes),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| StoreError::Serialization {
                reason: e.to_string(),
            })?;

        // 4-byte header length (little-endian) + header + payload
        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + payload_bytes.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(&payload_bytes);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, &output).map_err(|e| StoreError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_analysis::{
        ClassApi, DependencyEdge, DependencyKind, EdgeTarget, Stamp, UnitId,
    };
    use std::collections::{BTreeMap, BTreeSet};

    fn make_store(dir: &Path) -> AnalysisStore {
        AnalysisStore::new(dir.join("analysis.bin"), "0.1.0")
    }

    fn sample_analysis() -> Analysis {
        let setup = SetupFingerprint::compute(
            &["-strict".to_string()],
            &[PathBuf::from("lib/core.jar")],
            Path::new("out"),
        );
        let mut a = Analysis::empty(setup);
        a.source_stamps.insert(
            UnitId::from("src/A.unit"),
            Stamp::ContentHash(ContentHash::from_bytes(b"a source")),
        );
        a.source_stamps.insert(
            UnitId::from("src/B.unit"),
            Stamp::ContentHash(ContentHash::from_bytes(b"b source")),
        );
        a.classpath_stamps
            .insert(PathBuf::from("lib/core.jar"), Stamp::LastModified(12345));
        a.apis
            .insert(UnitId::from("src/A.unit"), vec![ClassApi::new("A")]);
        a.name_hashes.insert(
            UnitId::from("src/A.unit"),
            BTreeMap::from([("A".to_string(), ContentHash::from_bytes(b"shape"))]),
        );
        a.used_names.insert(
            UnitId::from("src/A.unit"),
            BTreeSet::from(["B".to_string()]),
        );
        a.edges.push(DependencyEdge {
            from: UnitId::from("src/A.unit"),
            to: EdgeTarget::Unit(UnitId::from("src/B.unit")),
            kind: DependencyKind::Inheritance,
        });
        a.class_origins
            .insert("A".to_string(), UnitId::from("src/A.unit"));
        a
    }

    #[test]
    fn get_on_missing_file_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        assert!(store.get().is_none());
    }

    #[test]
    fn set_then_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        let analysis = sample_analysis();
        let setup = analysis.setup;

        store.set(&analysis, setup).unwrap();
        let (loaded, loaded_setup) = store.get().unwrap();

        assert_eq!(loaded, analysis);
        assert_eq!(loaded_setup, setup);
    }

    #[test]
    fn set_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnalysisStore::new(
            dir.path().join("deeply").join("nested").join("analysis.bin"),
            "0.1.0",
        );
        let analysis = sample_analysis();
        store.set(&analysis, analysis.setup).unwrap();
        assert!(store.get().is_some());
    }

    #[test]
    fn overwrite_replaces_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());

        let first = sample_analysis();
        store.set(&first, first.setup).unwrap();

        let mut second = sample_analysis();
        second.drop_unit(&UnitId::from("src/A.unit"));
        store.set(&second, second.setup).unwrap();

        let (loaded, _) = store.get().unwrap();
        assert_eq!(loaded, second);
    }

    #[test]
    fn corrupt_file_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        std::fs::write(store.path(), b"garbage that is not a store").unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn truncated_file_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        std::fs::write(store.path(), b"KI").unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn tampered_payload_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        let analysis = sample_analysis();
        store.set(&analysis, analysis.setup).unwrap();

        // Flip a byte near the end of the payload.
        let mut raw = std::fs::read(store.path()).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        std::fs::write(store.path(), &raw).unwrap();

        assert!(store.get().is_none());
    }

    #[test]
    fn different_engine_version_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let writer = AnalysisStore::new(dir.path().join("analysis.bin"), "0.1.0");
        let analysis = sample_analysis();
        writer.set(&analysis, analysis.setup).unwrap();

        let reader = AnalysisStore::new(dir.path().join("analysis.bin"), "0.2.0");
        assert!(reader.get().is_none());
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        let analysis = sample_analysis();
        store.set(&analysis, analysis.setup).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn empty_analysis_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        let setup = SetupFingerprint::compute(&[], &[], Path::new("out"));
        let analysis = Analysis::empty(setup);

        store.set(&analysis, setup).unwrap();
        let (loaded, loaded_setup) = store.get().unwrap();
        assert_eq!(loaded, analysis);
        assert_eq!(loaded_setup, setup);
    }
}
