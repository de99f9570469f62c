//! Resource generation workflow
//!
//! Writes a synthetic resource set: seeded key material and the standard
//! CRC32 lookup table. Useful to exercise the search without the original
//! binary resources.

use crate::domain::checksum::{ChecksumError, KeyedChecksum};
use crate::domain::resource::{KeyMaterial, LookupTable};
use crate::infra::resource_io::{
    ResourceError, key_material_path, lookup_table_path, save_key_material, save_lookup_table,
};
use std::path::{Path, PathBuf};

/// Paths of a written resource set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePaths {
    pub key_material: PathBuf,
    pub lookup_table: PathBuf,
}

/// Write `resource.bin` (seeded key material of `len` bytes) and
/// `lookuptable.bin` (standard CRC32 table) into `dir`
pub fn create_resources(
    dir: impl AsRef<Path>,
    seed: u64,
    len: usize,
) -> Result<ResourcePaths, ResourceError> {
    let dir = dir.as_ref();
    let key_material = KeyMaterial::from_seed(seed, len);
    let table = LookupTable::crc32();

    let paths = ResourcePaths {
        key_material: key_material_path(dir),
        lookup_table: lookup_table_path(dir),
    };

    save_key_material(&paths.key_material, key_material.as_bytes())?;
    save_lookup_table(&paths.lookup_table, &table)?;

    Ok(paths)
}

/// Checksum of `candidate` under the resource set `create_resources` writes
/// for the same `seed` and `len`, without touching the file system
pub fn generated_checksum(
    candidate: impl AsRef<[u8]>,
    seed: u64,
    len: usize,
) -> Result<u32, ChecksumError> {
    let key_material = KeyMaterial::from_seed(seed, len);
    let table = LookupTable::crc32();
    KeyedChecksum::with_iterations(key_material.as_bytes(), &table, len)?.compute(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::resource_io::{load_key_material, load_lookup_table};
    use tempfile::TempDir;

    #[test]
    fn test_create_resources() {
        let dir = TempDir::new().unwrap();
        let paths = create_resources(dir.path(), 42, 512).expect("Failed to create");

        let key = load_key_material(&paths.key_material, 512).unwrap();
        let table = load_lookup_table(&paths.lookup_table).unwrap();

        assert_eq!(key, KeyMaterial::from_seed(42, 512));
        assert_eq!(table, LookupTable::crc32());
    }

    #[test]
    fn test_generated_checksum_matches_files() {
        let dir = TempDir::new().unwrap();
        let paths = create_resources(dir.path(), 7, 256).unwrap();

        let key = load_key_material(&paths.key_material, 256).unwrap();
        let table = load_lookup_table(&paths.lookup_table).unwrap();
        let engine = KeyedChecksum::with_iterations(key.as_bytes(), &table, 256).unwrap();

        assert_eq!(
            generated_checksum("1234", 7, 256).unwrap(),
            engine.compute("1234").unwrap()
        );
    }

    #[test]
    fn test_generated_checksum_empty_candidate() {
        assert_eq!(
            generated_checksum("", 7, 256),
            Err(ChecksumError::InvalidCandidate)
        );
    }
}
