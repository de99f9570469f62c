//! Resource file I/O operations
//!
//! This module provides functions for reading and writing the key material
//! and lookup table files. The lookup table is stored as 256 little-endian u32
//! words on every platform.

use crate::constants::{KEY_MATERIAL_FILE, LOOKUP_TABLE_FILE, LOOKUP_TABLE_LEN, LOOKUP_TABLE_SIZE};
use crate::domain::resource::{KeyMaterial, LookupTable};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

/// Resource loading errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The file does not exist
    #[error("Resource not found: {}", .path.display())]
    NotFound { path: PathBuf },
    /// The file holds fewer bytes than required
    #[error(
        "Resource too short: '{}' holds {found} bytes, {expected} required",
        .path.display()
    )]
    TooShort {
        path: PathBuf,
        expected: u64,
        found: u64,
    },
    /// The file is not exactly the expected size (wrong lookup table word count)
    #[error(
        "Resource size mismatch: '{}' holds {found} bytes, expected exactly {expected}",
        .path.display()
    )]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        found: u64,
    },
    /// Any other I/O failure
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResourceError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Path of the resource the error refers to
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path }
            | Self::TooShort { path, .. }
            | Self::SizeMismatch { path, .. }
            | Self::Io { path, .. } => path,
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), ResourceError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| ResourceError::from_io(parent, e))?;
    }

    Ok(())
}

/// Open a resource file and return it with its byte length
fn open_resource(path: &Path) -> Result<(File, u64), ResourceError> {
    let file = File::open(path).map_err(|e| ResourceError::from_io(path, e))?;
    let len = file
        .metadata()
        .map_err(|e| ResourceError::from_io(path, e))?
        .len();
    Ok((file, len))
}

/// Get the key material file path
///
/// Format: `{dir}/resource.bin`
pub fn key_material_path(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().join(KEY_MATERIAL_FILE)
}

/// Get the lookup table file path
///
/// Format: `{dir}/lookuptable.bin`
pub fn lookup_table_path(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().join(LOOKUP_TABLE_FILE)
}

/// Load the first `required_len` bytes of a key material file
///
/// Trailing bytes beyond `required_len` are ignored.
pub fn load_key_material(
    path: impl AsRef<Path>,
    required_len: usize,
) -> Result<KeyMaterial, ResourceError> {
    let path = path.as_ref();
    let (mut file, found) = open_resource(path)?;

    if found < required_len as u64 {
        return Err(ResourceError::TooShort {
            path: path.to_path_buf(),
            expected: required_len as u64,
            found,
        });
    }

    let mut bytes = vec![0u8; required_len];
    file.read_exact(&mut bytes)
        .map_err(|e| ResourceError::from_io(path, e))?;

    Ok(KeyMaterial::new(bytes))
}

/// Save key material to file
pub fn save_key_material(
    path: impl AsRef<Path>,
    key_material: &[u8],
) -> Result<(), ResourceError> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    fs::write(path, key_material).map_err(|e| ResourceError::from_io(path, e))
}

/// Load a lookup table file (exactly 256 little-endian u32 words)
pub fn load_lookup_table(path: impl AsRef<Path>) -> Result<LookupTable, ResourceError> {
    let path = path.as_ref();
    let (file, found) = open_resource(path)?;
    let expected = LOOKUP_TABLE_SIZE as u64;

    if found < expected {
        return Err(ResourceError::TooShort {
            path: path.to_path_buf(),
            expected,
            found,
        });
    }
    if found != expected {
        return Err(ResourceError::SizeMismatch {
            path: path.to_path_buf(),
            expected,
            found,
        });
    }

    let mut reader = BufReader::new(file);
    let mut words = [0u32; LOOKUP_TABLE_LEN];
    reader
        .read_u32_into::<LittleEndian>(&mut words)
        .map_err(|e| ResourceError::from_io(path, e))?;

    Ok(LookupTable::new(words))
}

/// Save a lookup table to file
pub fn save_lookup_table(
    path: impl AsRef<Path>,
    table: &LookupTable,
) -> Result<(), ResourceError> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    let write = || -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        for &word in table.words() {
            writer.write_u32::<LittleEndian>(word)?;
        }

        writer.flush()
    };

    write().map_err(|e| ResourceError::from_io(path, e))
}

// =============================================================================
// Memory-mapped key material (mmap feature)
// =============================================================================

/// Memory-mapped key material file
///
/// Provides read-only access to the key material without copying it into
/// memory. The file must not be modified while mapped.
#[cfg(feature = "mmap")]
pub struct MappedKeyMaterial {
    mmap: Mmap,
    len: usize,
}

#[cfg(feature = "mmap")]
impl MappedKeyMaterial {
    /// Open a key material file as memory-mapped
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, shorter than `required_len`,
    /// or cannot be mapped.
    pub fn open(path: impl AsRef<Path>, required_len: usize) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let (file, found) = open_resource(path)?;

        if found < required_len as u64 {
            return Err(ResourceError::TooShort {
                path: path.to_path_buf(),
                expected: required_len as u64,
                found,
            });
        }

        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| ResourceError::from_io(path, e))?;

        Ok(Self {
            mmap,
            len: required_len,
        })
    }

    /// Get the first `required_len` bytes of the file
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..self.len]
    }

    /// Get the number of bytes exposed
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_key_material() {
        let dir = TempDir::new().unwrap();
        let path = key_material_path(dir.path());
        let key = KeyMaterial::from_seed(1, 300);

        save_key_material(&path, key.as_bytes()).expect("Failed to save");
        let loaded = load_key_material(&path, 300).expect("Failed to load");

        assert_eq!(loaded, key);
    }

    #[test]
    fn test_load_key_material_prefix() {
        let dir = TempDir::new().unwrap();
        let path = key_material_path(dir.path());
        let key = KeyMaterial::from_seed(2, 300);

        save_key_material(&path, key.as_bytes()).unwrap();
        let loaded = load_key_material(&path, 100).unwrap();

        assert_eq!(loaded.as_bytes(), &key.as_bytes()[..100]);
    }

    #[test]
    fn test_load_key_material_too_short() {
        let dir = TempDir::new().unwrap();
        let path = key_material_path(dir.path());
        save_key_material(&path, &[0u8; 10]).unwrap();

        let result = load_key_material(&path, 11);
        assert!(matches!(
            result,
            Err(ResourceError::TooShort {
                expected: 11,
                found: 10,
                ..
            })
        ));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_key_material("/nonexistent/path/resource.bin", 1);
        assert!(matches!(result, Err(ResourceError::NotFound { .. })));

        let result = load_lookup_table("/nonexistent/path/lookuptable.bin");
        match result {
            Err(err @ ResourceError::NotFound { .. }) => {
                assert_eq!(err.path(), Path::new("/nonexistent/path/lookuptable.bin"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_save_and_load_lookup_table() {
        let dir = TempDir::new().unwrap();
        let path = lookup_table_path(dir.path());
        let table = LookupTable::crc32();

        save_lookup_table(&path, &table).expect("Failed to save");
        let loaded = load_lookup_table(&path).expect("Failed to load");

        assert_eq!(loaded, table);
        assert_eq!(fs::metadata(&path).unwrap().len(), LOOKUP_TABLE_SIZE as u64);
    }

    #[test]
    fn test_lookup_table_file_little_endian() {
        let dir = TempDir::new().unwrap();
        let path = lookup_table_path(dir.path());
        let mut words = [0u32; LOOKUP_TABLE_LEN];
        words[0] = 0x12345678;
        words[255] = 0xABCDEF00;

        save_lookup_table(&path, &LookupTable::new(words)).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(&bytes[1020..1024], &[0x00, 0xEF, 0xCD, 0xAB]);
    }

    #[test]
    fn test_load_lookup_table_wrong_size() {
        let dir = TempDir::new().unwrap();
        let short = dir.path().join("short.bin");
        let long = dir.path().join("long.bin");
        let ragged = dir.path().join("ragged.bin");
        fs::write(&short, vec![0u8; LOOKUP_TABLE_SIZE - 4]).unwrap();
        fs::write(&long, vec![0u8; LOOKUP_TABLE_SIZE + 4]).unwrap();
        fs::write(&ragged, vec![0u8; LOOKUP_TABLE_SIZE + 1]).unwrap();

        assert!(matches!(
            load_lookup_table(&short),
            Err(ResourceError::TooShort { .. })
        ));
        assert!(matches!(
            load_lookup_table(&long),
            Err(ResourceError::SizeMismatch { .. })
        ));
        assert!(matches!(
            load_lookup_table(&ragged),
            Err(ResourceError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let path = lookup_table_path(dir.path().join("nested").join("set"));

        save_lookup_table(&path, &LookupTable::crc32()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_resource_paths() {
        assert_eq!(
            key_material_path("."),
            PathBuf::from(".").join("resource.bin")
        );
        assert_eq!(
            lookup_table_path("res"),
            PathBuf::from("res").join("lookuptable.bin")
        );
    }

    #[cfg(feature = "mmap")]
    #[test]
    fn test_mapped_key_material_matches_load() {
        let dir = TempDir::new().unwrap();
        let path = key_material_path(dir.path());
        let key = KeyMaterial::from_seed(3, 4096);
        save_key_material(&path, key.as_bytes()).unwrap();

        let mapped = MappedKeyMaterial::open(&path, 4000).expect("Failed to open");
        let loaded = load_key_material(&path, 4000).unwrap();

        assert_eq!(mapped.len(), 4000);
        assert!(!mapped.is_empty());
        assert_eq!(mapped.as_bytes(), loaded.as_bytes());
    }

    #[cfg(feature = "mmap")]
    #[test]
    fn test_mapped_key_material_too_short() {
        let dir = TempDir::new().unwrap();
        let path = key_material_path(dir.path());
        save_key_material(&path, &[1u8; 8]).unwrap();

        assert!(matches!(
            MappedKeyMaterial::open(&path, 9),
            Err(ResourceError::TooShort { .. })
        ));
    }
}
