use anyhow::{ensure, Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// SHA256 verification of installed binaries against published release sums
pub struct Checksum;

impl Checksum {
    /// Calculate the lowercase hex SHA256 of a file
    pub fn calculate(path: &Path) -> Result<String> {
        let mut file =
            File::open(path).with_context(|| format!("Failed to open {:?} for hashing", path))?;
        let mut hasher = Sha256::new();

        io::copy(&mut file, &mut hasher)?;

        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Verify file matches expected SHA256 hash
    pub fn verify(path: &Path, expected_hash: &str) -> Result<()> {
        let hash = Self::calculate(path)?;
        let expected = expected_hash.trim().to_ascii_lowercase();

        ensure!(
            hash == expected,
            "Hash mismatch!\n  Expected: {}\n  Got:      {}",
            expected,
            hash
        );

        Ok(())
    }

    /// Look up the hash of `asset` in a `SHA2-256SUMS` style listing
    ///
    /// Lines look like `<hex>  <name>` or `<hex> *<name>` (binary mode).
    pub fn find_in_sums(sums: &str, asset: &str) -> Option<String> {
        sums.lines().find_map(|line| {
            let mut parts = line.split_whitespace();
            let hash = parts.next()?;
            let name = parts.next()?.trim_start_matches('*');
            (name == asset && is_sha256_hex(hash)).then(|| hash.to_ascii_lowercase())
        })
    }
}

fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}
