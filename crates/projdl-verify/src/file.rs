use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{Result, Sha256Digest, Sha256Hasher, VerifiedReader, VerifyError};

/// Read size used when hashing files.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Compute the SHA-256 digest of a file with fixed-size chunked reads.
pub fn hash_file(path: impl AsRef<Path>) -> Result<Sha256Digest> {
    let file = File::open(path.as_ref())?;
    let mut reader = VerifiedReader::new(file, Sha256Hasher::new());
    let mut buf = vec![0u8; CHUNK_SIZE];
    while reader.read(&mut buf)? > 0 {}

    let bytes = reader.finish();
    Sha256Digest::from_bytes(&bytes).ok_or_else(|| VerifyError::MalformedDigest(hex::encode(bytes)))
}

/// Hash `path` and compare it with `expected`.
pub fn verify_file(path: impl AsRef<Path>, expected: &Sha256Digest) -> Result<()> {
    let path = path.as_ref();
    let actual = hash_file(path)?;
    if &actual == expected {
        tracing::debug!(path = %path.display(), digest = %actual, "checksum verified");
        Ok(())
    } else {
        Err(VerifyError::Mismatch {
            expected: expected.to_hex(),
            actual:   actual.to_hex(),
        })
    }
}

/// `true` iff the file's digest equals `expected_hex` (case-insensitive).
///
/// A malformed expected digest or an unreadable file yields `false`.
pub fn verify_checksum(path: impl AsRef<Path>, expected_hex: &str) -> bool {
    expected_hex
        .parse::<Sha256Digest>()
        .and_then(|expected| verify_file(path, &expected))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample(len: usize) -> Vec<u8> { (0..len).map(|i| (i % 251) as u8).collect() }

    #[test]
    fn hash_file_spans_many_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let data = sample(CHUNK_SIZE * 3 + 17);
        fs::write(&path, &data).unwrap();

        let digest = hash_file(&path).unwrap();
        assert_eq!(digest.as_bytes().to_vec(), Sha256Hasher::digest(&data));
    }

    #[test]
    fn verify_checksum_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, b"hello world").unwrap();

        let lower = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        assert!(verify_checksum(&path, lower));
        assert!(verify_checksum(&path, &lower.to_uppercase()));
    }

    #[test]
    fn corrupting_one_byte_flips_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let mut data = sample(20_000);
        fs::write(&path, &data).unwrap();
        let expected = hex::encode(Sha256Hasher::digest(&data));
        assert!(verify_checksum(&path, &expected));

        data[12_345] ^= 0x01;
        fs::write(&path, &data).unwrap();
        assert!(!verify_checksum(&path, &expected));
    }

    #[test]
    fn verify_file_reports_both_digests() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, b"hello world").unwrap();

        let wrong: Sha256Digest = "0".repeat(64).parse().unwrap();
        match verify_file(&path, &wrong) {
            Err(VerifyError::Mismatch { expected, actual }) => {
                assert_eq!(expected, "0".repeat(64));
                assert!(actual.starts_with("b94d27b9"));
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn verify_checksum_false_for_missing_file_or_bad_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope");
        assert!(!verify_checksum(&path, &"0".repeat(64)));

        fs::write(&path, b"x").unwrap();
        assert!(!verify_checksum(&path, "not-a-digest"));
    }
}
