//! File encryption using AES-256-CBC
//!
//! Every file on the server is encrypted under a single pre-shared key.
//! The key is distributed to clients out-of-band (the daemon prints it at
//! startup); the server itself never decrypts on the download path, so it
//! only ever holds plaintext for the one encrypt pass at upload time.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Size of the AES-256 key in bytes
pub const KEY_SIZE: usize = 32;
/// Size of the CBC initialization vector in bytes (one AES block)
pub const IV_SIZE: usize = 16;
/// AES block size in bytes
const BLOCK_SIZE: usize = 16;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key size, expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },
    #[error("invalid hex key: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("data too short for IV")]
    Truncated,
    #[error("ciphertext length {0} is not a positive multiple of the block size")]
    BadCiphertextLength(usize),
    #[error("bad padding (wrong key or corrupted data)")]
    Padding,
}

/// The single 256-bit symmetric key shared by the server and all clients
///
/// Encryption format is: `iv (16 bytes) || AES-256-CBC(plaintext, PKCS7)`.
/// A fresh random IV is generated for every encrypt call so that identical
/// plaintexts never produce identical stored bytes; the IV travels with the
/// ciphertext and need not be tracked separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresharedKey([u8; KEY_SIZE]);

impl From<[u8; KEY_SIZE]> for PresharedKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        PresharedKey(bytes)
    }
}

impl PresharedKey {
    /// Generate a new random key using a cryptographically secure RNG
    pub fn generate() -> Self {
        let mut buff = [0; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut buff);
        Self(buff)
    }

    /// Create a key from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `KEY_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: data.len(),
            });
        }
        let mut buff = [0; KEY_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    /// Parse a key from its hex form, as printed at daemon startup
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }

    /// Hex form of the key, for operator distribution to clients
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get a reference to the key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Encrypt data using AES-256-CBC with PKCS7 padding
    ///
    /// The output format is: `iv (16 bytes) || ciphertext`. A random IV is
    /// generated for each encryption operation; reusing the key without a
    /// fresh IV per file would leak plaintext equality, so the IV is never
    /// caller-supplied.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut iv = [0u8; IV_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);

        let ciphertext =
            Aes256CbcEnc::new(&self.0.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut out = Vec::with_capacity(IV_SIZE + ciphertext.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(&ciphertext);
        out
    }

    /// Decrypt data produced by [`encrypt`](Self::encrypt)
    ///
    /// The server never calls this on the download path (recipients decrypt
    /// after download, using the out-of-band key); it exists for clients and
    /// for verifying the round-trip law in tests.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Data is too short to contain an IV
    /// - The ciphertext length is not a positive multiple of the block size
    /// - Padding verification fails (wrong key or corrupted data)
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if data.len() < IV_SIZE {
            return Err(CryptoError::Truncated);
        }

        let (iv, ciphertext) = data.split_at(IV_SIZE);
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::BadCiphertextLength(ciphertext.len()));
        }

        let mut iv_arr = [0u8; IV_SIZE];
        iv_arr.copy_from_slice(iv);

        Aes256CbcDec::new(&self.0.into(), &iv_arr.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::Padding)
    }
}
