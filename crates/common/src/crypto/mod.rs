mod preshared;

pub use preshared::{CryptoError, PresharedKey, IV_SIZE, KEY_SIZE};
