//! Child-index map type that switches between gxhash and std hashing
//! based on the `gxhash` feature. gxhash needs AES-NI/SSE2 at build time,
//! so the std map is the default.
//!
//! Construct with `HashMap::default()`, which works for either hasher.

/// HashMap backing node child indexes: gxhash when enabled, std otherwise
#[cfg(feature = "gxhash")]
pub type HashMap<K, V> = gxhash::HashMap<K, V>;

/// HashMap backing node child indexes: gxhash when enabled, std otherwise
#[cfg(not(feature = "gxhash"))]
pub type HashMap<K, V> = std::collections::HashMap<K, V>;
