mod digest;

pub use digest::{hash_file, HashAlgorithm};
