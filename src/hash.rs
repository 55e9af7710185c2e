use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn stable_hash_with(f: impl FnOnce(&mut DefaultHasher)) -> u64 {
    let mut hasher = DefaultHasher::new();
    f(&mut hasher);
    hasher.finish()
}

pub fn stable_hash_str(seed: u64, value: &str) -> u64 {
    stable_hash_with(|hasher| {
        seed.hash(hasher);
        value.hash(hasher);
    })
}

/// Hash for the `index`-th item of a named stream (e.g. one triplet of a split).
pub fn stable_hash_indexed(seed: u64, stream: &str, index: u64) -> u64 {
    stable_hash_with(|hasher| {
        seed.hash(hasher);
        stream.hash(hasher);
        index.hash(hasher);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_hash_separates_streams_and_indices() {
        let a = stable_hash_indexed(7, "train", 0);
        assert_eq!(a, stable_hash_indexed(7, "train", 0));
        assert_ne!(a, stable_hash_indexed(7, "train", 1));
        assert_ne!(a, stable_hash_indexed(7, "test", 0));
        assert_ne!(a, stable_hash_indexed(8, "train", 0));
    }

    #[test]
    fn str_hash_depends_on_seed() {
        assert_ne!(stable_hash_str(1, "alpha"), stable_hash_str(2, "alpha"));
    }
}
