//! Secondary indices shared by every store.
//!
//! An index maps a key to the handles of the entries carrying it, in
//! insertion order. Stores call [`index_insert`] on save and
//! [`index_remove`] on delete for each index they maintain, so no index can
//! drift from the primary collection.

use std::borrow::Borrow;
use std::collections::BTreeMap;

pub(crate) type Index<K, I> = BTreeMap<K, Vec<I>>;

pub(crate) fn index_insert<K: Ord, I>(index: &mut Index<K, I>, key: K, id: I) {
    index.entry(key).or_default().push(id);
}

/// Drops `id` from `key`'s bucket; empty buckets are removed
pub(crate) fn index_remove<K, Q, I>(index: &mut Index<K, I>, key: &Q, id: &I)
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
    I: PartialEq,
{
    let Some(ids) = index.get_mut(key) else {
        return;
    };
    ids.retain(|existing| existing != id);
    if ids.is_empty() {
        index.remove(key);
    }
}

/// Bucket sizes keyed by a display name, for statistics snapshots
pub(crate) fn bucket_sizes<K, I, F>(index: &Index<K, I>, name: F) -> BTreeMap<String, usize>
where
    F: Fn(&K) -> String,
{
    index.iter().map(|(key, ids)| (name(key), ids.len())).collect()
}

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub(crate) const KIND: &'static str = $kind;

            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            pub(crate) fn unknown(self) -> $crate::error::StoreError {
                $crate::error::StoreError::UnknownHandle {
                    kind: Self::KIND,
                    id: self.0,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", Self::KIND, self.0)
            }
        }
    };
}

pub(crate) use define_handle;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_and_remove_keep_order() {
        let mut index: Index<String, u64> = Index::new();
        index_insert(&mut index, "a".to_string(), 1);
        index_insert(&mut index, "a".to_string(), 2);
        index_insert(&mut index, "b".to_string(), 3);

        index_remove(&mut index, "a", &1);
        assert_eq!(index.get("a"), Some(&vec![2]));

        index_remove(&mut index, "b", &3);
        assert!(!index.contains_key("b"));

        // removing from a missing bucket is a no-op
        index_remove(&mut index, "zzz", &9);
        assert_eq!(bucket_sizes(&index, String::clone).len(), 1);
    }
}
