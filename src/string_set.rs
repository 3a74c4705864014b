use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// An insertion-ordered set of strings with constant-time index lookup.
///
/// Used for the `sources` and `names` tables. When duplicates are allowed the list keeps every
/// occurrence and [index_of](Self::index_of) reports the first one.
#[derive(Debug, Default, Clone)]
pub struct OrderedStringSet {
    items: Vec<Arc<str>>,
    indices: HashMap<Arc<str>, u32>,
}

impl OrderedStringSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from `iter`, keeping duplicates when `allow_duplicates` is set.
    pub fn from_iter_with_duplicates<I, S>(iter: I, allow_duplicates: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for s in iter {
            set.add(s.as_ref(), allow_duplicates);
        }
        set
    }

    /// Adds `s`, returning its index. A string already present is appended again only when
    /// `allow_duplicate` is set; the returned index is always the first occurrence.
    pub fn add(&mut self, s: &str, allow_duplicate: bool) -> u32 {
        if let Some(&idx) = self.indices.get(s) {
            if allow_duplicate {
                self.items.push(self.items[idx as usize].clone());
            }
            return idx;
        }

        let idx = self.items.len() as u32;
        let item: Arc<str> = Arc::from(s);
        self.items.push(item.clone());
        self.indices.insert(item, idx);
        idx
    }

    #[inline]
    pub fn has(&self, s: &str) -> bool {
        self.indices.contains_key(s)
    }

    #[inline]
    pub fn index_of(&self, s: &str) -> Result<u32> {
        self.indices
            .get(s)
            .copied()
            .ok_or_else(|| Error::NotFound(s.to_owned()))
    }

    #[inline]
    pub fn at(&self, idx: u32) -> Result<&str> {
        self.items
            .get(idx as usize)
            .map(|s| &**s)
            .ok_or(Error::IndexOutOfRange(idx as i64))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|s| &**s)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_owned).collect()
    }

    #[inline]
    pub(crate) fn items(&self) -> &[Arc<str>] {
        &self.items
    }
}
