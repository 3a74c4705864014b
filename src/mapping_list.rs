use crate::compare::compare_by_generated;
use crate::mapping::Mapping;
use std::cmp::Ordering;

/// Mappings collected by a [MapBuilder](crate::MapBuilder), sorted by generated position on
/// demand.
///
/// Producers usually emit mappings in generated order. The list remembers whether that held for
/// every insertion and only sorts when it did not.
#[derive(Debug, Default, Clone)]
pub struct MappingList {
    mappings: Vec<Mapping>,
    unsorted: bool,
    // last mapping appended in order
    last: Option<usize>,
}

impl MappingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mapping: Mapping) {
        let in_order = match self.last {
            Some(last) => {
                compare_by_generated(&self.mappings[last].view(), &mapping.view(), false)
                    != Ordering::Greater
            }
            None => true,
        };

        if in_order {
            self.last = Some(self.mappings.len());
        } else {
            self.unsorted = true;
        }
        self.mappings.push(mapping);
    }

    /// Returns the mappings sorted by generated position, with ties broken by the original
    /// side. Sorting is stable and happens at most once per out-of-order insertion.
    pub fn as_sorted(&mut self) -> &[Mapping] {
        if self.unsorted {
            tracing::trace!(mappings = self.mappings.len(), "sorting pending mappings");
            self.mappings
                .sort_by(|a, b| compare_by_generated(&a.view(), &b.view(), false));
            self.unsorted = false;
            self.last = self.mappings.len().checked_sub(1);
        }
        &self.mappings
    }

    /// Iterates in insertion order, or in sorted order if [Self::as_sorted] ran since.
    pub fn iter_unsorted(&self) -> impl Iterator<Item = &Mapping> + '_ {
        self.mappings.iter()
    }

    /// Callers that change a mapping must call [Self::mark_unsorted] afterwards.
    pub(crate) fn iter_unsorted_mut(&mut self) -> impl Iterator<Item = &mut Mapping> + '_ {
        self.mappings.iter_mut()
    }

    pub(crate) fn mark_unsorted(&mut self) {
        self.unsorted = true;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::MappingList;
    use crate::Mapping;

    fn render(list: &mut MappingList) -> Vec<String> {
        list.as_sorted().iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_in_order_is_left_alone() {
        let mut list = MappingList::new();
        list.add(Mapping::new(1, 0));
        list.add(Mapping::new(1, 4).with_source("a.js", 1, 0));
        list.add(Mapping::new(2, 0));
        assert!(!list.unsorted);
        assert_eq!(render(&mut list), ["1:0", "1:4 -> a.js:1:0", "2:0"]);
    }

    #[test]
    fn test_out_of_order_is_sorted() {
        let mut list = MappingList::new();
        list.add(Mapping::new(2, 0));
        list.add(Mapping::new(1, 4).with_source("b.js", 1, 0));
        list.add(Mapping::new(1, 4).with_source("a.js", 1, 0));
        list.add(Mapping::new(3, 1));
        assert!(list.unsorted);

        let expected = ["1:4 -> a.js:1:0", "1:4 -> b.js:1:0", "2:0", "3:1"];
        assert_eq!(render(&mut list), expected);
        // a second call without insertions returns the same order
        assert_eq!(render(&mut list), expected);
        assert!(!list.unsorted);

        list.add(Mapping::new(3, 0));
        assert!(list.unsorted);
        assert_eq!(render(&mut list).last().unwrap(), "3:1");
    }

    #[test]
    fn test_tie_break_detects_disorder() {
        let mut list = MappingList::new();
        list.add(Mapping::new(1, 0).with_source("b.js", 1, 0));
        list.add(Mapping::new(1, 0).with_source("a.js", 1, 0));
        assert!(list.unsorted);
        assert_eq!(render(&mut list), ["1:0 -> a.js:1:0", "1:0 -> b.js:1:0"]);
    }
}
