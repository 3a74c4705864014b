//! Total orders over mappings.
//!
//! Absent sources and names sort as the empty string and absent original positions as zero, so
//! mappings without original information sort before the ones that have it.

use crate::mapping::Position;
use std::cmp::Ordering;

/// Borrowed form of a mapping with sources and names resolved to strings.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct MappingView<'a> {
    pub generated: Position,
    pub original: Option<Position>,
    pub source: Option<&'a str>,
    pub name: Option<&'a str>,
}

#[inline]
fn original_line(view: &MappingView<'_>) -> u32 {
    view.original.map_or(0, |p| p.line)
}

#[inline]
fn original_column(view: &MappingView<'_>) -> u32 {
    view.original.map_or(0, |p| p.column)
}

#[inline]
fn cmp_str(a: Option<&str>, b: Option<&str>) -> Ordering {
    a.unwrap_or("").cmp(b.unwrap_or(""))
}

/// Orders by generated position. When `only_generated` is false, ties are broken by source,
/// original position and name.
pub(crate) fn compare_by_generated(
    a: &MappingView<'_>,
    b: &MappingView<'_>,
    only_generated: bool,
) -> Ordering {
    let ord = a.generated.cmp(&b.generated);
    if ord != Ordering::Equal || only_generated {
        return ord;
    }

    cmp_str(a.source, b.source)
        .then_with(|| original_line(a).cmp(&original_line(b)))
        .then_with(|| original_column(a).cmp(&original_column(b)))
        .then_with(|| cmp_str(a.name, b.name))
}

/// Orders by source and original position. When `only_original` is false, ties are broken by
/// name and generated position.
pub(crate) fn compare_by_original(
    a: &MappingView<'_>,
    b: &MappingView<'_>,
    only_original: bool,
) -> Ordering {
    let ord = cmp_str(a.source, b.source)
        .then_with(|| original_line(a).cmp(&original_line(b)))
        .then_with(|| original_column(a).cmp(&original_column(b)));
    if ord != Ordering::Equal || only_original {
        return ord;
    }

    cmp_str(a.name, b.name).then_with(|| a.generated.cmp(&b.generated))
}

#[cfg(test)]
mod tests {
    use super::{compare_by_generated, compare_by_original};
    use crate::Mapping;
    use std::cmp::Ordering;

    #[test]
    fn test_compare_by_generated() {
        let a = Mapping::new(1, 5);
        let b = Mapping::new(1, 5).with_source("a.js", 3, 0);
        let c = Mapping::new(1, 5).with_source("a.js", 3, 0).with_name("x");
        let d = Mapping::new(2, 0);

        assert_eq!(compare_by_generated(&a.view(), &b.view(), false), Ordering::Less);
        assert_eq!(compare_by_generated(&a.view(), &b.view(), true), Ordering::Equal);
        assert_eq!(compare_by_generated(&b.view(), &c.view(), false), Ordering::Less);
        assert_eq!(compare_by_generated(&d.view(), &c.view(), false), Ordering::Greater);
        assert_eq!(compare_by_generated(&c.view(), &c.view(), false), Ordering::Equal);
    }

    #[test]
    fn test_compare_by_original() {
        let a = Mapping::new(9, 0).with_source("a.js", 1, 4);
        let b = Mapping::new(1, 0).with_source("b.js", 1, 0);
        let c = Mapping::new(2, 0).with_source("a.js", 1, 4);

        assert_eq!(compare_by_original(&a.view(), &b.view(), false), Ordering::Less);
        assert_eq!(compare_by_original(&a.view(), &c.view(), true), Ordering::Equal);
        assert_eq!(compare_by_original(&a.view(), &c.view(), false), Ordering::Greater);
    }
}
