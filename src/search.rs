use std::cmp::Ordering;

/// Finds the index of the greatest element that is less than or equal to the needle.
///
/// `compare` receives an element of the sorted `haystack` and returns the ordering of the needle
/// relative to it. When several elements compare equal to the needle, the lowest index among
/// them is returned. Returns `None` when the haystack is empty or every element is greater than
/// the needle.
pub(crate) fn nearest_at_or_before<T, F>(haystack: &[T], mut compare: F) -> Option<usize>
where
    F: FnMut(&T) -> Ordering,
{
    if haystack.is_empty() {
        return None;
    }

    // Invariant: haystack[low] <= needle < haystack[high], with low = -1 and
    // high = len standing in for the open bounds.
    let mut low: isize = -1;
    let mut high = haystack.len() as isize;
    let mut found = None;

    while high - low > 1 {
        let mid = low + (high - low) / 2;
        match compare(&haystack[mid as usize]) {
            Ordering::Equal => {
                found = Some(mid as usize);
                break;
            }
            Ordering::Greater => low = mid,
            Ordering::Less => high = mid,
        }
    }

    let mut index = match found {
        Some(index) => index,
        None if low < 0 => return None,
        None => low as usize,
    };

    // step back to the first of a run of equal elements
    while index > 0 && compare(&haystack[index - 1]) == Ordering::Equal {
        index -= 1;
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::nearest_at_or_before;

    fn search(haystack: &[u32], needle: u32) -> Option<usize> {
        nearest_at_or_before(haystack, |elem| needle.cmp(elem))
    }

    #[test]
    fn test_exact_and_nearest() {
        let haystack = [1, 3, 5, 7, 9];
        assert_eq!(search(&haystack, 5), Some(2));
        assert_eq!(search(&haystack, 6), Some(2));
        assert_eq!(search(&haystack, 100), Some(4));
        assert_eq!(search(&haystack, 1), Some(0));
    }

    #[test]
    fn test_nothing_at_or_before() {
        assert_eq!(search(&[], 5), None);
        assert_eq!(search(&[3, 4], 2), None);
    }

    #[test]
    fn test_lowest_equal_index() {
        let haystack = [1, 2, 2, 2, 2, 2, 3];
        assert_eq!(search(&haystack, 2), Some(1));
        assert_eq!(search(&[4, 4, 4], 4), Some(0));
        assert_eq!(search(&[4, 4, 4], 5), Some(2));
    }
}
