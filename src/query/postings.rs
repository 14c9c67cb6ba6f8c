//! Set operations over ascending posting lists.

use std::cmp::Ordering;

use crate::index::package::DocId;

/// Intersect two ascending lists by merging.
pub fn intersect_sorted(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut result = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result
}

/// Intersect two ascending string lists by merging.
pub fn intersect_terms(a: &[String], b: &[String]) -> Vec<String> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                result.push(a[i].clone());
                i += 1;
                j += 1;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_sorted() {
        assert_eq!(intersect_sorted(&[1, 3, 5, 7], &[2, 3, 7, 9]), vec![3, 7]);
        assert!(intersect_sorted(&[], &[1]).is_empty());
    }

    #[test]
    fn test_intersect_terms() {
        let a = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
        let b = vec!["beta".to_string(), "delta".to_string(), "gamma".to_string()];
        assert_eq!(intersect_terms(&a, &b), vec!["beta", "gamma"]);
    }
}
