//! Utility function(s).

use super::JointIndex;

/// Sorts a slice such that `data[i]` becomes the element previously stored at `indices[i]`. O(n).
/// Found on [stackoverflow](https://stackoverflow.com/a/69774341)
pub(super) fn sort_by_indices<T>(data: &mut [T], mut indices: Vec<JointIndex>) {
    for idx in 0..data.len() {
        if indices[idx] != idx {
            let mut current_idx = idx;
            loop {
                let target_idx = indices[current_idx];
                indices[current_idx] = current_idx;
                if indices[target_idx] == target_idx {
                    break;
                }
                data.swap(current_idx, target_idx);
                current_idx = target_idx;
            }
        }
    }
}

/// Inverse of a permutation: `result[order[i]] == i`
pub(super) fn invert_permutation(order: &[JointIndex]) -> Vec<JointIndex> {
    let mut result = vec![0; order.len()];
    order.iter().enumerate().for_each(|(new, &old)| result[old] = new);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_indices() {
        let mut data = vec!['a', 'b', 'c', 'd'];
        sort_by_indices(&mut data, vec![2, 0, 3, 1]);
        assert_eq!(data, vec!['c', 'a', 'd', 'b']);
        assert_eq!(invert_permutation(&[2, 0, 3, 1]), vec![1, 3, 0, 2]);
    }
}
