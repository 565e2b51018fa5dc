//! Wrap-around indexing over a fixed list.

/// List, that can be indexed by any integer.
///
/// Indices past the end continue from the start, negative indices
/// count back from the end. The amount of whole wraps is reported
/// by [`Circular::wrap`], so scale degrees can move octaves.
///
/// # Example
/// ```
/// # use muse_score::primitives::Circular;
/// let steps = Circular::new(vec![0, 2, 4, 5, 7, 9, 11]);
/// assert_eq!(steps.get(8), Some(&2));
/// assert_eq!(steps.get(-1), Some(&11));
/// assert_eq!(steps.wrap(-1), Some((6, -1)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circular<T> {
    items: Vec<T>,
}
impl<T> Circular<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Internal index and number of whole wraps for outer index.
    pub fn wrap(&self, index: i64) -> Option<(usize, i64)> {
        let len = self.items.len() as i64;
        if len == 0 {
            return None;
        }
        Some((index.rem_euclid(len) as usize, index.div_euclid(len)))
    }

    pub fn get(&self, index: i64) -> Option<&T> {
        let (idx, _) = self.wrap(index)?;
        self.items.get(idx)
    }
    pub fn get_mut(&mut self, index: i64) -> Option<&mut T> {
        let (idx, _) = self.wrap(index)?;
        self.items.get_mut(idx)
    }

    /// Rotate left by `n` (negative `n` rotates right).
    pub fn rotate(&mut self, n: i64) {
        if let Some((idx, _)) = self.wrap(n) {
            self.items.rotate_left(idx);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}
impl<T: PartialEq> Circular<T> {
    /// First position of value.
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.items.iter().position(|item| item == value)
    }
    /// Last position of value.
    pub fn rindex_of(&self, value: &T) -> Option<usize> {
        self.items.iter().rposition(|item| item == value)
    }
}

#[cfg(test)]
mod tests {
    use super::Circular;

    #[test]
    fn indexing() {
        let mut c = Circular::new(vec!['a', 'b', 'c']);
        assert_eq!(c.get(0), Some(&'a'));
        assert_eq!(c.get(3), Some(&'a'));
        assert_eq!(c.get(-4), Some(&'c'));
        assert_eq!(c.wrap(7), Some((1, 2)));
        *c.get_mut(5).unwrap() = 'z';
        assert_eq!(c.get(2), Some(&'z'));
        assert_eq!(Circular::<u8>::new(vec![]).get(1), None);
    }

    #[test]
    fn search_and_rotate() {
        let mut c = Circular::new(vec![1, 2, 1, 3]);
        assert_eq!(c.index_of(&1), Some(0));
        assert_eq!(c.rindex_of(&1), Some(2));
        assert_eq!(c.index_of(&5), None);
        c.rotate(1);
        assert_eq!(c.iter().copied().collect::<Vec<_>>(), vec![2, 1, 3, 1]);
        c.rotate(-1);
        assert_eq!(c.iter().copied().collect::<Vec<_>>(), vec![1, 2, 1, 3]);
    }
}
