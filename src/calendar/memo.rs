/// A single-slot cache that recomputes its value only when the key it was
/// computed from changes
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Memo<K, V> {
    slot: Option<(K, V)>,
}

impl<K: PartialEq, V> Memo<K, V> {
    pub(crate) fn new() -> Self {
        Memo { slot: None }
    }

    pub(crate) fn get_or_compute<F>(&mut self, key: K, compute: F) -> &V
    where
        F: FnOnce(&K) -> V,
    {
        if self.slot.as_ref().is_some_and(|(k, _)| *k != key) {
            self.slot = None;
        }
        let (_, value) = self.slot.get_or_insert_with(|| {
            let value = compute(&key);
            (key, value)
        });
        value
    }

    pub(crate) fn invalidate(&mut self) {
        self.slot = None;
    }
}

impl<K: PartialEq, V> Default for Memo<K, V> {
    fn default() -> Self {
        Memo::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_value_for_equal_key() {
        let mut memo = Memo::new();
        let mut calls = 0;
        for _ in 0..3 {
            let v = *memo.get_or_compute((1, 2), |&(a, b)| {
                calls += 1;
                a + b
            });
            assert_eq!(v, 3);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_recomputes_on_key_change() {
        let mut memo = Memo::new();
        let mut calls = 0;
        for key in [1, 1, 2, 2, 1] {
            let v = *memo.get_or_compute(key, |&k| {
                calls += 1;
                k * 10
            });
            assert_eq!(v, key * 10);
        }
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_invalidate() {
        let mut memo = Memo::new();
        let mut calls = 0;
        let mut compute = |k: &i32| {
            calls += 1;
            *k
        };
        memo.get_or_compute(7, &mut compute);
        memo.invalidate();
        memo.get_or_compute(7, &mut compute);
        assert_eq!(calls, 2);
    }
}
