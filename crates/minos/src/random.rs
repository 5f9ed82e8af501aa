//! Random input generation for test tables.
//!
//! A process-wide [`Generator`] backs the free functions used by drivers.
//! It is seeded from OS entropy unless [`reseed`] is called.

use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use olympus_common::{HarnessError, HarnessResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Characters pseudo-words are drawn from
pub const WORD_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Closed integer range `[min, max]` with `min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    min: i64,
    max: i64,
}

impl IntRange {
    /// Validate and build a range. Bounds are never swapped.
    pub fn new(min: i64, max: i64) -> HarnessResult<Self> {
        if min > max {
            return Err(HarnessError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Shape of the word lists produced by [`Generator::word_set`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSetSpec {
    entries: (usize, usize),
    max_words_per_entry: usize,
    word_len: (usize, usize),
}

impl Default for WordSetSpec {
    fn default() -> Self {
        Self {
            entries: (1, 5),
            max_words_per_entry: 4,
            word_len: (1, 8),
        }
    }
}

impl WordSetSpec {
    /// Build a spec; every `min` must not exceed its `max` and every
    /// count must be at least one.
    pub fn new(
        min_entries: usize,
        max_entries: usize,
        max_words_per_entry: usize,
        min_word_len: usize,
        max_word_len: usize,
    ) -> HarnessResult<Self> {
        check_counts(min_entries, max_entries)?;
        check_counts(1, max_words_per_entry)?;
        check_counts(min_word_len, max_word_len)?;
        Ok(Self {
            entries: (min_entries, max_entries),
            max_words_per_entry,
            word_len: (min_word_len, max_word_len),
        })
    }

    /// Same spec with a different upper bound on entries
    pub fn with_max_entries(self, max_entries: usize) -> HarnessResult<Self> {
        Self::new(
            self.entries.0,
            max_entries,
            self.max_words_per_entry,
            self.word_len.0,
            self.word_len.1,
        )
    }

    pub fn min_entries(&self) -> usize {
        self.entries.0
    }

    pub fn max_entries(&self) -> usize {
        self.entries.1
    }

    pub fn max_words_per_entry(&self) -> usize {
        self.max_words_per_entry
    }

    pub fn min_word_len(&self) -> usize {
        self.word_len.0
    }

    pub fn max_word_len(&self) -> usize {
        self.word_len.1
    }
}

fn check_counts(min: usize, max: usize) -> HarnessResult<()> {
    let as_i64 = |v: usize| i64::try_from(v).unwrap_or(i64::MAX);
    if min == 0 || min > max {
        return Err(HarnessError::InvalidRange {
            min: as_i64(min),
            max: as_i64(max),
        });
    }
    Ok(())
}

/// Seedable source of test inputs
#[derive(Debug, Clone)]
pub struct Generator {
    rng: StdRng,
    words: WordSetSpec,
}

impl Generator {
    /// Generator seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            words: WordSetSpec::default(),
        }
    }

    /// Deterministic generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            words: WordSetSpec::default(),
        }
    }

    pub fn with_word_spec(mut self, words: WordSetSpec) -> Self {
        self.words = words;
        self
    }

    pub fn word_spec(&self) -> WordSetSpec {
        self.words
    }

    /// Uniform integer in `[min, max]`
    pub fn int_between(&mut self, min: i64, max: i64) -> HarnessResult<i64> {
        let range = IntRange::new(min, max)?;
        Ok(self.int_in(range))
    }

    pub fn int_in(&mut self, range: IntRange) -> i64 {
        self.rng.random_range(range.min..=range.max)
    }

    /// Alphanumeric pseudo-word of exactly `len` characters
    pub fn word(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| WORD_ALPHABET[self.rng.random_range(0..WORD_ALPHABET.len())] as char)
            .collect()
    }

    /// `count` pseudo-words with lengths drawn from the word spec
    pub fn words(&mut self, count: usize) -> Vec<String> {
        let (min_len, max_len) = self.words.word_len;
        (0..count)
            .map(|_| {
                let len = self.rng.random_range(min_len..=max_len);
                self.word(len)
            })
            .collect()
    }

    /// Bounded list of entries, each a space-joined group of pseudo-words
    pub fn word_set(&mut self) -> Vec<String> {
        let (min_entries, max_entries) = self.words.entries;
        let entries = self.rng.random_range(min_entries..=max_entries);
        (0..entries)
            .map(|_| {
                let count = self.rng.random_range(1..=self.words.max_words_per_entry);
                self.words(count).join(" ")
            })
            .collect()
    }
}

static SOURCE: LazyLock<Mutex<Generator>> =
    LazyLock::new(|| Mutex::new(Generator::from_entropy()));

fn source() -> MutexGuard<'static, Generator> {
    SOURCE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reseed the process-wide generator, keeping its word spec
pub fn reseed(seed: u64) {
    let mut generator = source();
    let words = generator.word_spec();
    *generator = Generator::seeded(seed).with_word_spec(words);
    tracing::debug!(seed, "random source reseeded");
}

/// Change the shape of lists returned by [`mult_rand_words`]
pub fn configure_words(words: WordSetSpec) {
    source().words = words;
}

/// Uniform integer in `[min, max]`; `min > max` is an [`HarnessError::InvalidRange`]
pub fn rand_int_between(min: i64, max: i64) -> HarnessResult<i64> {
    source().int_between(min, max)
}

/// Random word list, see [`Generator::word_set`]
pub fn mult_rand_words() -> Vec<String> {
    source().word_set()
}

pub fn rand_word(len: usize) -> String {
    source().word(len)
}

pub fn rand_words(count: usize) -> Vec<String> {
    source().words(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_int_between_stays_in_bounds() {
        let mut generator = Generator::seeded(7);
        for _ in 0..1000 {
            let v = generator.int_between(1, 20).unwrap();
            assert!((1..=20).contains(&v));
        }
    }

    #[test]
    fn test_int_between_varies() {
        let mut generator = Generator::seeded(11);
        let draws: Vec<i64> = (0..100).map(|_| generator.int_between(0, 1).unwrap()).collect();
        assert!(draws.iter().any(|v| *v != draws[0]));
    }

    #[test]
    fn test_single_value_range() {
        let mut generator = Generator::seeded(3);
        assert_eq!(generator.int_between(-4, -4), Ok(-4));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert_eq!(
            rand_int_between(20, 1),
            Err(HarnessError::InvalidRange { min: 20, max: 1 })
        );
    }

    #[test]
    fn test_full_i64_range() {
        let mut generator = Generator::seeded(5);
        assert!(generator.int_between(i64::MIN, i64::MAX).is_ok());
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = Generator::seeded(99);
        let mut b = Generator::seeded(99);
        assert_eq!(a.word_set(), b.word_set());
        assert_eq!(a.int_between(0, 1_000_000), b.int_between(0, 1_000_000));
    }

    #[test]
    fn test_word_set_respects_spec() {
        let spec = WordSetSpec::new(2, 3, 2, 3, 5).unwrap();
        let mut generator = Generator::seeded(1).with_word_spec(spec);
        for _ in 0..50 {
            let set = generator.word_set();
            assert!((2..=3).contains(&set.len()));
            for entry in &set {
                let words: Vec<&str> = entry.split_whitespace().collect();
                assert!((1..=2).contains(&words.len()));
                for word in words {
                    assert!((3..=5).contains(&word.len()));
                    assert!(word.bytes().all(|b| WORD_ALPHABET.contains(&b)));
                }
            }
        }
    }

    #[test]
    fn test_word_spec_validation() {
        assert!(WordSetSpec::new(3, 2, 1, 1, 1).is_err());
        assert!(WordSetSpec::new(0, 2, 1, 1, 1).is_err());
        assert!(WordSetSpec::new(1, 2, 0, 1, 1).is_err());
        assert!(WordSetSpec::default().with_max_entries(0).is_err());
        assert_eq!(WordSetSpec::default().with_max_entries(9).unwrap().max_entries(), 9);
    }

    #[test]
    fn test_word_has_requested_length() {
        let mut generator = Generator::seeded(2);
        assert_eq!(generator.word(6).len(), 6);
        assert_eq!(generator.word(0), "");
        assert_eq!(generator.words(4).len(), 4);
    }

    #[test]
    fn test_global_word_helpers() {
        let word = rand_word(5);
        assert_eq!(word.len(), 5);
        assert!(word.bytes().all(|b| WORD_ALPHABET.contains(&b)));

        let words = rand_words(3);
        assert_eq!(words.len(), 3);
        let spec = WordSetSpec::default();
        assert!(words.iter().all(|w| {
            (spec.min_word_len()..=spec.max_word_len()).contains(&w.len())
                && w.bytes().all(|b| WORD_ALPHABET.contains(&b))
        }));
        assert!(rand_words(0).is_empty());
    }

    proptest! {
        #[test]
        fn prop_int_between_in_range(a in any::<i64>(), b in any::<i64>(), seed in any::<u64>()) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let v = Generator::seeded(seed).int_between(min, max).unwrap();
            prop_assert!(min <= v && v <= max);
        }

        #[test]
        fn prop_inverted_range_fails(a in any::<i64>(), b in any::<i64>()) {
            prop_assume!(a != b);
            let (min, max) = if a > b { (a, b) } else { (b, a) };
            prop_assert_eq!(
                Generator::seeded(0).int_between(min, max),
                Err(HarnessError::InvalidRange { min, max })
            );
        }
    }
}
