use super::{FlagId, CAPACITY};
use serde::{Deserialize, Serialize};
use std::fmt;

type Word = u32;

const WORD_BITS: usize = Word::BITS as usize;
const WORDS: usize = CAPACITY / WORD_BITS;

// CAPACITY must fill whole words and stay addressable by FlagId.
const _: () = assert!(CAPACITY % WORD_BITS == 0);
const _: () = assert!(CAPACITY <= FlagId::MAX as usize + 1);

/// Fixed-size bitset over the flag identifier space
///
/// Used both as the raised-flag storage of a [`FlagSet`](super::FlagSet) and
/// as a dependency entry in a [`DependencyTable`](crate::DependencyTable).
/// Identifiers at or above [`CAPACITY`] are never stored: `set`/`clear`
/// ignore them and `contains` reports `false`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagMask {
    words: [Word; WORDS],
}

#[inline]
fn locate(id: FlagId) -> Option<(usize, Word)> {
    let id = usize::from(id);
    if id >= CAPACITY {
        return None;
    }
    Some((id / WORD_BITS, 1 << (id % WORD_BITS)))
}

impl FlagMask {
    /// Mask with no bits set
    pub const fn empty() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Build a mask from a list of identifiers, skipping out-of-range ones
    pub fn from_ids<I: IntoIterator<Item = FlagId>>(ids: I) -> Self {
        let mut mask = Self::empty();
        for id in ids {
            mask.set(id);
        }
        mask
    }

    /// Set bit `id`, returning whether it was previously clear
    #[inline]
    pub fn set(&mut self, id: FlagId) -> bool {
        match locate(id) {
            Some((word, bit)) => {
                let was_clear = self.words[word] & bit == 0;
                self.words[word] |= bit;
                was_clear
            }
            None => false,
        }
    }

    /// Clear bit `id`, returning whether it was previously set
    #[inline]
    pub fn clear(&mut self, id: FlagId) -> bool {
        match locate(id) {
            Some((word, bit)) => {
                let was_set = self.words[word] & bit != 0;
                self.words[word] &= !bit;
                was_set
            }
            None => false,
        }
    }

    #[inline]
    pub fn contains(&self, id: FlagId) -> bool {
        locate(id).is_some_and(|(word, bit)| self.words[word] & bit != 0)
    }

    /// Bits set in both masks
    #[inline]
    pub fn intersection(&self, other: &FlagMask) -> FlagMask {
        let mut out = FlagMask::empty();
        for (dst, (a, b)) in out.words.iter_mut().zip(self.words.iter().zip(&other.words)) {
            *dst = a & b;
        }
        out
    }

    #[inline]
    pub fn intersects(&self, other: &FlagMask) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(a, b)| a & b != 0)
    }

    /// Number of set bits
    #[inline]
    pub fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn clear_all(&mut self) {
        self.words = [0; WORDS];
    }

    /// Iterate set identifiers in ascending order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            mask: self,
            next: 0,
        }
    }
}

/// Ascending iterator over the identifiers set in a [`FlagMask`]
pub struct Iter<'a> {
    mask: &'a FlagMask,
    next: usize,
}

impl Iterator for Iter<'_> {
    type Item = FlagId;

    fn next(&mut self) -> Option<FlagId> {
        while self.next < CAPACITY {
            let word_idx = self.next / WORD_BITS;
            // Drop bits below the cursor, then jump to the lowest remaining one.
            let remaining = self.mask.words[word_idx] >> (self.next % WORD_BITS);
            if remaining == 0 {
                self.next = (word_idx + 1) * WORD_BITS;
                continue;
            }
            let id = self.next + remaining.trailing_zeros() as usize;
            self.next = id + 1;
            return Some(id as FlagId);
        }
        None
    }
}

impl<'a> IntoIterator for &'a FlagMask {
    type Item = FlagId;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl FromIterator<FlagId> for FlagMask {
    fn from_iter<I: IntoIterator<Item = FlagId>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}

impl fmt::Debug for FlagMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for FlagMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, "}}")
    }
}
