//! Dependency sets: the undischarged assumptions a proof line rests on.

use smallvec::SmallVec;
use std::fmt::{self, Debug, Display};

const WORD_BITS: usize = u64::BITS as usize;

/// A set of line indices stored as a bitset.
///
/// Trailing zero words are never stored, so two sets with the same members
/// compare equal regardless of how they were built.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Premises {
    words: SmallVec<[u64; 2]>,
}

impl Premises {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(index: usize) -> Self {
        let mut premises = Self::new();
        premises.insert(index);
        premises
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .is_some_and(|w| w & (1 << (index % WORD_BITS)) != 0)
    }

    pub fn insert(&mut self, index: usize) {
        let word = index / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (index % WORD_BITS);
    }

    pub fn union(&self, other: &Premises) -> Premises {
        let (long, short) = if self.words.len() >= other.words.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut words = long.words.clone();
        for (w, o) in words.iter_mut().zip(short.words.iter()) {
            *w |= o;
        }
        Premises { words }
    }

    pub fn is_subset(&self, other: &Premises) -> bool {
        self.words.len() <= other.words.len()
            && self.words.iter().zip(other.words.iter()).all(|(w, o)| w & !o == 0)
    }

    /// This set with `index` discharged.
    pub fn without(&self, index: usize) -> Premises {
        let mut premises = self.clone();
        if let Some(w) = premises.words.get_mut(index / WORD_BITS) {
            *w &= !(1 << (index % WORD_BITS));
        }
        premises.trim();
        premises
    }

    /// Members in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(i * WORD_BITS + bit)
            })
        })
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

impl FromIterator<usize> for Premises {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut premises = Premises::new();
        for index in iter {
            premises.insert(index);
        }
        premises
    }
}

impl Debug for Premises {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Shows members as 1-based line numbers.
impl Display for Premises {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<usize> = self.iter().map(crate::util::line_number).collect();
        write!(f, "{{{}}}", crate::util::ListDisplay(&lines, ", "))
    }
}
