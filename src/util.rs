use std::fmt::{self, Display};

pub(crate) type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasher>;

/// Displays the items of an iterator separated by a fixed string.
pub(crate) struct ListDisplay<'a, TS>(pub TS, pub &'a str);

impl<TS> Display for ListDisplay<'_, TS>
where
    TS: Clone + IntoIterator,
    TS::Item: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut did_something = false;
        for item in self.0.clone().into_iter() {
            if did_something {
                f.write_str(self.1)?;
            }
            write!(f, "{item}")?;
            did_something = true;
        }
        Ok(())
    }
}

/// Renders a 0-based line index the way a user numbers proof lines.
pub(crate) fn line_number(index: usize) -> usize {
    index + 1
}
