use rand::seq::IndexedRandom;

/// Pick one element uniformly at random, `None` for an empty slice
pub fn choose<T>(items: &[T]) -> Option<&T> {
    items.choose(&mut rand::rng())
}

/// A non-empty set of interchangeable phrases
///
/// Used wherever a reply should vary between turns: goodbyes, wait
/// messages, launch hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseSet {
    phrases: Vec<String>,
}

impl PhraseSet {
    /// Build a set from candidate phrases, ignoring blank entries
    ///
    /// Returns `None` when no usable phrase remains.
    pub fn new<I, S>(phrases: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.trim().is_empty())
            .collect();

        (!phrases.is_empty()).then_some(Self { phrases })
    }

    /// Pick one phrase uniformly at random
    #[must_use]
    pub fn pick(&self) -> &str {
        choose(&self.phrases).map_or("", String::as_str)
    }

    /// Whether `phrase` belongs to this set
    #[must_use]
    pub fn contains(&self, phrase: &str) -> bool {
        self.phrases.iter().any(|p| p == phrase)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
