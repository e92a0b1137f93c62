//! Variable-length list fields (skills, points, keywords, images)

use crate::types::ProjectImage;

/// Item of a `DynamicList`
pub trait ListItem: Clone + Default {
    /// Whether the item holds nothing worth submitting
    fn is_blank(&self) -> bool;
}

impl ListItem for String {
    #[inline]
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl ListItem for ProjectImage {
    #[inline]
    fn is_blank(&self) -> bool {
        self.url.trim().is_empty() && self.subtitle.trim().is_empty()
    }
}

/// Ordered list that always holds at least one element
///
/// A new blank element can be pushed only once the last one has content,
/// and the last remaining element cannot be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicList<T> {
    items: Vec<T>,
}

impl<T: ListItem> Default for DynamicList<T> {
    fn default() -> Self {
        Self {
            items: vec![T::default()],
        }
    }
}

impl<T: ListItem> DynamicList<T> {
    /// List holding one blank element
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// List from existing values; an empty input becomes one blank element
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            Self::default()
        } else {
            Self { items }
        }
    }

    /// Current elements, blanks included
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of elements, blanks included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list holds no elements
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Whether `push_blank` would succeed
    #[inline]
    #[must_use]
    pub fn can_push(&self) -> bool {
        self.items.last().map_or(true, |last| !last.is_blank())
    }

    /// Append a blank element; refused while the last element is blank
    pub fn push_blank(&mut self) -> bool {
        if !self.can_push() {
            return false;
        }
        self.items.push(T::default());
        true
    }

    /// Remove the element at `index`; refused for the only element
    pub fn remove(&mut self, index: usize) -> bool {
        if self.items.len() <= 1 || index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        true
    }

    /// Replace the element at `index`
    pub fn replace(&mut self, index: usize, value: T) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Elements with blanks dropped, ready for submission
    #[must_use]
    pub fn cleaned(&self) -> Vec<T> {
        self.items.iter().filter(|i| !i.is_blank()).cloned().collect()
    }
}

impl DynamicList<String> {
    /// Set the text at `index`
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> bool {
        self.replace(index, value.into())
    }
}
