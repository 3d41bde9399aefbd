use std::collections::{BTreeMap, BTreeSet};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::trace;

use crate::image::palette::Rgb;

/// Source of colors for values the [`ColorCache`] has not seen yet
pub trait ColorAssigner {
    /// Returns the color for the next newly seen value
    fn next_color(&mut self) -> Rgb;
}

/// Assigns uniformly random colors
#[derive(Debug, Clone)]
pub struct RandomColors {
    rng: StdRng,
}

impl RandomColors {
    /// Random colors seeded from the operating system
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible random colors
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomColors {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl ColorAssigner for RandomColors {
    fn next_color(&mut self) -> Rgb {
        Rgb::new(self.rng.gen(), self.rng.gen(), self.rng.gen())
    }
}

/// Assigns the same color to every value
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedColor(pub Rgb);

impl ColorAssigner for FixedColor {
    fn next_color(&mut self) -> Rgb {
        self.0
    }
}

/// Colors of every value seen so far
///
/// Entries are only ever added, so a value keeps its color across redraws and
/// file loads until [`ColorCache::clear`] is called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorCache {
    colors: BTreeMap<String, Rgb>,
}

impl ColorCache {
    /// Returns the color assigned to `value`
    #[must_use]
    pub fn get(&self, value: &str) -> Option<Rgb> {
        self.colors.get(value).copied()
    }

    /// Assigns `color` to `value` unless it already has one
    ///
    /// Returns `true` if the color was added
    pub fn insert(&mut self, value: &str, color: Rgb) -> bool {
        if self.colors.contains_key(value) {
            return false;
        }
        self.colors.insert(value.to_owned(), color);
        true
    }

    /// Gives every value without a color the next color of `assigner`
    ///
    /// New values are visited in sorted order, so a seeded assigner yields the
    /// same colors for the same input. Returns the number of colors added.
    pub fn assign_missing<I, S>(&mut self, values: I, assigner: &mut dyn ColorAssigner) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unseen: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().to_owned())
            .filter(|v| !self.colors.contains_key(v))
            .collect();
        for value in &unseen {
            let color = assigner.next_color();
            trace!("Assigned {color} to {value}");
            self.colors.insert(value.clone(), color);
        }
        unseen.len()
    }

    /// Number of values with a color
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns `true` if no value has a color yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Forgets every assigned color
    pub fn clear(&mut self) {
        self.colors.clear();
    }

    /// Iterates over values and their colors in sorted value order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_colors_repeat() {
        let mut a = RandomColors::seeded(7);
        let mut b = RandomColors::seeded(7);
        for _ in 0..16 {
            assert_eq!(a.next_color(), b.next_color());
        }
    }

    #[test]
    fn known_values_keep_their_color() {
        let mut cache = ColorCache::default();
        let mut red = FixedColor(Rgb::new(0xFF, 0, 0));
        assert_eq!(cache.assign_missing(["0A", "0B", "0A"], &mut red), 2);

        let mut blue = FixedColor(Rgb::new(0, 0, 0xFF));
        assert_eq!(cache.assign_missing(["0B", "0C"], &mut blue), 1);
        assert_eq!(cache.get("0A"), Some(Rgb::new(0xFF, 0, 0)));
        assert_eq!(cache.get("0B"), Some(Rgb::new(0xFF, 0, 0)));
        assert_eq!(cache.get("0C"), Some(Rgb::new(0, 0, 0xFF)));
        assert!(!cache.insert("0C", Rgb::BLACK));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn assignment_order_does_not_depend_on_input_order() {
        let mut first = ColorCache::default();
        let mut second = ColorCache::default();
        first.assign_missing(["FF", "00", "7F"], &mut RandomColors::seeded(1));
        second.assign_missing(["7F", "FF", "00"], &mut RandomColors::seeded(1));
        assert_eq!(first, second);
    }

    #[test]
    fn clear_is_explicit() {
        let mut cache = ColorCache::default();
        cache.insert("00", Rgb::WHITE);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("00"), None);
    }
}
