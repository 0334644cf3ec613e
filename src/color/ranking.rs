//! Frequency-ranked palette construction.

use std::collections::{HashMap, HashSet};

use super::{CanonicalColor, normalize};

/// A deduplicated, frequency-ranked palette split by the restricted list.
///
/// Rebuilt from scratch for every loaded document; never updated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    /// Colors not on the restricted list, most frequent first.
    pub ordinary: Vec<CanonicalColor>,
    /// Colors on the restricted list, most frequent first.
    pub restricted: Vec<CanonicalColor>,
    /// `ordinary` followed by `restricted`.
    pub combined: Vec<CanonicalColor>,
    counts: HashMap<CanonicalColor, usize>,
}

impl Palette {
    /// Returns how many input values normalized to `color`.
    pub fn count(&self, color: &CanonicalColor) -> usize {
        self.counts.get(color).copied().unwrap_or(0)
    }

    /// Returns true if no color was recognized.
    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }

    pub fn len(&self) -> usize {
        self.combined.len()
    }
}

/// Builds a palette from raw paint values.
///
/// Unrecognized values are dropped. Ties in frequency keep first-occurrence
/// order, so identical input always yields an identical palette.
pub fn build_palette<S, R>(colors: &[S], restricted: &[R]) -> Palette
where
    S: AsRef<str>,
    R: AsRef<str>,
{
    let mut tally: Vec<(CanonicalColor, usize)> = Vec::new();
    let mut slots: HashMap<CanonicalColor, usize> = HashMap::new();

    for color in colors.iter().filter_map(|c| normalize(c.as_ref())) {
        match slots.get(&color) {
            Some(&slot) => tally[slot].1 += 1,
            None => {
                slots.insert(color, tally.len());
                tally.push((color, 1));
            }
        }
    }

    // Stable sort keeps first-occurrence order within equal counts.
    tally.sort_by(|a, b| b.1.cmp(&a.1));

    let restricted: HashSet<CanonicalColor> =
        restricted.iter().filter_map(|c| normalize(c.as_ref())).collect();

    let (restricted_bucket, ordinary): (Vec<_>, Vec<_>) = tally
        .iter()
        .map(|(color, _)| *color)
        .partition(|color| restricted.contains(color));

    let combined = ordinary.iter().chain(&restricted_bucket).copied().collect();

    Palette {
        ordinary,
        restricted: restricted_bucket,
        combined,
        counts: tally.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(colors: &[CanonicalColor]) -> Vec<String> {
        colors.iter().map(|c| c.to_hex()).collect()
    }

    #[test]
    fn equivalent_forms_are_merged_and_restricted_split() {
        let palette = build_palette(
            &["#fff", "#FFFFFF", "rgb(255,255,255)", "#000"],
            &["#000000"],
        );

        assert_eq!(hex(&palette.ordinary), ["#ffffff"]);
        assert_eq!(hex(&palette.restricted), ["#000000"]);
        assert_eq!(hex(&palette.combined), ["#ffffff", "#000000"]);
        assert_eq!(palette.count(&CanonicalColor::new(255, 255, 255)), 3);
        assert_eq!(palette.count(&CanonicalColor::new(0, 0, 0)), 1);
    }

    #[test]
    fn empty_input_gives_empty_palette() {
        let palette = build_palette::<&str, &str>(&[], &["#000000"]);
        assert!(palette.is_empty());
        assert!(palette.ordinary.is_empty());
        assert!(palette.restricted.is_empty());
        assert!(palette.combined.is_empty());
    }

    #[test]
    fn unrecognized_values_are_dropped() {
        let palette = build_palette(&["none", "url(#g)", "#123456", "bogus"], &[] as &[&str]);
        assert_eq!(hex(&palette.combined), ["#123456"]);
    }

    #[test]
    fn ranking_is_by_descending_count_with_stable_ties() {
        let palette = build_palette(
            &["#111", "#222", "#333", "#222", "#333", "#444", "#333"],
            &[] as &[&str],
        );
        assert_eq!(hex(&palette.ordinary), ["#333333", "#222222", "#111111", "#444444"]);

        let again = build_palette(
            &["#111", "#222", "#333", "#222", "#333", "#444", "#333"],
            &[] as &[&str],
        );
        assert_eq!(palette, again);
    }

    #[test]
    fn restricted_list_is_normalized() {
        let palette = build_palette(&["rgb(202, 228, 237)", "#abc"], &["#CAE4ED"]);
        assert_eq!(hex(&palette.ordinary), ["#aabbcc"]);
        assert_eq!(hex(&palette.restricted), ["#cae4ed"]);
    }

    #[test]
    fn buckets_are_disjoint_and_complete() {
        let input = ["#a00", "#0a0", "#00a", "#a00", "#000", "#fff", "#000"];
        let palette = build_palette(&input, &["#000", "#0a0"]);

        for color in &palette.ordinary {
            assert!(!palette.restricted.contains(color));
        }

        let mut distinct: Vec<_> = input.iter().filter_map(|c| normalize(c)).collect();
        distinct.sort();
        distinct.dedup();

        let mut combined = palette.combined.clone();
        let before = combined.len();
        combined.sort();
        combined.dedup();
        assert_eq!(before, combined.len(), "combined has duplicates");
        assert_eq!(combined, distinct);
    }
}
