//! Color to region index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::{CanonicalColor, normalize};
use crate::document::{Document, NodeId, StyleMap};

/// What happens when a bucket is recolored onto a color that already has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum CollisionPolicy {
    /// Regions of both buckets end up under the new color.
    #[default]
    Merge,
    /// The recolored bucket replaces the existing one. Regions of the
    /// replaced bucket can no longer be recolored as a unit.
    Overwrite,
}

/// Returns the rendered fill of every region that paints something, in
/// document order.
///
/// `none` and fully transparent fills are skipped. Gradient references are
/// returned as-is and dropped later by normalization.
pub fn scan_fills(doc: &Document, styles: &StyleMap) -> Vec<String> {
    doc.regions()
        .into_iter()
        .filter_map(|id| styles.get(id))
        .filter(|style| style.fill.is_visible())
        .map(|style| style.fill.to_css())
        .collect()
}

/// Maps each canonical fill color to the regions currently painted with it.
#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    buckets: HashMap<CanonicalColor, Vec<NodeId>>,
    /// Keys in first-seen order.
    order: Vec<CanonicalColor>,
    policy: CollisionPolicy,
}

impl RegionIndex {
    /// Builds the index from the rendered fills of `doc`.
    pub fn build(doc: &Document, styles: &StyleMap, policy: CollisionPolicy) -> Self {
        let mut index = Self {
            policy,
            ..Self::default()
        };

        for id in doc.regions() {
            let Some(style) = styles.get(id) else {
                continue;
            };
            if !style.fill.is_visible() {
                continue;
            }
            let Some(color) = normalize(&style.fill.to_css()) else {
                continue;
            };

            index
                .buckets
                .entry(color)
                .or_insert_with(|| {
                    index.order.push(color);
                    Vec::new()
                })
                .push(id);
        }

        index
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Returns the regions painted with `color`, in document order.
    pub fn regions(&self, color: &CanonicalColor) -> &[NodeId] {
        self.buckets.get(color).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the indexed colors in first-seen order.
    pub fn colors(&self) -> &[CanonicalColor] {
        &self.order
    }

    /// Returns the number of distinct colors.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Paints every region of `old` with `new` and moves the bucket to `new`.
    ///
    /// The new color is written as an inline `fill` style so it wins over
    /// stylesheet rules. Only the regions of the bucket are touched. Returns
    /// the number of recolored regions.
    pub fn recolor(&mut self, doc: &mut Document, old: CanonicalColor, new: CanonicalColor) -> usize {
        let Some(regions) = self.buckets.remove(&old) else {
            return 0;
        };

        let value = new.to_hex();
        for id in &regions {
            doc.set_style_property(*id, "fill", &value);
        }
        let count = regions.len();

        let slot = self.order.iter().position(|c| *c == old);
        let collides = self.buckets.contains_key(&new);

        match self.policy {
            CollisionPolicy::Merge => self.buckets.entry(new).or_default().extend(regions),
            CollisionPolicy::Overwrite => {
                if collides {
                    log::warn!("recolor {old} -> {new} replaces an existing bucket");
                }
                self.buckets.insert(new, regions);
            }
        }

        // Rename the key in place unless the new color already had a slot.
        if let Some(slot) = slot {
            if collides {
                self.order.remove(slot);
            } else {
                self.order[slot] = new;
            }
        }

        log::debug!("recolored {count} regions {old} -> {new}");
        count
    }
}
