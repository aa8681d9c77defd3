//! Unlock progress and the saved-design gallery.
//!
//! Field names serialize in camelCase so stored progress stays readable by
//! the web build.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A saved design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    /// Creation time in unix milliseconds, bumped when needed to stay unique
    pub id: u64,
    pub mask_model: String,
    pub name: String,
    pub description: String,
    /// PNG data URL of the exported view
    pub image: String,
    /// Save time in unix milliseconds
    #[serde(default)]
    pub created_at: u64,
    /// Display date written by the web build, kept as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    /// Number of masks unlocked, counted from the start of the mask order
    pub unlocked_masks: usize,
    /// Newest first
    pub gallery: Vec<GalleryItem>,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            unlocked_masks: 1,
            gallery: Vec::new(),
        }
    }
}

impl UserProgress {
    /// Repair values a hand-edited or older save may carry
    pub fn normalized(mut self) -> Self {
        self.unlocked_masks = self.unlocked_masks.max(1);
        self
    }

    pub fn is_unlocked(&self, mask_index: usize) -> bool {
        mask_index < self.unlocked_masks
    }

    /// Prepend a design and return its id
    pub fn record_design(
        &mut self,
        mask_model: &str,
        name: &str,
        description: &str,
        image: String,
        timestamp_ms: u64,
    ) -> u64 {
        let mut id = timestamp_ms;
        while self.gallery.iter().any(|item| item.id == id) {
            id += 1;
        }

        self.gallery.insert(
            0,
            GalleryItem {
                id,
                mask_model: mask_model.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                image,
                created_at: timestamp_ms,
                date: None,
            },
        );
        debug!("recorded design {} for '{}'", id, mask_model);
        id
    }

    pub fn delete_design(&mut self, id: u64) -> bool {
        let before = self.gallery.len();
        self.gallery.retain(|item| item.id != id);
        self.gallery.len() != before
    }

    pub fn design(&self, id: u64) -> Option<&GalleryItem> {
        self.gallery.iter().find(|item| item.id == id)
    }

    /// Unlock the next mask when a design was saved on the last unlocked
    /// one and more remain
    pub fn unlock_after(&mut self, mask_index: usize, mask_count: usize) -> bool {
        if mask_index + 1 == self.unlocked_masks && self.unlocked_masks < mask_count {
            self.unlocked_masks += 1;
            return true;
        }
        false
    }
}
