//! Tagged, ordered container of canvas objects.
//!
//! A [`Canvas`] owns its children outright. Draw order lives in `order`
//! (bottom first) and the tag index in `objects`; both always hold the same
//! set of tags. Lookups by tag are the only fallible operations.
//!
//! Tags are unique per canvas. Adding under a tag that is already live
//! replaces the previous object, and the new object is drawn on top.
//!
//! Deleting a missing tag returns [`CanvasError::NotFound`]. Callers that
//! clean up objects which may already be gone use
//! [`Canvas::delete_objects_by_tag`], which counts instead of failing.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::object::{CanvasObject, Container, ObjectKind};

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("no object with tag '{0}'")]
    NotFound(String),
    #[error("canvas snapshot is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "CanvasRepr", into = "CanvasRepr")]
pub struct Canvas {
    order: Vec<String>,
    objects: HashMap<String, CanvasObject>,
    next_tag: u64,
}

/// Wire form: objects in draw order.
#[derive(Serialize, Deserialize)]
struct CanvasRepr {
    objects: Vec<TaggedObject>,
}

#[derive(Serialize, Deserialize)]
struct TaggedObject {
    tag: String,
    object: CanvasObject,
}

impl From<CanvasRepr> for Canvas {
    fn from(repr: CanvasRepr) -> Self {
        let mut canvas = Self::new();
        for entry in repr.objects {
            canvas.add(entry.object, Some(&entry.tag));
        }
        canvas
    }
}

impl From<Canvas> for CanvasRepr {
    fn from(mut canvas: Canvas) -> Self {
        let objects = std::mem::take(&mut canvas.order)
            .into_iter()
            .filter_map(|tag| canvas.objects.remove(&tag).map(|object| TaggedObject { tag, object }))
            .collect();
        Self { objects }
    }
}

impl Canvas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // INSERTION
    // =========================================================================

    /// Add `object` on top of the stack and return its tag.
    ///
    /// Without a tag, one of the form `@N` that is not in use is generated.
    /// An explicit tag that is already live replaces the old object.
    pub fn add(&mut self, object: CanvasObject, tag: Option<&str>) -> String {
        let tag = match tag {
            Some(tag) => tag.to_owned(),
            None => self.generate_tag(),
        };
        if self.objects.contains_key(&tag) {
            debug!(%tag, "canvas: replacing object with duplicate tag");
            self.order.retain(|t| t != &tag);
        }
        self.order.push(tag.clone());
        self.objects.insert(tag.clone(), object);
        tag
    }

    fn generate_tag(&mut self) -> String {
        loop {
            self.next_tag += 1;
            let tag = format!("@{}", self.next_tag);
            if !self.objects.contains_key(&tag) {
                return tag;
            }
        }
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// # Errors
    ///
    /// [`CanvasError::NotFound`] if no object carries `tag`.
    pub fn get_object_by_tag(&self, tag: &str) -> Result<&CanvasObject, CanvasError> {
        self.objects.get(tag).ok_or_else(|| CanvasError::NotFound(tag.to_owned()))
    }

    /// # Errors
    ///
    /// [`CanvasError::NotFound`] if no object carries `tag`.
    pub fn get_object_by_tag_mut(&mut self, tag: &str) -> Result<&mut CanvasObject, CanvasError> {
        self.objects.get_mut(tag).ok_or_else(|| CanvasError::NotFound(tag.to_owned()))
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.objects.contains_key(tag)
    }

    /// Objects whose tag starts with `prefix`, in draw order.
    #[must_use]
    pub fn get_objects_by_tag_prefix(&self, prefix: &str) -> Vec<(&str, &CanvasObject)> {
        self.iter().filter(|(tag, _)| tag.starts_with(prefix)).collect()
    }

    /// Objects of `kind` anywhere in the tree, depth-first in draw order.
    #[must_use]
    pub fn objects_of_kind(&self, kind: ObjectKind) -> Vec<&CanvasObject> {
        let mut out = Vec::new();
        for (_, object) in self.iter() {
            object.flatten_into(Some(kind), &mut out);
        }
        out
    }

    /// `(tag, object)` pairs from bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &CanvasObject)> {
        self.order.iter().filter_map(|tag| self.objects.get(tag).map(|o| (tag.as_str(), o)))
    }

    /// Mutable `(tag, object)` pairs, in no particular order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut CanvasObject)> {
        self.objects.iter_mut().map(|(tag, o)| (tag.as_str(), o))
    }

    /// Tags from bottom to top.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // =========================================================================
    // REMOVAL
    // =========================================================================

    /// Remove and return the object under `tag`.
    ///
    /// # Errors
    ///
    /// [`CanvasError::NotFound`] if no object carries `tag`.
    pub fn delete_object_by_tag(&mut self, tag: &str) -> Result<CanvasObject, CanvasError> {
        let object = self.objects.remove(tag).ok_or_else(|| CanvasError::NotFound(tag.to_owned()))?;
        self.order.retain(|t| t != tag);
        Ok(object)
    }

    /// Remove every listed tag that exists. Returns how many were removed.
    pub fn delete_objects_by_tag<S: AsRef<str>>(&mut self, tags: &[S]) -> usize {
        tags.iter().filter(|tag| self.delete_object_by_tag(tag.as_ref()).is_ok()).count()
    }

    /// Remove every object whose tag starts with `prefix`.
    pub fn delete_objects_by_tag_prefix(&mut self, prefix: &str) -> usize {
        let before = self.order.len();
        self.objects.retain(|tag, _| !tag.starts_with(prefix));
        self.order.retain(|tag| !tag.starts_with(prefix));
        before - self.order.len()
    }

    pub fn delete_all_objects(&mut self) -> usize {
        let count = self.order.len();
        self.order.clear();
        self.objects.clear();
        count
    }

    // =========================================================================
    // ORDERING AND OWNERSHIP
    // =========================================================================

    /// Move `tag` to the top of the stack.
    ///
    /// # Errors
    ///
    /// [`CanvasError::NotFound`] if no object carries `tag`.
    pub fn raise_object(&mut self, tag: &str) -> Result<(), CanvasError> {
        let index = self.position(tag)?;
        let tag = self.order.remove(index);
        self.order.push(tag);
        Ok(())
    }

    /// Move `tag` to the bottom of the stack.
    ///
    /// # Errors
    ///
    /// [`CanvasError::NotFound`] if no object carries `tag`.
    pub fn lower_object(&mut self, tag: &str) -> Result<(), CanvasError> {
        let index = self.position(tag)?;
        let tag = self.order.remove(index);
        self.order.insert(0, tag);
        Ok(())
    }

    /// Transfer `tag` to the top of `dest`, keeping its tag there unless
    /// `dest_tag` is given. Returns the tag in `dest`.
    ///
    /// # Errors
    ///
    /// [`CanvasError::NotFound`] if no object carries `tag`; `self` is left
    /// unchanged.
    pub fn move_object_to(&mut self, tag: &str, dest: &mut Canvas, dest_tag: Option<&str>) -> Result<String, CanvasError> {
        let object = self.delete_object_by_tag(tag)?;
        Ok(dest.add(object, Some(dest_tag.unwrap_or(tag))))
    }

    fn position(&self, tag: &str) -> Result<usize, CanvasError> {
        self.order.iter().position(|t| t == tag).ok_or_else(|| CanvasError::NotFound(tag.to_owned()))
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    /// # Errors
    ///
    /// [`CanvasError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, CanvasError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rebuild a canvas from [`Canvas::to_json`] output.
    ///
    /// # Errors
    ///
    /// [`CanvasError::Json`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Same tags in the same order with equal objects. Tag generator state is
/// not compared.
impl PartialEq for Canvas {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.objects == other.objects
    }
}

impl Container for Canvas {
    fn children(&self) -> Vec<&CanvasObject> {
        self.iter().map(|(_, o)| o).collect()
    }
}
