use std::collections::HashMap;

use crate::foundation::core::CanvasSize;
use crate::foundation::error::{CertError, CertResult};
use crate::foundation::ids::ElementId;
use crate::scene::color::Paint;
use crate::scene::element::Element;
use crate::scene::update::PropertyUpdate;
use serde::{Deserialize, Serialize};

/// Offset applied to both axes of a duplicated element.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// How the background image is fitted onto the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundFit {
    /// Uniformly scale so the image spans the canvas width, anchored top-left.
    #[default]
    ScaleToWidth,
    /// Stretch to cover the canvas exactly.
    Stretch,
    /// Draw at intrinsic size, anchored top-left.
    None,
}

/// Background image reference. Never an element: not selectable, always drawn first.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Background {
    /// Asset reference.
    pub source: String,
    /// Fitting mode.
    pub fit: BackgroundFit,
}

impl Background {
    /// Background with the default width-fitting mode.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            fit: BackgroundFit::ScaleToWidth,
        }
    }
}

/// A certificate template: canvas, background and z-ordered elements.
///
/// Elements live in an arena keyed by [`ElementId`]; a separate order list holds the back-to-front
/// draw order. The order list is always a permutation of the arena keys.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDocument {
    canvas: CanvasSize,
    background_color: Paint,
    background: Option<Background>,
    elements: HashMap<ElementId, Element>,
    order: Vec<ElementId>,
    next_id: u64,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new(CanvasSize::default())
    }
}

impl SceneDocument {
    /// Empty document with a white background color and no background image.
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            background_color: Paint::WHITE,
            background: None,
            elements: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild a document from decoded parts, checking identifier uniqueness.
    pub(crate) fn from_parts(
        canvas: CanvasSize,
        background_color: Paint,
        background: Option<Background>,
        elements: Vec<Element>,
        next_id: u64,
    ) -> CertResult<Self> {
        let mut doc = Self::new(canvas);
        doc.background_color = background_color;
        doc.background = background;
        let mut max_id = 0u64;
        for el in elements {
            el.validate()?;
            if doc.elements.contains_key(&el.id) {
                return Err(CertError::validation(format!(
                    "duplicate element id {}",
                    el.id
                )));
            }
            max_id = max_id.max(el.id.0);
            doc.order.push(el.id);
            doc.elements.insert(el.id, el);
        }
        let after_max = max_id
            .checked_add(1)
            .ok_or_else(|| CertError::malformed(format!("element id {max_id} is out of range")))?;
        doc.next_id = next_id.max(after_max);
        Ok(doc)
    }

    /// Canvas size.
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Paint drawn under the background image.
    pub fn background_color(&self) -> Paint {
        self.background_color
    }

    /// Replace the background color.
    pub fn set_background_color(&mut self, paint: Paint) {
        self.background_color = paint;
    }

    /// Background image, if any.
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Replace the background image. Setting the same value again changes nothing.
    pub fn set_background(&mut self, background: Background) {
        self.background = Some(background);
    }

    /// Remove the background image.
    pub fn clear_background(&mut self) {
        self.background = None;
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Return `true` when the document has no elements.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Identifier the next inserted element will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Identifiers back to front.
    pub fn z_order(&self) -> &[ElementId] {
        &self.order
    }

    /// Elements back to front.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Mutable access for in-place substitutions that cannot invalidate an element.
    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Look up an element.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Look up an element or fail with `NotFound`.
    pub fn require(&self, id: ElementId) -> CertResult<&Element> {
        self.elements
            .get(&id)
            .ok_or_else(|| CertError::not_found(format!("element {id}")))
    }

    /// Return `true` when `id` is present.
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Z-index of an element (0 = back).
    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.order.iter().position(|x| *x == id)
    }

    fn require_index(&self, id: ElementId) -> CertResult<usize> {
        self.index_of(id)
            .ok_or_else(|| CertError::not_found(format!("element {id}")))
    }

    /// Insert on top of the z-order and return the assigned identifier.
    ///
    /// The element's own `id` field is overwritten.
    pub fn insert_element(&mut self, mut element: Element) -> CertResult<ElementId> {
        let (id, next) = self.reserve_id()?;
        element.id = id;
        element.validate()?;
        self.next_id = next;
        self.elements.insert(id, element);
        self.order.push(id);
        Ok(id)
    }

    /// Remove an element and close the gap in the z-order.
    pub fn remove_element(&mut self, id: ElementId) -> CertResult<Element> {
        let idx = self.require_index(id)?;
        self.order.remove(idx);
        self.elements
            .remove(&id)
            .ok_or_else(|| CertError::not_found(format!("element {id}")))
    }

    /// Move an element to `new_index`, clamped into `[0, len - 1]`. Returns the final index.
    ///
    /// The relative order of all other elements is preserved.
    pub fn reorder(&mut self, id: ElementId, new_index: usize) -> CertResult<usize> {
        let idx = self.require_index(id)?;
        let target = new_index.min(self.order.len() - 1);
        if target != idx {
            let moved = self.order.remove(idx);
            self.order.insert(target, moved);
        }
        Ok(target)
    }

    /// Move an element to the top of the z-order.
    pub fn bring_to_front(&mut self, id: ElementId) -> CertResult<usize> {
        self.reorder(id, usize::MAX)
    }

    /// Move an element to the back of the z-order.
    pub fn send_to_back(&mut self, id: ElementId) -> CertResult<usize> {
        self.reorder(id, 0)
    }

    /// Copy an element with a fresh identifier, offset by [`DUPLICATE_OFFSET`], directly above it.
    pub fn duplicate(&mut self, id: ElementId) -> CertResult<ElementId> {
        let idx = self.require_index(id)?;
        let mut copy = self.require(id)?.clone();
        let (new_id, next) = self.reserve_id()?;
        copy.id = new_id;
        copy.placement.x += DUPLICATE_OFFSET;
        copy.placement.y += DUPLICATE_OFFSET;
        copy.validate()?;
        self.next_id = next;
        self.elements.insert(new_id, copy);
        self.order.insert(idx + 1, new_id);
        Ok(new_id)
    }

    /// Apply updates to one element atomically.
    pub fn update_element(&mut self, id: ElementId, updates: &[PropertyUpdate]) -> CertResult<()> {
        let el = self
            .elements
            .get_mut(&id)
            .ok_or_else(|| CertError::not_found(format!("element {id}")))?;
        el.apply_updates(updates)
    }

    /// Identifier for the next element and the counter value after it.
    fn reserve_id(&self) -> CertResult<(ElementId, u64)> {
        let next = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| CertError::validation("element identifiers exhausted"))?;
        Ok((ElementId(self.next_id), next))
    }

    /// Verify the arena/z-order invariant.
    pub fn check_invariants(&self) -> CertResult<()> {
        if self.order.len() != self.elements.len() {
            return Err(CertError::validation(format!(
                "z-order has {} entries for {} elements",
                self.order.len(),
                self.elements.len()
            )));
        }
        let mut seen = std::collections::HashSet::with_capacity(self.order.len());
        for id in &self.order {
            if !seen.insert(*id) || !self.elements.contains_key(id) {
                return Err(CertError::validation(format!(
                    "z-order entry {id} is duplicated or dangling"
                )));
            }
            if id.0 >= self.next_id {
                return Err(CertError::validation(format!(
                    "element {id} is not below next id {}",
                    self.next_id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/document.rs"]
mod tests;
