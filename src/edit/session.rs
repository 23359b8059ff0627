use crate::edit::presets::FieldPreset;
use crate::foundation::error::CertResult;
use crate::foundation::ids::ElementId;
use crate::scene::color::Paint;
use crate::scene::document::{Background, SceneDocument};
use crate::scene::element::{
    Element, FontWeight, ImageElement, Shape, TextAlign, TextField, VerificationSlot,
};
use crate::scene::update::PropertyUpdate;

/// Default content of a freshly added text element.
pub const DEFAULT_TEXT: &str = "Click to Edit Text";

/// Selection state of an editing session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    /// Nothing is selected.
    #[default]
    Idle,
    /// One element is selected.
    Selected(ElementId),
}

/// Interactive editing state over one scene document.
///
/// The session owns its document exclusively. The selection always refers to an element that is
/// present: every operation that removes the selected element returns to [`Selection::Idle`].
/// Property setters are no-ops returning `Ok(false)` when nothing is selected.
#[derive(Clone, Debug, Default)]
pub struct EditSession {
    doc: SceneDocument,
    selection: Selection,
}

impl EditSession {
    /// Start editing `doc` with nothing selected.
    pub fn new(doc: SceneDocument) -> Self {
        Self {
            doc,
            selection: Selection::Idle,
        }
    }

    /// Current document.
    pub fn document(&self) -> &SceneDocument {
        &self.doc
    }

    /// Finish editing and hand back the document.
    pub fn into_document(self) -> SceneDocument {
        self.doc
    }

    /// Current selection state.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Selected element id, if any.
    pub fn selected(&self) -> Option<ElementId> {
        match self.selection {
            Selection::Idle => None,
            Selection::Selected(id) => Some(id),
        }
    }

    /// Selected element, if any.
    pub fn selected_element(&self) -> Option<&Element> {
        self.selected().and_then(|id| self.doc.get(id))
    }

    /// Select an element.
    pub fn select(&mut self, id: ElementId) -> CertResult<()> {
        self.doc.require(id)?;
        self.selection = Selection::Selected(id);
        Ok(())
    }

    /// Drop the selection. Calling this while idle changes nothing.
    pub fn clear_selection(&mut self) {
        self.selection = Selection::Idle;
    }

    /// Replace the background image.
    pub fn set_background(&mut self, background: Background) {
        self.doc.set_background(background);
    }

    /// Remove the background image.
    pub fn clear_background(&mut self) {
        self.doc.clear_background();
    }

    /// Insert an element on top and select it.
    pub fn add_element(&mut self, element: Element) -> CertResult<ElementId> {
        let id = self.doc.insert_element(element)?;
        tracing::debug!(element = %id, "element added");
        self.selection = Selection::Selected(id);
        Ok(id)
    }

    /// Add default text at (100, 100).
    pub fn add_text(&mut self) -> CertResult<ElementId> {
        self.add_element(Element::text(TextField::new(DEFAULT_TEXT)).at(100.0, 100.0))
    }

    /// Add a preset placeholder field centred on the canvas.
    pub fn add_preset_field(&mut self, preset: FieldPreset) -> CertResult<ElementId> {
        let center_x = f64::from(self.doc.canvas().width) / 2.0;
        self.add_element(preset.element(center_x))
    }

    /// Add a 200×100 outlined rectangle at (100, 100).
    pub fn add_rectangle(&mut self) -> CertResult<ElementId> {
        self.add_element(Element::shape(Shape::rectangle(200.0, 100.0)).at(100.0, 100.0))
    }

    /// Add a 200×100 outlined ellipse at (100, 100).
    pub fn add_ellipse(&mut self) -> CertResult<ElementId> {
        self.add_element(Element::shape(Shape::ellipse(200.0, 100.0)).at(100.0, 100.0))
    }

    /// Add an image at (100, 100).
    pub fn add_image(
        &mut self,
        source: impl Into<String>,
        width: f64,
        height: f64,
    ) -> CertResult<ElementId> {
        self.add_element(Element::image(ImageElement::new(source, width, height)).at(100.0, 100.0))
    }

    /// Add a verification code slot near the bottom-right corner of the canvas.
    pub fn add_verification_slot(&mut self, size: f64) -> CertResult<ElementId> {
        let canvas = self.doc.canvas();
        let margin = 40.0;
        let x = (f64::from(canvas.width) - size - margin).max(0.0);
        let y = (f64::from(canvas.height) - size - margin).max(0.0);
        self.add_element(Element::verification_slot(VerificationSlot::new(size)).at(x, y))
    }

    /// Remove any element, returning to idle if it was selected.
    pub fn remove(&mut self, id: ElementId) -> CertResult<Element> {
        let removed = self.doc.remove_element(id)?;
        if self.selected() == Some(id) {
            self.selection = Selection::Idle;
        }
        Ok(removed)
    }

    /// Move any element in the z-order.
    pub fn reorder(&mut self, id: ElementId, new_index: usize) -> CertResult<usize> {
        self.doc.reorder(id, new_index)
    }

    /// Delete the selected element.
    pub fn delete_selected(&mut self) -> CertResult<Option<Element>> {
        match self.selected() {
            Some(id) => self.remove(id).map(Some),
            None => Ok(None),
        }
    }

    /// Duplicate the selected element and select the copy.
    pub fn duplicate_selected(&mut self) -> CertResult<Option<ElementId>> {
        let Some(id) = self.selected() else {
            return Ok(None);
        };
        let copy = self.doc.duplicate(id)?;
        self.selection = Selection::Selected(copy);
        Ok(Some(copy))
    }

    /// Raise the selected element to the top.
    pub fn bring_selected_to_front(&mut self) -> CertResult<Option<usize>> {
        match self.selected() {
            Some(id) => self.doc.bring_to_front(id).map(Some),
            None => Ok(None),
        }
    }

    /// Lower the selected element to the bottom.
    pub fn send_selected_to_back(&mut self) -> CertResult<Option<usize>> {
        match self.selected() {
            Some(id) => self.doc.send_to_back(id).map(Some),
            None => Ok(None),
        }
    }

    /// Apply one update to the selection. Returns `false` when idle.
    pub fn update(&mut self, update: PropertyUpdate) -> CertResult<bool> {
        self.update_many(std::slice::from_ref(&update))
    }

    /// Apply several updates to the selection atomically. Returns `false` when idle.
    pub fn update_many(&mut self, updates: &[PropertyUpdate]) -> CertResult<bool> {
        let Some(id) = self.selected() else {
            return Ok(false);
        };
        self.doc.update_element(id, updates)?;
        Ok(true)
    }

    /// Nudge the selection by a delta.
    pub fn move_selected_by(&mut self, dx: f64, dy: f64) -> CertResult<bool> {
        let Some(el) = self.selected_element() else {
            return Ok(false);
        };
        let (x, y) = (el.placement.x + dx, el.placement.y + dy);
        self.update(PropertyUpdate::Position { x, y })
    }

    /// Set text content.
    pub fn set_text(&mut self, text: impl Into<String>) -> CertResult<bool> {
        self.update(PropertyUpdate::Text(text.into()))
    }

    /// Set fill paint.
    pub fn set_fill(&mut self, paint: Paint) -> CertResult<bool> {
        self.update(PropertyUpdate::Fill(paint))
    }

    /// Set font size.
    pub fn set_font_size(&mut self, size: f64) -> CertResult<bool> {
        self.update(PropertyUpdate::FontSize(size))
    }

    /// Set font family.
    pub fn set_font_family(&mut self, family: impl Into<String>) -> CertResult<bool> {
        self.update(PropertyUpdate::FontFamily(family.into()))
    }

    /// Toggle bold weight.
    pub fn set_bold(&mut self, bold: bool) -> CertResult<bool> {
        let weight = if bold {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        };
        self.update(PropertyUpdate::Weight(weight))
    }

    /// Toggle italic style.
    pub fn set_italic(&mut self, italic: bool) -> CertResult<bool> {
        self.update(PropertyUpdate::Italic(italic))
    }

    /// Set text alignment.
    pub fn set_align(&mut self, align: TextAlign) -> CertResult<bool> {
        self.update(PropertyUpdate::Align(align))
    }

    /// Set outline paint.
    pub fn set_stroke(&mut self, paint: Paint) -> CertResult<bool> {
        self.update(PropertyUpdate::Stroke(paint))
    }

    /// Set outline width.
    pub fn set_stroke_width(&mut self, width: f64) -> CertResult<bool> {
        self.update(PropertyUpdate::StrokeWidth(width))
    }

    /// Move the anchor.
    pub fn set_position(&mut self, x: f64, y: f64) -> CertResult<bool> {
        self.update(PropertyUpdate::Position { x, y })
    }

    /// Set rotation in degrees.
    pub fn set_rotation(&mut self, degrees: f64) -> CertResult<bool> {
        self.update(PropertyUpdate::Rotation(degrees))
    }

    /// Set scale factors.
    pub fn set_scale(&mut self, x: f64, y: f64) -> CertResult<bool> {
        self.update(PropertyUpdate::Scale { x, y })
    }

    /// Set box size.
    pub fn set_size(&mut self, width: f64, height: f64) -> CertResult<bool> {
        self.update(PropertyUpdate::Size { width, height })
    }

    /// Show or hide.
    pub fn set_visible(&mut self, visible: bool) -> CertResult<bool> {
        self.update(PropertyUpdate::Visible(visible))
    }

    /// Lock or unlock.
    pub fn set_locked(&mut self, locked: bool) -> CertResult<bool> {
        self.update(PropertyUpdate::Locked(locked))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/session.rs"]
mod tests;
