//! The inline add/edit form shown below a screen's list.

/// The visibility, field values and edit target of a screen's inline form.
///
/// `F` holds the raw field values as the user sees them and `Id` is the
/// identifier type of the rows being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct FormOverlay<F, Id> {
    visible: bool,
    fields: F,
    editing: Option<Id>,
}

impl<F, Id> Default for FormOverlay<F, Id>
where
    F: Default,
{
    fn default() -> Self {
        Self {
            visible: false,
            fields: F::default(),
            editing: None,
        }
    }
}

impl<F, Id> FormOverlay<F, Id>
where
    F: Default,
    Id: Copy,
{
    /// Whether the form is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The current field values.
    pub fn fields(&self) -> &F {
        &self.fields
    }

    /// The row being edited, `None` when adding a new row.
    pub fn editing(&self) -> Option<Id> {
        self.editing
    }

    /// Handle the "Add" button.
    ///
    /// Hides a visible form. Otherwise shows an empty form with no edit target.
    pub fn toggle_add(&mut self) {
        if self.visible {
            self.visible = false;
            return;
        }

        self.fields = F::default();
        self.editing = None;
        self.visible = true;
    }

    /// Show the form pre-populated with `fields` for editing the row `id`.
    pub fn open_edit(&mut self, id: Id, fields: F) {
        self.fields = fields;
        self.editing = Some(id);
        self.visible = true;
    }

    /// Close and clear the form after a submission, returning the edit
    /// target that was active.
    pub fn finish_submission(&mut self) -> Option<Id> {
        let editing = self.editing.take();
        self.fields = F::default();
        self.visible = false;

        editing
    }
}

#[cfg(test)]
mod tests {
    use super::FormOverlay;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Fields {
        name: String,
    }

    fn fields(name: &str) -> Fields {
        Fields {
            name: name.to_owned(),
        }
    }

    #[test]
    fn starts_hidden_and_empty() {
        let form: FormOverlay<Fields, i64> = FormOverlay::default();

        assert!(!form.is_visible());
        assert_eq!(form.fields(), &Fields::default());
        assert_eq!(form.editing(), None);
    }

    #[test]
    fn add_clears_previous_edit() {
        let mut form = FormOverlay::default();
        form.open_edit(3, fields("Savings"));
        form.toggle_add();

        form.toggle_add();

        assert!(form.is_visible());
        assert_eq!(form.fields(), &Fields::default());
        assert_eq!(form.editing(), None);
    }

    #[test]
    fn add_toggles_visibility() {
        let mut form: FormOverlay<Fields, i64> = FormOverlay::default();

        form.toggle_add();
        assert!(form.is_visible());

        form.toggle_add();
        assert!(!form.is_visible());
    }

    #[test]
    fn edit_records_target_and_fields() {
        let mut form = FormOverlay::default();

        form.open_edit(7, fields("Checking"));

        assert!(form.is_visible());
        assert_eq!(form.fields(), &fields("Checking"));
        assert_eq!(form.editing(), Some(7));
    }

    #[test]
    fn submission_closes_and_clears() {
        let mut form = FormOverlay::default();
        form.open_edit(7, fields("Checking"));

        let editing = form.finish_submission();

        assert_eq!(editing, Some(7));
        assert_eq!(form, FormOverlay::default());
    }
}
