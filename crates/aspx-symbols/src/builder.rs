//! Literal-combining control list builder.

use crate::control::{Control, LiteralControl};

/// Collects sibling controls, merging adjacent literals and flattening roots.
///
/// Every place that gathers children goes through this type, so the reduction
/// rules are the same for page roots, tag children, templates and properties.
#[derive(Debug, Default)]
pub struct ControlListBuilder {
    controls: Vec<Control>,
    drop_literals: bool,
}

impl ControlListBuilder {
    /// Creates a builder that keeps literals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder that discards literals.
    pub fn dropping_literals() -> Self {
        Self {
            controls: Vec::new(),
            drop_literals: true,
        }
    }

    /// Adds a control.
    ///
    /// `None` is ignored. A [`Control::Root`] adds each of its children instead of
    /// itself. A literal following a literal is merged into it.
    ///
    /// # Panics
    ///
    /// Panics if two merged literals come from different files. Controls of one
    /// page always share the page path.
    pub fn add(&mut self, control: Option<Control>) {
        match control {
            Some(Control::Literal(_)) if self.drop_literals => {}
            None => {}
            Some(Control::Root(root)) => {
                for child in root.children {
                    self.add(Some(child));
                }
            }
            Some(Control::Literal(literal)) => match self.controls.last_mut() {
                Some(Control::Literal(last)) => merge(last, literal),
                _ => self.controls.push(Control::Literal(literal)),
            },
            Some(control) => self.controls.push(control),
        }
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Returns the collected controls.
    pub fn build(self) -> Vec<Control> {
        self.controls
    }
}

impl Extend<Option<Control>> for ControlListBuilder {
    fn extend<I: IntoIterator<Item = Option<Control>>>(&mut self, iter: I) {
        for control in iter {
            self.add(control);
        }
    }
}

fn merge(last: &mut LiteralControl, next: LiteralControl) {
    last.location = last
        .location
        .combine(&next.location)
        .unwrap_or_else(|err| panic!("cannot merge literals: {err}"));
    last.text.push_str(&next.text);
}
