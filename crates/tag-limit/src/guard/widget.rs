//! The tag editor as seen by the guard.

use std::fmt;

/// A control whose state the guard manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Control {
    /// Text field where new tag names are typed.
    TagInput,
    /// Button that commits the pending text as tags.
    AddButton,
    /// Link that opens the most-used tags cloud.
    TagCloudLink,
    /// The most-used tags cloud itself.
    TagCloud,
}

impl Control {
    pub const ALL: [Control; 4] = [
        Control::TagInput,
        Control::AddButton,
        Control::TagCloudLink,
        Control::TagCloud,
    ];

    /// Whether the editor works without this control.
    pub fn is_optional(self) -> bool {
        matches!(self, Control::TagCloudLink | Control::TagCloud)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Control::TagInput => "tag_input",
            Control::AddButton => "add_button",
            Control::TagCloudLink => "tag_cloud_link",
            Control::TagCloud => "tag_cloud",
        };
        f.write_str(name)
    }
}

/// Host tag editor.
///
/// The guard reads the committed chip count and the pending text, and
/// toggles visibility and disabled state of the controls. It never adds or
/// removes chips; the host does that and then notifies the guard.
pub trait TagWidget {
    /// Number of committed tag chips, or `None` if the chip list is not on
    /// the page.
    fn chip_count(&self) -> Option<usize>;

    /// Text currently in the tag input, or `None` if the input is not on
    /// the page.
    fn pending_input(&self) -> Option<String>;

    /// Whether the control is present on the page.
    fn has_control(&self, control: Control) -> bool;

    fn set_visible(&mut self, control: Control, visible: bool);

    fn set_disabled(&mut self, control: Control, disabled: bool);
}

impl<W: TagWidget + ?Sized> TagWidget for &mut W {
    fn chip_count(&self) -> Option<usize> {
        (**self).chip_count()
    }

    fn pending_input(&self) -> Option<String> {
        (**self).pending_input()
    }

    fn has_control(&self, control: Control) -> bool {
        (**self).has_control(control)
    }

    fn set_visible(&mut self, control: Control, visible: bool) {
        (**self).set_visible(control, visible);
    }

    fn set_disabled(&mut self, control: Control, disabled: bool) {
        (**self).set_disabled(control, disabled);
    }
}
