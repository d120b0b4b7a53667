//! Live tag-count guard for the tag editor.
//!
//! The guard keeps the editor's controls in one of two states:
//!
//! - **Open**: fewer chips than the limit. The input is enabled and the add
//!   button and tag cloud are shown.
//! - **Capped**: the limit is reached. The input is disabled and the add
//!   button, tag cloud link and tag cloud are hidden.
//!
//! On top of that, typing is checked predictively: if the pending text holds
//! more tag names than the limit, or more than the chips still allowed, the
//! add button is hidden and the keystroke's commit is suppressed.
//!
//! Everything the guard shows is recomputed from scratch out of
//! `(chip count, max tags, pending candidates)` on every event, so the two
//! event sources always settle on the same presentation.

mod candidates;
mod widget;

use tracing::debug;

use crate::client::ClientContext;
use crate::settings::TagLimitSettings;

pub use candidates::{TAG_DELIMITER, candidates, count_candidates};
pub use widget::{Control, TagWidget};

/// Whether more tags can be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Open,
    Capped,
}

/// What the host should do with the keystroke that triggered an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDecision {
    /// Let the keystroke through, including a commit.
    Allow,
    /// Cancel the keystroke's default commit action (delimiter or enter).
    Suppress,
}

/// An event the host reports to the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardEvent {
    /// A chip was added to or removed from the checklist.
    ChipsChanged,
    /// A key was pressed or released in the tag input.
    Keystroke,
}

/// Control states derived from one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub input_disabled: bool,
    pub add_visible: bool,
    pub cloud_visible: bool,
}

/// Outcome of evaluating the guard rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub state: GuardState,
    pub decision: KeyDecision,
    pub presentation: Presentation,
}

/// Evaluate the guard rule.
///
/// `max_tags <= 0` is treated as always capped.
pub fn evaluate(chip_count: usize, max_tags: i64, candidate_count: usize) -> Verdict {
    let chips = i64::try_from(chip_count).unwrap_or(i64::MAX);
    let inputted = i64::try_from(candidate_count).unwrap_or(i64::MAX);

    let capped = max_tags <= 0 || chips >= max_tags;
    let remaining = max_tags.saturating_sub(chips);
    let overshoot = inputted > max_tags || inputted > remaining;

    let state = if capped {
        GuardState::Capped
    } else {
        GuardState::Open
    };
    // While capped every commit is suppressed, even with nothing typed.
    let decision = if capped || overshoot {
        KeyDecision::Suppress
    } else {
        KeyDecision::Allow
    };

    Verdict {
        state,
        decision,
        presentation: Presentation {
            input_disabled: capped,
            add_visible: decision == KeyDecision::Allow,
            cloud_visible: !capped,
        },
    }
}

/// A guard attached to one tag editor.
///
/// The host owns the event loop: after it changes the chip list or the
/// input text it calls [`TagCountGuard::handle`] with the matching event.
/// Handlers run synchronously and write the full presentation on every
/// recompute. The host may change the same controls in between, so nothing
/// about what was last written is remembered.
#[derive(Debug)]
pub struct TagCountGuard<W: TagWidget> {
    widget: W,
    max_tags: i64,
    state: GuardState,
}

impl<W: TagWidget> TagCountGuard<W> {
    /// Attach to a widget, applying the initial state right away.
    ///
    /// Returns `None`, without touching the widget, when the chip list or
    /// the tag input is missing from the page.
    pub fn attach(context: &ClientContext, widget: W) -> Option<Self> {
        if widget.chip_count().is_none() {
            debug!("tag checklist not found, tag limit guard not attached");
            return None;
        }
        if widget.pending_input().is_none() {
            debug!("tag input not found, tag limit guard not attached");
            return None;
        }

        let mut guard = Self {
            widget,
            max_tags: context.max_tags,
            state: GuardState::Open,
        };
        if let Some(verdict) = guard.recompute() {
            debug!(max_tags = guard.max_tags, state = ?verdict.state, "tag limit guard attached");
        }
        Some(guard)
    }

    /// Attach only if tag limiting is enabled for the content type.
    ///
    /// For any other content type nothing is attached and the widget is
    /// left untouched.
    pub fn attach_for_page(
        settings: &TagLimitSettings,
        content_type: &str,
        widget: W,
    ) -> Option<Self> {
        let context = ClientContext::for_page(settings, content_type)?;
        Self::attach(&context, widget)
    }

    /// Dispatch a host event. The decision only matters for keystrokes.
    pub fn handle(&mut self, event: GuardEvent) -> KeyDecision {
        match event {
            GuardEvent::ChipsChanged => {
                self.on_chips_changed();
                KeyDecision::Allow
            }
            GuardEvent::Keystroke => self.on_keystroke(),
        }
    }

    /// React to a chip being added or removed.
    pub fn on_chips_changed(&mut self) -> GuardState {
        self.recompute();
        self.state
    }

    /// React to typing in the tag input.
    pub fn on_keystroke(&mut self) -> KeyDecision {
        self.recompute()
            .map_or(KeyDecision::Allow, |verdict| verdict.decision)
    }

    /// Re-evaluate against the widget's current contents and apply the
    /// result. Returns `None` if the widget's markup has gone missing.
    pub fn recompute(&mut self) -> Option<Verdict> {
        let Some(chips) = self.widget.chip_count() else {
            debug!("tag checklist disappeared, skipping tag limit check");
            return None;
        };
        let Some(pending) = self.widget.pending_input() else {
            debug!("tag input disappeared, skipping tag limit check");
            return None;
        };

        let verdict = evaluate(chips, self.max_tags, count_candidates(&pending));
        if verdict.state != self.state {
            debug!(
                chips,
                max_tags = self.max_tags,
                from = ?self.state,
                to = ?verdict.state,
                "tag limit state changed"
            );
            self.state = verdict.state;
        }
        self.apply(verdict.presentation);
        Some(verdict)
    }

    fn apply(&mut self, next: Presentation) {
        self.set_disabled(Control::TagInput, next.input_disabled);
        self.set_visible(Control::AddButton, next.add_visible);
        self.set_visible(Control::TagCloudLink, next.cloud_visible);
        self.set_visible(Control::TagCloud, next.cloud_visible);
    }

    fn set_visible(&mut self, control: Control, visible: bool) {
        if self.widget.has_control(control) {
            self.widget.set_visible(control, visible);
        } else if !control.is_optional() {
            debug!(%control, "control missing, visibility not changed");
        }
    }

    fn set_disabled(&mut self, control: Control, disabled: bool) {
        if self.widget.has_control(control) {
            self.widget.set_disabled(control, disabled);
        } else if !control.is_optional() {
            debug!(%control, "control missing, disabled state not changed");
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn max_tags(&self) -> i64 {
        self.max_tags
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// Mutable access for the host to change chips or input text. Follow
    /// up with [`TagCountGuard::handle`].
    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    /// Detach, handing the widget back as it currently is.
    pub fn detach(self) -> W {
        self.widget
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Default)]
    struct StubWidget {
        chips: Option<usize>,
        input: Option<String>,
        visible: BTreeMap<Control, bool>,
        disabled: BTreeMap<Control, bool>,
        writes: usize,
    }

    impl StubWidget {
        fn new(chips: usize, input: &str) -> Self {
            Self {
                chips: Some(chips),
                input: Some(input.to_string()),
                ..Default::default()
            }
        }
    }

    impl TagWidget for StubWidget {
        fn chip_count(&self) -> Option<usize> {
            self.chips
        }

        fn pending_input(&self) -> Option<String> {
            self.input.clone()
        }

        fn has_control(&self, control: Control) -> bool {
            control != Control::TagCloud
        }

        fn set_visible(&mut self, control: Control, visible: bool) {
            self.writes += 1;
            self.visible.insert(control, visible);
        }

        fn set_disabled(&mut self, control: Control, disabled: bool) {
            self.writes += 1;
            self.disabled.insert(control, disabled);
        }
    }

    fn ctx(max_tags: i64) -> ClientContext {
        ClientContext { max_tags }
    }

    #[test]
    fn evaluate_boundaries() {
        assert_eq!(evaluate(5, 5, 0).state, GuardState::Capped);
        assert_eq!(evaluate(4, 5, 0).state, GuardState::Open);
        assert_eq!(evaluate(9, 5, 0).state, GuardState::Capped);
        assert_eq!(evaluate(0, 1, 0).state, GuardState::Open);
    }

    #[test]
    fn evaluate_non_positive_limit_is_capped() {
        for max in [0, -1, i64::MIN] {
            let v = evaluate(0, max, 0);
            assert_eq!(v.state, GuardState::Capped);
            assert_eq!(v.decision, KeyDecision::Suppress);
        }
    }

    #[test]
    fn evaluate_remaining_allowance() {
        assert_eq!(evaluate(4, 5, 2).decision, KeyDecision::Suppress);
        assert_eq!(evaluate(4, 5, 1).decision, KeyDecision::Allow);
        assert_eq!(evaluate(0, 3, 4).decision, KeyDecision::Suppress);
        assert_eq!(evaluate(0, 3, 3).decision, KeyDecision::Allow);
    }

    #[test]
    fn capped_presentation_hides_everything() {
        let p = evaluate(5, 5, 0).presentation;
        assert!(p.input_disabled);
        assert!(!p.add_visible);
        assert!(!p.cloud_visible);
    }

    #[test]
    fn overshoot_only_hides_add_button() {
        let p = evaluate(4, 5, 2).presentation;
        assert!(!p.input_disabled);
        assert!(!p.add_visible);
        assert!(p.cloud_visible);
    }

    #[test]
    fn attach_skips_missing_markup() {
        let mut no_chips = StubWidget::new(0, "");
        no_chips.chips = None;
        assert!(TagCountGuard::attach(&ctx(5), &mut no_chips).is_none());
        assert_eq!(no_chips.writes, 0);

        let mut no_input = StubWidget::new(0, "");
        no_input.input = None;
        assert!(TagCountGuard::attach(&ctx(5), &mut no_input).is_none());
        assert_eq!(no_input.writes, 0);
    }

    #[test]
    fn missing_optional_control_is_skipped() {
        let guard = TagCountGuard::attach(&ctx(2), StubWidget::new(2, "")).unwrap();
        let widget = guard.detach();
        assert_eq!(widget.visible.get(&Control::TagCloudLink), Some(&false));
        assert!(!widget.visible.contains_key(&Control::TagCloud));
    }

    #[test]
    fn vanished_markup_allows_keystrokes() {
        let mut guard = TagCountGuard::attach(&ctx(1), StubWidget::new(1, "")).unwrap();
        assert_eq!(guard.state(), GuardState::Capped);

        guard.widget_mut().input = None;
        assert_eq!(guard.on_keystroke(), KeyDecision::Allow);
        assert!(guard.recompute().is_none());
        assert_eq!(guard.state(), GuardState::Capped);
    }

    #[test]
    fn every_recompute_writes_full_presentation() {
        let mut guard = TagCountGuard::attach(&ctx(5), StubWidget::new(3, "a")).unwrap();
        // The stub has no tag cloud panel, so three controls are written.
        assert_eq!(guard.widget().writes, 3);

        guard.handle(GuardEvent::ChipsChanged);
        guard.handle(GuardEvent::Keystroke);
        assert_eq!(guard.widget().writes, 9);
    }

    #[test]
    fn host_reset_is_overwritten_on_next_event() {
        let mut guard = TagCountGuard::attach(&ctx(5), StubWidget::new(5, "")).unwrap();
        assert_eq!(guard.state(), GuardState::Capped);

        // The host re-renders the editor with everything shown and enabled.
        guard.widget_mut().visible.clear();
        guard.widget_mut().disabled.clear();

        assert_eq!(guard.handle(GuardEvent::Keystroke), KeyDecision::Suppress);
        let widget = guard.widget();
        assert_eq!(widget.visible.get(&Control::AddButton), Some(&false));
        assert_eq!(widget.visible.get(&Control::TagCloudLink), Some(&false));
        assert_eq!(widget.disabled.get(&Control::TagInput), Some(&true));
    }

    #[test]
    fn overshoot_hides_add_button_only() {
        let mut guard = TagCountGuard::attach(&ctx(5), StubWidget::new(4, "")).unwrap();

        guard.widget_mut().input = Some("a,b".into());
        assert_eq!(guard.handle(GuardEvent::Keystroke), KeyDecision::Suppress);
        let widget = guard.widget();
        assert_eq!(widget.visible.get(&Control::AddButton), Some(&false));
        assert_eq!(widget.disabled.get(&Control::TagInput), Some(&false));
        assert_eq!(widget.visible.get(&Control::TagCloudLink), Some(&true));
    }
}
