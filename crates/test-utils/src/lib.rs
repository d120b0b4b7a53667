//! Tag Limit test utilities.
//!
//! Helpers for integration testing: a scriptable tag editor that records
//! what the guard does to it, and settings fixtures.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tag_limit::guard::{Control, TagWidget};
use tag_limit::settings::{
    MaxTags, MemorySettingsStorage, SettingsService, TagLimitSettings, YamlSettingsStorage,
};
use uuid::Uuid;

/// Create a tag editor with every control present, shown and enabled,
/// no chips and an empty input.
pub fn tag_widget() -> FakeTagWidget {
    FakeTagWidget {
        chips: Some(Vec::new()),
        input: Some(String::new()),
        controls: Control::ALL
            .iter()
            .map(|c| (*c, ControlState::default()))
            .collect(),
        writes: 0,
    }
}

/// Visibility and disabled state of one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub visible: bool,
    pub disabled: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            visible: true,
            disabled: false,
        }
    }
}

/// An in-memory tag editor for driving the guard.
#[derive(Debug, Clone)]
pub struct FakeTagWidget {
    chips: Option<Vec<String>>,
    input: Option<String>,
    controls: BTreeMap<Control, ControlState>,
    writes: usize,
}

impl FakeTagWidget {
    /// Start with `n` chips named `tag-1` .. `tag-n`.
    pub fn with_chips(mut self, n: usize) -> Self {
        self.chips = Some((1..=n).map(|i| format!("tag-{i}")).collect());
        self
    }

    /// Start with the given chips.
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.chips = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Start with text in the input.
    pub fn with_input(mut self, text: &str) -> Self {
        self.input = Some(text.to_string());
        self
    }

    /// Remove the chip list from the page.
    pub fn without_checklist(mut self) -> Self {
        self.chips = None;
        self
    }

    /// Remove the tag input from the page.
    pub fn without_input(mut self) -> Self {
        self.input = None;
        self
    }

    /// Remove a control from the page.
    pub fn without_control(mut self, control: Control) -> Self {
        self.controls.remove(&control);
        self
    }

    /// Commit a chip, as the editor does when a tag is added.
    pub fn add_chip(&mut self, name: &str) {
        if let Some(chips) = self.chips.as_mut() {
            chips.push(name.to_string());
        }
    }

    /// Remove the last chip.
    pub fn remove_chip(&mut self) -> Option<String> {
        self.chips.as_mut().and_then(Vec::pop)
    }

    /// Replace the pending input text.
    pub fn type_text(&mut self, text: &str) {
        if let Some(input) = self.input.as_mut() {
            *input = text.to_string();
        }
    }

    /// Commit the pending text as chips and clear the input, the way the
    /// editor's add button does.
    pub fn commit_input(&mut self) {
        let Some(text) = self.input.as_mut().map(std::mem::take) else {
            return;
        };
        for name in tag_limit::guard::candidates(&text) {
            self.add_chip(name);
        }
    }

    /// Set a control's state from the host side, as the editor's own
    /// scripts do. Not counted as a guard write.
    pub fn set_control(&mut self, control: Control, state: ControlState) {
        if let Some(current) = self.controls.get_mut(&control) {
            *current = state;
        }
    }

    /// Re-render the editor: every present control goes back to shown and
    /// enabled, whatever the guard last wrote. Chips and input are kept.
    pub fn rerender(&mut self) {
        for state in self.controls.values_mut() {
            *state = ControlState::default();
        }
    }

    /// Drop the whole editor markup, as if the host re-rendered it away.
    pub fn remove_markup(&mut self) {
        self.chips = None;
        self.input = None;
    }

    pub fn chips(&self) -> &[String] {
        self.chips.as_deref().unwrap_or_default()
    }

    pub fn control(&self, control: Control) -> Option<ControlState> {
        self.controls.get(&control).copied()
    }

    pub fn is_visible(&self, control: Control) -> bool {
        self.control(control).is_some_and(|s| s.visible)
    }

    pub fn is_disabled(&self, control: Control) -> bool {
        self.control(control).is_some_and(|s| s.disabled)
    }

    /// States of every present control.
    pub fn snapshot(&self) -> BTreeMap<Control, ControlState> {
        self.controls.clone()
    }

    /// Number of control writes made through [`TagWidget`].
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Whether the editor currently looks capped to the user.
    pub fn looks_capped(&self) -> bool {
        self.is_disabled(Control::TagInput) && !self.is_visible(Control::AddButton)
    }
}

impl TagWidget for FakeTagWidget {
    fn chip_count(&self) -> Option<usize> {
        self.chips.as_ref().map(Vec::len)
    }

    fn pending_input(&self) -> Option<String> {
        self.input.clone()
    }

    fn has_control(&self, control: Control) -> bool {
        self.controls.contains_key(&control)
    }

    fn set_visible(&mut self, control: Control, visible: bool) {
        if let Some(state) = self.controls.get_mut(&control) {
            state.visible = visible;
            self.writes += 1;
        }
    }

    fn set_disabled(&mut self, control: Control, disabled: bool) {
        if let Some(state) = self.controls.get_mut(&control) {
            state.disabled = disabled;
            self.writes += 1;
        }
    }
}

/// Create settings with the given limit and enabled content types.
///
/// A limit of 0 falls back to the default, as a stored 0 would.
pub fn test_settings(max_tags: u32, enabled: &[&str]) -> TagLimitSettings {
    TagLimitSettings::new(
        MaxTags::new(i64::from(max_tags)).unwrap_or_default(),
        enabled.iter().copied(),
    )
}

/// A settings service over fresh in-memory storage.
pub fn memory_service() -> SettingsService {
    SettingsService::new(Arc::new(MemorySettingsStorage::new()))
}

/// A settings service over in-memory storage seeded with raw values.
pub fn seeded_service(values: &[(&str, JsonValue)]) -> SettingsService {
    let storage = MemorySettingsStorage::with_values(values.iter().cloned());
    SettingsService::new(Arc::new(storage))
}

/// A settings service over a YAML file at a fresh temp path.
pub fn yaml_service() -> (SettingsService, PathBuf) {
    let path = temp_settings_path();
    let service = SettingsService::new(Arc::new(YamlSettingsStorage::new(path.clone())));
    (service, path)
}

/// A unique, not yet existing settings file path under the temp dir.
pub fn temp_settings_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("tag_limit_test_{}", Uuid::now_v7().simple()))
        .join("tag_limit.yml")
}
