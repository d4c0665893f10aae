//! Panel selection sets and the pure interpreter that turns UI interactions
//! into the next selection.
//!
//! Nothing here touches panels or the sidebar: callers feed the current
//! selection in and hand the result to the workspace, which is the only
//! writer of panel `selected` flags.

use crate::panels::PanelId;
use serde::{Deserialize, Serialize};

/// Insertion-ordered set of panel ids. Membership is what matters; order is
/// kept so views list selected platforms the way the user picked them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: Vec<PanelId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(id: PanelId) -> Self {
        Self { ids: vec![id] }
    }

    /// Build a set from ids, dropping repeats after the first occurrence.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = PanelId>,
    {
        let mut set = Self::new();
        for id in ids {
            set.insert(id);
        }
        set
    }

    pub fn contains(&self, id: &PanelId) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// Add `id` if absent. Returns `true` when inserted.
    pub fn insert(&mut self, id: PanelId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id` if present. Returns `true` when removed.
    pub fn remove(&mut self, id: &PanelId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    /// Flip membership of `id`.
    pub fn toggle(&mut self, id: &PanelId) {
        if !self.remove(id) {
            self.ids.push(id.clone());
        }
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&PanelId) -> bool,
    {
        self.ids.retain(keep);
    }

    /// Same members, ignoring order.
    pub fn same_members(&self, other: &SelectionSet) -> bool {
        self.len() == other.len() && self.ids.iter().all(|id| other.contains(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PanelId> {
        self.ids.iter()
    }

    pub fn as_slice(&self) -> &[PanelId] {
        &self.ids
    }

    pub fn first(&self) -> Option<&PanelId> {
        self.ids.first()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Where inside a panel a click landed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickTarget {
    #[default]
    Body,
    /// The drag grip; pointer-downs there start drags, not selections.
    DragHandle,
    /// A button or other control rendered inside the panel.
    Control,
}

/// Key pressed while a panel has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKey {
    Enter,
    Space,
    Other,
}

/// Discrete UI input relevant to selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    /// Pointer click on a panel; `modifier` is ctrl or meta.
    PanelClick {
        panel_id: PanelId,
        #[serde(default)]
        modifier: bool,
        #[serde(default)]
        target: ClickTarget,
    },
    /// Key press on a focused panel.
    PanelKey {
        panel_id: PanelId,
        key: PanelKey,
        #[serde(default)]
        modifier: bool,
    },
    /// Click on the empty area around the panels.
    Background,
    Escape,
}

/// Selection after a click on `panel_id`.
///
/// A plain click selects exactly that panel. A modified click toggles its
/// membership, which may leave the selection empty.
pub fn panel_interact(current: &SelectionSet, panel_id: &PanelId, modifier: bool) -> SelectionSet {
    if !modifier {
        return SelectionSet::single(panel_id.clone());
    }
    let mut next = current.clone();
    next.toggle(panel_id);
    next
}

/// Selection after a background click or escape: always empty.
pub fn clear() -> SelectionSet {
    SelectionSet::new()
}

/// Interpret `interaction` against `current`.
///
/// # Returns
/// The next selection, or `None` when the interaction does not affect
/// selection (clicks on drag handles or inner controls, unrelated keys).
pub fn next_selection(current: &SelectionSet, interaction: &Interaction) -> Option<SelectionSet> {
    match interaction {
        Interaction::PanelClick {
            panel_id,
            modifier,
            target: ClickTarget::Body,
        } => Some(panel_interact(current, panel_id, *modifier)),
        Interaction::PanelClick { .. } => None,
        Interaction::PanelKey {
            panel_id,
            key: PanelKey::Enter | PanelKey::Space,
            modifier,
        } => Some(panel_interact(current, panel_id, *modifier)),
        Interaction::PanelKey { .. } => None,
        Interaction::Background | Interaction::Escape => Some(clear()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> PanelId {
        PanelId::from(raw)
    }

    #[test]
    fn plain_click_replaces_selection() {
        let current = SelectionSet::from_ids([id("a"), id("b")]);
        let next = panel_interact(&current, &id("c"), false);
        assert_eq!(next.as_slice(), &[id("c")]);

        let again = panel_interact(&next, &id("c"), false);
        assert_eq!(again.as_slice(), &[id("c")], "plain click never deselects");
    }

    #[test]
    fn modified_click_toggles_membership() {
        let current = SelectionSet::single(id("a"));
        let added = panel_interact(&current, &id("b"), true);
        assert_eq!(added.as_slice(), &[id("a"), id("b")]);

        let removed = panel_interact(&added, &id("a"), true);
        assert_eq!(removed.as_slice(), &[id("b")]);

        let emptied = panel_interact(&removed, &id("b"), true);
        assert!(emptied.is_empty());
    }

    #[test]
    fn double_modified_click_restores_selection() {
        let original = SelectionSet::single(id("a"));
        let once = panel_interact(&original, &id("b"), true);
        let twice = panel_interact(&once, &id("b"), true);
        assert_eq!(twice, original);
    }

    #[test]
    fn background_and_escape_clear_unconditionally() {
        let current = SelectionSet::from_ids([id("a"), id("b")]);
        for interaction in [Interaction::Background, Interaction::Escape] {
            assert_eq!(
                next_selection(&current, &interaction),
                Some(SelectionSet::new())
            );
        }
        assert_eq!(
            next_selection(&SelectionSet::new(), &Interaction::Background),
            Some(SelectionSet::new())
        );
    }

    #[test]
    fn clicks_on_handles_and_controls_are_ignored() {
        let current = SelectionSet::single(id("a"));
        for target in [ClickTarget::DragHandle, ClickTarget::Control] {
            let interaction = Interaction::PanelClick {
                panel_id: id("b"),
                modifier: false,
                target,
            };
            assert_eq!(next_selection(&current, &interaction), None);
        }
    }

    #[test]
    fn enter_and_space_activate_like_clicks() {
        let current = SelectionSet::single(id("a"));
        let enter = Interaction::PanelKey {
            panel_id: id("b"),
            key: PanelKey::Enter,
            modifier: true,
        };
        assert_eq!(
            next_selection(&current, &enter).map(|set| set.len()),
            Some(2)
        );

        let other = Interaction::PanelKey {
            panel_id: id("b"),
            key: PanelKey::Other,
            modifier: false,
        };
        assert_eq!(next_selection(&current, &other), None);
    }

    #[test]
    fn from_ids_drops_duplicates_and_keeps_order() {
        let set = SelectionSet::from_ids([id("b"), id("a"), id("b")]);
        assert_eq!(set.as_slice(), &[id("b"), id("a")]);
        assert!(set.same_members(&SelectionSet::from_ids([id("a"), id("b")])));
    }

    #[test]
    fn interaction_decodes_from_tagged_json() {
        let decoded: Interaction =
            serde_json::from_str(r#"{"kind":"panel_click","panel_id":"preview-1","modifier":true}"#)
                .expect("decode");
        assert_eq!(
            decoded,
            Interaction::PanelClick {
                panel_id: id("preview-1"),
                modifier: true,
                target: ClickTarget::Body,
            }
        );
    }
}
