//! Hierarchical upload selection
//!
//! Each provider group holds a set of selected member indices. The group
//! checkbox state is derived from that set and never stored. Every
//! transition reconciles the shared ignored-ids entry so that it holds
//! exactly the ids of the deselected uploads.
//!
//! # State machine (per group)
//!
//! ```text
//!            toggle_group                    toggle_group
//! NoneSelected ──────────▶ AllSelected ──────────────▶ NoneSelected
//!                               │  ▲
//!              toggle_upload    ▼  │   toggle_upload
//!                           SomeSelected ──toggle_group──▶ NoneSelected
//! ```

use crate::cache::{SharedCache, IGNORED_UPLOAD_IDS};
use crate::error::SelectionError;
use crate::grouping::UploadGroups;
use covhist_model::{ProviderKey, UploadId};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Group checkbox state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SelectionState {
    /// Every member selected
    AllSelected,
    /// Some but not all members selected
    SomeSelected,
    /// No member selected
    NoneSelected,
}

/// Derive the group state from selected and total member counts
#[inline]
#[must_use]
pub fn derive_state(selected: usize, total: usize) -> SelectionState {
    if selected == 0 {
        SelectionState::NoneSelected
    } else if selected >= total {
        SelectionState::AllSelected
    } else {
        SelectionState::SomeSelected
    }
}

/// Selection over provider groups, publishing deselected ids to the shared cache
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    /// Member ids per group, in display order
    members: IndexMap<ProviderKey, Vec<Option<UploadId>>>,
    /// Selected indices for groups touched so far; untouched groups are fully selected
    selections: HashMap<ProviderKey, BTreeSet<usize>>,
    /// Shared store holding the ignored ids
    cache: SharedCache,
}

impl SelectionEngine {
    /// Create engine over a grouping
    #[must_use]
    pub fn new(groups: &UploadGroups, cache: SharedCache) -> Self {
        Self {
            members: member_ids(groups),
            selections: HashMap::new(),
            cache,
        }
    }

    /// Re-read a fresh grouping
    ///
    /// Existing selection sets are kept and clamped to the new member counts.
    /// New groups, and members appended to a touched group, start selected.
    /// Ids that no longer exist are dropped from the cache.
    pub fn sync_groups(&mut self, groups: &UploadGroups) {
        let next = member_ids(groups);
        let previous_len: HashMap<ProviderKey, usize> = self
            .members
            .iter()
            .map(|(provider, ids)| (provider.clone(), ids.len()))
            .collect();

        let live: HashSet<UploadId> = next.values().flatten().flatten().copied().collect();
        let stale: Vec<UploadId> = self
            .members
            .values()
            .flatten()
            .flatten()
            .copied()
            .filter(|id| !live.contains(id))
            .collect();

        self.selections.retain(|provider, selected| match next.get(provider) {
            Some(ids) => {
                let old_len = previous_len.get(provider).copied().unwrap_or(0);
                selected.retain(|&index| index < ids.len());
                selected.extend(old_len..ids.len());
                true
            }
            None => false,
        });
        self.members = next;

        if !stale.is_empty() {
            self.cache.update(&IGNORED_UPLOAD_IDS, |mut ignored| {
                ignored.retain(|id| !stale.contains(id));
                ignored
            });
        }

        let providers: Vec<ProviderKey> = self.members.keys().cloned().collect();
        for provider in &providers {
            self.reconcile(provider);
        }
    }

    /// Provider keys known to the engine
    pub fn providers(&self) -> impl Iterator<Item = &ProviderKey> {
        self.members.keys()
    }

    /// Number of members in a group
    ///
    /// # Errors
    /// `SelectionError::UnknownGroup` if the provider has no group
    pub fn member_count(&self, provider: &ProviderKey) -> Result<usize, SelectionError> {
        self.members
            .get(provider)
            .map(Vec::len)
            .ok_or_else(|| SelectionError::UnknownGroup(provider.clone()))
    }

    /// Selected member indices, ascending
    ///
    /// # Errors
    /// `SelectionError::UnknownGroup` if the provider has no group
    pub fn selected_indices(&self, provider: &ProviderKey) -> Result<Vec<usize>, SelectionError> {
        let total = self.member_count(provider)?;
        Ok(match self.selections.get(provider) {
            Some(selected) => selected.iter().copied().collect(),
            None => (0..total).collect(),
        })
    }

    /// Current group state
    ///
    /// # Errors
    /// `SelectionError::UnknownGroup` if the provider has no group
    pub fn group_state(&self, provider: &ProviderKey) -> Result<SelectionState, SelectionError> {
        let total = self.member_count(provider)?;
        let selected = self.selections.get(provider).map_or(total, BTreeSet::len);
        Ok(derive_state(selected, total))
    }

    /// Check if one member is selected
    ///
    /// # Errors
    /// - `SelectionError::UnknownGroup` if the provider has no group
    /// - `SelectionError::IndexOutOfRange` if the index is not a member
    pub fn is_selected(&self, provider: &ProviderKey, index: usize) -> Result<bool, SelectionError> {
        self.check_index(provider, index)?;
        Ok(self
            .selections
            .get(provider)
            .map_or(true, |selected| selected.contains(&index)))
    }

    /// Click the group checkbox
    ///
    /// From `NoneSelected` every member gets selected; from any other state
    /// every member gets deselected.
    ///
    /// # Errors
    /// `SelectionError::UnknownGroup` if the provider has no group
    pub fn toggle_group(&mut self, provider: &ProviderKey) -> Result<SelectionState, SelectionError> {
        let total = self.member_count(provider)?;
        let next = match self.group_state(provider)? {
            SelectionState::NoneSelected => (0..total).collect(),
            SelectionState::SomeSelected | SelectionState::AllSelected => BTreeSet::new(),
        };
        self.selections.insert(provider.clone(), next);
        self.finish_transition(provider)
    }

    /// Click one member checkbox
    ///
    /// # Errors
    /// - `SelectionError::UnknownGroup` if the provider has no group
    /// - `SelectionError::IndexOutOfRange` if the index is not a member
    pub fn toggle_upload(
        &mut self,
        provider: &ProviderKey,
        index: usize,
    ) -> Result<SelectionState, SelectionError> {
        let selected = self.is_selected(provider, index)?;
        self.set_upload_selected(provider, index, !selected)
    }

    /// Select or deselect one member explicitly
    ///
    /// # Errors
    /// - `SelectionError::UnknownGroup` if the provider has no group
    /// - `SelectionError::IndexOutOfRange` if the index is not a member
    pub fn set_upload_selected(
        &mut self,
        provider: &ProviderKey,
        index: usize,
        selected: bool,
    ) -> Result<SelectionState, SelectionError> {
        let total = self.check_index(provider, index)?;
        let set = self
            .selections
            .entry(provider.clone())
            .or_insert_with(|| (0..total).collect());

        if selected {
            set.insert(index);
        } else {
            set.remove(&index);
        }
        self.finish_transition(provider)
    }

    /// Ids currently published as ignored
    #[inline]
    #[must_use]
    pub fn ignored_upload_ids(&self) -> Vec<UploadId> {
        self.cache.ignored_upload_ids()
    }

    /// Shared cache the engine writes to
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    fn check_index(&self, provider: &ProviderKey, index: usize) -> Result<usize, SelectionError> {
        let total = self.member_count(provider)?;
        if index >= total {
            return Err(SelectionError::index_out_of_range(provider.clone(), index, total));
        }
        Ok(total)
    }

    fn finish_transition(&mut self, provider: &ProviderKey) -> Result<SelectionState, SelectionError> {
        let ignored = self.reconcile(provider);
        let state = self.group_state(provider)?;
        debug!(
            provider = %provider,
            state = ?state,
            ignored = ignored.len(),
            "selection changed"
        );
        Ok(state)
    }

    /// Bring the cache in line with one group's selection set
    ///
    /// Deselected ids are appended if missing, selected ids removed. Members
    /// without an id are skipped. Other groups' ids are left alone.
    fn reconcile(&self, provider: &ProviderKey) -> Vec<UploadId> {
        let Some(ids) = self.members.get(provider) else {
            return self.cache.ignored_upload_ids();
        };
        let selected = self.selections.get(provider);

        self.cache.update(&IGNORED_UPLOAD_IDS, |mut ignored| {
            for (index, id) in ids.iter().enumerate() {
                let Some(id) = id else { continue };
                let is_selected = selected.map_or(true, |set| set.contains(&index));
                if is_selected {
                    ignored.retain(|existing| existing != id);
                } else if !ignored.contains(id) {
                    ignored.push(*id);
                }
            }
            ignored
        })
    }
}

fn member_ids(groups: &UploadGroups) -> IndexMap<ProviderKey, Vec<Option<UploadId>>> {
    groups
        .iter()
        .map(|(provider, uploads)| (provider.clone(), uploads.iter().map(|u| u.id).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use covhist_model::Upload;

    fn travis() -> ProviderKey {
        ProviderKey::named("travis")
    }

    fn engine() -> SelectionEngine {
        let groups = UploadGroups::from_uploads(vec![
            Upload::new(0).with_provider("travis"),
            Upload::new(1).with_provider("travis"),
            Upload::new(2).with_provider("circleci"),
        ]);
        SelectionEngine::new(&groups, SharedCache::default())
    }

    #[test]
    fn derive_state_table() {
        assert_eq!(derive_state(0, 3), SelectionState::NoneSelected);
        assert_eq!(derive_state(1, 3), SelectionState::SomeSelected);
        assert_eq!(derive_state(3, 3), SelectionState::AllSelected);
        assert_eq!(derive_state(0, 0), SelectionState::NoneSelected);
    }

    #[test]
    fn groups_start_fully_selected() {
        let engine = engine();
        assert_eq!(engine.group_state(&travis()).unwrap(), SelectionState::AllSelected);
        assert_eq!(engine.selected_indices(&travis()).unwrap(), vec![0, 1]);
        assert!(engine.ignored_upload_ids().is_empty());
    }

    #[test]
    fn indeterminate_group_click_clears() {
        let mut engine = engine();
        engine.toggle_upload(&travis(), 1).unwrap();
        assert_eq!(engine.toggle_group(&travis()).unwrap(), SelectionState::NoneSelected);
    }

    #[test]
    fn unknown_group_and_bad_index() {
        let mut engine = engine();
        let missing = ProviderKey::named("jenkins");
        assert_eq!(
            engine.toggle_group(&missing),
            Err(SelectionError::UnknownGroup(missing.clone()))
        );
        assert!(matches!(
            engine.toggle_upload(&travis(), 5),
            Err(SelectionError::IndexOutOfRange { index: 5, len: 2, .. })
        ));
    }

    #[test]
    fn missing_ids_still_update_local_state() {
        let groups = UploadGroups::from_uploads(vec![
            Upload::draft().with_provider("travis"),
            Upload::new(9).with_provider("travis"),
        ]);
        let mut engine = SelectionEngine::new(&groups, SharedCache::default());

        assert_eq!(engine.toggle_upload(&travis(), 0).unwrap(), SelectionState::SomeSelected);
        assert!(!engine.is_selected(&travis(), 0).unwrap());
        assert!(engine.ignored_upload_ids().is_empty());
    }

    #[test]
    fn sync_clamps_and_drops_stale_ids() {
        let mut engine = engine();
        engine.toggle_group(&travis()).unwrap();
        assert_eq!(engine.ignored_upload_ids(), vec![UploadId(0), UploadId(1)]);

        let shrunk = UploadGroups::from_uploads(vec![Upload::new(0).with_provider("travis")]);
        engine.sync_groups(&shrunk);

        assert_eq!(engine.member_count(&travis()).unwrap(), 1);
        assert_eq!(engine.group_state(&travis()).unwrap(), SelectionState::NoneSelected);
        assert_eq!(engine.ignored_upload_ids(), vec![UploadId(0)]);
        assert!(engine.member_count(&ProviderKey::named("circleci")).is_err());
    }

    #[test]
    fn sync_selects_members_appended_to_touched_group() {
        let mut engine = engine();
        engine.toggle_upload(&travis(), 1).unwrap();

        let grown = UploadGroups::from_uploads(vec![
            Upload::new(0).with_provider("travis"),
            Upload::new(1).with_provider("travis"),
            Upload::new(3).with_provider("travis"),
        ]);
        engine.sync_groups(&grown);

        assert_eq!(engine.selected_indices(&travis()).unwrap(), vec![0, 2]);
        assert!(engine.is_selected(&travis(), 2).unwrap());
        assert_eq!(engine.group_state(&travis()).unwrap(), SelectionState::SomeSelected);
        assert_eq!(engine.ignored_upload_ids(), vec![UploadId(1)]);
    }
}
