//! Provider grouping and overview
//!
//! Partitions uploads by CI provider. Real providers keep first-seen order;
//! the sentinel bucket for uploads without a provider always comes last.
//! Flattening a grouping and grouping it again yields the same buckets in
//! the same order.

use covhist_model::{ProviderKey, Upload, UploadState};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Uploads partitioned by provider, in display order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UploadGroups {
    groups: IndexMap<ProviderKey, Vec<Upload>>,
}

impl UploadGroups {
    /// Create empty grouping
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group uploads by provider
    #[must_use]
    pub fn from_uploads<I>(uploads: I) -> Self
    where
        I: IntoIterator<Item = Upload>,
    {
        let mut groups: IndexMap<ProviderKey, Vec<Upload>> = IndexMap::new();
        let mut unspecified = Vec::new();

        for upload in uploads {
            match upload.provider_key() {
                ProviderKey::NotSpecified => unspecified.push(upload),
                key => groups.entry(key).or_default().push(upload),
            }
        }

        if !unspecified.is_empty() {
            groups.insert(ProviderKey::NotSpecified, unspecified);
        }

        Self { groups }
    }

    /// Provider keys in display order
    #[must_use]
    pub fn provider_order(&self) -> Vec<ProviderKey> {
        self.groups.keys().cloned().collect()
    }

    /// Uploads of one provider
    #[inline]
    #[must_use]
    pub fn get(&self, provider: &ProviderKey) -> Option<&[Upload]> {
        self.groups.get(provider).map(Vec::as_slice)
    }

    /// Iterate groups in display order
    pub fn iter(&self) -> impl Iterator<Item = (&ProviderKey, &[Upload])> {
        self.groups.iter().map(|(key, uploads)| (key, uploads.as_slice()))
    }

    /// Iterate every upload in display order
    pub fn uploads(&self) -> impl Iterator<Item = &Upload> {
        self.groups.values().flatten()
    }

    /// Number of provider groups
    #[inline]
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of uploads across all groups
    #[inline]
    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Check if there are no uploads at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upload_count() == 0
    }

    /// All uploads in display order
    #[must_use]
    pub fn flatten(&self) -> Vec<Upload> {
        self.uploads().cloned().collect()
    }

    /// Copy of the grouping restricted to matching uploads
    ///
    /// Groups left empty are dropped; surviving groups keep their order.
    #[must_use]
    pub fn filtered<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Upload) -> bool,
    {
        let groups = self
            .groups
            .iter()
            .filter_map(|(key, uploads)| {
                let kept: Vec<Upload> = uploads.iter().filter(|u| predicate(u)).cloned().collect();
                (!kept.is_empty()).then(|| (key.clone(), kept))
            })
            .collect();

        Self { groups }
    }
}

/// Per-lifecycle upload counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadsOverview {
    /// Uploads still processing
    pub started: usize,
    /// Uploads whose processing failed
    pub errored: usize,
    /// Uploads processed or complete
    pub successful: usize,
    /// Uploads reused from a prior commit
    pub carried_forward: usize,
}

impl UploadsOverview {
    /// Count uploads
    ///
    /// Carried-forward uploads are counted only as carried forward, never in a
    /// lifecycle bucket.
    #[must_use]
    pub fn from_uploads<'a, I>(uploads: I) -> Self
    where
        I: IntoIterator<Item = &'a Upload>,
    {
        let mut overview = Self::default();
        for upload in uploads {
            if upload.is_carried_forward() {
                overview.carried_forward += 1;
                continue;
            }
            match upload.state {
                UploadState::Started => overview.started += 1,
                UploadState::Error => overview.errored += 1,
                UploadState::Processed | UploadState::Complete => overview.successful += 1,
            }
        }
        overview
    }
}

impl fmt::Display for UploadsOverview {
    /// e.g. "3 started, 2 errored, 1 successful"; zero buckets are omitted
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            (self.started, "started"),
            (self.errored, "errored"),
            (self.successful, "successful"),
            (self.carried_forward, "carried forward"),
        ];

        let sentence = parts
            .iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, phrase)| format!("{count} {phrase}"))
            .collect::<Vec<_>>()
            .join(", ");

        f.write_str(&sentence)
    }
}

/// Grouping result for a commit's uploads
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UploadGrouping {
    /// Uploads by provider
    pub grouped_by_provider: UploadGroups,
    /// One-line summary sentence
    pub overview: String,
    /// True iff the commit has no uploads
    pub has_no_uploads: bool,
}

impl UploadGrouping {
    /// Provider keys in display order
    #[inline]
    #[must_use]
    pub fn provider_order(&self) -> Vec<ProviderKey> {
        self.grouped_by_provider.provider_order()
    }
}

/// Group uploads and summarize them
#[must_use]
pub fn group_uploads(uploads: Vec<Upload>) -> UploadGrouping {
    let overview = UploadsOverview::from_uploads(&uploads).to_string();
    let grouped_by_provider = UploadGroups::from_uploads(uploads);
    let has_no_uploads = grouped_by_provider.is_empty();

    UploadGrouping {
        grouped_by_provider,
        overview,
        has_no_uploads,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covhist_model::UploadType;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_seen_order_with_sentinel_last() {
        let uploads = vec![
            Upload::new(0).with_provider("travis"),
            Upload::new(1),
            Upload::new(2).with_provider("circleci"),
            Upload::new(3).with_provider("travis"),
        ];
        let groups = UploadGroups::from_uploads(uploads);

        assert_eq!(
            groups.provider_order(),
            vec![
                ProviderKey::named("travis"),
                ProviderKey::named("circleci"),
                ProviderKey::NotSpecified
            ]
        );
        assert_eq!(groups.get(&ProviderKey::named("travis")).map(<[Upload]>::len), Some(2));
    }

    #[test]
    fn regrouping_flattened_is_identity() {
        let uploads = vec![
            Upload::new(0).with_provider("github"),
            Upload::new(1),
            Upload::new(2).with_provider("travis"),
            Upload::new(3).with_provider("github"),
        ];
        let groups = UploadGroups::from_uploads(uploads);
        let regrouped = UploadGroups::from_uploads(groups.flatten());

        assert_eq!(regrouped, groups);
    }

    #[test]
    fn overview_sentence() {
        let uploads = vec![
            Upload::new(0).with_state(UploadState::Started),
            Upload::new(1).with_state(UploadState::Started),
            Upload::new(2).with_state(UploadState::Started),
            Upload::new(3).with_state(UploadState::Error),
            Upload::new(4).with_state(UploadState::Error),
            Upload::new(5).with_state(UploadState::Complete),
        ];
        assert_eq!(
            UploadsOverview::from_uploads(&uploads).to_string(),
            "3 started, 2 errored, 1 successful"
        );
    }

    #[test]
    fn processed_and_complete_are_both_successful() {
        let uploads = vec![
            Upload::new(0).with_state(UploadState::Processed),
            Upload::new(1).with_state(UploadState::Complete),
        ];
        assert_eq!(UploadsOverview::from_uploads(&uploads).to_string(), "2 successful");
    }

    #[test]
    fn only_carried_forward() {
        let uploads = vec![
            Upload::new(0)
                .with_state(UploadState::Processed)
                .with_upload_type(UploadType::CarriedForward),
            Upload::new(1)
                .with_state(UploadState::Complete)
                .with_upload_type(UploadType::CarriedForward),
        ];
        assert_eq!(UploadsOverview::from_uploads(&uploads).to_string(), "2 carried forward");
    }

    #[test]
    fn carried_forward_augments_lifecycle() {
        let uploads = vec![
            Upload::new(0).with_state(UploadState::Processed),
            Upload::new(1)
                .with_state(UploadState::Processed)
                .with_upload_type(UploadType::CarriedForward),
        ];
        assert_eq!(
            UploadsOverview::from_uploads(&uploads).to_string(),
            "1 successful, 1 carried forward"
        );
    }

    #[test]
    fn empty_input() {
        let grouping = group_uploads(Vec::new());
        assert!(grouping.has_no_uploads);
        assert_eq!(grouping.overview, "");
        assert!(grouping.provider_order().is_empty());
    }

    #[test]
    fn filtered_drops_empty_groups() {
        let groups = UploadGroups::from_uploads(vec![
            Upload::new(0).with_provider("travis").with_state(UploadState::Error),
            Upload::new(1).with_provider("circleci"),
        ]);
        let errored = groups.filtered(Upload::is_errored);

        assert_eq!(errored.provider_order(), vec![ProviderKey::named("travis")]);
        assert_eq!(errored.upload_count(), 1);
    }
}
