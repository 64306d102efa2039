//! Plain-text rendering

use chrono::{DateTime, Utc};
use covhist_core::{upload_notices, MainView, SelectionEngine, SelectionState, UploadsHistory};
use covhist_model::{time::time_ago, Upload};

fn checkbox(selected: bool) -> &'static str {
    if selected {
        "[x]"
    } else {
        "[ ]"
    }
}

fn group_checkbox(state: SelectionState) -> &'static str {
    match state {
        SelectionState::AllSelected => "[x]",
        SelectionState::SomeSelected => "[-]",
        SelectionState::NoneSelected => "[ ]",
    }
}

fn upload_line(upload: &Upload, now: DateTime<Utc>) -> String {
    let mut line = format!("{}  {}", upload.label(), upload.state.as_str());
    if upload.is_carried_forward() {
        line.push_str("  carried forward");
    }
    if let Some(created_at) = upload.created_at {
        line.push_str(&format!("  {}", time_ago(created_at, now)));
    }
    if !upload.flags.is_empty() {
        line.push_str(&format!("  [{}]", upload.flags.join(", ")));
    }
    line
}

/// Overview, groups and notices
pub(crate) fn render_summary(history: &UploadsHistory, now: DateTime<Utc>) -> String {
    let grouping = &history.grouping;
    let mut lines = vec!["Coverage reports history".to_string()];

    if grouping.has_no_uploads {
        lines.push("No uploads for this commit".to_string());
        return lines.join("\n") + "\n";
    }
    lines.push(grouping.overview.clone());

    for (provider, uploads) in grouping.grouped_by_provider.iter() {
        lines.push(String::new());
        lines.push(format!("{} ({})", provider.label(), uploads.len()));
        for upload in uploads {
            lines.push(format!("  {}", upload_line(upload, now)));
            let notices = upload_notices(upload);
            lines.extend(notices.errors.iter().map(|notice| match notice.doc_link {
                Some(link) => format!("    ! {notice} <{link}>"),
                None => format!("    ! {notice}"),
            }));
            if let Some(warning) = notices.flag_warning {
                lines.push(format!("    ! {warning}"));
            }
        }
    }
    lines.join("\n") + "\n"
}

/// Main view with checkbox state, followed by the ignored ids
pub(crate) fn render_list(history: &UploadsHistory, engine: &SelectionEngine) -> String {
    let mut lines = Vec::new();

    match &history.main_view {
        MainView::Search(results) => {
            lines.push(format!("{} search result(s)", results.len()));
            lines.extend(
                results
                    .iter()
                    .map(|upload| format!("  {} ({})", upload.label(), upload.provider_key().label())),
            );
        }
        MainView::Grouped(groups) => {
            for (provider, rows) in groups.iter() {
                let state = engine
                    .group_state(provider)
                    .unwrap_or(SelectionState::AllSelected);
                lines.push(format!("{} {}", group_checkbox(state), provider.label()));
                for row in rows {
                    let selected = engine.is_selected(provider, row.member_index).unwrap_or(true);
                    lines.push(format!("  {} {}", checkbox(selected), row.upload.label()));
                }
            }
        }
    }

    let ids: Vec<String> = engine
        .ignored_upload_ids()
        .iter()
        .map(ToString::to_string)
        .collect();
    lines.push(format!("Ignored upload ids: [{}]", ids.join(", ")));
    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use covhist_core::{SharedCache, UploadFilters};
    use covhist_model::ProviderKey;
    use covhist_test_utils::{create_errored_upload, fixed_now, mixed_commit, travis_pair};
    use pretty_assertions::assert_eq;

    #[test]
    fn summary_lists_groups_and_notices() {
        let uploads = vec![
            create_errored_upload(1, "travis", &["REPORT_EXPIRED"]),
            Upload::new(2).with_name("bare"),
        ];
        let history = UploadsHistory::build(uploads, &UploadFilters::new());
        let text = render_summary(&history, fixed_now());

        assert!(text.contains("\n1 started, 1 errored\n"));
        assert!(text.contains("\ntravis (1)\n"));
        assert!(text.contains("\nNot specified (1)\n"));
        assert!(text.contains("upload-1  ERROR  less than a minute ago"));
        assert!(text.contains("    ! "));
    }

    #[test]
    fn summary_of_empty_commit() {
        let history = UploadsHistory::build(Vec::new(), &UploadFilters::new());
        assert_eq!(
            render_summary(&history, fixed_now()),
            "Coverage reports history\nNo uploads for this commit\n"
        );
    }

    #[test]
    fn list_marks_deselected_upload() {
        let history = UploadsHistory::build(travis_pair(), &UploadFilters::new());
        let mut engine =
            SelectionEngine::new(&history.grouping.grouped_by_provider, SharedCache::default());
        engine.toggle_upload(&ProviderKey::named("travis"), 1).unwrap();

        assert_eq!(
            render_list(&history, &engine),
            "[-] travis\n  [x] upload-0\n  [ ] upload-1\nIgnored upload ids: [1]\n"
        );
    }

    #[test]
    fn list_marks_the_toggled_row_among_identical_uploads() {
        let uploads = vec![
            Upload::draft().with_provider("travis"),
            Upload::draft().with_provider("travis"),
        ];
        let history = UploadsHistory::build(uploads, &UploadFilters::new());
        let mut engine =
            SelectionEngine::new(&history.grouping.grouped_by_provider, SharedCache::default());
        engine.toggle_upload(&ProviderKey::named("travis"), 1).unwrap();

        assert_eq!(
            render_list(&history, &engine),
            "[-] travis\n  [x] upload\n  [ ] upload\nIgnored upload ids: []\n"
        );
    }

    #[test]
    fn list_in_search_mode_is_flat() {
        let filters = UploadFilters::new().with_search_term("integration");
        let history = UploadsHistory::build(mixed_commit(), &filters);
        let engine =
            SelectionEngine::new(&history.grouping.grouped_by_provider, SharedCache::default());

        assert_eq!(
            render_list(&history, &engine),
            "1 search result(s)\n  upload-13 (travis)\nIgnored upload ids: []\n"
        );
    }
}
