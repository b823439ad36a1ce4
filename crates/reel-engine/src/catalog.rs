//! Clip catalog builder.
//!
//! Turns a raw remote folder listing into the canonical, deduplicated,
//! date-ordered list of daily media feeding one compilation run.

use tracing::debug;

use reel_models::naming::parse_daily_media_name;
use reel_models::{CompilationRequest, MediaItem};
use reel_storage::{FolderId, RemoteFile, SegmentStore};

use crate::error::{CatalogError, CompileError, CompileResult};

/// Build the catalog for a folder and request.
///
/// Fails with a [`CatalogError`] before any download happens.
pub async fn build_catalog(
    store: &dyn SegmentStore,
    folder: &FolderId,
    request: &CompilationRequest,
    min_clips: usize,
) -> CompileResult<Vec<MediaItem>> {
    let files = store
        .list(folder)
        .await
        .map_err(|e| CompileError::from_fetch(folder.as_str(), e))?;

    Ok(select_catalog(&files, request, min_clips)?)
}

/// Select, deduplicate and order the daily media out of a folder listing.
///
/// - Names not matching `YYYY-MM-DD.ext` (thumbnails included) are skipped.
/// - One item survives per date: the latest `modified_at` wins; on an
///   exact timestamp tie the later-seen file in list order wins. The
///   tie-break is arbitrary but fixed, so repeated builds agree.
/// - The date filter is inclusive on both bounds.
pub fn select_catalog(
    files: &[RemoteFile],
    request: &CompilationRequest,
    min_clips: usize,
) -> Result<Vec<MediaItem>, CatalogError> {
    let mut by_date: Vec<MediaItem> = Vec::new();

    for file in files {
        let Some((date, kind)) = parse_daily_media_name(&file.name) else {
            continue;
        };

        let item = MediaItem {
            date,
            kind,
            remote_id: file.id.clone(),
            name: file.name.clone(),
            modified_at: file.modified_at,
        };

        match by_date.iter_mut().find(|existing| existing.date == date) {
            Some(existing) => {
                if item.modified_at >= existing.modified_at {
                    debug!(
                        date = %date,
                        kept = %item.name,
                        superseded = %existing.name,
                        "Duplicate daily media, keeping the newer file"
                    );
                    *existing = item;
                } else {
                    debug!(
                        date = %date,
                        kept = %existing.name,
                        superseded = %item.name,
                        "Duplicate daily media, keeping the newer file"
                    );
                }
            }
            None => by_date.push(item),
        }
    }

    let had_any = !by_date.is_empty();
    let mut selected: Vec<MediaItem> = by_date
        .into_iter()
        .filter(|item| request.contains(item.date))
        .collect();

    if selected.is_empty() && had_any && request.has_date_filter() {
        return Err(CatalogError::EmptyRange);
    }
    if selected.len() < min_clips {
        return Err(CatalogError::InsufficientClips {
            found: selected.len(),
            required: min_clips,
        });
    }

    selected.sort_by_key(|item| item.date);
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use reel_models::MediaKind;

    fn file(name: &str, modified_secs: i64) -> RemoteFile {
        RemoteFile {
            id: format!("id-{}", name),
            name: name.to_string(),
            mime_type: "application/octet-stream".to_string(),
            created_at: None,
            modified_at: Utc.timestamp_opt(modified_secs, 0).unwrap(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_newer_duplicate_wins() {
        let files = vec![
            file("2024-01-01.mp4", 100),
            file("2024-01-01.jpg", 200),
            file("2024-01-02.png", 50),
        ];
        let catalog = select_catalog(&files, &CompilationRequest::all_history(), 2).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].date, d(2024, 1, 1));
        assert_eq!(catalog[0].kind, MediaKind::Image);
        assert_eq!(catalog[0].name, "2024-01-01.jpg");
        assert_eq!(catalog[1].date, d(2024, 1, 2));
        assert_eq!(catalog[1].kind, MediaKind::Image);
    }

    #[test]
    fn test_equal_timestamps_keep_later_listed() {
        let files = vec![file("2024-01-01.mp4", 100), file("2024-01-01.webm", 100)];
        let catalog = select_catalog(&files, &CompilationRequest::all_history(), 1).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].name, "2024-01-01.webm");
    }

    #[test]
    fn test_thumbnails_and_noise_are_skipped() {
        let files = vec![
            file("2024-01-01.mp4", 100),
            file("2024-01-01.thumb.jpg", 300),
            file("reel-compilation_1700000000.mp4", 400),
            file("notes.txt", 500),
            file("2024-01-02.jpg", 100),
        ];
        let catalog = select_catalog(&files, &CompilationRequest::all_history(), 2).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].name, "2024-01-01.mp4");
    }

    #[test]
    fn test_catalog_is_sorted_ascending() {
        let files = vec![
            file("2024-03-05.mp4", 1),
            file("2024-01-01.mp4", 2),
            file("2024-02-10.jpg", 3),
        ];
        let catalog = select_catalog(&files, &CompilationRequest::all_history(), 2).unwrap();
        let dates: Vec<_> = catalog.iter().map(|i| i.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 2, 10), d(2024, 3, 5)]);
    }

    #[test]
    fn test_range_filter_is_inclusive() {
        let files = vec![
            file("2023-12-31.mp4", 1),
            file("2024-01-01.mp4", 1),
            file("2024-01-31.mp4", 1),
            file("2024-02-01.mp4", 1),
        ];
        let request = CompilationRequest::for_range(d(2024, 1, 1), d(2024, 1, 31));
        let catalog = select_catalog(&files, &request, 2).unwrap();

        let dates: Vec<_> = catalog.iter().map(|i| i.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 31)]);
    }

    #[test]
    fn test_empty_range_is_distinct_from_insufficient() {
        let files = vec![file("2024-06-01.mp4", 1), file("2024-06-02.mp4", 1)];

        let request = CompilationRequest::for_range(d(2020, 1, 1), d(2020, 12, 31));
        assert_eq!(
            select_catalog(&files, &request, 2).unwrap_err(),
            CatalogError::EmptyRange
        );

        assert_eq!(
            select_catalog(&files, &CompilationRequest::all_history(), 5).unwrap_err(),
            CatalogError::InsufficientClips {
                found: 2,
                required: 5
            }
        );
    }

    #[test]
    fn test_empty_folder_reports_insufficient() {
        let err = select_catalog(&[], &CompilationRequest::all_history(), 2).unwrap_err();
        assert_eq!(
            err,
            CatalogError::InsufficientClips {
                found: 0,
                required: 2
            }
        );
    }
}
