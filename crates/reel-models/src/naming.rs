//! Remote filename conventions.
//!
//! The gallery, catalog builder and compilation output all rely on these
//! exact shapes:
//! - daily media: `YYYY-MM-DD.{mp4|webm|jpg|jpeg|png}`
//! - thumbnail:   `YYYY-MM-DD.thumb.jpg`
//! - compilation: `<prefix>_<YYYYMMDD>_to_<YYYYMMDD>_<unix-ts>.mp4`,
//!   or `<prefix>-compilation_<unix-ts>.mp4` when no range was given.

use chrono::NaiveDate;

use crate::media::MediaKind;

/// Suffix marking per-day thumbnails; never part of a catalog.
pub const THUMB_SUFFIX: &str = ".thumb.jpg";

/// Extension of every compilation output.
pub const OUTPUT_EXT: &str = "mp4";

/// Date format used inside daily filenames.
const DAILY_DATE_FMT: &str = "%Y-%m-%d";

/// Compact date format used inside output filenames.
const OUTPUT_DATE_FMT: &str = "%Y%m%d";

/// Parse a daily media filename into its date and kind.
///
/// Returns `None` for thumbnails and anything not matching the canonical
/// `YYYY-MM-DD.ext` pattern (unknown extensions included).
pub fn parse_daily_media_name(name: &str) -> Option<(NaiveDate, MediaKind)> {
    if name.ends_with(THUMB_SUFFIX) {
        return None;
    }

    let (stem, ext) = name.rsplit_once('.')?;
    let kind = MediaKind::from_extension(&ext.to_ascii_lowercase())?;
    let date = NaiveDate::parse_from_str(stem, DAILY_DATE_FMT).ok()?;

    // parse_from_str accepts unpadded components; the stored convention is
    // zero-padded ISO, so round-trip to reject e.g. "2024-1-1.mp4".
    if date.format(DAILY_DATE_FMT).to_string() != stem {
        return None;
    }

    Some((date, kind))
}

/// Format the canonical daily filename for a date and extension.
pub fn daily_media_name(date: NaiveDate, ext: &str) -> String {
    format!("{}.{}", date.format(DAILY_DATE_FMT), ext)
}

/// Thumbnail filename for a date.
pub fn thumbnail_name(date: NaiveDate) -> String {
    format!("{}{}", date.format(DAILY_DATE_FMT), THUMB_SUFFIX)
}

/// Compilation output filename.
///
/// `generated_at` is a unix timestamp in seconds; it keeps repeated runs over
/// the same range from colliding and makes outputs human-traceable.
pub fn output_name(
    prefix: &str,
    range: Option<(NaiveDate, NaiveDate)>,
    generated_at: i64,
) -> String {
    match range {
        Some((start, end)) => format!(
            "{}_{}_to_{}_{}.{}",
            prefix,
            start.format(OUTPUT_DATE_FMT),
            end.format(OUTPUT_DATE_FMT),
            generated_at,
            OUTPUT_EXT
        ),
        None => format!("{}-compilation_{}.{}", prefix, generated_at, OUTPUT_EXT),
    }
}
