//! Download filename generation.
//!
//! Filenames combine the account handle, the post's own date (when known),
//! the wall-clock time of generation, and a per-batch index:
//! `<account>[(<postdate>)]_<MMDD>_<HHMI>_<NN>.<ext>`. No collision
//! handling: identical inputs within the same minute produce identical
//! names, and the save layer is left to overwrite or rename.

use chrono::{Datelike, Local, NaiveDateTime, Timelike};

use crate::media::DEFAULT_EXTENSION;
use crate::post::DATE_UNKNOWN;

/// Filename for the media at `index` (zero-based position, rendered
/// 1-based), stamped with the current local time.
pub fn filename(account: &str, post_date: &str, index: usize, extension: &str) -> String {
    filename_at(account, post_date, index, extension, Local::now().naive_local())
}

/// Deterministic variant taking the clock as a value, for callers and tests
/// that need reproducible names.
pub fn filename_at(
    account: &str,
    post_date: &str,
    index: usize,
    extension: &str,
    now: NaiveDateTime,
) -> String {
    let extension = if extension.is_empty() {
        DEFAULT_EXTENSION
    } else {
        extension
    };
    let date_part = if post_date.is_empty() || post_date == DATE_UNKNOWN {
        String::new()
    } else {
        format!("({post_date})")
    };

    format!(
        "{account}{date_part}_{:02}{:02}_{:02}{:02}_{:02}.{extension}",
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        index + 1,
    )
}
