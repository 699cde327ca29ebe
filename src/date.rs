use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use std::path::Path;

use crate::error::RewriteError;

/// chrono format of a date directory name.
pub const DATE_DIR_FORMAT: &str = "%Y-%m-%d";

/// Build the capture timestamp for `path` from the name of its parent directory.
///
/// `images/2021-06-15/photo.jpg` with a `+09:00` offset becomes
/// `2021-06-15T00:00:00+09:00`.
pub fn capture_timestamp(
    path: &Path,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, RewriteError> {
    let dir = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_date_token(&dir, offset)
}

/// Parse a `YYYY-MM-DD` token as midnight in `offset`.
pub fn parse_date_token(
    token: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, RewriteError> {
    let invalid = |source| RewriteError::DateParse {
        dir: token.to_string(),
        source,
    };

    // chrono alone would also accept unpadded or signed fields
    if !has_date_shape(token) {
        return Err(invalid(None));
    }

    let date = NaiveDate::parse_from_str(token, DATE_DIR_FORMAT).map_err(|e| invalid(Some(e)))?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| invalid(None))?;
    offset
        .from_local_datetime(&midnight)
        .single()
        .ok_or_else(|| invalid(None))
}

fn has_date_shape(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
