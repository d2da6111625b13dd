//! Error location within highlighted bodies.

use crate::formatter::syntax::Segment;
use serde::Serialize;

/// Points at the highlighted segment that contains a body's error offset.
///
/// The presentation layer uses it to underline the offending token: segment
/// `segment` of the rendered body spans bytes `start..end` of the plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMarker {
    /// Index of the segment in highlight order.
    pub segment: usize,
    pub start: usize,
    pub end: usize,
    /// The error offset this marker was computed for.
    pub offset: usize,
}

/// Finds the first segment whose cumulative length exceeds `offset`.
///
/// Returns `None` when the offset lies at or past the end of the text.
///
/// # Examples
///
/// ```
/// use txn_inspector::formatter::marker::locate_error;
/// use txn_inspector::formatter::syntax::Segment;
///
/// let segments = vec![
///     Segment { range: 0..3, kind: None },
///     Segment { range: 3..8, kind: None },
/// ];
/// let marker = locate_error(&segments, 5).unwrap();
/// assert_eq!((marker.segment, marker.start, marker.end), (1, 3, 8));
/// ```
pub fn locate_error(segments: &[Segment], offset: usize) -> Option<ErrorMarker> {
    let mut consumed = 0;
    for (index, segment) in segments.iter().enumerate() {
        let start = consumed;
        consumed += segment.len();
        if consumed > offset {
            return Some(ErrorMarker {
                segment: index,
                start,
                end: consumed,
                offset,
            });
        }
    }
    None
}
