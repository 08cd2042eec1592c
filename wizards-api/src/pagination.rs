//! Limit/offset windowing for list endpoints

/// Page size when the caller gives none
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page a caller may request
pub const MAX_LIMIT: i64 = 100;

/// Sanitized LIMIT/OFFSET pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

/// Clamp requested limit to [1, MAX_LIMIT] and offset to >= 0
///
/// # Examples
/// ```
/// use wizards_api::pagination::calculate_window;
///
/// let w = calculate_window(None, None);
/// assert_eq!((w.limit, w.offset), (10, 0));
///
/// // Oversized requests get clamped
/// let w = calculate_window(Some(500), Some(-3));
/// assert_eq!((w.limit, w.offset), (100, 0));
/// ```
pub fn calculate_window(limit: Option<i64>, offset: Option<i64>) -> Window {
    Window {
        limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        offset: offset.unwrap_or(0).max(0),
    }
}
