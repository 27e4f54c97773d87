//! Daily reading model and query parameters.

/// One day of pivoted measurements for a reservoir.
///
/// A category with no stored measurement for the day reads as `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyReading {
    /// Calendar day, formatted `YYYY-MM-DD`.
    pub date: String,
    /// Upper-bief water level in meters.
    pub level: f64,
    /// Upper-bief water volume in million cubic meters.
    pub volume: f64,
}

/// Selects the measurements of one reservoir over an inclusive date range.
///
/// The dates are passed to the store as-is and compared there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingFilter {
    pub reservoir_id: i64,
    pub date_from: String,
    pub date_to: String,
}

impl ReadingFilter {
    pub fn new(reservoir_id: i64, date_from: impl Into<String>, date_to: impl Into<String>) -> Self {
        Self {
            reservoir_id,
            date_from: date_from.into(),
            date_to: date_to.into(),
        }
    }
}

/// A 1-based page over the distinct days matched by a [`ReadingFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: i64,
    per_page: i64,
    offset: i64,
}

impl Page {
    /// Create a page cursor.
    ///
    /// Returns `None` unless both `number` and `per_page` are positive and
    /// the row offset `(number - 1) * per_page` fits in an `i64`.
    pub fn new(number: i64, per_page: i64) -> Option<Self> {
        if number <= 0 || per_page <= 0 {
            return None;
        }
        let offset = (number - 1).checked_mul(per_page)?;
        Some(Self {
            number,
            per_page,
            offset,
        })
    }

    /// 1-based page number.
    pub fn number(&self) -> i64 {
        self.number
    }

    /// Maximum rows in the page.
    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Position-based id of the row at `index` within this page.
    ///
    /// Ids are 1-based and continue across pages of the same size.
    pub fn item_id(&self, index: usize) -> i64 {
        self.offset + index as i64 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_rejects_non_positive() {
        assert!(Page::new(0, 10).is_none());
        assert!(Page::new(1, 0).is_none());
        assert!(Page::new(-1, 10).is_none());
        assert!(Page::new(1, -5).is_none());
    }

    #[test]
    fn test_page_rejects_overflowing_offset() {
        assert!(Page::new(i64::MAX, 2).is_none());
        assert!(Page::new(i64::MAX, 1).is_some());
    }

    #[test]
    fn test_page_offset() {
        let page = Page::new(1, 50).unwrap();
        assert_eq!(page.offset(), 0);

        let page = Page::new(5, 50).unwrap();
        assert_eq!(page.offset(), 200);
        assert_eq!(page.per_page(), 50);
        assert_eq!(page.number(), 5);
    }

    #[test]
    fn test_item_id() {
        let page = Page::new(1, 2).unwrap();
        assert_eq!(page.item_id(0), 1);
        assert_eq!(page.item_id(1), 2);

        let page = Page::new(3, 10).unwrap();
        assert_eq!(page.item_id(0), 21);
        assert_eq!(page.item_id(9), 30);
    }

    #[test]
    fn test_filter_new() {
        let filter = ReadingFilter::new(2, "2024-01-01", String::from("2024-01-31"));
        assert_eq!(filter.reservoir_id, 2);
        assert_eq!(filter.date_from, "2024-01-01");
        assert_eq!(filter.date_to, "2024-01-31");
    }
}
