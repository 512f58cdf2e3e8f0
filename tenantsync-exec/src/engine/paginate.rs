//! Page arithmetic for one tenant.

/// `ceil(total / page_size)`, or zero when there is nothing to page through.
pub fn page_count(total: i64, page_size: i64) -> i64 {
    debug_assert!(page_size > 0, "page size must be positive");
    if total < 1 {
        return 0;
    }
    let mut pages = total / page_size;
    if total % page_size != 0 {
        pages += 1;
    }
    pages
}

/// Offsets `0, L, 2L, …` covering `[0, total)` without gaps or overlaps.
pub fn page_offsets(total: i64, page_size: i64) -> impl Iterator<Item = i64> {
    (0..page_count(total, page_size)).map(move |i| i * page_size)
}
