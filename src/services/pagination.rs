pub const PAGE_SIZE: i64 = 10;

/// `?page=` values that are missing, non-numeric or below 1 all mean page 1.
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

pub fn skip_for(page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(PAGE_SIZE)
}

pub fn total_pages(total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (total + PAGE_SIZE - 1) / PAGE_SIZE
}
