/// Fixed size of every folder listing page.
pub const PAGE_SIZE: u64 = 30;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paginated<T> {
    /// Zero-based page index.
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub items: Vec<T>,
}

/// Lenient page parsing: anything that is not a non-negative integer means page 0.
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .map(|page| page.max(0) as u64)
        .unwrap_or(0)
}

/// Slices an already ordered list into the requested zero-based page.
pub fn paginate_vec<T>(items: Vec<T>, page: u64, limit: u64) -> Paginated<T> {
    let total = items.len() as u64;
    let start = page.saturating_mul(limit);
    let items = if start >= total {
        Vec::new()
    } else {
        items
            .into_iter()
            .skip(start as usize)
            .take(limit as usize)
            .collect()
    };
    Paginated {
        page,
        limit,
        total,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_zero_based() {
        let items: Vec<u32> = (0..65).collect();
        let first = paginate_vec(items.clone(), 0, PAGE_SIZE);
        assert_eq!(first.total, 65);
        assert_eq!(first.items.len(), 30);
        assert_eq!(first.items[0], 0);

        let last = paginate_vec(items.clone(), 2, PAGE_SIZE);
        assert_eq!(last.items, vec![60, 61, 62, 63, 64]);

        let beyond = paginate_vec(items, 9, PAGE_SIZE);
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 65);
        assert_eq!(beyond.page, 9);
    }

    #[test]
    fn page_parameter_is_lenient() {
        assert_eq!(parse_page(None), 0);
        assert_eq!(parse_page(Some("3")), 3);
        assert_eq!(parse_page(Some("-2")), 0);
        assert_eq!(parse_page(Some("two")), 0);
    }
}
