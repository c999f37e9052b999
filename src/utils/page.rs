use crate::utils::AppError;

/// One page of a list that the API returns unpaginated
#[derive(Debug)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub current_page: usize,
    pub total_pages: usize,
}

impl<'a, T> Page<'a, T> {
    /// Slice out page `page_num` (1-based); an empty list has a single empty page
    pub fn of(items: &'a [T], page_num: usize, items_per_page: usize) -> Result<Self, AppError> {
        let per_page = items_per_page.max(1);
        let total_pages = items.len().div_ceil(per_page).max(1);

        if page_num < 1 || page_num > total_pages {
            return Err(AppError::InvalidInput(format!(
                "Invalid page number. This list has {} page(s)",
                total_pages
            )));
        }

        let start = (page_num - 1) * per_page;
        let end = std::cmp::min(start + per_page, items.len());

        Ok(Page {
            items: &items[start..end],
            current_page: page_num,
            total_pages,
        })
    }

    pub fn is_first(&self) -> bool {
        self.current_page == 1
    }

    pub fn is_last(&self) -> bool {
        self.current_page == self.total_pages
    }

    /// e.g. `Page 2 of 5 (next: orders 3)`
    pub fn footer(&self, next_command: &str) -> String {
        if self.is_last() {
            format!("Page {} of {}", self.current_page, self.total_pages)
        } else {
            format!(
                "Page {} of {} (next: {} {})",
                self.current_page,
                self.total_pages,
                next_command,
                self.current_page + 1
            )
        }
    }
}

/// Footer for lists the API paginates itself
pub fn server_footer(current_page: u32, total_pages: u32, next_command: &str) -> String {
    if total_pages == 0 || current_page >= total_pages {
        format!("Page {} of {}", current_page, total_pages.max(current_page))
    } else {
        format!(
            "Page {} of {} (next: {} {})",
            current_page,
            total_pages,
            next_command,
            current_page + 1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_slice_items() {
        let items: Vec<u32> = (1..=25).collect();

        let first = Page::of(&items, 1, 10).unwrap();
        assert_eq!(first.items, &items[0..10]);
        assert_eq!(first.total_pages, 3);
        assert!(first.is_first());

        let last = Page::of(&items, 3, 10).unwrap();
        assert_eq!(last.items, &[21, 22, 23, 24, 25]);
        assert!(last.is_last());
        assert_eq!(last.footer("orders"), "Page 3 of 3");
        assert_eq!(first.footer("orders"), "Page 1 of 3 (next: orders 2)");
    }

    #[test]
    fn test_out_of_range_page() {
        let items = vec!["a", "b"];
        assert!(Page::of(&items, 0, 10).is_err());
        assert!(Page::of(&items, 2, 10).is_err());

        let empty: Vec<&str> = Vec::new();
        let page = Page::of(&empty, 1, 10).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_server_footer() {
        assert_eq!(server_footer(1, 4, "products"), "Page 1 of 4 (next: products 2)");
        assert_eq!(server_footer(4, 4, "products"), "Page 4 of 4");
        assert_eq!(server_footer(1, 0, "products"), "Page 1 of 1");
    }
}
