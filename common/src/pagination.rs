//! Abstractions for offset-based pagination.

/// Requested window of a paginated list.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Arguments {
    /// 1-based number of the requested page.
    page: usize,

    /// Maximum number of items on a page.
    limit: usize,
}

impl Arguments {
    /// Creates new [`Arguments`] out of the optionally provided `page` and
    /// `limit`, falling back to the first page and the `default_limit`.
    ///
    /// [`None`] is returned if:
    /// - `page` is less than `1`;
    /// - `limit` is not in `1..=max_limit` range.
    pub fn new<Num>(
        page: Option<Num>,
        limit: Option<Num>,
        default_limit: usize,
        max_limit: usize,
    ) -> Option<Self>
    where
        Num: TryInto<usize>,
    {
        let page = match page {
            Some(p) => p.try_into().ok()?,
            None => 1,
        };
        let limit = match limit {
            Some(l) => l.try_into().ok()?,
            None => default_limit,
        };
        (page >= 1 && (1..=max_limit).contains(&limit))
            .then_some(Self { page, limit })
    }

    /// Returns the 1-based page number requested by these [`Arguments`].
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Returns the maximum number of items requested by these [`Arguments`].
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of items to skip before the requested page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Information about a [`Page`] relative to the whole result set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Info {
    /// 1-based number of the current [`Page`].
    pub current_page: usize,

    /// Total number of pages in the result set.
    ///
    /// `0` if the result set is empty.
    pub total_pages: usize,

    /// Total number of items in the result set.
    pub total_items: usize,

    /// Maximum number of items on a [`Page`].
    pub items_per_page: usize,

    /// Indicator whether there is a page after the current one.
    pub has_next: bool,

    /// Indicator whether there is a page before the current one.
    pub has_prev: bool,
}

impl Info {
    /// Computes the [`Info`] of the page requested by the provided
    /// [`Arguments`] in a result set of `total_items`.
    #[must_use]
    pub const fn new(arguments: &Arguments, total_items: usize) -> Self {
        let total_pages = total_items.div_ceil(arguments.limit);
        Self {
            current_page: arguments.page,
            total_pages,
            total_items,
            items_per_page: arguments.limit,
            has_next: arguments.page < total_pages,
            has_prev: arguments.page > 1,
        }
    }
}

/// Single page of a paginated list.
#[derive(Clone, Debug)]
pub struct Page<T> {
    /// Items on this [`Page`].
    pub items: Vec<T>,

    /// [`Info`] about this [`Page`].
    pub info: Info,
}

impl<T> Page<T> {
    /// Creates a new [`Page`] of the provided `items` out of `total_items`.
    #[must_use]
    pub fn new(
        arguments: &Arguments,
        items: impl IntoIterator<Item = impl Into<T>>,
        total_items: usize,
    ) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            info: Info::new(arguments, total_items),
        }
    }
}

/// Pagination selector.
#[derive(Clone, Copy, Debug)]
pub struct Selector<F, S> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Filter restricting the result set.
    pub filter: F,

    /// [`Sorting`] of the result set.
    pub sorting: Sorting<S>,
}

/// Sorting of a result set by a single key.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Sorting<S> {
    /// Key to sort by.
    pub by: S,

    /// [`Order`] of sorting.
    pub order: Order,
}

/// Order of sorting.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Order {
    /// Ascending order.
    Ascending,

    /// Descending order.
    #[default]
    Descending,
}

impl Order {
    #[cfg(feature = "postgres")]
    /// Returns SQL keyword representing this [`Order`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    #[cfg(feature = "postgres")]
    /// Returns SQL clause placing `NULL`s as the lowest values in this
    /// [`Order`].
    #[must_use]
    pub const fn nulls(&self) -> &'static str {
        match self {
            Self::Ascending => "NULLS FIRST",
            Self::Descending => "NULLS LAST",
        }
    }
}

/// Defines pagination types of a specific list.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty, $sort_by:ty) => {
        #[doc = "A [`Page`] of [`$node`]s."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "An information about a [`Page`]."]
        pub type Info = $crate::pagination::Info;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "Sorting of a [`Page`]."]
        pub type Sorting = $crate::pagination::Sorting<$sort_by>;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter, $sort_by>;
    };
}

#[cfg(test)]
mod spec {
    #[cfg(feature = "postgres")]
    use super::Order;
    use super::{Arguments, Info, Page};

    fn args(page: usize, limit: usize) -> Arguments {
        Arguments::new(Some(page), Some(limit), 10, 100).unwrap()
    }

    #[test]
    fn arguments_defaults() {
        let args = Arguments::new::<usize>(None, None, 10, 100).unwrap();

        assert_eq!(args.page(), 1);
        assert_eq!(args.limit(), 10);
        assert_eq!(args.offset(), 0);
    }

    #[test]
    fn arguments_bounds() {
        assert!(Arguments::new(Some(0), Some(10), 10, 100).is_none());
        assert!(Arguments::new(Some(-1), Some(10), 10, 100).is_none());
        assert!(Arguments::new(Some(1), Some(0), 10, 100).is_none());
        assert!(Arguments::new(Some(1), Some(101), 10, 100).is_none());

        assert!(Arguments::new(Some(1), Some(1), 10, 100).is_some());
        assert!(Arguments::new(Some(1), Some(100), 10, 100).is_some());
    }

    #[test]
    fn offset() {
        assert_eq!(args(1, 10).offset(), 0);
        assert_eq!(args(2, 10).offset(), 10);
        assert_eq!(args(5, 3).offset(), 12);
        assert_eq!(args(usize::MAX, 100).offset(), usize::MAX);
    }

    #[test]
    fn info_of_last_partial_page() {
        assert_eq!(
            Info::new(&args(2, 10), 12),
            Info {
                current_page: 2,
                total_pages: 2,
                total_items: 12,
                items_per_page: 10,
                has_next: false,
                has_prev: true,
            },
        );
    }

    #[test]
    fn info_of_empty_set() {
        let first = Info::new(&args(1, 10), 0);
        assert_eq!(first.total_pages, 0);
        assert!(!first.has_next);
        assert!(!first.has_prev);

        let third = Info::new(&args(3, 10), 0);
        assert_eq!(third.total_pages, 0);
        assert!(!third.has_next);
        assert!(third.has_prev);
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn nulls_are_lowest_in_both_orders() {
        assert_eq!(Order::Ascending.sql(), "ASC");
        assert_eq!(Order::Ascending.nulls(), "NULLS FIRST");
        assert_eq!(Order::Descending.sql(), "DESC");
        assert_eq!(Order::Descending.nulls(), "NULLS LAST");
    }

    #[test]
    fn info_beyond_last_page() {
        let info = Info::new(&args(7, 5), 12);

        assert_eq!(info.total_pages, 3);
        assert_eq!(info.total_items, 12);
        assert!(!info.has_next);
        assert!(info.has_prev);
    }

    #[test]
    fn has_next_iff_more_items_remain() {
        for total in 0..=25 {
            for limit in 1..=7 {
                for page in 1..=6 {
                    let info = Info::new(&args(page, limit), total);

                    assert_eq!(
                        info.has_next,
                        page * limit < total,
                        "page: {page}, limit: {limit}, total: {total}",
                    );
                    assert_eq!(info.total_pages, total.div_ceil(limit));
                    assert_eq!(info.has_prev, page > 1);
                }
            }
        }
    }

    #[test]
    fn page_converts_items() {
        let page = Page::<i64>::new(&args(1, 10), [1_i32, 2, 3], 3);

        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.info.total_pages, 1);
    }
}
