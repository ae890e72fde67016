//! Abstractions for offset-based pagination.

/// Arguments selecting a numbered page of a list.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Arguments {
    /// 1-based number of the page.
    page: u32,

    /// Maximum number of items on the page.
    limit: u32,
}

impl Arguments {
    /// Number of items on a page when nothing else is requested.
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Maximum allowed number of items on a page.
    pub const MAX_LIMIT: u32 = 100;

    /// Page sizes offered for choosing.
    pub const LIMIT_OPTIONS: [u32; 4] = [5, 10, 25, 50];

    /// Creates new [`Arguments`].
    ///
    /// A zero `page` is treated as the first one, and the `limit` is clamped
    /// to the `1..=MAX_LIMIT` range.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Returns 1-based number of the requested page.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns maximum number of items on the requested page.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns number of items preceding the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// A page of items along with the total count of items in the whole list.
#[derive(Clone, Debug)]
pub struct Page<I> {
    /// Items on this [`Page`].
    pub items: Vec<I>,

    /// Total number of items in the whole list.
    pub total: u64,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,
}

impl<I> Page<I> {
    /// Creates a new [`Page`].
    #[must_use]
    pub fn new(
        arguments: Arguments,
        items: impl IntoIterator<Item = I>,
        total: u64,
    ) -> Self {
        Self {
            items: items.into_iter().collect(),
            total,
            arguments,
        }
    }

    /// Returns [`PageInfo`] of this [`Page`].
    #[must_use]
    pub fn info(&self) -> PageInfo {
        PageInfo::new(self.arguments, self.total)
    }
}

/// Information about a [`Page`] position in a list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageInfo {
    /// Number of the current page.
    pub current_page: u32,

    /// Total number of pages.
    pub total_pages: u32,

    /// Total number of items.
    pub total_items: u64,

    /// Maximum number of items on a page.
    pub limit: u32,

    /// 1-based position of the first item on the page, or `0` if the page is
    /// empty.
    pub start_item: u64,

    /// 1-based position of the last item up to the page, capped by the
    /// [`PageInfo::total_items`].
    pub end_item: u64,
}

impl PageInfo {
    /// Number of page links shown on each side of the current one.
    pub const WINDOW_DELTA: u32 = 2;

    /// Computes [`PageInfo`] for the provided [`Arguments`] and total number
    /// of items.
    #[must_use]
    pub fn new(args: Arguments, total: u64) -> Self {
        let limit = u64::from(args.limit());
        let total_pages =
            u32::try_from(total.div_ceil(limit)).unwrap_or(u32::MAX);
        let offset = args.offset();
        let start_item = if offset < total { offset + 1 } else { 0 };
        let end_item = (offset + limit).min(total);
        Self {
            current_page: args.page(),
            total_pages,
            total_items: total,
            limit: args.limit(),
            start_item,
            end_item,
        }
    }

    /// Indicates whether there is a page after the current one.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Indicates whether there is a page before the current one.
    #[must_use]
    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    /// Returns the page links to show for navigating around the current page.
    ///
    /// The first page is always present, the last one is present whenever
    /// there is more than one page, and up to [`WINDOW_DELTA`] pages are shown
    /// on each side of the current one, with gaps collapsed into
    /// [`PageLink::Ellipsis`].
    ///
    /// [`WINDOW_DELTA`]: Self::WINDOW_DELTA
    #[must_use]
    pub fn window(&self) -> Vec<PageLink> {
        let current = i64::from(self.current_page);
        let total = i64::from(self.total_pages);
        let delta = i64::from(Self::WINDOW_DELTA);

        let start = (current - delta).max(2);
        let end = (current + delta).min(total - 1);

        let mut links = vec![PageLink::Number(1)];
        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
        links.extend(
            (start..=end)
                .filter_map(|n| u32::try_from(n).ok())
                .map(PageLink::Number),
        );
        if end < total - 1 {
            links.push(PageLink::Ellipsis);
        }
        if total > 1 {
            links.push(PageLink::Number(self.total_pages));
        }
        links
    }
}

/// Link to a page in a [`PageInfo::window()`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PageLink {
    /// Link to the page with the specified number.
    Number(u32),

    /// Collapsed range of pages.
    Ellipsis,
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
    /// Returns the opposite [`Order`].
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Returns short textual representation of this [`Order`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    /// Parses an [`Order`] out of its short textual representation
    /// (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(Self::Ascending)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Self::Descending)
        } else {
            None
        }
    }

    #[cfg(feature = "postgres")]
    /// Returns SQL keyword representing this [`Order`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Sorting of a list by a `F`ield.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Sort<F> {
    /// Field to sort by.
    pub field: F,

    /// [`Order`] of sorting.
    pub order: Order,
}

/// Page selector.
#[derive(Clone, Debug)]
pub struct Selector<F, S> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the list.
    pub filter: F,

    /// [`Sort`] of the list.
    pub sort: Sort<S>,
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty, $field:ty) => {
        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "An information about a [`Page`]."]
        pub type PageInfo = $crate::pagination::PageInfo;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] sorting."]
        pub type Sort = $crate::pagination::Sort<$field>;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter, $field>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Order, PageInfo, PageLink as L};

    fn window(page: u32, total_pages: u32) -> Vec<L> {
        PageInfo::new(
            Arguments::new(page, 1),
            u64::from(total_pages),
        )
        .window()
    }

    #[test]
    fn arguments_are_normalized() {
        let args = Arguments::new(0, 0);
        assert_eq!((args.page(), args.limit()), (1, 1));

        let args = Arguments::new(3, 1_000);
        assert_eq!((args.page(), args.limit()), (3, Arguments::MAX_LIMIT));
        assert_eq!(args.offset(), 200);

        assert_eq!(Arguments::default().limit(), 10);
    }

    #[test]
    fn computes_info() {
        let info = PageInfo::new(Arguments::new(2, 10), 25);
        assert_eq!(info.total_pages, 3);
        assert_eq!((info.start_item, info.end_item), (11, 20));
        assert!(info.has_next_page());
        assert!(info.has_previous_page());

        let info = PageInfo::new(Arguments::new(3, 10), 25);
        assert_eq!((info.start_item, info.end_item), (21, 25));
        assert!(!info.has_next_page());

        let info = PageInfo::new(Arguments::new(1, 10), 0);
        assert_eq!(info.total_pages, 0);
        assert_eq!((info.start_item, info.end_item), (0, 0));
        assert!(!info.has_next_page());
        assert!(!info.has_previous_page());

    }

    #[test]
    fn caps_end_item_past_last_page() {
        let info = PageInfo::new(Arguments::new(9, 10), 25);
        assert_eq!(info.total_pages, 3);
        assert_eq!((info.start_item, info.end_item), (0, 25));
        assert!(!info.has_next_page());
        assert!(info.has_previous_page());
    }

    #[test]
    fn window_without_gaps() {
        assert_eq!(window(1, 0), [L::Number(1)]);
        assert_eq!(window(1, 1), [L::Number(1)]);
        assert_eq!(window(1, 2), [L::Number(1), L::Number(2)]);
        assert_eq!(
            window(3, 5),
            [1, 2, 3, 4, 5].map(L::Number),
        );
    }

    #[test]
    fn window_with_gaps() {
        assert_eq!(
            window(1, 10),
            [
                L::Number(1),
                L::Number(2),
                L::Number(3),
                L::Ellipsis,
                L::Number(10),
            ],
        );
        assert_eq!(
            window(5, 10),
            [
                L::Number(1),
                L::Ellipsis,
                L::Number(3),
                L::Number(4),
                L::Number(5),
                L::Number(6),
                L::Number(7),
                L::Ellipsis,
                L::Number(10),
            ],
        );
        assert_eq!(
            window(10, 10),
            [
                L::Number(1),
                L::Ellipsis,
                L::Number(8),
                L::Number(9),
                L::Number(10),
            ],
        );
    }

    #[test]
    fn order_round_trips_text() {
        assert_eq!(Order::parse("ASC"), Some(Order::Ascending));
        assert_eq!(Order::parse("desc"), Some(Order::Descending));
        assert_eq!(Order::parse("up"), None);
        assert_eq!(Order::Ascending.toggled(), Order::Descending);
        assert_eq!(Order::default().as_str(), "desc");
    }
}
