//! [`User`] read model definition.
//!
//! [`User`]: crate::domain::User

use derive_more::{Deref, From, Into};

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

pub mod list {
    //! [`User`]s list definitions.

    use common::{define_pagination, pagination::Order};
    use url::form_urlencoded;

    use crate::domain::user;
    #[cfg(doc)]
    use crate::domain::User;

    define_pagination!(user::Id, Filter, Field);

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Filter {
        /// Text to be contained in a [`user::Name`] or a [`user::Email`],
        /// case-insensitively.
        pub search: Option<String>,

        /// [`user::Status`] to match exactly.
        pub status: Option<user::Status>,

        /// [`user::Role`] to match exactly.
        pub role: Option<user::Role>,
    }

    /// Field to [`Sort`] a [`User`]s list by.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub enum Field {
        /// [`User::name`].
        Name,

        /// [`User::email`].
        Email,

        /// [`User::created_at`].
        #[default]
        CreatedAt,

        /// [`User::updated_at`].
        UpdatedAt,
    }

    impl Field {
        /// All the [`Field`]s.
        pub const ALL: [Self; 4] =
            [Self::Name, Self::Email, Self::CreatedAt, Self::UpdatedAt];

        /// Returns the name of this [`Field`] as used in a query string.
        #[must_use]
        pub const fn as_str(self) -> &'static str {
            match self {
                Self::Name => "name",
                Self::Email => "email",
                Self::CreatedAt => "createdAt",
                Self::UpdatedAt => "updatedAt",
            }
        }

        /// Parses a [`Field`] out of its name in a query string.
        #[must_use]
        pub fn parse(s: &str) -> Option<Self> {
            Self::ALL.into_iter().find(|f| f.as_str() == s)
        }
    }

    /// Query string parameter which [`Params::with_filter()`] may change.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum FilterParam {
        /// `status` parameter.
        Status,

        /// `role` parameter.
        Role,

        /// `sortBy` parameter.
        SortBy,
    }

    /// Raw parameters of a [`User`]s list, as kept in a query string.
    ///
    /// Values are stored as given, and interpreted leniently by
    /// [`Params::selector()`], so a malformed query string still selects a
    /// meaningful [`Page`].
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Params {
        /// `search` parameter.
        pub search: Option<String>,

        /// `status` parameter.
        pub status: Option<String>,

        /// `role` parameter.
        pub role: Option<String>,

        /// `page` parameter.
        pub page: Option<String>,

        /// `limit` parameter.
        pub limit: Option<String>,

        /// `sortBy` parameter.
        pub sort_by: Option<String>,

        /// `sortOrder` parameter.
        pub sort_order: Option<String>,
    }

    impl Params {
        /// Value of a filter parameter meaning no filtering.
        pub const ALL: &'static str = "all";

        /// Parses [`Params`] out of the provided query string.
        ///
        /// Unknown parameters are ignored, and the last occurrence of a
        /// repeated parameter wins.
        #[must_use]
        pub fn from_query(query: &str) -> Self {
            let mut params = Self::default();
            for (k, v) in form_urlencoded::parse(query.as_bytes()) {
                let slot = match &*k {
                    "search" => &mut params.search,
                    "status" => &mut params.status,
                    "role" => &mut params.role,
                    "page" => &mut params.page,
                    "limit" => &mut params.limit,
                    "sortBy" => &mut params.sort_by,
                    "sortOrder" => &mut params.sort_order,
                    _ => continue,
                };
                *slot = Some(v.into_owned());
            }
            params
        }

        /// Encodes these [`Params`] into a query string.
        ///
        /// Empty parameters are omitted, and the present ones always go in
        /// the same order.
        #[must_use]
        pub fn to_query(&self) -> String {
            let mut query = form_urlencoded::Serializer::new(String::new());
            for (k, v) in [
                ("search", &self.search),
                ("status", &self.status),
                ("role", &self.role),
                ("sortBy", &self.sort_by),
                ("sortOrder", &self.sort_order),
                ("limit", &self.limit),
                ("page", &self.page),
            ] {
                if let Some(v) = v.as_deref().filter(|v| !v.is_empty()) {
                    _ = query.append_pair(k, v);
                }
            }
            query.finish()
        }

        /// Interprets these [`Params`] as a [`Selector`].
        #[must_use]
        pub fn selector(&self) -> Selector {
            /// Returns the trimmed non-blank value of a parameter.
            fn value(param: Option<&String>) -> Option<&str> {
                param.map(|s| s.trim()).filter(|s| !s.is_empty())
            }

            let page = value(self.page.as_ref())
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(1);
            let limit = value(self.limit.as_ref())
                .and_then(|s| s.parse::<u32>().ok())
                .filter(|l| *l > 0)
                .unwrap_or(Arguments::DEFAULT_LIMIT);

            Selector {
                arguments: Arguments::new(page, limit),
                filter: Filter {
                    search: value(self.search.as_ref()).map(str::to_owned),
                    status: value(self.status.as_ref())
                        .and_then(|s| s.parse().ok()),
                    role: value(self.role.as_ref())
                        .and_then(|s| s.parse().ok()),
                },
                sort: Sort {
                    field: value(self.sort_by.as_ref())
                        .and_then(Field::parse)
                        .unwrap_or_default(),
                    order: value(self.sort_order.as_ref())
                        .and_then(Order::parse)
                        .unwrap_or_default(),
                },
            }
        }

        /// Returns these [`Params`] pointing to the provided `page`.
        #[must_use]
        pub fn with_page(&self, page: u32) -> Self {
            Self {
                page: Some(page.to_string()),
                ..self.clone()
            }
        }

        /// Returns these [`Params`] with the provided page `limit`, starting
        /// from the first page.
        #[must_use]
        pub fn with_limit(&self, limit: u32) -> Self {
            Self {
                limit: Some(limit.to_string()),
                page: Some("1".into()),
                ..self.clone()
            }
        }

        /// Returns these [`Params`] with the provided filter parameter set to
        /// the `value`, starting from the first page.
        ///
        /// A blank or [`Params::ALL`] `value` removes the parameter.
        #[must_use]
        pub fn with_filter(&self, param: FilterParam, value: &str) -> Self {
            let value = value.trim();
            let value = (!value.is_empty() && value != Self::ALL)
                .then(|| value.to_owned());

            let mut params = Self {
                page: None,
                ..self.clone()
            };
            *match param {
                FilterParam::Status => &mut params.status,
                FilterParam::Role => &mut params.role,
                FilterParam::SortBy => &mut params.sort_by,
            } = value;
            params
        }

        /// Returns these [`Params`] searching for the provided `value`,
        /// starting from the first page.
        ///
        /// A blank `value` removes the search.
        #[must_use]
        pub fn with_search(&self, value: &str) -> Self {
            let value = value.trim();
            Self {
                search: (!value.is_empty()).then(|| value.to_owned()),
                page: None,
                ..self.clone()
            }
        }

        /// Returns these [`Params`] with the opposite sort [`Order`].
        ///
        /// Anything but an ascending [`Order`] is toggled to the ascending
        /// one.
        #[must_use]
        pub fn toggle_sort_order(&self) -> Self {
            let current = self
                .sort_order
                .as_deref()
                .and_then(Order::parse)
                .unwrap_or_default();
            Self {
                sort_order: Some(current.toggled().as_str().into()),
                ..self.clone()
            }
        }
    }
}

/// Counts of [`User`]s by their [`user::Status`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Total count of [`User`]s.
    pub total: u64,

    /// Count of [`user::Status::Active`] [`User`]s.
    pub active: u64,

    /// Count of [`user::Status::Pending`] [`User`]s.
    pub pending: u64,

    /// Count of [`user::Status::Inactive`] [`User`]s.
    pub inactive: u64,
}

/// Distinct [`user::Role`]s assigned to the existing [`User`]s.
#[derive(Clone, Debug, Default, Deref, Eq, From, Into, PartialEq)]
pub struct Roles(Vec<user::Role>);

#[cfg(test)]
mod spec {
    use common::pagination::Order;

    use crate::domain::user;

    use super::list::{Field, FilterParam, Params};

    fn params(query: &str) -> Params {
        Params::from_query(query)
    }

    #[test]
    fn defaults_for_empty_query() {
        let s = params("").selector();

        assert_eq!(s.arguments.page(), 1);
        assert_eq!(s.arguments.limit(), 10);
        assert_eq!(s.filter.search, None);
        assert_eq!(s.filter.status, None);
        assert_eq!(s.filter.role, None);
        assert_eq!(s.sort.field, Field::CreatedAt);
        assert_eq!(s.sort.order, Order::Descending);
    }

    #[test]
    fn parses_full_query() {
        let s = params(
            "search=+ana+&status=pending&role=Admin&page=3&limit=25\
             &sortBy=email&sortOrder=ASC",
        )
        .selector();

        assert_eq!(s.arguments.page(), 3);
        assert_eq!(s.arguments.limit(), 25);
        assert_eq!(s.arguments.offset(), 50);
        assert_eq!(s.filter.search.as_deref(), Some("ana"));
        assert_eq!(s.filter.status, Some(user::Status::Pending));
        assert_eq!(s.filter.role, Some(user::Role::Admin));
        assert_eq!(s.sort.field, Field::Email);
        assert_eq!(s.sort.order, Order::Ascending);
    }

    #[test]
    fn tolerates_garbage() {
        let s = params(
            "search=%20%20&status=all&role=root&page=-2&limit=abc\
             &sortBy=password&sortOrder=sideways",
        )
        .selector();

        assert_eq!(s.arguments.page(), 1);
        assert_eq!(s.arguments.limit(), 10);
        assert_eq!(s.filter.search, None);
        assert_eq!(s.filter.status, None);
        assert_eq!(s.filter.role, None);
        assert_eq!(s.sort.field, Field::CreatedAt);
        assert_eq!(s.sort.order, Order::Descending);
    }

    #[test]
    fn clamps_limit() {
        assert_eq!(params("limit=0").selector().arguments.limit(), 10);
        assert_eq!(params("limit=1000").selector().arguments.limit(), 100);
        assert_eq!(params("page=0").selector().arguments.page(), 1);
    }

    #[test]
    fn encodes_in_stable_order() {
        let p = params("page=2&sortBy=name&search=a b&status=ACTIVE&x=1");
        assert_eq!(
            p.to_query(),
            "search=a+b&status=ACTIVE&sortBy=name&page=2",
        );
        assert_eq!(Params::default().to_query(), "");
    }

    #[test]
    fn limit_change_resets_page() {
        let p = params("page=4&limit=10").with_limit(25);
        assert_eq!(p.to_query(), "limit=25&page=1");
    }

    #[test]
    fn filter_change_drops_page() {
        let p = params("page=4&role=USER");

        assert_eq!(
            p.with_filter(FilterParam::Status, "PENDING").to_query(),
            "status=PENDING&role=USER",
        );
        assert_eq!(p.with_filter(FilterParam::Role, "all").to_query(), "");
        assert_eq!(p.with_filter(FilterParam::Role, " ").to_query(), "");
        assert_eq!(
            p.with_filter(FilterParam::SortBy, "updatedAt").to_query(),
            "role=USER&sortBy=updatedAt",
        );
    }

    #[test]
    fn search_change_drops_page() {
        let p = params("page=4&search=old");

        assert_eq!(p.with_search("  new ").to_query(), "search=new");
        assert_eq!(p.with_search("").to_query(), "");
    }

    #[test]
    fn toggles_sort_order() {
        assert_eq!(
            params("").toggle_sort_order().to_query(),
            "sortOrder=asc",
        );
        assert_eq!(
            params("sortOrder=asc").toggle_sort_order().to_query(),
            "sortOrder=desc",
        );
        assert_eq!(
            params("sortOrder=desc&page=3").toggle_sort_order().to_query(),
            "sortOrder=asc&page=3",
        );
    }

    #[test]
    fn page_change_keeps_rest() {
        assert_eq!(
            params("status=ACTIVE&page=1").with_page(2).to_query(),
            "status=ACTIVE&page=2",
        );
    }
}
