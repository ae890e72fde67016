//! [`User`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::{domain, query, read, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A [`User`] managed through the dashboard.
#[derive(Clone, Debug, From)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`domain::User`] representing this [`User`].
    user: OnceCell<domain::User>,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id.into(),
            user: OnceCell::new_with(Some(user)),
        }
    }
}

impl User {
    /// Returns the [`domain::User`] representing this [`User`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::User`] doesn't exist.
    async fn user(&self, ctx: &Context) -> Result<&domain::User, Error> {
        let id = self.id.into();
        self.user
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::user::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|u| {
                        future::ready(u.ok_or_else(|| {
                            api::query::UserError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A `User` managed through the dashboard.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.user(ctx).await?.name.clone().into())
    }

    /// Email of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn email(&self, ctx: &Context) -> Result<Email, Error> {
        Ok(self.user(ctx).await?.email.clone().into())
    }

    /// Status of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.user(ctx).await?.status.into())
    }

    /// Role of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.role",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn role(&self, ctx: &Context) -> Result<Role, Error> {
        Ok(self.user(ctx).await?.role.into())
    }

    /// Avatar image URL of this `User`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.avatar",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn avatar(
        &self,
        ctx: &Context,
    ) -> Result<Option<Avatar>, Error> {
        Ok(self.user(ctx).await?.avatar.clone().map(Into::into))
    }

    /// `DateTime` when this `User` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.user(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when this `User` was updated last time.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.updatedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn updated_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.user(ctx).await?.updated_at.coerce())
    }
}

/// Unique identifier of a `User`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::user::Id)]
#[into(domain::user::Id)]
#[graphql(name = "UserId", transparent)]
pub struct Id(Uuid);

/// Name of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserName",
    with = scalar::Via::<domain::user::Name>,
)]
pub struct Name(domain::user::Name);

/// Email of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserEmail",
    with = scalar::Via::<domain::user::Email>,
)]
pub struct Email(domain::user::Email);

/// Avatar image URL of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserAvatar",
    with = scalar::Via::<domain::user::Avatar>,
)]
pub struct Avatar(domain::user::Avatar);

/// Status of a `User` account.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "UserStatus")]
pub enum Status {
    /// `User` is active.
    Active,

    /// `User` awaits activation.
    Pending,

    /// `User` is deactivated.
    Inactive,
}

impl From<domain::user::Status> for Status {
    fn from(status: domain::user::Status) -> Self {
        use domain::user::Status as S;

        match status {
            S::Active => Self::Active,
            S::Pending => Self::Pending,
            S::Inactive => Self::Inactive,
        }
    }
}

/// Role of a `User`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "UserRole")]
pub enum Role {
    /// Administrator of the system.
    Admin,

    /// Regular user.
    User,

    /// Moderator of the content.
    Moderator,
}

impl From<domain::user::Role> for Role {
    fn from(role: domain::user::Role) -> Self {
        use domain::user::Role as R;

        match role {
            R::Admin => Self::Admin,
            R::User => Self::User,
            R::Moderator => Self::Moderator,
        }
    }
}

/// Counts of `User`s by their status.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "UserStats")]
pub struct Stats {
    /// Total number of `User`s.
    pub total: i32,

    /// Number of `ACTIVE` `User`s.
    pub active: i32,

    /// Number of `PENDING` `User`s.
    pub pending: i32,

    /// Number of `INACTIVE` `User`s.
    pub inactive: i32,
}

impl From<read::user::Stats> for Stats {
    fn from(stats: read::user::Stats) -> Self {
        let read::user::Stats {
            total,
            active,
            pending,
            inactive,
        } = stats;
        Self {
            total: api::int(total),
            active: api::int(active),
            pending: api::int(pending),
            inactive: api::int(inactive),
        }
    }
}

pub mod deletion {
    //! Definitions related to a [`User`] deletion.
    //!
    //! [`User`]: super::User

    use common::DateTime;
    use derive_more::{AsRef, From, Into};
    use juniper::{GraphQLObject, GraphQLScalar};
    use service::{command, domain};

    use crate::{
        api::{self, scalar},
        Context,
    };

    /// Signed ticket confirming a `User` deletion.
    #[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
    #[graphql(
        name = "UserDeletionTicket",
        with = scalar::Via::<domain::user::deletion::Token>,
    )]
    pub struct Ticket(domain::user::deletion::Token);

    /// Pending deletion of a `User`, awaiting confirmation.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "UserDeletionRequest")]
    pub struct Request {
        /// Ticket to be passed to `deleteUser` for confirming the deletion.
        pub ticket: Ticket,

        /// `User` to be deleted.
        pub user: api::User,

        /// `DateTime` when the `ticket` expires.
        pub expires_at: DateTime,
    }

    impl From<command::request_user_deletion::Output> for Request {
        fn from(output: command::request_user_deletion::Output) -> Self {
            let command::request_user_deletion::Output {
                token,
                user,
                expires_at,
            } = output;
            Self {
                ticket: token.into(),
                user: user.into(),
                expires_at: expires_at.coerce(),
            }
        }
    }
}

pub mod list {
    //! Definitions related to [`User`] list.

    use common::pagination::{Arguments, PageLink};
    use juniper::{graphql_object, GraphQLEnum, GraphQLObject};
    use service::{query, read, Query as _};

    use crate::{api, AsError, Context, Error};

    use super::User;

    /// Page of the [`User`] list, along with the parameters it was selected
    /// with.
    #[derive(Clone, Debug)]
    pub struct Page {
        /// Underlying [`read::user::list::Page`].
        page: read::user::list::Page,

        /// [`read::user::list::Params`] the page was selected with.
        params: read::user::list::Params,
    }

    impl Page {
        /// Creates a new [`Page`] out of the selected one and its parameters.
        #[must_use]
        pub fn new(
            page: read::user::list::Page,
            params: read::user::list::Params,
        ) -> Self {
            Self { page, params }
        }
    }

    /// Page of the `User` list.
    #[graphql_object(name = "UserListPage", context = Context)]
    impl Page {
        /// `User`s on this page, in the requested order.
        #[tracing::instrument(
            skip_all,
            fields(
                gql.name = "UserListPage.nodes",
                otel.name = api::Query::SPAN_NAME,
            ),
        )]
        pub async fn nodes(&self, ctx: &Context) -> Result<Vec<User>, Error> {
            let mut users = ctx
                .service()
                .execute(query::users::ByIds::by(self.page.items.clone()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())?;

            // A `User` deleted in between is skipped.
            Ok(self
                .page
                .items
                .iter()
                .filter_map(|id| users.remove(id))
                .map(Into::into)
                .collect())
        }

        /// Information about this page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo(self.page.info())
        }

        /// Links to the pages around this one, with gaps collapsed.
        #[must_use]
        pub fn pages(&self) -> Vec<PageLinkEntry> {
            let info = self.page.info();
            info.window()
                .into_iter()
                .map(|link| match link {
                    PageLink::Number(n) => PageLinkEntry {
                        number: Some(api::int(n)),
                        is_current: n == info.current_page,
                        is_ellipsis: false,
                        query: Some(self.params.with_page(n).to_query()),
                    },
                    PageLink::Ellipsis => PageLinkEntry {
                        number: None,
                        is_current: false,
                        is_ellipsis: true,
                        query: None,
                    },
                })
                .collect()
        }

        /// Page sizes offered for choosing.
        #[must_use]
        pub fn limit_options(&self) -> Vec<i32> {
            Arguments::LIMIT_OPTIONS.into_iter().map(api::int).collect()
        }

        /// Parameters this page was selected with, as interpreted.
        #[must_use]
        pub fn params(&self) -> Params {
            Params(self.params.clone())
        }

        /// Query strings leading from this page to the related ones.
        #[must_use]
        pub fn query(&self) -> Query {
            Query {
                params: self.params.clone(),
                info: self.page.info(),
            }
        }
    }

    /// Information about a [`Page`].
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo(read::user::list::PageInfo);

    /// Information about a `UserListPage`.
    #[graphql_object(name = "UserListPageInfo", context = Context)]
    impl PageInfo {
        /// Number of the current page, starting from 1.
        #[must_use]
        pub fn current_page(&self) -> i32 {
            api::int(self.0.current_page)
        }

        /// Total number of pages.
        #[must_use]
        pub fn total_pages(&self) -> i32 {
            api::int(self.0.total_pages)
        }

        /// Total number of `User`s matching the filters.
        #[must_use]
        pub fn total_items(&self) -> i32 {
            api::int(self.0.total_items)
        }

        /// Maximum number of `User`s on a page.
        #[must_use]
        pub fn limit(&self) -> i32 {
            api::int(self.0.limit)
        }

        /// Position of the first `User` on the page, or `0` if it's empty.
        #[must_use]
        pub fn start_item(&self) -> i32 {
            api::int(self.0.start_item)
        }

        /// Position of the last `User` up to the page, never exceeding the
        /// total number of `User`s.
        #[must_use]
        pub fn end_item(&self) -> i32 {
            api::int(self.0.end_item)
        }

        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.0.has_next_page()
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.0.has_previous_page()
        }
    }

    /// Entry of the page links of a `UserListPage`.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(name = "UserListPageLink")]
    pub struct PageLinkEntry {
        /// Number of the linked page, absent for a gap.
        pub number: Option<i32>,

        /// Indicator whether this entry links the current page.
        pub is_current: bool,

        /// Indicator whether this entry is a gap between the page numbers.
        pub is_ellipsis: bool,

        /// Query string of the linked page, absent for a gap.
        pub query: Option<String>,
    }

    /// Interpreted parameters of a [`Page`].
    #[derive(Clone, Debug)]
    pub struct Params(read::user::list::Params);

    /// Interpreted parameters of a `UserListPage`.
    #[graphql_object(name = "UserListParams", context = Context)]
    impl Params {
        /// Searched text, if any.
        #[must_use]
        pub fn search(&self) -> Option<String> {
            self.0.selector().filter.search
        }

        /// Status filter, if any.
        #[must_use]
        pub fn status(&self) -> Option<api::user::Status> {
            self.0.selector().filter.status.map(Into::into)
        }

        /// Role filter, if any.
        #[must_use]
        pub fn role(&self) -> Option<api::user::Role> {
            self.0.selector().filter.role.map(Into::into)
        }

        /// Field the list is sorted by.
        #[must_use]
        pub fn sort_by(&self) -> String {
            self.0.selector().sort.field.as_str().to_owned()
        }

        /// Sort order of the list, either `asc` or `desc`.
        #[must_use]
        pub fn sort_order(&self) -> String {
            self.0.selector().sort.order.as_str().to_owned()
        }
    }

    /// Filter parameter of a `User` list query string.
    #[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
    #[graphql(name = "UserListFilterParam")]
    pub enum FilterParam {
        /// `status` parameter.
        Status,

        /// `role` parameter.
        Role,

        /// `sortBy` parameter.
        SortBy,
    }

    impl From<FilterParam> for read::user::list::FilterParam {
        fn from(param: FilterParam) -> Self {
            match param {
                FilterParam::Status => Self::Status,
                FilterParam::Role => Self::Role,
                FilterParam::SortBy => Self::SortBy,
            }
        }
    }

    /// Query strings leading from a [`Page`] to the related ones.
    #[derive(Clone, Debug)]
    pub struct Query {
        /// [`read::user::list::Params`] of the [`Page`].
        params: read::user::list::Params,

        /// [`read::user::list::PageInfo`] of the [`Page`].
        info: read::user::list::PageInfo,
    }

    /// Query strings leading from a `UserListPage` to the related ones.
    #[graphql_object(name = "UserListQuery", context = Context)]
    impl Query {
        /// Query string of the current page.
        #[must_use]
        pub fn current(&self) -> String {
            self.params.to_query()
        }

        /// Query string of the next page, if there is one.
        #[must_use]
        pub fn next_page(&self) -> Option<String> {
            self.info.has_next_page().then(|| {
                self.params
                    .with_page(self.info.current_page + 1)
                    .to_query()
            })
        }

        /// Query string of the previous page, if there is one.
        #[must_use]
        pub fn previous_page(&self) -> Option<String> {
            self.info.has_previous_page().then(|| {
                self.params
                    .with_page(self.info.current_page - 1)
                    .to_query()
            })
        }

        /// Query string with the opposite sort order.
        #[must_use]
        pub fn toggle_sort_order(&self) -> String {
            self.params.toggle_sort_order().to_query()
        }

        /// Query string of the specified page.
        #[must_use]
        pub fn with_page(&self, page: i32) -> String {
            self.params.with_page(api::uint(page)).to_query()
        }

        /// Query string with the specified page size, starting from the first
        /// page.
        #[must_use]
        pub fn with_limit(&self, limit: i32) -> String {
            self.params.with_limit(api::uint(limit)).to_query()
        }

        /// Query string with the specified filter parameter, starting from
        /// the first page.
        ///
        /// A blank or `all` value removes the filter.
        #[must_use]
        pub fn with_filter(
            &self,
            param: FilterParam,
            value: String,
        ) -> String {
            self.params.with_filter(param.into(), &value).to_query()
        }

        /// Query string searching for the specified text, starting from the
        /// first page.
        ///
        /// A blank value removes the search.
        #[must_use]
        pub fn with_search(&self, value: String) -> String {
            self.params.with_search(&value).to_query()
        }
    }
}
