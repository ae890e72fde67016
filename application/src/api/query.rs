//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "user",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(query::user::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches a page of `User`s.
    ///
    /// Parameters are taken from the `query` string first, and then
    /// overridden by the explicitly specified ones. Malformed values fall
    /// back to their defaults instead of failing.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "users",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
            page = ?page,
            query = ?query,
            role = ?role,
            search = ?search,
            sort_by = ?sort_by,
            sort_order = ?sort_order,
            status = ?status,
        ),
    )]
    pub async fn users(
        query: Option<String>,
        search: Option<String>,
        status: Option<String>,
        role: Option<String>,
        page: Option<String>,
        limit: Option<String>,
        sort_by: Option<String>,
        sort_order: Option<String>,
        ctx: &Context,
    ) -> Result<api::user::list::Page, Error> {
        let base = query
            .as_deref()
            .map(read::user::list::Params::from_query)
            .unwrap_or_default();
        let params = read::user::list::Params {
            search: search.or(base.search),
            status: status.or(base.status),
            role: role.or(base.role),
            page: page.or(base.page),
            limit: limit.or(base.limit),
            sort_by: sort_by.or(base.sort_by),
            sort_order: sort_order.or(base.sort_order),
        };

        ctx.service()
            .execute(query::users::List::by(params.selector()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|page| api::user::list::Page::new(page, params))
    }

    /// Counts `User`s by their status.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "userStats",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user_stats(ctx: &Context) -> Result<api::user::Stats, Error> {
        ctx.service()
            .execute(query::users::Stats::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists the roles assigned to the existing `User`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "userRoles",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user_roles(
        ctx: &Context,
    ) -> Result<Vec<api::user::Role>, Error> {
        ctx.service()
            .execute(query::users::Roles::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|roles| roles.iter().copied().map(Into::into).collect())
    }

    /// Returns the currently shown `Toast`s, in order of showing.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "toasts",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub fn toasts(ctx: &Context) -> Vec<api::Toast> {
        let toasts = ctx.service().toasts();
        api::Toast::stack(toasts.snapshot(), toasts.config())
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
