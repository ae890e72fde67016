//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::command::{self, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User`.
    ///
    /// Blank or absent `status` means `ACTIVE`, and an unknown or absent
    /// `role` means `USER`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_INPUT` - some of the fields are invalid, as detailed in the
    ///                     `fields` extension;
    /// - `EMAIL_OCCUPIED` - provided email is used by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
            role = ?role,
            status = ?status,
        ),
    )]
    pub async fn create_user(
        name: String,
        email: String,
        status: Option<String>,
        role: Option<String>,
        avatar: Option<String>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::CreateUser {
                name,
                email,
                status,
                role,
                avatar,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.failure())
            .map(Into::into)
    }

    /// Updates the specified `User`.
    ///
    /// Absent fields, as well as blank `name`, `email`, `status` or `role`,
    /// are left unchanged. A blank `avatar` removes it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_INPUT` - some of the fields are invalid, as detailed in the
    ///                     `fields` extension;
    /// - `EMAIL_OCCUPIED` - provided email is used by another `User`;
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            email = ?email,
            gql.name = "updateUser",
            id = %id,
            name = ?name,
            otel.name = Self::SPAN_NAME,
            role = ?role,
            status = ?status,
        ),
    )]
    pub async fn update_user(
        id: api::user::Id,
        name: Option<String>,
        email: Option<String>,
        status: Option<String>,
        role: Option<String>,
        avatar: Option<String>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::UpdateUser {
                id: id.into(),
                name,
                email,
                status,
                role,
                avatar,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.failure())
            .map(Into::into)
    }

    /// Requests deletion of the specified `User`.
    ///
    /// The returned ticket must be passed to `deleteUser` to confirm the
    /// deletion before it expires.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "requestUserDeletion",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn request_user_deletion(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::user::deletion::Request, Error> {
        ctx.service()
            .execute(command::RequestUserDeletion { user_id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.failure())
            .map(Into::into)
    }

    /// Deletes the `User` confirmed by the provided ticket.
    ///
    /// Returns the deleted `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_TICKET` - the ticket is malformed, forged or expired;
    /// - `USER_NOT_EXISTS` - the `User` doesn't exist anymore.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_user(
        ticket: api::user::deletion::Ticket,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::DeleteUser {
                token: ticket.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.failure())
            .map(Into::into)
    }

    /// Starts removal of the specified `Toast`.
    ///
    /// Returns `false` if there is no such `Toast`, or it's being removed
    /// already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "dismissToast",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub fn dismiss_toast(id: api::toast::Id, ctx: &Context) -> bool {
        ctx.service().toasts().dismiss(&id.into())
    }
}

define_error! {
    enum UserError {
        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Email is used by another `User`"]
        EmailOccupied,

        #[code = "INVALID_INPUT"]
        #[status = BAD_REQUEST]
        #[message = "Provided input is invalid"]
        InvalidInput,

        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(UserError::EmailOccupied.into()),
            Self::InvalidInput(v) => {
                Some(Error::from(UserError::InvalidInput).with_violations(v))
            }
        }
    }
}

impl AsError for command::update_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(UserError::EmailOccupied.into()),
            Self::InvalidInput(v) => {
                Some(Error::from(UserError::InvalidInput).with_violations(v))
            }
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

impl AsError for command::request_user_deletion::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_TICKET"]
                #[status = FORBIDDEN]
                #[message = "Deletion ticket is invalid or expired"]
                InvalidTicket,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidTicket(_) => Some(Error::InvalidTicket.into()),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}
