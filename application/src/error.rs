//! [`Error`]-related definitions.

use std::fmt;

use derive_more::Error as StdError;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use service::{command::Violations, infra::database, notification};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                            fields: Vec::new(),
                        },
                    )*
                }
            }
        }
    };
}

/// GraphQL API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,

    /// Rejected input fields along with the reasons, if any.
    pub fields: Vec<(&'static str, &'static str)>,
}

impl Error {
    /// [`Code`] of an internal server [`Error`].
    pub const INTERNAL_CODE: Code = "INTERNAL_SERVER_ERROR";

    /// Message shown to dashboard users instead of an internal [`Error`]
    /// details.
    pub const INTERNAL_MESSAGE: &'static str = "Internal server error";

    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: Self::INTERNAL_CODE,
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
            fields: Vec::new(),
        }
    }

    /// Shows this [`Error`] as an error [`notification::Toast`].
    ///
    /// Internal [`Error`]s are shown with [`Error::INTERNAL_MESSAGE`] only, as
    /// the toasts are broadcast to every dashboard.
    pub fn notify(&self, toasts: &notification::Toasts) {
        let message = if self.code == Self::INTERNAL_CODE {
            Self::INTERNAL_MESSAGE
        } else {
            self.message.as_str()
        };
        _ = toasts.show(message, notification::Kind::Error);
    }

    /// Attaches the provided [`Violations`] to this [`Error`].
    #[must_use]
    pub fn with_violations(mut self, violations: &Violations) -> Self {
        self.fields = violations.iter().map(|(f, v)| (f, v.as_str())).collect();
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
            fields: _,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let mut ext = juniper::Object::with_capacity(3);
        drop(
            ext.add_field("code", juniper::Value::scalar(self.code.to_owned())),
        );
        if !self.fields.is_empty() {
            let mut fields = juniper::Object::with_capacity(self.fields.len());
            for (field, reason) in &self.fields {
                drop(fields.add_field(
                    *field,
                    juniper::Value::scalar((*reason).to_owned()),
                ));
            }
            drop(ext.add_field("fields", juniper::Value::object(fields)));
        }
        drop(
            ext.add_field(
                "backtrace",
                juniper::Value::list(
                    self.backtrace
                        .iter()
                        .flat_map(|trace| trace.iter())
                        .map(|frame| juniper::Value::scalar(frame.to_string()))
                        .collect(),
                ),
            ),
        );
        juniper::FieldError::new(self.message, juniper::Value::object(ext))
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use service::{
        command::create_user,
        domain::user,
        infra::{database, postgres},
        notification::{self, Toasts},
    };

    use super::{AsError as _, Error};

    #[tokio::test]
    async fn hides_internal_details_from_toasts() {
        let toasts = Toasts::new(notification::Config::default());
        let err = create_user::ExecutionError::Db(database::Error::Postgres(
            postgres::Error::TransactionFinished,
        ))
        .as_error();
        assert_eq!(err.code, Error::INTERNAL_CODE);
        assert!(err.message.contains("`Database` operation failed"));

        err.notify(&toasts);

        let shown = toasts.snapshot();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].kind, notification::Kind::Error);
        assert_eq!(shown[0].message, Error::INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn shows_domain_errors_as_is() {
        let toasts = Toasts::new(notification::Config::default());
        let email = user::Email::new("ana@example.com").unwrap();

        create_user::ExecutionError::EmailOccupied(email)
            .as_error()
            .notify(&toasts);

        assert_eq!(
            toasts.snapshot()[0].message,
            "Email is used by another `User`",
        );
    }
}
