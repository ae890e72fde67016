//! [`Database`]-related implementations.

#[cfg(test)]
pub mod mock;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    #[cfg(test)]
    /// [`mock::Mock`] error.
    Mock(mock::Error),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of a unique constraint.
    ///
    /// Any unique constraint matches if no `constraint` name is specified.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match *self {
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.is_unique_violation(constraint),
            #[cfg(test)]
            Self::Mock(e) => matches!(e, mock::Error::UniqueViolation),
        }
    }
}
