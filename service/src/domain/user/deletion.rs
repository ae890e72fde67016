//! [`Ticket`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Confirmed intention to delete a [`User`].
///
/// Issued when deletion is requested, and must be presented back to actually
/// delete the [`User`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Ticket {
    /// ID of the [`User`] to be deleted.
    pub user_id: user::Id,

    /// [`DateTime`] when this [`Ticket`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Signed representation of a [`Ticket`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
#[as_ref(str, String)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a signed [`Ticket`].
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of a [`Ticket`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Ticket, unit::Expiration)>;
