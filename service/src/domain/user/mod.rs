//! [`User`] definitions.

pub mod deletion;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User managed through the dashboard.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// [`Status`] of this [`User`].
    pub status: Status,

    /// [`Role`] of this [`User`].
    pub role: Role,

    /// [`Avatar`] of this [`User`].
    pub avatar: Option<Avatar>,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`User`] was updated last time.
    pub updated_at: UpdateDateTime,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Maximum length of a [`Name`] in bytes.
    pub const MAX_LEN: usize = 512;

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= Self::MAX_LEN
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`User`].
///
/// Always stored lower-cased, so addresses differing only in case are
/// considered the same.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Maximum length of an [`Email`] in bytes.
    pub const MAX_LEN: usize = 320;

    /// Creates a new [`Email`] if the given `address` is valid.
    ///
    /// The `address` is trimmed and lower-cased before checking.
    #[must_use]
    pub fn new(address: impl AsRef<str>) -> Option<Self> {
        let address = address.as_ref().trim().to_lowercase();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format: something without
        /// whitespace and `@` on each side of a single `@`, with a dot in the
        /// domain part.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= Self::MAX_LEN && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// URL of a [`User`]'s avatar image.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Avatar(String);

impl Avatar {
    /// Maximum length of an [`Avatar`] URL in bytes.
    pub const MAX_LEN: usize = 2048;

    /// Creates a new [`Avatar`] if the given `url` is an absolute HTTP(S)
    /// URL.
    #[must_use]
    pub fn new(url: impl AsRef<str>) -> Option<Self> {
        let url = url.as_ref().trim();
        if url.len() > Self::MAX_LEN {
            return None;
        }
        let parsed = url::Url::parse(url).ok()?;
        (matches!(parsed.scheme(), "http" | "https") && parsed.has_host())
            .then(|| Self(url.to_owned()))
    }
}

impl FromStr for Avatar {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Avatar`")
    }
}

define_kind! {
    #[doc = "Status of a [`User`] account."]
    enum Status {
        #[doc = "[`User`] is active."]
        Active,

        #[doc = "[`User`] awaits activation."]
        Pending,

        #[doc = "[`User`] is deactivated."]
        Inactive,
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Active
    }
}

define_kind! {
    #[doc = "Role of a [`User`]."]
    enum Role {
        #[doc = "Administrator of the system."]
        Admin,

        #[doc = "Regular user."]
        User,

        #[doc = "Moderator of the content."]
        Moderator,
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl Role {
    /// Parses a [`Role`] submitted by a form, falling back to the
    /// [`Role::default()`] on missing, blank or unknown input.
    #[must_use]
    pub fn parse_lenient(input: Option<&str>) -> Self {
        input
            .map(str::trim)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was updated.
pub type UpdateDateTime = DateTimeOf<(User, unit::Update)>;

#[cfg(test)]
mod spec {
    use super::{Avatar, Email, Name, Role, Status};

    #[test]
    fn name_rejects_blank_and_padded() {
        assert!(Name::new("Ana Costa").is_some());
        assert!(Name::new("").is_none());
        assert!(Name::new(" Ana").is_none());
        assert!(Name::new("x".repeat(Name::MAX_LEN + 1)).is_none());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(
            Email::new("  Joao@Example.COM ").unwrap().to_string(),
            "joao@example.com",
        );
    }

    #[test]
    fn email_format() {
        assert!(Email::new("lucia.almeida@example.com").is_some());
        assert!(Email::new("a@b.c").is_some());

        assert!(Email::new("").is_none());
        assert!(Email::new("joao").is_none());
        assert!(Email::new("joao@example").is_none());
        assert!(Email::new("jo ao@example.com").is_none());
        assert!(Email::new("joao@@example.com").is_none());
    }

    #[test]
    fn avatar_must_be_http_url() {
        assert!(Avatar::new("https://i.pravatar.cc/150?u=ana").is_some());
        assert!(Avatar::new("http://example.com/a.png").is_some());

        assert!(Avatar::new("ftp://example.com/a.png").is_none());
        assert!(Avatar::new("example.com/a.png").is_none());
        assert!(Avatar::new("").is_none());
    }

    #[test]
    fn defaults() {
        assert_eq!(Status::default(), Status::Active);
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn role_lenient_parsing() {
        assert_eq!(Role::parse_lenient(None), Role::User);
        assert_eq!(Role::parse_lenient(Some("  ")), Role::User);
        assert_eq!(Role::parse_lenient(Some("admin")), Role::Admin);
        assert_eq!(Role::parse_lenient(Some("MODERATOR")), Role::Moderator);
        assert_eq!(Role::parse_lenient(Some("superuser")), Role::User);
    }
}
