//! Validation of raw [`User`] form input.

use std::{collections::BTreeMap, fmt};

use common::define_kind;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

define_kind! {
    #[doc = "Reason of a form field being rejected."]
    enum Violation {
        #[doc = "Field is blank, but must be provided."]
        Required,

        #[doc = "Field has an unacceptable value."]
        Invalid,

        #[doc = "Field is malformed."]
        InvalidFormat,
    }
}

/// All the [`Violation`]s found in a form, by the names of its fields.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Violations(BTreeMap<&'static str, Violation>);

impl Violations {
    /// Indicates whether no [`Violation`]s were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the [`Violation`] of the provided `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Violation> {
        self.0.get(field).copied()
    }

    /// Iterates over the violated fields, in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Violation)> + '_ {
        self.0.iter().map(|(f, v)| (*f, *v))
    }

    /// Records the [`Violation`] of the provided `field`.
    fn add(&mut self, field: &'static str, violation: Violation) {
        _ = self.0.insert(field, violation);
    }

    /// Returns these [`Violations`] as an error, if there are any.
    pub(crate) fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Checks the raw `name` field.
    pub(crate) fn name(&mut self, raw: &str) -> Option<user::Name> {
        let raw = raw.trim();
        if raw.is_empty() {
            self.add("name", Violation::Required);
            return None;
        }
        let name = user::Name::new(raw);
        if name.is_none() {
            self.add("name", Violation::Invalid);
        }
        name
    }

    /// Checks the raw `email` field.
    pub(crate) fn email(&mut self, raw: &str) -> Option<user::Email> {
        if raw.trim().is_empty() {
            self.add("email", Violation::Required);
            return None;
        }
        let email = user::Email::new(raw);
        if email.is_none() {
            self.add("email", Violation::InvalidFormat);
        }
        email
    }

    /// Checks the raw `status` field.
    ///
    /// [`None`] is returned for a blank field without any [`Violation`].
    pub(crate) fn status(&mut self, raw: &str) -> Option<user::Status> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let status = raw.parse().ok();
        if status.is_none() {
            self.add("status", Violation::Invalid);
        }
        status
    }

    /// Checks the raw `avatar` field.
    ///
    /// `Some(None)` is returned for a blank field, meaning no [`user::Avatar`]
    /// at all.
    pub(crate) fn avatar(&mut self, raw: &str) -> Option<Option<user::Avatar>> {
        if raw.trim().is_empty() {
            return Some(None);
        }
        let avatar = user::Avatar::new(raw);
        if avatar.is_none() {
            self.add("avatar", Violation::InvalidFormat);
            return None;
        }
        Some(avatar)
    }
}

impl FromIterator<(&'static str, Violation)> for Violations {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Violation)>,
    {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, violation)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "`{field}` is {violation}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::user;

    use super::{Violation, Violations};

    #[test]
    fn collects_all_violations() {
        let mut v = Violations::default();
        assert!(v.name("  ").is_none());
        assert!(v.email("not-an-email").is_none());
        assert!(v.status("ARCHIVED").is_none());
        assert!(v.avatar("ftp://x.org/a.png").is_none());

        assert_eq!(v.get("name"), Some(Violation::Required));
        assert_eq!(v.get("email"), Some(Violation::InvalidFormat));
        assert_eq!(v.get("status"), Some(Violation::Invalid));
        assert_eq!(v.get("avatar"), Some(Violation::InvalidFormat));
        assert_eq!(
            v.to_string(),
            "`avatar` is INVALID_FORMAT, `email` is INVALID_FORMAT, \
             `name` is REQUIRED, `status` is INVALID",
        );
        assert!(v.into_result().is_err());
    }

    #[test]
    fn accepts_valid_input() {
        let mut v = Violations::default();
        assert_eq!(v.name(" Ana Costa ").unwrap().to_string(), "Ana Costa");
        assert_eq!(
            v.email(" Ana@Example.com").unwrap().to_string(),
            "ana@example.com",
        );
        assert_eq!(v.status("pending"), Some(user::Status::Pending));
        assert_eq!(v.status(" "), None);
        assert_eq!(v.avatar(""), Some(None));
        assert!(v.avatar("https://i.pravatar.cc/150?u=ana").unwrap().is_some());
        assert!(v.into_result().is_ok());
    }

    #[test]
    fn distinguishes_required_email() {
        let mut v = Violations::default();
        assert!(v.email("").is_none());
        assert_eq!(v.get("email"), Some(Violation::Required));
    }

    #[test]
    fn rejects_too_long_name() {
        let mut v = Violations::default();
        assert!(v.name(&"a".repeat(user::Name::MAX_LEN + 1)).is_none());
        assert_eq!(v.get("name"), Some(Violation::Invalid));
    }
}
