//! In-memory [`Database`] for testing [`Command`]s.
//!
//! [`Command`]: crate::Command

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use common::{
    operations::{By, Commit, Delete, Insert, Lock, Select, Transact, Update},
    DateTime,
};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    notification, Config, Service,
};

/// [`Mock`] database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Write violated a unique constraint.
    #[display("Unique constraint violated")]
    UniqueViolation,

    /// Database is unreachable.
    #[display("Database is unavailable")]
    Unavailable,
}

/// In-memory [`Database`], shared between all its clones.
///
/// Writes are applied immediately, so a [`Transact`]ion is the very same
/// [`Mock`], counting its [`Commit`]s.
#[derive(Clone, Debug, Default)]
pub struct Mock(Arc<Mutex<State>>);

/// State of a [`Mock`].
#[derive(Debug, Default)]
pub struct State {
    /// Stored [`User`]s.
    pub users: HashMap<user::Id, User>,

    /// IDs of the [`User`]s locked at least once.
    pub locked: Vec<user::Id>,

    /// Number of [`Commit`]s performed.
    pub commits: usize,

    /// [`Error`] every [`Insert`] or [`Update`] fails with, if any.
    pub failing_writes: Option<Error>,
}

impl Mock {
    /// Creates a new [`Mock`] storing the provided [`User`]s.
    #[must_use]
    pub fn with(users: impl IntoIterator<Item = User>) -> Self {
        let this = Self::default();
        this.state()
            .users
            .extend(users.into_iter().map(|u| (u.id, u)));
        this
    }

    /// Makes every following [`Insert`] or [`Update`] fail with the provided
    /// [`Error`].
    pub fn fail_writes(&self, err: Error) {
        self.state().failing_writes = Some(err);
    }

    /// Returns the [`State`] of this [`Mock`].
    ///
    /// # Panics
    ///
    /// If a test panicked while holding the [`State`].
    #[must_use]
    pub fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    /// Creates a new [`Service`] on top of this [`Mock`].
    #[must_use]
    pub fn service(&self) -> Service<Self> {
        let config = Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(SECRET),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(SECRET),
            deletion_ticket_ttl: Duration::from_secs(300),
            toasts: notification::Config::default(),
        };
        Service::new(config, self.clone()).0
    }

    /// Stores the provided [`User`], unless writes are failing.
    fn write(&self, user: User) -> Result<(), Traced<database::Error>> {
        let mut state = self.state();
        if let Some(e) = state.failing_writes {
            return Err(tracerr::new!(database::Error::from(e)));
        }
        _ = state.users.insert(user.id, user);
        Ok(())
    }
}

/// Secret signing deletion tickets of a [`Mock::service()`].
pub const SECRET: &[u8] = b"test";

/// Creates a new [`User`] with the provided `name` and `email`, created and
/// updated an hour ago.
///
/// # Panics
///
/// If the `name` or the `email` is invalid.
#[must_use]
pub fn user(name: &str, email: &str) -> User {
    let hour_ago =
        DateTime::from_unix_timestamp(DateTime::now().unix_timestamp() - 3_600)
            .unwrap();
    User {
        id: user::Id::new(),
        name: user::Name::new(name).unwrap(),
        email: user::Email::new(email).unwrap(),
        status: user::Status::default(),
        role: user::Role::default(),
        avatar: None,
        created_at: hour_ago.coerce(),
        updated_at: hour_ago.coerce(),
    }
}

impl Database<Transact> for Mock {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.state().commits += 1;
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Mock {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().users.get(&by.into_inner()).cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for Mock {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .state()
            .users
            .values()
            .find(|u| u.email == *email)
            .cloned())
    }
}

impl Database<Insert<User>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(user)
    }
}

impl Database<Update<User>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(user)
    }
}

impl Database<Delete<By<User, user::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.state().users.remove(&by.into_inner());
        Ok(())
    }
}

impl Database<Lock<By<User, user::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state().locked.push(by.into_inner());
        Ok(())
    }
}
