//! [`Command`] for replacing all the [`User`]s with the sample ones.

use std::time::Duration;

use common::{
    operations::{By, Commit, Delete, Insert, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for replacing all the existing [`User`]s with the sample ones.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeedUsers;

impl SeedUsers {
    /// Sample [`User`]s as `(name, email, status, role)`.
    const SAMPLES: [(&'static str, &'static str, user::Status, user::Role);
        16] = {
        use user::{Role as R, Status as S};

        [
            ("João Silva", "joao@example.com", S::Active, R::Admin),
            ("Maria Santos", "maria@example.com", S::Active, R::User),
            ("Pedro Oliveira", "pedro@example.com", S::Pending, R::User),
            ("Ana Costa", "ana@example.com", S::Inactive, R::Moderator),
            ("Carlos Mendes", "carlos@example.com", S::Active, R::User),
            ("Lucia Ferreira", "lucia@example.com", S::Active, R::User),
            ("Roberto Ferreira", "roberto@example.com", S::Pending, R::User),
            (
                "Lucia Almeida",
                "lucia.almeida@example.com",
                S::Active,
                R::Moderator,
            ),
            ("Fernando Costa", "fernando@example.com", S::Inactive, R::User),
            ("Patricia Silva", "patricia@example.com", S::Active, R::Admin),
            ("Ricardo Santos", "ricardo@example.com", S::Pending, R::User),
            ("Amanda Oliveira", "amanda@example.com", S::Active, R::User),
            ("Bruno Mendes", "bruno@example.com", S::Inactive, R::Moderator),
            ("Camila Lima", "camila@example.com", S::Active, R::User),
            ("Diego Rocha", "diego@example.com", S::Pending, R::User),
            ("Eduarda Pinto", "eduarda@example.com", S::Active, R::Admin),
        ]
    };

    /// Builds the sample [`User`]s.
    ///
    /// Creation times grow in the listed order, so the newest-first listing
    /// is stable.
    fn users() -> Vec<User> {
        let now = DateTime::now();
        (0..)
            .zip(Self::SAMPLES)
            .filter_map(|(i, (name, email, status, role))| {
                let local = email.split('@').next()?;
                let created_at = (now + Duration::from_millis(i)).coerce();
                Some(User {
                    id: user::Id::new(),
                    name: user::Name::new(name)?,
                    email: user::Email::new(email)?,
                    status,
                    role,
                    avatar: user::Avatar::new(format!(
                        "https://i.pravatar.cc/150?u={local}",
                    )),
                    created_at,
                    updated_at: created_at.coerce(),
                })
            })
            .collect()
    }
}

impl<Db> Command<SeedUsers> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Delete<By<Vec<User>, ()>>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = usize;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: SeedUsers) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let removed = tx
            .execute(Delete(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tracing::info!("Removed {removed} existing `User`s");

        let users = SeedUsers::users();
        let count = users.len();
        for user in users {
            tx.execute(Insert(user))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(count)
    }
}

/// Error of [`SeedUsers`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use std::collections::HashSet;

    use crate::domain::user::{Role, Status};

    use super::SeedUsers;

    #[test]
    fn builds_every_sample() {
        let users = SeedUsers::users();
        assert_eq!(users.len(), SeedUsers::SAMPLES.len());

        let emails = users.iter().map(|u| &u.email).collect::<HashSet<_>>();
        assert_eq!(emails.len(), users.len());

        assert!(users.windows(2).all(|w| w[0].created_at < w[1].created_at));
    }

    #[test]
    fn derives_avatars_from_emails() {
        let users = SeedUsers::users();
        let lucia = users
            .iter()
            .find(|u| u.email.to_string() == "lucia.almeida@example.com")
            .unwrap();

        assert_eq!(
            lucia.avatar.as_ref().map(ToString::to_string).as_deref(),
            Some("https://i.pravatar.cc/150?u=lucia.almeida"),
        );
        assert_eq!(lucia.role, Role::Moderator);
        assert_eq!(lucia.status, Status::Active);
    }

    #[test]
    fn covers_every_role_and_status() {
        let users = SeedUsers::users();
        for &role in Role::ALL {
            assert!(users.iter().any(|u| u.role == role), "{role}");
        }
        for &status in Status::ALL {
            assert!(users.iter().any(|u| u.status == status), "{status}");
        }
    }
}
