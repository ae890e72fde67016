//! [`Command`] for updating an existing [`User`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    notification, Service,
};

use super::{input::Violations, Command};

/// [`Command`] for updating an existing [`User`].
///
/// Fields are raw, as submitted by a form. Absent or blank fields are left
/// unchanged, except the `avatar` which is removed by a blank value.
#[derive(Clone, Debug)]
pub struct UpdateUser {
    /// ID of the [`User`] to update.
    pub id: user::Id,

    /// New [`user::Name`] of the [`User`].
    pub name: Option<String>,

    /// New [`user::Email`] of the [`User`].
    pub email: Option<String>,

    /// New [`user::Status`] of the [`User`].
    pub status: Option<String>,

    /// New [`user::Role`] of the [`User`].
    ///
    /// Parsed leniently with [`user::Role::parse_lenient()`].
    pub role: Option<String>,

    /// New [`user::Avatar`] of the [`User`].
    pub avatar: Option<String>,
}

impl UpdateUser {
    /// Validates this [`UpdateUser`] input, reporting all its violations at
    /// once.
    fn validate(&self) -> Result<Changes, Violations> {
        /// Returns the field value, unless it's absent or blank.
        fn given(field: Option<&String>) -> Option<&str> {
            field.map(String::as_str).filter(|s| !s.trim().is_empty())
        }

        let mut violations = Violations::default();
        let changes = Changes {
            name: given(self.name.as_ref()).and_then(|n| violations.name(n)),
            email: given(self.email.as_ref())
                .and_then(|e| violations.email(e)),
            status: self.status.as_deref().and_then(|s| violations.status(s)),
            role: given(self.role.as_ref())
                .map(|r| user::Role::parse_lenient(Some(r))),
            avatar: self.avatar.as_deref().and_then(|a| violations.avatar(a)),
        };
        violations.into_result().map(|()| changes)
    }
}

/// Validated changes of an [`UpdateUser`] [`Command`].
///
/// [`None`] means no change.
#[derive(Debug, Default)]
struct Changes {
    /// New [`user::Name`].
    name: Option<user::Name>,

    /// New [`user::Email`].
    email: Option<user::Email>,

    /// New [`user::Status`].
    status: Option<user::Status>,

    /// New [`user::Role`].
    role: Option<user::Role>,

    /// New [`user::Avatar`], or its removal.
    avatar: Option<Option<user::Avatar>>,
}

impl Changes {
    /// Applies these [`Changes`] to the provided [`User`].
    ///
    /// Returns `false` if the [`User`] stays the same.
    fn apply(self, user: &mut User) -> bool {
        /// Replaces the `current` value with the `new` one, if it differs.
        fn set<T: PartialEq>(current: &mut T, new: Option<T>) -> bool {
            match new {
                Some(new) if *current != new => {
                    *current = new;
                    true
                }
                _ => false,
            }
        }

        let Self {
            name,
            email,
            status,
            role,
            avatar,
        } = self;

        // Non-short-circuiting `|` applies every change.
        set(&mut user.name, name)
            | set(&mut user.email, email)
            | set(&mut user.status, status)
            | set(&mut user.role, role)
            | set(&mut user.avatar, avatar)
    }
}

impl<Db> Command<UpdateUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let changes = cmd
            .validate()
            .map_err(E::InvalidInput)
            .map_err(tracerr::wrap!())?;
        let user_id = cmd.id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        if let Some(email) = changes.email.as_ref().filter(|e| **e != user.email)
        {
            let owner = tx
                .execute(Select(By::new(email)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if owner.is_some() {
                return Err(tracerr::new!(E::EmailOccupied(email.clone())));
            }
        }

        if !changes.apply(&mut user) {
            return Ok(user);
        }
        user.updated_at = DateTime::now().coerce();

        let updated = tx.execute(Update(user.clone())).await;
        // Lost a race with another `User` taking the same `user::Email`.
        if updated
            .as_ref()
            .is_err_and(|e| e.as_ref().is_unique_violation(None))
        {
            return Err(tracerr::new!(E::EmailOccupied(user.email)));
        }
        updated.map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        _ = self.toasts().show(
            format!("User `{}` updated", user.name),
            notification::Kind::Success,
        );

        Ok(user)
    }
}

/// Error of [`UpdateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Email`] is already used by another [`User`].
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),

    /// Input is invalid.
    #[display("Invalid input: {_0}")]
    #[from(ignore)]
    InvalidInput(#[error(not(source))] Violations),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        command::{input::Violation, Command as _},
        domain::{user, User},
        infra::database::mock::{self, Mock},
        notification,
    };

    use super::{ExecutionError, UpdateUser};

    fn user() -> User {
        User {
            id: user::Id::new(),
            name: user::Name::new("Ana Costa").unwrap(),
            email: user::Email::new("ana@example.com").unwrap(),
            status: user::Status::Active,
            role: user::Role::Moderator,
            avatar: user::Avatar::new("https://i.pravatar.cc/150?u=ana"),
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        }
    }

    fn update(user: &User) -> UpdateUser {
        UpdateUser {
            id: user.id,
            name: None,
            email: None,
            status: None,
            role: None,
            avatar: None,
        }
    }

    #[test]
    fn blank_fields_change_nothing() {
        let mut u = user();
        let cmd = UpdateUser {
            name: Some(" ".into()),
            email: Some(String::new()),
            status: Some(String::new()),
            role: Some("  ".into()),
            ..update(&u)
        };

        assert!(!cmd.validate().unwrap().apply(&mut u));
        assert_eq!(u.role, user::Role::Moderator);
    }

    #[test]
    fn same_values_change_nothing() {
        let mut u = user();
        let cmd = UpdateUser {
            name: Some("Ana Costa".into()),
            email: Some("ANA@example.com".into()),
            status: Some("active".into()),
            ..update(&u)
        };

        assert!(!cmd.validate().unwrap().apply(&mut u));
    }

    #[test]
    fn applies_changes() {
        let mut u = user();
        let cmd = UpdateUser {
            email: Some("ana.costa@example.com".into()),
            role: Some("unknown".into()),
            ..update(&u)
        };

        assert!(cmd.validate().unwrap().apply(&mut u));
        assert_eq!(u.email.to_string(), "ana.costa@example.com");
        assert_eq!(u.role, user::Role::User);
        assert_eq!(u.name.to_string(), "Ana Costa");
    }

    #[test]
    fn blank_avatar_removes_it() {
        let mut u = user();
        let cmd = UpdateUser {
            avatar: Some(String::new()),
            ..update(&u)
        };

        assert!(cmd.validate().unwrap().apply(&mut u));
        assert_eq!(u.avatar, None);
    }

    #[test]
    fn reports_violations() {
        let u = user();
        let v = UpdateUser {
            email: Some("ana at example".into()),
            status: Some("retired".into()),
            avatar: Some("avatar.png".into()),
            ..update(&u)
        }
        .validate()
        .unwrap_err();

        assert_eq!(v.get("email"), Some(Violation::InvalidFormat));
        assert_eq!(v.get("status"), Some(Violation::Invalid));
        assert_eq!(v.get("avatar"), Some(Violation::InvalidFormat));
        assert_eq!(v.get("name"), None);
    }

    #[tokio::test]
    async fn updates_and_notifies() {
        let ana = mock::user("Ana Costa", "ana@example.com");
        let db = Mock::with([ana.clone()]);
        let svc = db.service();

        let updated = svc
            .execute(UpdateUser {
                name: Some("Ana Lima".into()),
                ..update(&ana)
            })
            .await
            .unwrap();

        assert_eq!(updated.name.to_string(), "Ana Lima");
        assert!(updated.updated_at > ana.updated_at);
        assert_eq!(updated.created_at, ana.created_at);
        {
            let state = db.state();
            assert_eq!(state.commits, 1);
            assert_eq!(state.locked, [ana.id]);
            assert_eq!(state.users[&ana.id].name.to_string(), "Ana Lima");
        }

        let toasts = svc.toasts().snapshot();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, notification::Kind::Success);
        assert_eq!(toasts[0].message, "User `Ana Lima` updated");
    }

    #[tokio::test]
    async fn noop_keeps_updated_at() {
        let ana = mock::user("Ana Costa", "ana@example.com");
        let db = Mock::with([ana.clone()]);
        let svc = db.service();

        let same = svc
            .execute(UpdateUser {
                name: Some("Ana Costa".into()),
                email: Some("ANA@example.com".into()),
                ..update(&ana)
            })
            .await
            .unwrap();

        assert_eq!(same.updated_at, ana.updated_at);
        assert_eq!(db.state().users[&ana.id].updated_at, ana.updated_at);
        assert_eq!(db.state().commits, 0);
        assert!(svc.toasts().snapshot().is_empty());
    }

    #[tokio::test]
    async fn rejects_missing_user() {
        let db = Mock::default();
        let svc = db.service();
        let ghost = user();

        let err = svc
            .execute(UpdateUser {
                name: Some("Nobody".into()),
                ..update(&ghost)
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == ghost.id,
        ));
        assert!(db.state().users.is_empty());
        assert!(svc.toasts().snapshot().is_empty());
    }

    #[tokio::test]
    async fn rejects_email_of_another_user() {
        let ana = mock::user("Ana Costa", "ana@example.com");
        let bia = mock::user("Bia Souza", "bia@example.com");
        let db = Mock::with([ana.clone(), bia]);
        let svc = db.service();

        let err = svc
            .execute(UpdateUser {
                email: Some("bia@example.com".into()),
                ..update(&ana)
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
        assert_eq!(
            db.state().users[&ana.id].email.to_string(),
            "ana@example.com",
        );
        assert_eq!(db.state().commits, 0);
        assert!(svc.toasts().snapshot().is_empty());
    }

    #[tokio::test]
    async fn reports_lost_email_race_as_occupied() {
        let ana = mock::user("Ana Costa", "ana@example.com");
        let db = Mock::with([ana.clone()]);
        db.fail_writes(mock::Error::UniqueViolation);
        let svc = db.service();

        let err = svc
            .execute(UpdateUser {
                email: Some("ana.costa@example.com".into()),
                ..update(&ana)
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
        assert_eq!(db.state().commits, 0);
        assert!(svc.toasts().snapshot().is_empty());
    }
}
