//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
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

/// [`Command`] for creating a new [`User`].
///
/// Fields are raw, as submitted by a form.
#[derive(Clone, Debug, Default)]
pub struct CreateUser {
    /// [`user::Name`] of a new [`User`].
    pub name: String,

    /// [`user::Email`] of a new [`User`].
    pub email: String,

    /// [`user::Status`] of a new [`User`].
    ///
    /// [`user::Status::default()`] is used if blank or absent.
    pub status: Option<String>,

    /// [`user::Role`] of a new [`User`].
    ///
    /// Parsed leniently with [`user::Role::parse_lenient()`].
    pub role: Option<String>,

    /// [`user::Avatar`] of a new [`User`], if any.
    pub avatar: Option<String>,
}

impl CreateUser {
    /// Validates this [`CreateUser`] input, reporting all its violations at
    /// once.
    fn validate(self) -> Result<Validated, Violations> {
        let mut violations = Violations::default();

        let name = violations.name(&self.name);
        let email = violations.email(&self.email);
        let status = self
            .status
            .as_deref()
            .and_then(|s| violations.status(s))
            .unwrap_or_default();
        let role = user::Role::parse_lenient(self.role.as_deref());
        let avatar = self
            .avatar
            .as_deref()
            .map_or(Some(None), |a| violations.avatar(a));

        match (name, email, avatar) {
            (Some(name), Some(email), Some(avatar))
                if violations.is_empty() =>
            {
                Ok(Validated {
                    name,
                    email,
                    status,
                    role,
                    avatar,
                })
            }
            _ => Err(violations),
        }
    }
}

/// Validated [`CreateUser`] input.
#[derive(Debug)]
struct Validated {
    /// [`user::Name`] of a new [`User`].
    name: user::Name,

    /// [`user::Email`] of a new [`User`].
    email: user::Email,

    /// [`user::Status`] of a new [`User`].
    status: user::Status,

    /// [`user::Role`] of a new [`User`].
    role: user::Role,

    /// [`user::Avatar`] of a new [`User`].
    avatar: Option<user::Avatar>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Validated {
            name,
            email,
            status,
            role,
            avatar,
        } = cmd
            .validate()
            .map_err(E::InvalidInput)
            .map_err(tracerr::wrap!())?;

        let existing = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let now = DateTime::now();
        let user = User {
            id: user::Id::new(),
            name,
            email,
            status,
            role,
            avatar,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let inserted = tx.execute(Insert(user.clone())).await;
        // Lost a race with another `User` taking the same `user::Email`.
        if inserted
            .as_ref()
            .is_err_and(|e| e.as_ref().is_unique_violation(None))
        {
            return Err(tracerr::new!(E::EmailOccupied(user.email)));
        }
        inserted
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        _ = self.toasts().show(
            format!("User `{}` created", user.name),
            notification::Kind::Success,
        );

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Email`] is already used by another [`User`].
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// Input is invalid.
    #[display("Invalid input: {_0}")]
    InvalidInput(#[error(not(source))] Violations),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{input::Violation, Command as _},
        domain::user::{Role, Status},
        infra::database::mock::{self, Mock},
        notification,
    };

    use super::{CreateUser, ExecutionError};

    fn create(name: &str, email: &str) -> CreateUser {
        CreateUser {
            name: name.into(),
            email: email.into(),
            ..CreateUser::default()
        }
    }

    #[test]
    fn applies_defaults() {
        let v = CreateUser {
            name: "Ana Costa".into(),
            email: "ana@example.com".into(),
            status: Some(" ".into()),
            role: Some("superuser".into()),
            avatar: Some(String::new()),
        }
        .validate()
        .unwrap();

        assert_eq!(v.status, Status::Active);
        assert_eq!(v.role, Role::User);
        assert_eq!(v.avatar, None);
    }

    #[test]
    fn reports_every_field() {
        let v = CreateUser {
            name: String::new(),
            email: "ana@".into(),
            status: Some("gone".into()),
            role: None,
            avatar: Some("not a url".into()),
        }
        .validate()
        .unwrap_err();

        assert_eq!(v.get("name"), Some(Violation::Required));
        assert_eq!(v.get("email"), Some(Violation::InvalidFormat));
        assert_eq!(v.get("status"), Some(Violation::Invalid));
        assert_eq!(v.get("avatar"), Some(Violation::InvalidFormat));
        assert_eq!(v.get("role"), None);
    }

    #[tokio::test]
    async fn creates_and_notifies() {
        let db = Mock::default();
        let svc = db.service();

        let user = svc
            .execute(create("Ana Costa", " Ana@Example.com "))
            .await
            .unwrap();

        assert_eq!(user.email.to_string(), "ana@example.com");
        assert_eq!(user.status, Status::Active);
        assert_eq!(user.created_at, user.updated_at.coerce());
        {
            let state = db.state();
            assert_eq!(state.commits, 1);
            assert!(state.users.contains_key(&user.id));
        }

        let toasts = svc.toasts().snapshot();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, notification::Kind::Success);
        assert_eq!(toasts[0].message, "User `Ana Costa` created");
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let db = Mock::with([mock::user("Ana Costa", "ana@example.com")]);
        let svc = db.service();

        let err = svc
            .execute(create("Ana Clone", "ANA@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
        assert_eq!(db.state().users.len(), 1);
        assert_eq!(db.state().commits, 0);
        assert!(svc.toasts().snapshot().is_empty());
    }

    #[tokio::test]
    async fn reports_lost_email_race_as_occupied() {
        let db = Mock::default();
        db.fail_writes(mock::Error::UniqueViolation);
        let svc = db.service();

        let err = svc
            .execute(create("Ana Costa", "ana@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
        assert_eq!(db.state().commits, 0);
        assert!(svc.toasts().snapshot().is_empty());
    }

    #[tokio::test]
    async fn propagates_database_failure() {
        let db = Mock::default();
        db.fail_writes(mock::Error::Unavailable);
        let svc = db.service();

        let err = svc
            .execute(create("Ana Costa", "ana@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        assert_eq!(db.state().commits, 0);
        assert!(svc.toasts().snapshot().is_empty());
    }

    #[tokio::test]
    async fn rejects_invalid_input_untouched() {
        let db = Mock::default();
        let svc = db.service();

        let err = svc.execute(create("", "ana@")).await.unwrap_err();

        let ExecutionError::InvalidInput(v) = err.as_ref() else {
            panic!("expected `InvalidInput`, found: {err}");
        };
        assert_eq!(v.get("name"), Some(Violation::Required));
        assert_eq!(v.get("email"), Some(Violation::InvalidFormat));
        assert!(db.state().users.is_empty());
        assert!(svc.toasts().snapshot().is_empty());
    }
}
