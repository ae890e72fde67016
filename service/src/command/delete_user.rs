//! [`Command`] for deleting a [`User`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::deletion::Ticket;
use crate::{
    domain::{
        user::{self, deletion},
        User,
    },
    infra::{database, Database},
    notification, Service,
};

use super::Command;

/// [`Command`] for deleting a [`User`] by a [`Ticket`] issued with a
/// [`RequestUserDeletion`] [`Command`].
///
/// [`RequestUserDeletion`]: super::RequestUserDeletion
#[derive(Clone, Debug, From)]
pub struct DeleteUser {
    /// Signed [`Ticket`] confirming the deletion.
    pub token: deletion::Token,
}

impl<Db> Command<DeleteUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteUser { token } = cmd;

        // Expires exactly at `exp`, with no grace period.
        let mut validation = Validation::default();
        validation.leeway = 0;
        let ticket = jsonwebtoken::decode::<deletion::Ticket>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &validation,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;
        let user_id = ticket.user_id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::<User, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        _ = self.toasts().show(
            format!("User `{}` deleted", user.name),
            notification::Kind::Success,
        );

        Ok(user)
    }
}

/// Error of [`DeleteUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Ticket`] is malformed, forged or expired.
    #[display("Invalid deletion ticket: {_0}")]
    InvalidTicket(jsonwebtoken::errors::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use jsonwebtoken::{EncodingKey, Header};

    use crate::{
        command::{Command as _, RequestUserDeletion},
        domain::user::{
            self,
            deletion::{Ticket, Token},
        },
        infra::database::mock::{self, Mock},
        notification,
    };

    use super::{DeleteUser, ExecutionError};

    fn sign(user_id: user::Id, expires_at: DateTime, secret: &[u8]) -> Token {
        jsonwebtoken::encode(
            &Header::default(),
            &Ticket {
                user_id,
                expires_at: expires_at.coerce(),
            },
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
        .parse()
        .unwrap()
    }

    fn in_secs(secs: i64) -> DateTime {
        DateTime::from_unix_timestamp(DateTime::now().unix_timestamp() + secs)
            .unwrap()
    }

    #[tokio::test]
    async fn deletes_by_requested_ticket() {
        let ana = mock::user("Ana Costa", "ana@example.com");
        let db = Mock::with([ana.clone()]);
        let svc = db.service();

        let requested = svc
            .execute(RequestUserDeletion { user_id: ana.id })
            .await
            .unwrap();
        assert_eq!(requested.user.id, ana.id);
        assert!(
            requested.expires_at
                > (DateTime::now() + Duration::from_secs(290)).coerce(),
        );
        assert!(svc.toasts().snapshot().is_empty());

        let deleted = svc
            .execute(DeleteUser {
                token: requested.token,
            })
            .await
            .unwrap();

        assert_eq!(deleted.id, ana.id);
        {
            let state = db.state();
            assert!(state.users.is_empty());
            assert_eq!(state.locked, [ana.id]);
            assert_eq!(state.commits, 1);
        }

        let toasts = svc.toasts().snapshot();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, notification::Kind::Success);
        assert_eq!(toasts[0].message, "User `Ana Costa` deleted");
    }

    #[tokio::test]
    async fn rejects_forged_ticket() {
        let ana = mock::user("Ana Costa", "ana@example.com");
        let db = Mock::with([ana.clone()]);
        let svc = db.service();

        let err = svc
            .execute(DeleteUser {
                token: sign(ana.id, in_secs(300), b"forged"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidTicket(_)));
        assert!(db.state().users.contains_key(&ana.id));
        assert!(svc.toasts().snapshot().is_empty());
    }

    #[tokio::test]
    async fn rejects_just_expired_ticket() {
        let ana = mock::user("Ana Costa", "ana@example.com");
        let db = Mock::with([ana.clone()]);
        let svc = db.service();

        let err = svc
            .execute(DeleteUser {
                token: sign(ana.id, in_secs(-1), mock::SECRET),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidTicket(_)));
        assert!(db.state().users.contains_key(&ana.id));
        assert_eq!(db.state().commits, 0);
        assert!(svc.toasts().snapshot().is_empty());
    }

    #[tokio::test]
    async fn rejects_malformed_ticket() {
        let db = Mock::default();
        let svc = db.service();

        let err = svc
            .execute(DeleteUser {
                token: "not.a.ticket".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidTicket(_)));
    }

    #[tokio::test]
    async fn rejects_ticket_of_missing_user() {
        let ana = mock::user("Ana Costa", "ana@example.com");
        let db = Mock::with([ana.clone()]);
        let svc = db.service();
        let ghost = user::Id::new();

        let err = svc
            .execute(DeleteUser {
                token: sign(ghost, in_secs(300), mock::SECRET),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == ghost,
        ));
        assert!(db.state().users.contains_key(&ana.id));
        assert!(svc.toasts().snapshot().is_empty());
    }

    #[tokio::test]
    async fn ticket_is_spent_by_deletion() {
        let ana = mock::user("Ana Costa", "ana@example.com");
        let db = Mock::with([ana.clone()]);
        let svc = db.service();
        let token = sign(ana.id, in_secs(300), mock::SECRET);

        _ = svc
            .execute(DeleteUser {
                token: token.clone(),
            })
            .await
            .unwrap();
        let err = svc.execute(DeleteUser { token }).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
        assert_eq!(svc.toasts().snapshot().len(), 1);
    }
}
