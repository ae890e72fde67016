//! [`Command`] for requesting a [`User`] deletion.

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::deletion::Ticket;
use crate::{
    domain::{
        user::{self, deletion},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for requesting a [`User`] deletion.
///
/// Issues a [`Ticket`] to be presented to a [`DeleteUser`] [`Command`] for
/// confirming the deletion.
///
/// [`DeleteUser`]: super::DeleteUser
#[derive(Clone, Copy, Debug, From)]
pub struct RequestUserDeletion {
    /// ID of the [`User`] to be deleted.
    pub user_id: user::Id,
}

/// Output of [`RequestUserDeletion`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Signed [`Ticket`] confirming the deletion.
    pub token: deletion::Token,

    /// [`User`] to be deleted.
    pub user: User,

    /// [`DateTime`] when the [`Ticket`] expires.
    pub expires_at: deletion::ExpirationDateTime,
}

impl<Db> Command<RequestUserDeletion> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RequestUserDeletion,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RequestUserDeletion { user_id } = cmd;

        let user = self
            .database()
            .execute(Select(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let expires_at =
            (DateTime::now() + self.config().deletion_ticket_ttl).coerce();
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &deletion::Ticket {
                user_id: user.id,
                expires_at,
            },
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a signed `Ticket`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { deletion::Token::new_unchecked(token) };

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`RequestUserDeletion`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::Command as _,
        domain::user,
        infra::database::mock::{self, Mock},
    };

    use super::{ExecutionError, RequestUserDeletion};

    #[tokio::test]
    async fn issues_ticket_without_deleting() {
        let ana = mock::user("Ana Costa", "ana@example.com");
        let db = Mock::with([ana.clone()]);

        let out = db
            .service()
            .execute(RequestUserDeletion { user_id: ana.id })
            .await
            .unwrap();

        assert_eq!(out.user.id, ana.id);
        assert!(!AsRef::<str>::as_ref(&out.token).is_empty());
        assert!(db.state().users.contains_key(&ana.id));
    }

    #[tokio::test]
    async fn rejects_missing_user() {
        let ghost = user::Id::new();

        let err = Mock::default()
            .service()
            .execute(RequestUserDeletion { user_id: ghost })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == ghost,
        ));
    }
}
