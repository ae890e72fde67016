//! [`Command`] definition.

pub mod create_user;
pub mod delete_user;
pub mod input;
pub mod request_user_deletion;
pub mod seed_users;
pub mod update_user;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_user::CreateUser,
    delete_user::DeleteUser,
    input::{Violation, Violations},
    request_user_deletion::RequestUserDeletion,
    seed_users::SeedUsers,
    update_user::UpdateUser,
};
