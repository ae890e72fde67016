//! [`Query`] collection related to the multiple [`User`]s.

use std::collections::HashMap;

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{user, User},
    read,
};

use super::DatabaseQuery;

/// Queries multiple [`User`]s by their [`user::Id`]s.
pub type ByIds = DatabaseQuery<By<HashMap<user::Id, User>, Vec<user::Id>>>;

/// Queries a [`read::user::list::Page`] of [`User`]s.
pub type List =
    DatabaseQuery<By<read::user::list::Page, read::user::list::Selector>>;

/// Queries [`User`]s counts by their [`user::Status`].
pub type Stats = DatabaseQuery<By<read::user::Stats, ()>>;

/// Queries [`user::Role`]s in use.
pub type Roles = DatabaseQuery<By<read::user::Roles, ()>>;
