//! [`Query`] collection related to a single [`User`].

use crate::domain::{user, User};
#[cfg(doc)]
use crate::Query;

use super::Fetch;

/// Queries a [`User`] by its [`user::Id`], active or not.
pub type ById = Fetch<Option<User>, user::Id>;

/// Queries a [`User`] holding the exact [`user::Email`], active or not.
pub type ByEmail<'e> = Fetch<Option<User>, &'e user::Email>;
