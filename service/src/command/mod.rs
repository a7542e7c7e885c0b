//! [`Command`] definition.

pub mod create_user;
pub mod delete_user;
pub mod update_user;
pub mod update_user_activity;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_user::CreateUser, delete_user::DeleteUser, update_user::UpdateUser,
    update_user_activity::UpdateUserActivity,
};
