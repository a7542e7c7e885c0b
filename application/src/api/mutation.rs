//! GraphQL [`Mutation`]s definitions.

use juniper::{graphql_object, Nullable};
use service::{
    command::{self, update_user::Changes},
    Command as _,
};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new active `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is used by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            age = ?age,
            department = ?department.as_ref().map(ToString::to_string),
            email = %email,
            gql.name = "createUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        email: api::user::Email,
        age: Option<api::user::Age>,
        department: Option<api::user::Department>,
        salary: Option<api::user::Salary>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::CreateUser {
                name: name.into(),
                email: email.into(),
                age: age.map(Into::into),
                department: department.map(Into::into),
                salary: salary.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the provided fields of the `User` with the specified ID.
    ///
    /// Omitted fields stay unchanged, while an explicit `null` `department`
    /// removes the `User` from its department.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist;
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is used by another `User`.
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    #[tracing::instrument(
        skip_all,
        fields(
            age = ?age,
            email = ?email.as_ref().map(ToString::to_string),
            gql.name = "updateUser",
            id = %id,
            is_active = ?is_active,
            name = ?name.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_user(
        id: api::user::Id,
        name: Option<api::user::Name>,
        email: Option<api::user::Email>,
        age: Option<api::user::Age>,
        department: Nullable<api::user::Department>,
        salary: Option<api::user::Salary>,
        is_active: Option<bool>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::UpdateUser {
                user_id: id.into(),
                changes: Changes {
                    name: name.map(Into::into),
                    email: email.map(Into::into),
                    age: age.map(Into::into),
                    department: department
                        .explicit()
                        .map(|d| d.map(Into::into)),
                    salary: salary.map(Into::into),
                    is_active,
                },
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `User` with the specified ID softly, by deactivating it.
    ///
    /// The deleted `User` keeps occupying its `UserEmail`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteUser",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        Self::set_activity(id, false, ctx).await
    }

    /// Deletes the `User` with the specified ID permanently.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "hardDeleteUser",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn hard_delete_user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        ctx.service()
            .execute(command::DeleteUser { user_id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Activates the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "activateUser",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn activate_user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        Self::set_activity(id, true, ctx).await
    }

    /// Deactivates the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deactivateUser",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn deactivate_user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        Self::set_activity(id, false, ctx).await
    }
}

impl Mutation {
    /// Sets the activity status of the `User` with the specified ID.
    async fn set_activity(
        id: api::user::Id,
        is_active: bool,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::UpdateUserActivity {
                user_id: id.into(),
                is_active,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,

        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "`UserEmail` is occupied by another `User`"]
        EmailOccupied,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(UserError::EmailOccupied.into()),
        }
    }
}

impl AsError for command::update_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
            Self::EmailOccupied(_) => Some(UserError::EmailOccupied.into()),
        }
    }
}

impl AsError for command::update_user_activity::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}
