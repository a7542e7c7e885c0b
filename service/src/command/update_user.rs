//! [`Command`] for updating a [`User`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Age, Department, Email, Name, Salary};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`User`].
#[derive(Clone, Debug)]
pub struct UpdateUser {
    /// ID of the [`User`] to be updated.
    pub user_id: user::Id,

    /// [`Changes`] to be applied to the [`User`].
    pub changes: Changes,
}

/// Changes of a [`User`].
///
/// Only the provided fields are changed.
#[derive(Clone, Debug, Default)]
pub struct Changes {
    /// New [`Name`] of the [`User`].
    pub name: Option<user::Name>,

    /// New [`Email`] of the [`User`].
    pub email: Option<user::Email>,

    /// New [`Age`] of the [`User`].
    pub age: Option<user::Age>,

    /// New [`Department`] of the [`User`].
    ///
    /// `Some(None)` removes the [`User`] from any [`Department`].
    pub department: Option<Option<user::Department>>,

    /// New [`Salary`] of the [`User`].
    pub salary: Option<user::Salary>,

    /// New activity status of the [`User`].
    pub is_active: Option<bool>,
}

impl Changes {
    /// Indicates whether these [`Changes`] don't provide any field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.age.is_none()
            && self.department.is_none()
            && self.salary.is_none()
            && self.is_active.is_none()
    }

    /// Applies these [`Changes`] to the provided [`User`].
    fn apply(self, user: &mut User) {
        let Self {
            name,
            email,
            age,
            department,
            salary,
            is_active,
        } = self;

        if let Some(name) = name {
            user.name = name;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(age) = age {
            user.age = Some(age);
        }
        if let Some(department) = department {
            user.department = department;
        }
        if let Some(salary) = salary {
            user.salary = Some(salary);
        }
        if let Some(is_active) = is_active {
            user.is_active = is_active;
        }
    }
}

impl<Db> Command<UpdateUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'e> Database<
            Select<By<Option<User>, &'e user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Update<User>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUser { user_id, changes } = cmd;

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
        if changes.is_empty() {
            return Ok(user);
        }

        if let Some(email) = changes.email.as_ref().filter(|e| **e != user.email)
        {
            let holder = tx
                .execute(Select(By::<Option<User>, _>::new(email)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if holder.is_some_and(|u| u.id != user_id) {
                return Err(tracerr::new!(E::EmailOccupied(email.clone())));
            }
        }

        changes.apply(&mut user);
        let email = user.email.clone();
        let res = tx.execute(Update(user)).await;
        // Another `User` may have taken the `Email` after the check.
        if let Err(e) = &res {
            if e.as_ref().is_unique_violation(database::USER_EMAIL_CONSTRAINT)
            {
                return Err(tracerr::new!(E::EmailOccupied(email)));
            }
        }
        let user = res
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`UpdateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`Email`] is already occupied by another [`User`].
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),
}
