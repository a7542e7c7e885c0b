//! [`Command`] for creating a new [`User`].

use common::operations::{By, Insert, Select};
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

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Age`] of a new [`User`].
    pub age: Option<user::Age>,

    /// [`Department`] of a new [`User`].
    pub department: Option<user::Department>,

    /// [`Salary`] of a new [`User`].
    pub salary: Option<user::Salary>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'e> Database<
            Select<By<Option<User>, &'e user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<user::New>, Ok = User, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            email,
            age,
            department,
            salary,
        } = cmd;

        let u = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let new = user::New {
            name,
            email: email.clone(),
            age,
            department,
            salary,
        };
        let res = self.database().execute(Insert(new)).await;
        // Another `User` may have taken the `Email` after the check.
        if let Err(e) = &res {
            if e.as_ref().is_unique_violation(database::USER_EMAIL_CONSTRAINT)
            {
                return Err(tracerr::new!(E::EmailOccupied(email)));
            }
        }
        res.map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Email`] is already occupied by another [`User`].
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),
}
