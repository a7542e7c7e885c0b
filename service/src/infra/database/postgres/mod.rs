//! Postgres [`Database`] implementation.

pub mod client;
pub mod connection;
mod impls;
mod like_pattern;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::{
    error::{DbError, SqlState},
    NoTls,
};
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use deadpool_postgres::Config;
pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
    like_pattern::LikePattern,
};

/// Postgres [`Database`] client, either [`NonTx`] or [`Tx`].
#[derive(Clone, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Builds a [`connection::Pool`] out of the provided [`Config`] and
    /// creates a [`NonTx`] [`Postgres`] client over it.
    ///
    /// No connection is opened here, so an unavailable database is only
    /// detected by the first statement.
    ///
    /// # Errors
    ///
    /// If the provided [`Config`] is invalid.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self(NonTx::from_pool(pool)))
    }
}

/// Postgres [`Database`] error.
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Statement failed to execute.
    #[display("Statement failed: {_0}")]
    Statement(connection::Error),

    /// [`connection::Pool`] cannot be built out of the provided [`Config`].
    #[display("Invalid `connection::Pool` configuration: {_0}")]
    PoolCreation(connection::PoolCreationError),

    /// No [`Connection`] can be taken from the [`connection::Pool`].
    #[display("No `Connection` available: {_0}")]
    Pool(connection::PoolError),
}

impl Error {
    /// Returns the name of the unique constraint violated by the failed
    /// statement, if any.
    #[must_use]
    pub fn violated_unique_constraint(&self) -> Option<&str> {
        match self {
            Self::Statement(e)
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) =>
            {
                e.as_db_error().and_then(DbError::constraint)
            }
            Self::Statement(_) | Self::Pool(_) | Self::PoolCreation(_) => None,
        }
    }
}
