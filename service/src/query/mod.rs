//! [`Query`] definition.

pub mod user;
pub mod users;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] fetching a `W`hat from the [`Database`] by a `B`.
///
/// Serves the lookups needing nothing more than a single [`Select`].
#[derive(Clone, Copy, Debug)]
pub struct Fetch<W, B>(By<W, B>);

impl<W, B> Fetch<W, B> {
    /// Creates a new [`Fetch`] of a `W` by the provided `key`.
    #[must_use]
    pub fn by(key: B) -> Self {
        Self(By::new(key))
    }
}

impl<Db, W, B> Query<Fetch<W, B>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Fetch(by): Fetch<W, B>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}
