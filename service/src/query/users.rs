//! [`Query`] collection related to the multiple [`User`]s.

use common::operations::{By, Select};
use futures::future;
use tracerr::Traced;

use crate::{
    domain::User,
    infra::{database, Database},
    read::user::{list, statistics},
    Service,
};

use super::{Fetch, Query};

/// [`List`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Number of [`User`]s on a page if no limit is requested.
    pub default_limit: usize,

    /// Maximum number of [`User`]s on a page.
    pub max_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl Config {
    /// Creates [`list::Arguments`] out of the optionally requested `page` and
    /// `limit`, according to this [`Config`].
    ///
    /// [`None`] is returned if the requested `page` or `limit` is out of
    /// range.
    #[must_use]
    pub fn arguments<Num>(
        &self,
        page: Option<Num>,
        limit: Option<Num>,
    ) -> Option<list::Arguments>
    where
        Num: TryInto<usize>,
    {
        list::Arguments::new(page, limit, self.default_limit, self.max_limit)
    }
}

/// Queries a [`list::Page`] of [`User`]s matching a [`list::Selector`].
///
/// Counts all the matching [`User`]s first, and then fetches the requested
/// page of them.
#[derive(Clone, Debug)]
pub struct List(pub list::Selector);

/// Queries total count of [`User`]s matching a [`list::Filter`].
pub type TotalCount = Fetch<list::TotalCount, list::Filter>;

/// Queries aggregated statistics of [`User`]s.
#[derive(Clone, Copy, Debug)]
pub struct Statistics;

/// Output of the [`Statistics`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Aggregates over all [`User`]s.
    pub overview: statistics::Overview,

    /// Aggregates over active [`User`]s of every department, ordered by the
    /// number of [`User`]s descending.
    pub by_department: Vec<statistics::Department>,
}

impl<Db> Query<List> for Service<Db>
where
    Db: Database<
            Select<By<list::TotalCount, list::Filter>>,
            Ok = list::TotalCount,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<User>, list::Selector>>,
            Ok = Vec<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        List(selector): List,
    ) -> Result<Self::Ok, Self::Err> {
        let arguments = selector.arguments;

        let total: usize = self
            .database()
            .execute(Select(By::new(selector.filter.clone())))
            .await
            .map_err(tracerr::wrap!())?
            .into();

        // A window past the counted total would be empty, or would hold rows
        // inserted after the count, which the page info doesn't account for.
        let users = if arguments.offset() < total {
            self.database()
                .execute(Select(By::new(selector)))
                .await
                .map_err(tracerr::wrap!())?
        } else {
            vec![]
        };

        Ok(list::Page::new(&arguments, users, total))
    }
}

impl<Db> Query<Statistics> for Service<Db>
where
    Db: Database<
            Select<By<statistics::Overview, ()>>,
            Ok = statistics::Overview,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<statistics::Department>, ()>>,
            Ok = Vec<statistics::Department>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Statistics) -> Result<Self::Ok, Self::Err> {
        let (overview, by_department) = future::try_join(
            self.database()
                .execute(Select(By::<statistics::Overview, _>::new(()))),
            self.database().execute(Select(By::<
                Vec<statistics::Department>,
                _,
            >::new(()))),
        )
        .await
        .map_err(tracerr::wrap!())?;

        Ok(Output {
            overview,
            by_department,
        })
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::pagination::{Order, Sorting};
    use rust_decimal::Decimal;

    #[cfg(feature = "postgres")]
    use crate::infra::database;
    use crate::{
        domain::user,
        infra::database::memory::{Memory, Read},
        read::user::list::{Filter, Fragment, Selector, SortBy},
        Query as _,
    };

    use super::{Config, List, Statistics, TotalCount};

    fn selector(page: usize, limit: usize, filter: Filter) -> Selector {
        Selector {
            arguments: Config::default()
                .arguments(Some(page), Some(limit))
                .unwrap(),
            filter,
            sorting: Sorting::default(),
        }
    }

    fn populate(db: &Memory, count: usize) {
        for i in 0..count {
            _ = db.add(
                &format!("User {i}"),
                &format!("user{i}@example.com"),
                None,
                None,
                None,
                true,
            );
        }
    }

    #[tokio::test]
    async fn no_filter_counts_everything() {
        let db = Memory::default();
        populate(&db, 7);
        let svc = db.service();

        let page = svc
            .execute(List(selector(1, 10, Filter::default())))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 7);
        assert_eq!(page.info.total_items, 7);
        assert_eq!(page.info.total_pages, 1);
        assert!(!page.info.has_prev);
        assert!(!page.info.has_next);
    }

    #[tokio::test]
    async fn last_partial_page() {
        let db = Memory::default();
        populate(&db, 12);
        let svc = db.service();

        let page = svc
            .execute(List(selector(2, 10, Filter::default())))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.info.total_pages, 2);
        assert!(!page.info.has_next);
        assert!(page.info.has_prev);
    }

    #[tokio::test]
    async fn page_beyond_the_end_is_empty() {
        let db = Memory::default();
        populate(&db, 3);
        let svc = db.service();

        let page = svc
            .execute(List(selector(5, 2, Filter::default())))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.info.total_items, 3);
        assert_eq!(page.info.total_pages, 2);
        assert!(page.info.has_prev);
    }

    #[tokio::test]
    async fn empty_store() {
        let svc = Memory::default().service();

        let page = svc
            .execute(List(selector(1, 10, Filter::default())))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.info.total_pages, 0);
        assert!(!page.info.has_next);
        assert!(!page.info.has_prev);
    }

    #[tokio::test]
    async fn age_bounds_are_inclusive() {
        let db = Memory::default();
        _ = db.add("Young", "young@example.com", Some(25), None, None, true);
        _ = db.add("Old", "old@example.com", Some(35), None, None, true);
        let svc = db.service();

        let older = svc
            .execute(List(selector(
                1,
                10,
                Filter {
                    min_age: Some(30),
                    ..Filter::default()
                },
            )))
            .await
            .unwrap();
        assert_eq!(older.items.len(), 1);
        assert_eq!(older.items[0].name.to_string(), "Old");

        let younger = svc
            .execute(List(selector(
                1,
                10,
                Filter {
                    max_age: Some(30),
                    ..Filter::default()
                },
            )))
            .await
            .unwrap();
        assert_eq!(younger.items.len(), 1);
        assert_eq!(younger.items[0].name.to_string(), "Young");

        let exact = svc
            .execute(TotalCount::by(Filter {
                min_age: Some(35),
                max_age: Some(35),
                ..Filter::default()
            }))
            .await
            .unwrap();
        assert_eq!(usize::from(exact), 1);
    }

    #[tokio::test]
    async fn inverted_range_matches_nothing() {
        let db = Memory::default();
        _ = db.add("Middle", "mid@example.com", Some(30), None, None, true);
        let svc = db.service();

        let page = svc
            .execute(List(selector(
                1,
                10,
                Filter {
                    min_age: Some(40),
                    max_age: Some(20),
                    ..Filter::default()
                },
            )))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.info.total_items, 0);
    }

    #[tokio::test]
    async fn activity_filter() {
        let db = Memory::default();
        _ = db.add("Active", "a@example.com", None, None, None, true);
        _ = db.add("Inactive", "i@example.com", None, None, None, false);
        let svc = db.service();

        let count = |is_active| {
            svc.execute(TotalCount::by(Filter {
                is_active,
                ..Filter::default()
            }))
        };

        assert_eq!(usize::from(count(Some(false)).await.unwrap()), 1);
        assert_eq!(usize::from(count(Some(true)).await.unwrap()), 1);
        assert_eq!(usize::from(count(None).await.unwrap()), 2);
    }

    #[tokio::test]
    async fn substring_filters_ignore_case() {
        let db = Memory::default();
        _ = db.add(
            "John Smith",
            "john@example.com",
            None,
            Some("Engineering"),
            None,
            true,
        );
        _ = db.add("Jane Doe", "jane@corp.org", None, None, None, true);
        let svc = db.service();

        let page = svc
            .execute(List(selector(
                1,
                10,
                Filter {
                    name: Fragment::new("SMITH"),
                    department: Fragment::new("engine"),
                    ..Filter::default()
                },
            )))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].email.to_string(), "john@example.com");
    }

    #[tokio::test]
    async fn sorts_by_requested_key() {
        let db = Memory::default();
        for (name, salary) in [("Bob", "300"), ("Alice", "100"), ("Carl", "200")]
        {
            _ = db.add(
                name,
                &format!("{}@example.com", name.to_lowercase()),
                None,
                None,
                Some(salary),
                true,
            );
        }
        let svc = db.service();

        let page = svc
            .execute(List(Selector {
                sorting: Sorting {
                    by: SortBy::Salary,
                    order: Order::Ascending,
                },
                ..selector(1, 10, Filter::default())
            }))
            .await
            .unwrap();

        let names = page
            .items
            .iter()
            .map(|u| u.name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Alice", "Carl", "Bob"]);
    }

    #[tokio::test]
    async fn missing_values_are_lowest() {
        let db = Memory::default();
        for (name, age, salary) in [
            ("Rich", Some(40), Some("900")),
            ("NoPay", None, None),
            ("Poor", Some(20), Some("10")),
        ] {
            _ = db.add(
                name,
                &format!("{}@example.com", name.to_lowercase()),
                age,
                None,
                salary,
                true,
            );
        }
        let svc = db.service();

        for (by, order, expected) in [
            (SortBy::Salary, Order::Descending, ["Rich", "Poor", "NoPay"]),
            (SortBy::Salary, Order::Ascending, ["NoPay", "Poor", "Rich"]),
            (SortBy::Age, Order::Descending, ["Rich", "Poor", "NoPay"]),
            (SortBy::Age, Order::Ascending, ["NoPay", "Poor", "Rich"]),
        ] {
            let page = svc
                .execute(List(Selector {
                    sorting: Sorting { by, order },
                    ..selector(1, 10, Filter::default())
                }))
                .await
                .unwrap();

            let names = page
                .items
                .iter()
                .map(|u| u.name.to_string())
                .collect::<Vec<_>>();
            assert_eq!(names, expected, "{by:?} {order:?}");
        }
    }

    #[cfg(feature = "postgres")]
    fn is_unavailable(err: &tracerr::Traced<database::Error>) -> bool {
        matches!(
            err.as_ref(),
            database::Error::Postgres(database::postgres::Error::Pool(_)),
        )
    }

    #[cfg(feature = "postgres")]
    #[tokio::test]
    async fn list_propagates_failed_count() {
        let db = Memory::default();
        populate(&db, 3);
        db.fail(Read::Count);
        let svc = db.service();

        let err = svc
            .execute(List(selector(1, 10, Filter::default())))
            .await
            .unwrap_err();

        assert!(is_unavailable(&err), "unexpected error: {err:?}");
    }

    #[cfg(feature = "postgres")]
    #[tokio::test]
    async fn list_propagates_failed_page_after_successful_count() {
        let db = Memory::default();
        populate(&db, 3);
        db.fail(Read::Page);
        let svc = db.service();

        let count = svc
            .execute(TotalCount::by(Filter::default()))
            .await
            .unwrap();
        assert_eq!(usize::from(count), 3);

        let err = svc
            .execute(List(selector(1, 10, Filter::default())))
            .await
            .unwrap_err();

        assert!(is_unavailable(&err), "unexpected error: {err:?}");
    }

    #[cfg(feature = "postgres")]
    #[tokio::test]
    async fn page_beyond_the_end_is_not_fetched() {
        let db = Memory::default();
        populate(&db, 3);
        db.fail(Read::Page);
        let svc = db.service();

        let page = svc
            .execute(List(selector(3, 2, Filter::default())))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.info.total_items, 3);
    }

    #[cfg(feature = "postgres")]
    #[tokio::test]
    async fn statistics_propagate_any_failed_read() {
        for read in [Read::Overview, Read::Departments] {
            let db = Memory::default();
            populate(&db, 2);
            db.fail(read);
            let svc = db.service();

            let err = svc.execute(Statistics).await.unwrap_err();

            assert!(is_unavailable(&err), "{read:?}: {err:?}");
        }
    }

    #[tokio::test]
    async fn statistics_of_empty_store() {
        let svc = Memory::default().service();

        let stats = svc.execute(Statistics).await.unwrap();

        assert_eq!(stats.overview.total_users, 0);
        assert_eq!(stats.overview.active_users, 0);
        assert_eq!(stats.overview.inactive_users, 0);
        assert_eq!(stats.overview.average_age, None);
        assert_eq!(stats.overview.average_salary, None);
        assert_eq!(stats.overview.min_salary, None);
        assert_eq!(stats.overview.max_salary, None);
        assert!(stats.by_department.is_empty());
    }

    #[tokio::test]
    async fn statistics_by_department() {
        let db = Memory::default();
        let people = [
            ("Ann", Some(30), Some("Eng"), Some("100"), true),
            ("Ben", Some(40), Some("Eng"), Some("200"), true),
            ("Cid", None, Some("Eng"), None, false),
            ("Dan", Some(50), Some("Ops"), Some("600"), true),
            ("Eve", None, None, Some("50"), true),
        ];
        for (name, age, department, salary, is_active) in people {
            _ = db.add(
                name,
                &format!("{}@example.com", name.to_lowercase()),
                age,
                department,
                salary,
                is_active,
            );
        }
        let svc = db.service();

        let stats = svc.execute(Statistics).await.unwrap();

        assert_eq!(stats.overview.total_users, 5);
        assert_eq!(stats.overview.active_users, 4);
        assert_eq!(stats.overview.inactive_users, 1);
        assert_eq!(stats.overview.average_age, Some(Decimal::new(40, 0)));
        assert_eq!(stats.overview.average_salary, Some(Decimal::new(2375, 1)));
        assert_eq!(
            stats.overview.min_salary,
            Some(user::Salary::from_str("50").unwrap()),
        );
        assert_eq!(
            stats.overview.max_salary,
            Some(user::Salary::from_str("600").unwrap()),
        );

        let departments = stats
            .by_department
            .iter()
            .map(|d| (d.department.to_string(), d.user_count))
            .collect::<Vec<_>>();
        assert_eq!(
            departments,
            [("Eng".to_owned(), 2), ("Ops".to_owned(), 1)],
        );
        assert_eq!(
            stats.by_department[0].average_salary,
            Some(Decimal::new(150, 0)),
        );
    }
}
