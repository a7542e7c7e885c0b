//! In-memory [`Database`] implementation for tests.

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use common::{
    operations::{By, Commit, Delete, Insert, Lock, Select, Transact, Update},
    pagination::Order,
    DateTime,
};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    query,
    read::user::{
        list::{self, SortBy},
        statistics,
    },
    Config, Service,
};

/// In-memory [`Database`] of [`User`]s.
///
/// Transactions are no-op: every operation is applied immediately.
#[derive(Clone, Debug, Default)]
pub(crate) struct Memory(Arc<Mutex<State>>);

/// State of the [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`User`]s in insertion order.
    users: Vec<User>,

    /// Last assigned [`user::Id`].
    last_id: i32,

    /// Reads failing as if the storage were unavailable.
    failing: Vec<Read>,
}

/// Read operations of a [`Memory`] database which can be made failing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Read {
    /// Counting [`User`]s matching a [`list::Filter`].
    Count,

    /// Fetching a page of [`User`]s.
    Page,

    /// Aggregating [`statistics::Overview`].
    Overview,

    /// Aggregating [`statistics::Department`]s.
    Departments,
}

impl Memory {
    /// Returns the locked [`State`] of this [`Memory`] database.
    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    /// Makes the provided [`Read`] fail on every further execution.
    pub(crate) fn fail(&self, read: Read) {
        self.state().failing.push(read);
    }

    /// Returns an error if the provided [`Read`] is made failing.
    fn check(&self, read: Read) -> Result<(), Traced<database::Error>> {
        if self.state().failing.contains(&read) {
            return Err(tracerr::new!(unavailable()));
        }
        Ok(())
    }

    /// Creates a new [`Service`] over this [`Memory`] database.
    pub(crate) fn service(&self) -> Service<Self> {
        Service::new(
            Config {
                users: query::users::Config::default(),
            },
            self.clone(),
        )
    }

    /// Returns a snapshot of all the stored [`User`]s.
    pub(crate) fn users(&self) -> Vec<User> {
        self.state().users.clone()
    }

    /// Stores a new [`User`] with the provided fields.
    pub(crate) fn add(
        &self,
        name: &str,
        email: &str,
        age: Option<i32>,
        department: Option<&str>,
        salary: Option<&str>,
        is_active: bool,
    ) -> User {
        let new = user::New {
            name: name.parse().unwrap(),
            email: email.parse().unwrap(),
            age: age.map(|a| user::Age::new(a).unwrap()),
            department: department.map(|d| d.parse().unwrap()),
            salary: salary.map(|s| s.parse().unwrap()),
        };
        let mut user = self.insert(new);
        if !is_active {
            user.is_active = false;
            let mut state = self.state();
            if let Some(u) = state.users.iter_mut().find(|u| u.id == user.id) {
                u.is_active = false;
            }
        }
        user
    }

    /// Inserts the provided [`user::New`] assigning it a fresh [`user::Id`].
    fn insert(&self, new: user::New) -> User {
        let mut state = self.state();
        state.last_id += 1;
        let now = DateTime::now();
        let user = User {
            id: user::Id::new(state.last_id).unwrap(),
            name: new.name,
            email: new.email,
            age: new.age,
            department: new.department,
            salary: new.salary,
            is_active: true,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        state.users.push(user.clone());
        user
    }
}

/// Error of an unavailable storage.
#[cfg(feature = "postgres")]
fn unavailable() -> database::Error {
    database::postgres::Error::Pool(
        database::postgres::connection::PoolError::Closed,
    )
    .into()
}

/// Error of an unavailable storage.
#[cfg(not(feature = "postgres"))]
fn unavailable() -> database::Error {
    unreachable!("no storage errors exist without `postgres` feature")
}

/// Returns the textual representation of the provided value.
fn text(value: &impl AsRef<str>) -> &str {
    value.as_ref()
}

/// Checks whether the provided `value` contains the `fragment` ignoring case.
fn contains(value: &impl AsRef<str>, fragment: &list::Fragment) -> bool {
    text(value)
        .to_lowercase()
        .contains(&text(fragment).to_lowercase())
}

/// Checks whether the provided [`User`] matches the [`list::Filter`].
fn matches(user: &User, filter: &list::Filter) -> bool {
    let age = user.age.map(i32::from);
    filter.name.as_ref().is_none_or(|f| contains(&user.name, f))
        && filter
            .email
            .as_ref()
            .is_none_or(|f| contains(&user.email, f))
        && filter.department.as_ref().is_none_or(|f| {
            user.department
                .as_ref()
                .is_some_and(|d| contains(d, f))
        })
        && filter.is_active.is_none_or(|a| user.is_active == a)
        && filter.min_age.is_none_or(|m| age.is_some_and(|a| a >= m))
        && filter.max_age.is_none_or(|m| age.is_some_and(|a| a <= m))
        && filter
            .min_salary
            .is_none_or(|m| user.salary.is_some_and(|s| s >= m))
        && filter
            .max_salary
            .is_none_or(|m| user.salary.is_some_and(|s| s <= m))
}

/// Compares the provided [`User`]s by the [`list::Sorting`].
///
/// Missing values are lower than any present one, so they go first in
/// [`Order::Ascending`] and last in [`Order::Descending`].
fn compare(a: &User, b: &User, sorting: list::Sorting) -> Ordering {
    let ord = match sorting.by {
        SortBy::Name => text(&a.name).cmp(text(&b.name)),
        SortBy::Email => text(&a.email).cmp(text(&b.email)),
        SortBy::Age => a.age.cmp(&b.age),
        SortBy::Salary => a.salary.cmp(&b.salary),
        SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    match sorting.order {
        Order::Ascending => ord,
        Order::Descending => ord.reverse(),
    }
}

/// Averages the provided values rounding to 2 fractional digits.
fn average(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    let (sum, count) = values
        .into_iter()
        .fold((Decimal::ZERO, 0_u32), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| (sum / Decimal::from(count)).round_dp(2))
}

impl Database<Select<By<list::TotalCount, list::Filter>>> for Memory {
    type Ok = list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Read::Count)?;
        let filter = by.into_inner();
        let state = self.state();
        Ok(state.users.iter().filter(|u| matches(u, &filter)).count().into())
    }
}

impl Database<Select<By<Vec<User>, list::Selector>>> for Memory {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Read::Page)?;
        let list::Selector {
            arguments,
            filter,
            sorting,
        } = by.into_inner();

        let mut users = self
            .state()
            .users
            .iter()
            .filter(|u| matches(u, &filter))
            .cloned()
            .collect::<Vec<_>>();
        users.sort_by(|a, b| compare(a, b, sorting));
        Ok(users
            .into_iter()
            .skip(arguments.offset())
            .take(arguments.limit())
            .collect())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state().users.iter().find(|u| u.id == id).cloned())
    }
}

impl<'e> Database<Select<By<Option<User>, &'e user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self.state().users.iter().find(|u| &u.email == email).cloned())
    }
}

impl Database<Insert<user::New>> for Memory {
    type Ok = User;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<user::New>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.insert(new))
    }
}

impl Database<Update<User>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        let Some(stored) = state.users.iter_mut().find(|u| u.id == user.id)
        else {
            return Ok(None);
        };
        *stored = User {
            created_at: stored.created_at,
            updated_at: DateTime::now().coerce(),
            ..user
        };
        Ok(Some(stored.clone()))
    }
}

impl Database<Delete<By<User, user::Id>>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut state = self.state();
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        Ok(state.users.len() < before)
    }
}

impl Database<Lock<By<User, user::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<statistics::Overview, ()>>> for Memory {
    type Ok = statistics::Overview;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<statistics::Overview, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Read::Overview)?;
        let state = self.state();
        let users = &state.users;
        let count = |f: fn(&&User) -> bool| {
            i32::try_from(users.iter().filter(f).count()).unwrap()
        };
        let salaries = || users.iter().filter_map(|u| u.salary);
        Ok(statistics::Overview {
            total_users: count(|_| true),
            active_users: count(|u| u.is_active),
            inactive_users: count(|u| !u.is_active),
            average_age: average(
                users.iter().filter_map(|u| u.age.map(i32::from).map(Into::into)),
            ),
            average_salary: average(salaries().map(Into::into)),
            min_salary: salaries().min(),
            max_salary: salaries().max(),
        })
    }
}

impl Database<Select<By<Vec<statistics::Department>, ()>>> for Memory {
    type Ok = Vec<statistics::Department>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<statistics::Department>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Read::Departments)?;
        let state = self.state();
        let mut groups = BTreeMap::<String, Vec<&User>>::new();
        for u in state.users.iter().filter(|u| u.is_active) {
            if let Some(d) = &u.department {
                groups.entry(d.to_string()).or_default().push(u);
            }
        }

        let mut departments = groups
            .into_values()
            .map(|users| statistics::Department {
                department: users[0].department.clone().unwrap(),
                user_count: i32::try_from(users.len()).unwrap(),
                average_salary: average(
                    users.iter().filter_map(|u| u.salary).map(Into::into),
                ),
            })
            .collect::<Vec<_>>();
        departments.sort_by(|a, b| b.user_count.cmp(&a.user_count));
        Ok(departments)
    }
}
