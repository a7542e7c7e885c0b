//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{
            self,
            postgres::{Connection, LikePattern},
            Postgres,
        },
        Database,
    },
    read::user::{
        list::{self, SortBy},
        statistics,
    },
};

/// Columns of the `users` table forming a [`User`].
const COLUMNS: &str = "\
    id, name, email, age, department, salary, \
    is_active, created_at, updated_at";

/// Reads a [`User`] out of the provided [`Row`] selected with [`COLUMNS`].
fn user_from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        age: row.get("age"),
        department: row.get("department"),
        salary: row.get("salary"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Returns the column to sort [`User`]s by the provided [`SortBy`] key.
const fn sort_column(by: SortBy) -> &'static str {
    match by {
        SortBy::Name => "name",
        SortBy::Email => "email",
        SortBy::Age => "age",
        SortBy::Salary => "salary",
        SortBy::CreatedAt => "created_at",
    }
}

/// [`LikePattern`]s of the substring fields of a [`list::Filter`].
#[derive(Debug, Default)]
struct Patterns {
    /// [`LikePattern`] of [`list::Filter::name`].
    name: Option<LikePattern>,

    /// [`LikePattern`] of [`list::Filter::email`].
    email: Option<LikePattern>,

    /// [`LikePattern`] of [`list::Filter::department`].
    department: Option<LikePattern>,
}

impl From<&list::Filter> for Patterns {
    fn from(filter: &list::Filter) -> Self {
        let pattern = |f: &Option<list::Fragment>| {
            f.as_ref().map(|f| LikePattern::contains(f.as_ref()))
        };
        Self {
            name: pattern(&filter.name),
            email: pattern(&filter.email),
            department: pattern(&filter.department),
        }
    }
}

/// Conjunction of SQL predicates along with their bound parameters.
#[derive(Debug, Default)]
struct Predicates<'p> {
    /// SQL conditions to be joined with `AND`.
    conditions: Vec<String>,

    /// Parameters bound by the `conditions`, in placeholder order.
    params: Vec<&'p (dyn ToSql + Sync)>,
}

impl<'p> Predicates<'p> {
    /// Assembles [`Predicates`] of the provided [`list::Filter`].
    ///
    /// Every provided field of the [`list::Filter`] adds exactly one
    /// condition with exactly one bound parameter.
    fn of_filter(filter: &'p list::Filter, patterns: &'p Patterns) -> Self {
        let mut this = Self::default();
        this.bind(patterns.name.as_ref(), |i| {
            format!("name ILIKE ${i}::VARCHAR")
        });
        this.bind(patterns.email.as_ref(), |i| {
            format!("email ILIKE ${i}::VARCHAR")
        });
        this.bind(patterns.department.as_ref(), |i| {
            format!("department ILIKE ${i}::VARCHAR")
        });
        this.bind(filter.is_active.as_ref(), |i| {
            format!("is_active = ${i}::BOOL")
        });
        this.bind(filter.min_age.as_ref(), |i| format!("age >= ${i}::INT4"));
        this.bind(filter.max_age.as_ref(), |i| format!("age <= ${i}::INT4"));
        this.bind(filter.min_salary.as_ref(), |i| {
            format!("salary >= ${i}::NUMERIC")
        });
        this.bind(filter.max_salary.as_ref(), |i| {
            format!("salary <= ${i}::NUMERIC")
        });
        this
    }

    /// Binds the provided `param`, if any, adding the condition produced out
    /// of its 1-based placeholder index.
    fn bind<T: ToSql + Sync>(
        &mut self,
        param: Option<&'p T>,
        condition: impl FnOnce(usize) -> String,
    ) {
        if let Some(p) = param {
            self.params.push(p);
            self.conditions.push(condition(self.params.len()));
        }
    }

    /// Renders these [`Predicates`] as an SQL `WHERE` clause.
    ///
    /// Empty string is returned if there are no [`Predicates`].
    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }
        format!("WHERE {}", self.conditions.iter().format(" AND "))
    }
}

/// Renders the SQL counting [`User`]s matching the provided [`Predicates`].
fn count_sql(predicates: &Predicates<'_>) -> String {
    format!(
        "SELECT COUNT(*)::INT8 FROM users {}",
        predicates.where_clause(),
    )
}

/// Renders the SQL fetching a page of [`User`]s matching the provided
/// [`Predicates`].
///
/// `LIMIT` and `OFFSET` are expected to be bound right after the
/// [`Predicates`] parameters.
fn fetch_sql(predicates: &Predicates<'_>, sorting: list::Sorting) -> String {
    let limit_idx = predicates.params.len() + 1;
    format!(
        "SELECT {COLUMNS} \
         FROM users \
         {filtering} \
         ORDER BY {column} {order} {nulls} \
         LIMIT ${limit_idx}::INT8 OFFSET ${offset_idx}::INT8",
        filtering = predicates.where_clause(),
        column = sort_column(sorting.by),
        order = sorting.order.sql(),
        nulls = sorting.order.nulls(),
        offset_idx = limit_idx + 1,
    )
}

impl<C> Database<Select<By<list::TotalCount, list::Filter>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let patterns = Patterns::from(&filter);
        let predicates = Predicates::of_filter(&filter, &patterns);

        let count = self
            .query_opt(&count_sql(&predicates), &predicates.params)
            .await
            .map_err(tracerr::wrap!())?
            .expect("always exists")
            .get::<_, i64>(0);
        Ok(usize::try_from(count).expect("non-negative count").into())
    }
}

impl<C> Database<Select<By<Vec<User>, list::Selector>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Selector {
            arguments,
            filter,
            sorting,
        } = by.into_inner();

        let limit = i64::try_from(arguments.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);

        let patterns = Patterns::from(&filter);
        let mut predicates = Predicates::of_filter(&filter, &patterns);
        let sql = fetch_sql(&predicates, sorting);
        predicates.params.push(&limit);
        predicates.params.push(&offset);

        Ok(self
            .query(&sql, &predicates.params)
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(user_from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1::INT4");
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(user_from_row))
    }
}

impl<'e, C> Database<Select<By<Option<User>, &'e user::Email>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        let sql =
            format!("SELECT {COLUMNS} FROM users WHERE email = $1::VARCHAR");
        Ok(self
            .query_opt(&sql, &[email])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(user_from_row))
    }
}

impl<C> Database<Insert<user::New>> for Postgres<C>
where
    C: Connection,
{
    type Ok = User;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<user::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::New {
            name,
            email,
            age,
            department,
            salary,
        } = new;

        let sql = format!(
            "INSERT INTO users (name, email, age, department, salary) \
             VALUES ($1::VARCHAR, $2::VARCHAR, \
                     $3::INT4, $4::VARCHAR, $5::NUMERIC) \
             RETURNING {COLUMNS}",
        );
        self.query_opt(&sql, &[&name, &email, &age, &department, &salary])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| user_from_row(&row.expect("always returned")))
    }
}

impl<C> Database<Update<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            name,
            email,
            age,
            department,
            salary,
            is_active,
            created_at: _,
            updated_at: _,
        } = user;

        let sql = format!(
            "UPDATE users \
             SET name = $2::VARCHAR, \
                 email = $3::VARCHAR, \
                 age = $4::INT4, \
                 department = $5::VARCHAR, \
                 salary = $6::NUMERIC, \
                 is_active = $7::BOOL, \
                 updated_at = NOW() \
             WHERE id = $1::INT4 \
             RETURNING {COLUMNS}",
        );
        Ok(self
            .query_opt(
                &sql,
                &[&id, &name, &email, &age, &department, &salary, &is_active],
            )
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(user_from_row))
    }
}

impl<C> Database<Delete<By<User, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "DELETE FROM users WHERE id = $1::INT4";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected > 0)
    }
}

impl<C> Database<Lock<By<User, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM users \
            WHERE id = $1::INT4 \
            FOR UPDATE";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<statistics::Overview, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = statistics::Overview;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<statistics::Overview, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 AS total_users, \
                   (COUNT(*) FILTER (WHERE is_active))::INT4 AS active_users, \
                   (COUNT(*) FILTER (WHERE NOT is_active))::INT4 \
                       AS inactive_users, \
                   ROUND(AVG(age), 2) AS average_age, \
                   ROUND(AVG(salary), 2) AS average_salary, \
                   MIN(salary) AS min_salary, \
                   MAX(salary) AS max_salary \
            FROM users";
        let row = self
            .query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .expect("always exists");
        Ok(statistics::Overview {
            total_users: row.get("total_users"),
            active_users: row.get("active_users"),
            inactive_users: row.get("inactive_users"),
            average_age: row.get("average_age"),
            average_salary: row.get("average_salary"),
            min_salary: row.get("min_salary"),
            max_salary: row.get("max_salary"),
        })
    }
}

impl<C> Database<Select<By<Vec<statistics::Department>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<statistics::Department>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<statistics::Department>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT department, \
                   COUNT(*)::INT4 AS user_count, \
                   ROUND(AVG(salary), 2) AS average_salary \
            FROM users \
            WHERE department IS NOT NULL \
              AND is_active \
            GROUP BY department \
            ORDER BY user_count DESC, department ASC";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| statistics::Department {
                department: row.get("department"),
                user_count: row.get("user_count"),
                average_salary: row.get("average_salary"),
            })
            .collect())
    }
}
