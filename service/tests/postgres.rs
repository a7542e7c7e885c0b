//! Tests of the Postgres [`Database`] against a real database in a container.
//!
//! [`Database`]: service::infra::Database

#![cfg(feature = "integration")]

use std::time::Duration;

use common::pagination::{Order, Sorting};
use service::{
    command::{
        create_user, update_user, CreateUser, DeleteUser, UpdateUser,
        UpdateUserActivity,
    },
    infra::{postgres, Postgres},
    query::{self, users::List},
    read::user::list::{Filter, Fragment, Selector, SortBy},
    Command as _, Config, Query as _, Service,
};
use testcontainers::{
    runners::AsyncRunner, ContainerAsync, ContainerRequest, ImageExt,
};
use testcontainers_modules::postgres::Postgres as PostgresImage;

mod embedded {
    service::infra::postgres::embed_migrations!("../migrations");
}

/// Running Postgres container along with the [`Service`] connected to it.
struct Env {
    /// [`Service`] under test.
    svc: Service<Postgres>,

    /// Container to be stopped once the test finishes.
    _container: ContainerAsync<PostgresImage>,
}

async fn bring_up() -> anyhow::Result<Env> {
    let container = ContainerRequest::from(PostgresImage::default())
        .with_env_var("POSTGRES_PASSWORD", "pass")
        .with_env_var("POSTGRES_USER", "user")
        .with_env_var("POSTGRES_DB", "app")
        .start()
        .await?;
    let port = container.get_host_port_ipv4(5432).await?;
    wait_for_tcp("127.0.0.1", port, Duration::from_secs(20)).await?;

    let mut conf = postgres::Config::new();
    conf.host = Some("127.0.0.1".into());
    conf.port = Some(port);
    conf.user = Some("user".into());
    conf.password = Some("pass".into());
    conf.dbname = Some("app".into());

    let mut db = Postgres::new(&conf)?;
    _ = embedded::migrations::runner().run_async(&mut db).await?;

    Ok(Env {
        svc: Service::new(
            Config {
                users: query::users::Config::default(),
            },
            db,
        ),
        _container: container,
    })
}

async fn wait_for_tcp(
    host: &str,
    port: u16,
    timeout: Duration,
) -> anyhow::Result<()> {
    use tokio::{
        net::TcpStream,
        time::{sleep, Instant},
    };

    let deadline = Instant::now() + timeout;
    loop {
        if TcpStream::connect((host, port)).await.is_ok() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            anyhow::bail!("Timeout waiting for {host}:{port}");
        }
        sleep(Duration::from_millis(200)).await;
    }
}

fn new_user(
    name: &str,
    age: Option<i32>,
    department: Option<&str>,
    salary: Option<&str>,
) -> CreateUser {
    CreateUser {
        name: name.parse().unwrap(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', "."))
            .parse()
            .unwrap(),
        age: age.map(|a| service::domain::user::Age::new(a).unwrap()),
        department: department.map(|d| d.parse().unwrap()),
        salary: salary.map(|s| s.parse().unwrap()),
    }
}

fn selector(page: usize, limit: usize, filter: Filter) -> Selector {
    Selector {
        arguments: query::users::Config::default()
            .arguments(Some(page), Some(limit))
            .unwrap(),
        filter,
        sorting: Sorting::default(),
    }
}

#[tokio::test]
async fn filtered_pagination() {
    let env = bring_up().await.unwrap();
    let svc = &env.svc;

    for i in 0..12 {
        _ = svc
            .execute(new_user(
                &format!("Person {i}"),
                Some(20 + i),
                Some(if i % 2 == 0 { "Engineering" } else { "Sales" }),
                Some(format!("{}000.50", 40 + i).as_str()),
            ))
            .await
            .unwrap();
    }

    let page = svc
        .execute(List(selector(2, 10, Filter::default())))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.info.total_items, 12);
    assert_eq!(page.info.total_pages, 2);
    assert!(!page.info.has_next);
    assert!(page.info.has_prev);

    let page = svc
        .execute(List(Selector {
            sorting: Sorting {
                by: SortBy::Age,
                order: Order::Ascending,
            },
            ..selector(
                1,
                10,
                Filter {
                    department: Fragment::new("ENGINEER"),
                    min_age: Some(24),
                    max_age: Some(28),
                    ..Filter::default()
                },
            )
        }))
        .await
        .unwrap();
    let ages = page
        .items
        .iter()
        .map(|u| u.age.map(i32::from))
        .collect::<Vec<_>>();
    assert_eq!(ages, [Some(24), Some(26), Some(28)]);
    assert_eq!(page.info.total_items, 3);

    let page = svc
        .execute(List(selector(
            1,
            10,
            Filter {
                name: Fragment::new("100%_"),
                ..Filter::default()
            },
        )))
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.info.total_pages, 0);
}

#[tokio::test]
async fn missing_values_sort_lowest() {
    let env = bring_up().await.unwrap();
    let svc = &env.svc;

    for (name, age, salary) in [
        ("Rich Person", Some(40), Some("900")),
        ("Unpaid Person", None, None),
        ("Poor Person", Some(20), Some("10")),
    ] {
        _ = svc.execute(new_user(name, age, None, salary)).await.unwrap();
    }

    for (by, order, expected) in [
        (
            SortBy::Salary,
            Order::Descending,
            ["Rich Person", "Poor Person", "Unpaid Person"],
        ),
        (
            SortBy::Salary,
            Order::Ascending,
            ["Unpaid Person", "Poor Person", "Rich Person"],
        ),
        (
            SortBy::Age,
            Order::Descending,
            ["Rich Person", "Poor Person", "Unpaid Person"],
        ),
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

#[tokio::test]
async fn user_lifecycle() {
    let env = bring_up().await.unwrap();
    let svc = &env.svc;

    let john = svc
        .execute(new_user("John Doe", Some(30), Some("Sales"), Some("1000")))
        .await
        .unwrap();
    let jane = svc
        .execute(new_user("Jane Roe", None, None, None))
        .await
        .unwrap();

    let err = svc
        .execute(new_user("John Doe", None, None, None))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        create_user::ExecutionError::EmailOccupied(_),
    ));

    let err = svc
        .execute(UpdateUser {
            user_id: jane.id,
            changes: update_user::Changes {
                email: Some(john.email.clone()),
                ..update_user::Changes::default()
            },
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        update_user::ExecutionError::EmailOccupied(_),
    ));

    let updated = svc
        .execute(UpdateUser {
            user_id: john.id,
            changes: update_user::Changes {
                department: Some(None),
                ..update_user::Changes::default()
            },
        })
        .await
        .unwrap();
    assert_eq!(updated.department, None);
    assert_eq!(updated.created_at, john.created_at);
    assert!(updated.updated_at >= john.updated_at);

    let inactive = svc
        .execute(UpdateUserActivity {
            user_id: jane.id,
            is_active: false,
        })
        .await
        .unwrap();
    assert!(!inactive.is_active);

    let stats = svc.execute(query::users::Statistics).await.unwrap();
    assert_eq!(stats.overview.total_users, 2);
    assert_eq!(stats.overview.inactive_users, 1);
    assert!(stats.by_department.is_empty());

    svc.execute(DeleteUser { user_id: jane.id }).await.unwrap();
    let found = svc
        .execute(query::user::ById::by(jane.id))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn statistics_of_empty_table() {
    let env = bring_up().await.unwrap();
    let svc = &env.svc;

    let stats = svc.execute(query::users::Statistics).await.unwrap();

    assert_eq!(stats.overview.total_users, 0);
    assert_eq!(stats.overview.average_age, None);
    assert_eq!(stats.overview.average_salary, None);
    assert_eq!(stats.overview.min_salary, None);
    assert!(stats.by_department.is_empty());
}
