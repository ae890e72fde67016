//! [`User`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    pagination::Sort,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{
            self,
            postgres::{Connection, SearchPattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of the `users` table, in the order [`from_row()`] expects them.
const COLUMNS: &str = "id, name, email, status, role, avatar, \
                       created_at, updated_at";

/// Reads a [`User`] out of a [`Row`] selected with [`COLUMNS`].
fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        status: row.get("status"),
        role: row.get("role"),
        avatar: row.get("avatar"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<user::Id, User>, IDs>>> for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[user::Id]>,
{
    type Ok = HashMap<user::Id, User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<user::Id, User>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[user::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE id = ANY($1::UUID[])"
        );
        Ok(self
            .query(&sql, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .map(|u| (u.id, u))
            .collect())
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<user::Id, User>, [user::Id; 1]>>,
        Ok = HashMap<user::Id, User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Email>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE LOWER(email) = LOWER($1::VARCHAR) \
             LIMIT 1"
        );
        Ok(self
            .query_opt(&sql, &[&email])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(user)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            name,
            email,
            status,
            role,
            avatar,
            created_at,
            updated_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (\
                id, name, email, \
                status, role, avatar, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, \
                $4::VARCHAR, $5::VARCHAR, $6::VARCHAR, \
                $7::TIMESTAMPTZ, $8::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                email = EXCLUDED.email, \
                status = EXCLUDED.status, \
                role = EXCLUDED.role, \
                avatar = EXCLUDED.avatar, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &email,
                &status,
                &role,
                &avatar,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

/// Deletes a single [`User`] along with its lock row.
const DELETE_ONE: &str = "\
    WITH unlocked AS (DELETE FROM users_lock WHERE id = $1::UUID) \
    DELETE FROM users \
    WHERE id = $1::UUID";

/// Deletes all the [`User`]s along with their lock rows.
const DELETE_ALL: &str = "\
    WITH unlocked AS (DELETE FROM users_lock) \
    DELETE FROM users";

impl<C> Database<Delete<By<User, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: user::Id = by.into_inner();

        self.exec(DELETE_ONE, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Vec<User>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Delete<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.exec(DELETE_ALL, &[]).await.map_err(tracerr::wrap!())
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
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        // Upserting a row takes its lock until the end of the transaction.
        const SQL: &str = "\
            INSERT INTO users_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

/// Positions of the [`read::user::list::Filter`] parameters in a list query.
#[derive(Clone, Copy, Debug, Default)]
struct FilterParams {
    /// Position of the [`SearchPattern`] parameter.
    search: Option<usize>,

    /// Position of the [`user::Status`] parameter.
    status: Option<usize>,

    /// Position of the [`user::Role`] parameter.
    role: Option<usize>,
}

impl FilterParams {
    /// Renders the `WHERE` clause filtering by these parameters.
    fn where_clause(self) -> String {
        let Self {
            search,
            status,
            role,
        } = self;

        let conditions = search
            .map(|i| {
                format!(
                    "(name ILIKE ${i}::VARCHAR OR email ILIKE ${i}::VARCHAR)"
                )
            })
            .into_iter()
            .chain(status.map(|i| format!("status = ${i}::VARCHAR")))
            .chain(role.map(|i| format!("role = ${i}::VARCHAR")))
            .collect::<Vec<_>>();
        if conditions.is_empty() {
            return String::new();
        }
        format!("WHERE {}", conditions.iter().format(" AND "))
    }
}

/// Renders the `ORDER BY` clause for the provided [`Sort`].
///
/// Ties are broken by `id` in the same direction, so pages never overlap.
fn order_clause(sort: Sort<read::user::list::Field>) -> String {
    use read::user::list::Field as F;

    let column = match sort.field {
        F::Name => "name",
        F::Email => "email",
        F::CreatedAt => "created_at",
        F::UpdatedAt => "updated_at",
    };
    let order = sort.order.sql();
    format!("ORDER BY {column} {order}, id {order}")
}

impl<C> Database<Select<By<read::user::list::Page, read::user::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::user::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::user::list::Page, read::user::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::user::list::Selector {
            arguments,
            filter:
                read::user::list::Filter {
                    search,
                    status,
                    role,
                },
            sort,
        } = by.into_inner();

        let pattern = search.as_deref().map(SearchPattern::new);
        let limit = i64::from(arguments.limit());
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let filter = FilterParams {
            search: pattern.as_ref().map(|p| {
                ps.push(p);
                ps.len()
            }),
            status: status.as_ref().map(|s| {
                ps.push(s);
                ps.len()
            }),
            role: role.as_ref().map(|r| {
                ps.push(r);
                ps.len()
            }),
        }
        .where_clause();

        let sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM users \
             {filter}"
        );
        let total: i64 = self
            .query_one(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .get(0);
        let total = u64::try_from(total).unwrap_or_default();

        let filtered = ps.len();
        ps.push(&limit);
        ps.push(&offset);

        let sql = format!(
            "SELECT id \
             FROM users \
             {filter} \
             {order} \
             LIMIT ${limit_idx}::INT8 \
             OFFSET ${offset_idx}::INT8",
            order = order_clause(sort),
            limit_idx = filtered + 1,
            offset_idx = filtered + 2,
        );
        let ids = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"));

        Ok(read::user::list::Page::new(arguments, ids, total))
    }
}

impl<C> Database<Select<By<read::user::Stats, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::user::Stats;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::user::Stats, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT8 AS total, \
                   COUNT(*) FILTER (WHERE status = 'ACTIVE')::INT8 \
                       AS active, \
                   COUNT(*) FILTER (WHERE status = 'PENDING')::INT8 \
                       AS pending, \
                   COUNT(*) FILTER (WHERE status = 'INACTIVE')::INT8 \
                       AS inactive \
            FROM users";
        let row = self.query_one(SQL, &[]).await.map_err(tracerr::wrap!())?;

        let count =
            |c: &str| u64::try_from(row.get::<_, i64>(c)).unwrap_or_default();
        Ok(read::user::Stats {
            total: count("total"),
            active: count("active"),
            pending: count("pending"),
            inactive: count("inactive"),
        })
    }
}

impl<C> Database<Select<By<read::user::Roles, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::user::Roles;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::user::Roles, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT DISTINCT role \
            FROM users \
            ORDER BY role ASC";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("role"))
            .collect::<Vec<user::Role>>()
            .into())
    }
}

#[cfg(test)]
mod spec {
    use common::pagination::{Order, Sort};

    use crate::read::user::list::Field;

    use super::{order_clause, FilterParams, DELETE_ALL, DELETE_ONE};

    #[test]
    fn deletion_releases_lock_rows() {
        assert!(DELETE_ONE.starts_with(
            "WITH unlocked AS (DELETE FROM users_lock WHERE id = $1::UUID) ",
        ));
        assert!(DELETE_ONE.ends_with("WHERE id = $1::UUID"));
        assert_eq!(
            DELETE_ALL,
            "WITH unlocked AS (DELETE FROM users_lock) DELETE FROM users",
        );
    }

    #[test]
    fn no_filter_renders_nothing() {
        assert_eq!(FilterParams::default().where_clause(), "");
    }

    #[test]
    fn filters_are_conjoined() {
        let clause = FilterParams {
            search: Some(1),
            status: None,
            role: Some(2),
        }
        .where_clause();

        assert_eq!(
            clause,
            "WHERE (name ILIKE $1::VARCHAR OR email ILIKE $1::VARCHAR) \
             AND role = $2::VARCHAR",
        );
    }

    #[test]
    fn status_only() {
        let clause = FilterParams {
            status: Some(1),
            ..FilterParams::default()
        }
        .where_clause();

        assert_eq!(clause, "WHERE status = $1::VARCHAR");
    }

    #[test]
    fn orders_with_id_tie_breaker() {
        assert_eq!(
            order_clause(Sort::default()),
            "ORDER BY created_at DESC, id DESC",
        );
        assert_eq!(
            order_clause(Sort {
                field: Field::Name,
                order: Order::Ascending,
            }),
            "ORDER BY name ASC, id ASC",
        );
    }
}
