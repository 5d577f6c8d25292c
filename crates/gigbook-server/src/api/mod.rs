pub mod artists;
pub mod home;
pub mod shows;
pub mod venues;

use chrono::{DateTime, Utc};
use gigbook_db::entities::show;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, DbErr, EntityTrait, QueryFilter, QuerySelect, Select,
};
use std::collections::HashMap;

/// Number of shows after `now`, grouped on `key` (`VenueId` or
/// `ArtistId`) and limited to `only` when given. Ids without upcoming
/// shows are absent.
pub(crate) async fn upcoming_counts<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
    key: show::Column,
    only: Option<&[i32]>,
) -> Result<HashMap<i32, usize>, DbErr> {
    if only.is_some_and(|ids| ids.is_empty()) {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, i64)> = upcoming_counts_query(now, key, only)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, n)| (id, usize::try_from(n).unwrap_or_default()))
        .collect())
}

fn upcoming_counts_query(
    now: DateTime<Utc>,
    key: show::Column,
    only: Option<&[i32]>,
) -> Select<show::Entity> {
    let mut query = show::Entity::find()
        .select_only()
        .column(key)
        .column_as(Expr::col(show::Column::Id).count(), "upcoming")
        .filter(show::Column::StartTime.gt(now));
    if let Some(ids) = only {
        query = query.filter(key.is_in(ids.iter().copied()));
    }
    query.group_by(key)
}

/// Case-insensitive substring match on `column`. LIKE wildcards in the
/// term match literally.
///
/// SQLite's `LOWER` folds ASCII only, so the term is folded the same way
/// there; PostgreSQL folds the full Unicode range on both sides.
pub(crate) fn name_contains<C: ColumnTrait>(
    backend: DbBackend,
    column: C,
    term: &str,
) -> SimpleExpr {
    let term = term.trim();
    let folded = match backend {
        DbBackend::Postgres => term.to_lowercase(),
        _ => term.to_ascii_lowercase(),
    };
    let pattern = format!("%{}%", escape_like(&folded));
    Expr::expr(Func::lower(Expr::col((column.entity_name(), column))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
