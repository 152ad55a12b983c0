// Improvement potential: Use `sqlx::migrate!` instead of `CREATE TABLE IF NOT EXISTS` once
//   the schema changes for the first time.
use async_trait::async_trait;
use log::info;
use relay_chess::error::StoreError;
use relay_chess::force::Force;
use relay_chess::marker::{Marker, MarkerSet};
use relay_chess::move_record::{BoardMove, MoveId, MoveRecord, PlayerMove};
use relay_chess::session_store::{MarkerStore, MoveLog};
use sqlx::prelude::*;


// All markers are kept as a bitmask in a single row, so that every marker operation,
// including compare-and-swap, is one atomic UPDATE.
const MARKER_SLOT: i64 = 0;

pub struct SqlxDatabase<DB: sqlx::Database> {
    pub pool: sqlx::Pool<DB>,
}

impl<DB: sqlx::Database> Clone for SqlxDatabase<DB> {
    fn clone(&self) -> Self { Self { pool: self.pool.clone() } }
}

impl SqlxDatabase<sqlx::Sqlite> {
    pub fn new(db_address: &str) -> Result<Self, anyhow::Error> {
        let options = sqlx::sqlite::SqliteConnectOptions::new()
            .filename(db_address)
            .create_if_missing(true);
        let pool = async_std::task::block_on(sqlx::SqlitePool::connect_with(options))?;
        Ok(Self { pool })
    }
}

impl SqlxDatabase<sqlx::Postgres> {
    pub fn new(db_address: &str) -> Result<Self, anyhow::Error> {
        let options = sqlx::postgres::PgPoolOptions::new();
        let pool = async_std::task::block_on(options.connect(db_address))?;
        Ok(Self { pool })
    }
}

pub trait HasIdColumnDefinition {
    // AUTOINCREMENT makes SQLite never reuse ids, even of deleted rows.
    const ID_COLUMN_DEFINITION: &'static str;
}

impl HasIdColumnDefinition for sqlx::Sqlite {
    const ID_COLUMN_DEFINITION: &'static str = "id INTEGER PRIMARY KEY AUTOINCREMENT";
}

impl HasIdColumnDefinition for sqlx::Postgres {
    const ID_COLUMN_DEFINITION: &'static str = "id BIGSERIAL PRIMARY KEY";
}

fn backend_error(err: sqlx::Error) -> StoreError { StoreError::Backend(err.to_string()) }

impl<DB> SqlxDatabase<DB>
where
    DB: sqlx::Database + HasIdColumnDefinition,
    for<'q> i64: sqlx::Type<DB> + sqlx::Encode<'q, DB> + sqlx::Decode<'q, DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> <DB as sqlx::Database>::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    for<'s> &'s str: sqlx::ColumnIndex<DB::Row>,
{
    pub async fn create_tables(&self) -> anyhow::Result<()> {
        let id_column_definition = DB::ID_COLUMN_DEFINITION;
        sqlx::query::<DB>(
            format!(
                "CREATE TABLE IF NOT EXISTS moves (
                {id_column_definition},
                player BIGINT NOT NULL,
                row1 BIGINT NOT NULL,
                col1 BIGINT NOT NULL,
                row2 BIGINT NOT NULL,
                col2 BIGINT NOT NULL)",
            )
            .as_str(),
        )
        .execute(&self.pool)
        .await?;
        sqlx::query::<DB>(
            "CREATE TABLE IF NOT EXISTS session_markers (
            slot BIGINT PRIMARY KEY,
            bits BIGINT NOT NULL)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query::<DB>(
            "INSERT INTO session_markers (slot, bits) VALUES ($1, 0)
            ON CONFLICT (slot) DO NOTHING",
        )
        .bind(MARKER_SLOT)
        .execute(&self.pool)
        .await?;
        info!("Database tables ready");
        Ok(())
    }

    async fn marker_bits(&self) -> Result<i64, StoreError> {
        sqlx::query::<DB>("SELECT bits FROM session_markers WHERE slot = $1")
            .bind(MARKER_SLOT)
            .fetch_one(&self.pool)
            .await
            .and_then(|row| row.try_get::<i64, _>("bits"))
            .map_err(backend_error)
    }
}

fn move_record_from_row(
    id: i64, player: i64, row1: i64, col1: i64, row2: i64, col2: i64,
) -> Result<MoveRecord, StoreError> {
    let player = Force::from_player_number(player)
        .ok_or_else(|| StoreError::Corrupted(format!("move {id} has player {player}")))?;
    Ok(MoveRecord {
        id: MoveId(id),
        player_move: PlayerMove::new(player, BoardMove::new(row1, col1, row2, col2)),
    })
}

#[async_trait]
impl<DB> MarkerStore for SqlxDatabase<DB>
where
    DB: sqlx::Database + HasIdColumnDefinition,
    for<'q> i64: sqlx::Type<DB> + sqlx::Encode<'q, DB> + sqlx::Decode<'q, DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> <DB as sqlx::Database>::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    for<'s> &'s str: sqlx::ColumnIndex<DB::Row>,
{
    async fn markers(&self) -> Result<MarkerSet, StoreError> {
        MarkerSet::try_from_bits(self.marker_bits().await?).map_err(StoreError::Corrupted)
    }

    async fn set(&self, marker: Marker) -> Result<(), StoreError> {
        sqlx::query::<DB>("UPDATE session_markers SET bits = bits | $1 WHERE slot = $2")
            .bind(marker.bit())
            .bind(MARKER_SLOT)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn clear(&self, marker: Marker) -> Result<(), StoreError> {
        sqlx::query::<DB>("UPDATE session_markers SET bits = bits & $1 WHERE slot = $2")
            .bind(!marker.bit())
            .bind(MARKER_SLOT)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn compare_and_swap(
        &self, expected: MarkerSet, new: MarkerSet,
    ) -> Result<bool, StoreError> {
        // Generic `QueryResult` doesn't expose `rows_affected`, hence RETURNING.
        let swapped = sqlx::query::<DB>(
            "UPDATE session_markers SET bits = $1
            WHERE slot = $2 AND bits = $3
            RETURNING bits",
        )
        .bind(new.to_bits())
        .bind(MARKER_SLOT)
        .bind(expected.to_bits())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?;
        Ok(swapped.is_some())
    }

    async fn clean(&self) -> Result<(), StoreError> {
        sqlx::query::<DB>("UPDATE session_markers SET bits = 0 WHERE slot = $1")
            .bind(MARKER_SLOT)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}

#[async_trait]
impl<DB> MoveLog for SqlxDatabase<DB>
where
    DB: sqlx::Database + HasIdColumnDefinition,
    for<'q> i64: sqlx::Type<DB> + sqlx::Encode<'q, DB> + sqlx::Decode<'q, DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> <DB as sqlx::Database>::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    for<'s> &'s str: sqlx::ColumnIndex<DB::Row>,
{
    async fn append(&self, player_move: PlayerMove) -> Result<MoveId, StoreError> {
        let BoardMove { row1, col1, row2, col2 } = player_move.board_move;
        let row = sqlx::query::<DB>(
            "INSERT INTO moves (player, row1, col1, row2, col2)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id",
        )
        .bind(player_move.player.player_number())
        .bind(row1)
        .bind(col1)
        .bind(row2)
        .bind(col2)
        .fetch_one(&self.pool)
        .await
        .map_err(backend_error)?;
        Ok(MoveId(row.try_get("id").map_err(backend_error)?))
    }

    async fn max_id(&self) -> Result<MoveId, StoreError> {
        let row = sqlx::query::<DB>("SELECT COALESCE(MAX(id), 0) AS max_id FROM moves")
            .fetch_one(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(MoveId(row.try_get("max_id").map_err(backend_error)?))
    }

    async fn get(&self, id: MoveId) -> Result<Option<MoveRecord>, StoreError> {
        let Some(row) = sqlx::query::<DB>(
            "SELECT id, player, row1, col1, row2, col2 FROM moves WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?
        else {
            return Ok(None);
        };
        let get = |column: &str| row.try_get::<i64, _>(column).map_err(backend_error);
        move_record_from_row(
            get("id")?,
            get("player")?,
            get("row1")?,
            get("col1")?,
            get("row2")?,
            get("col2")?,
        )
        .map(Some)
    }
}
