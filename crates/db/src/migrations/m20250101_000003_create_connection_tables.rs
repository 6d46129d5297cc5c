//! Create `follower`, `following`, `muted` and `blocked` tables migration.
//!
//! Each table holds exactly one row per user, keyed by the owner's ID, with
//! member lists stored as JSONB arrays.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Builds a one-row-per-owner connection table with the given list columns.
fn connection_table<T>(table: T, lists: &[Alias], fk_name: &str) -> TableCreateStatement
where
    T: Iden + Copy + 'static,
{
    let mut stmt = Table::create();
    stmt.table(table)
        .if_not_exists()
        .col(
            ColumnDef::new(Connection::UserId)
                .string_len(32)
                .not_null()
                .primary_key(),
        );

    for list in lists {
        stmt.col(
            ColumnDef::new(list.clone())
                .json_binary()
                .not_null()
                .default(Expr::cust("'[]'::jsonb")),
        );
    }

    stmt.col(ColumnDef::new(Connection::UpdatedAt).timestamp_with_time_zone())
        .foreign_key(
            ForeignKey::create()
                .name(fk_name)
                .from(table, Connection::UserId)
                .to(User::Table, User::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(connection_table(
                Follower::Table,
                &[Alias::new("follower"), Alias::new("requests_for_follow")],
                "fk_follower_user",
            ))
            .await?;

        manager
            .create_table(connection_table(
                Following::Table,
                &[Alias::new("following"), Alias::new("requesting_to_follow")],
                "fk_following_user",
            ))
            .await?;

        manager
            .create_table(connection_table(
                Muted::Table,
                &[Alias::new("muted")],
                "fk_muted_user",
            ))
            .await?;

        manager
            .create_table(connection_table(
                Blocked::Table,
                &[Alias::new("blocked")],
                "fk_blocked_user",
            ))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Blocked::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Muted::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Following::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Follower::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
enum Follower {
    Table,
}

#[derive(Iden, Clone, Copy)]
enum Following {
    Table,
}

#[derive(Iden, Clone, Copy)]
enum Muted {
    Table,
}

#[derive(Iden, Clone, Copy)]
enum Blocked {
    Table,
}

#[derive(Iden)]
enum Connection {
    UserId,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
