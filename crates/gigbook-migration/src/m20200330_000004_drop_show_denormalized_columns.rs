use sea_orm_migration::prelude::*;

use super::m20200330_000003_create_shows::Shows;

/// Names and images are joined from `artists`/`venues` at read time, so
/// the copies on `shows` go.
///
/// One ALTER per column: SQLite rejects multiple alterations in one
/// statement.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for column in [Shows::ArtistImageLink, Shows::VenueName, Shows::ArtistName] {
            manager
                .alter_table(
                    Table::alter()
                        .table(Shows::Table)
                        .drop_column(column)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let columns = [
            ColumnDef::new(Shows::ArtistName).string().null().to_owned(),
            ColumnDef::new(Shows::VenueName).string().null().to_owned(),
            ColumnDef::new(Shows::ArtistImageLink)
                .string_len(500)
                .null()
                .to_owned(),
        ];
        for mut column in columns {
            manager
                .alter_table(
                    Table::alter()
                        .table(Shows::Table)
                        .add_column(&mut column)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}
