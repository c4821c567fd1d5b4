use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SeenLink::Table)
                    .if_not_exists()
                    .col(pk_auto(SeenLink::Id))
                    .col(string(SeenLink::Link))
                    .col(big_integer(SeenLink::SeenAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_seen_link_link")
                    .table(SeenLink::Table)
                    .col(SeenLink::Link)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SeenLink::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum SeenLink {
    Table,
    Id,
    Link,
    SeenAt,
}
