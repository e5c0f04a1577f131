//! tracked_links 表
//!
//! 每行是一个短链接：标题、目标地址、短码以及冗余的点击 / 独立访客计数。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackedLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackedLinks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TrackedLinks::Title).string_len(255).not_null())
                    .col(ColumnDef::new(TrackedLinks::DestinationUrl).text().not_null())
                    .col(
                        ColumnDef::new(TrackedLinks::ShortCode)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::TotalClicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::UniqueVisitors)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TrackedLinks::Campaign).string_len(255).null())
                    .col(
                        ColumnDef::new(TrackedLinks::Status)
                            .string_len(20)
                            .not_null()
                            .default("publish"),
                    )
                    .col(ColumnDef::new(TrackedLinks::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(TrackedLinks::UpdatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracked_links_short_code")
                    .table(TrackedLinks::Table)
                    .col(TrackedLinks::ShortCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracked_links_status")
                    .table(TrackedLinks::Table)
                    .col(TrackedLinks::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_tracked_links_status").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_tracked_links_short_code").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TrackedLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TrackedLinks {
    #[sea_orm(iden = "tracked_links")]
    Table,
    Id,
    Title,
    DestinationUrl,
    ShortCode,
    TotalClicks,
    UniqueVisitors,
    Campaign,
    Status,
    CreatedAt,
    UpdatedAt,
}
