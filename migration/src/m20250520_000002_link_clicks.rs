//! link_clicks 表
//!
//! 追加写入的点击事件。link_id 不设外键：删除链接不会级联删除点击记录。
//! clicked_at 存站点本地时间（无时区）。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LinkClicks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkClicks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinkClicks::LinkId).big_integer().not_null())
                    .col(ColumnDef::new(LinkClicks::VisitorId).string_len(64).not_null())
                    .col(ColumnDef::new(LinkClicks::IpAddress).string_len(45).not_null())
                    .col(ColumnDef::new(LinkClicks::UserAgent).text().not_null())
                    .col(ColumnDef::new(LinkClicks::Referrer).text().not_null())
                    .col(ColumnDef::new(LinkClicks::DeviceType).string_len(32).not_null())
                    .col(ColumnDef::new(LinkClicks::Browser).string_len(64).not_null())
                    .col(ColumnDef::new(LinkClicks::Os).string_len(64).not_null())
                    .col(ColumnDef::new(LinkClicks::ClickedAt).date_time().not_null())
                    .col(ColumnDef::new(LinkClicks::UtmSource).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(LinkClicks::UtmMedium).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(LinkClicks::UtmCampaign).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(LinkClicks::UtmTerm).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(LinkClicks::UtmContent).string_len(255).not_null().default(""))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_link_clicks_link_id")
                    .table(LinkClicks::Table)
                    .col(LinkClicks::LinkId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_link_clicks_clicked_at")
                    .table(LinkClicks::Table)
                    .col(LinkClicks::ClickedAt)
                    .to_owned(),
            )
            .await?;

        // 单链接时间序列 + 独立访客判断
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_link_clicks_link_visitor")
                    .table(LinkClicks::Table)
                    .col(LinkClicks::LinkId)
                    .col(LinkClicks::VisitorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_link_clicks_link_visitor",
            "idx_link_clicks_clicked_at",
            "idx_link_clicks_link_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        manager
            .drop_table(Table::drop().table(LinkClicks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LinkClicks {
    #[sea_orm(iden = "link_clicks")]
    Table,
    Id,
    LinkId,
    VisitorId,
    IpAddress,
    UserAgent,
    Referrer,
    DeviceType,
    Browser,
    Os,
    ClickedAt,
    UtmSource,
    UtmMedium,
    UtmCampaign,
    UtmTerm,
    UtmContent,
}
