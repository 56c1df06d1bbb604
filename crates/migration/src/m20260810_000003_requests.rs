use sea_orm_migration::prelude::*;

use crate::m20260810_000002_groups::Groups;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Requests {
    Table,
    Id,
    GroupId,
    Title,
    Icon,
    CreatedBy,
    TotalAmount,
    CreatedAt,
}

#[derive(Iden)]
enum RequestMembers {
    Table,
    RequestId,
    UserId,
    Position,
}

#[derive(Iden)]
enum RequestPaid {
    Table,
    RequestId,
    UserId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Requests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Requests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Requests::GroupId).string().not_null())
                    .col(ColumnDef::new(Requests::Title).string().not_null())
                    .col(ColumnDef::new(Requests::Icon).string().not_null())
                    .col(ColumnDef::new(Requests::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Requests::TotalAmount).double().not_null())
                    .col(ColumnDef::new(Requests::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-requests-group_id")
                            .from(Requests::Table, Requests::GroupId)
                            .to(Groups::Table, Groups::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-requests-group_id")
                    .table(Requests::Table)
                    .col(Requests::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RequestMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RequestMembers::RequestId).string().not_null())
                    .col(ColumnDef::new(RequestMembers::UserId).string().not_null())
                    .col(ColumnDef::new(RequestMembers::Position).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(RequestMembers::RequestId)
                            .col(RequestMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-request_members-request_id")
                            .from(RequestMembers::Table, RequestMembers::RequestId)
                            .to(Requests::Table, Requests::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-request_members-user_id")
                    .table(RequestMembers::Table)
                    .col(RequestMembers::UserId)
                    .to_owned(),
            )
            .await?;

        // Paid roster is kept separate from the member roster: a payer stays
        // credited even after leaving the request.
        manager
            .create_table(
                Table::create()
                    .table(RequestPaid::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RequestPaid::RequestId).string().not_null())
                    .col(ColumnDef::new(RequestPaid::UserId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(RequestPaid::RequestId)
                            .col(RequestPaid::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-request_paid-request_id")
                            .from(RequestPaid::Table, RequestPaid::RequestId)
                            .to(Requests::Table, Requests::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RequestPaid::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RequestMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Requests::Table).to_owned())
            .await?;
        Ok(())
    }
}
