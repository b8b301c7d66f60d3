use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const CONTACTS_OWNER_INDEX: &str = "idx_contacts_user_id_first_name";
const ADDRESSES_PARENT_INDEX: &str = "idx_addresses_contact_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(CONTACTS_OWNER_INDEX)
                    .table(Contacts::Table)
                    .col(Contacts::UserId)
                    .col(Contacts::FirstName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(ADDRESSES_PARENT_INDEX)
                    .table(Addresses::Table)
                    .col(Addresses::ContactId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(ADDRESSES_PARENT_INDEX)
                    .table(Addresses::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name(CONTACTS_OWNER_INDEX)
                    .table(Contacts::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Contacts {
    Table,
    UserId,
    FirstName,
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    ContactId,
}
