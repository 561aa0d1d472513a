//! Programmatic schema migrations for the three tables. The binary runs
//! them at startup; tests run them against `sqlite::memory:`.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(CreateMemberTable),
            Box::new(CreateOrderTable),
            Box::new(CreateProductTable),
        ]
    }
}

pub struct CreateMemberTable;

#[async_trait::async_trait]
impl MigrationName for CreateMemberTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_member_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateMemberTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(MemberTable)
            .if_not_exists()
            .col(
                ColumnDef::new(MemberColumn::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(MemberColumn::FirstName).string().not_null())
            .col(ColumnDef::new(MemberColumn::LastName).string().not_null())
            .col(
                ColumnDef::new(MemberColumn::Email)
                    .string()
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(MemberColumn::Phone).string().null())
            .col(ColumnDef::new(MemberColumn::Address).string().null())
            .col(
                ColumnDef::new(MemberColumn::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MemberTable).to_owned())
            .await
    }
}

#[derive(Debug)]
pub enum MemberColumn {
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    CreatedAt,
}

impl Iden for MemberColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "id",
                Self::FirstName => "first_name",
                Self::LastName => "last_name",
                Self::Email => "email",
                Self::Phone => "phone",
                Self::Address => "address",
                Self::CreatedAt => "created_at",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct MemberTable;

impl Iden for MemberTable {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "members").unwrap();
    }
}

pub struct CreateOrderTable;

#[async_trait::async_trait]
impl MigrationName for CreateOrderTable {
    fn name(&self) -> &'static str {
        "m20240101_000002_create_order_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateOrderTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(OrderTable)
            .if_not_exists()
            .col(
                ColumnDef::new(OrderColumn::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(OrderColumn::OrderNumber)
                    .string()
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(OrderColumn::CustomerName).string().not_null())
            .col(ColumnDef::new(OrderColumn::Email).string().not_null())
            .col(ColumnDef::new(OrderColumn::Phone).string().null())
            .col(ColumnDef::new(OrderColumn::TotalAmount).double().not_null())
            .col(
                ColumnDef::new(OrderColumn::Status)
                    .string()
                    .not_null()
                    .default("pending"),
            )
            .col(
                ColumnDef::new(OrderColumn::OrderDate)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(OrderColumn::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderTable).to_owned())
            .await
    }
}

#[derive(Debug)]
pub enum OrderColumn {
    Id,
    OrderNumber,
    CustomerName,
    Email,
    Phone,
    TotalAmount,
    Status,
    OrderDate,
    CreatedAt,
}

impl Iden for OrderColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "id",
                Self::OrderNumber => "order_number",
                Self::CustomerName => "customer_name",
                Self::Email => "email",
                Self::Phone => "phone",
                Self::TotalAmount => "total_amount",
                Self::Status => "status",
                Self::OrderDate => "order_date",
                Self::CreatedAt => "created_at",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct OrderTable;

impl Iden for OrderTable {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "orders").unwrap();
    }
}

pub struct CreateProductTable;

#[async_trait::async_trait]
impl MigrationName for CreateProductTable {
    fn name(&self) -> &'static str {
        "m20240101_000003_create_product_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateProductTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(ProductTable)
            .if_not_exists()
            .col(
                ColumnDef::new(ProductColumn::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(ProductColumn::Name).string().not_null())
            .col(ColumnDef::new(ProductColumn::Description).text().null())
            .col(ColumnDef::new(ProductColumn::Price).double().not_null())
            .col(
                ColumnDef::new(ProductColumn::Stock)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(ColumnDef::new(ProductColumn::Category).string().null())
            .col(ColumnDef::new(ProductColumn::ImageUrl).string().null())
            .col(
                ColumnDef::new(ProductColumn::IsActive)
                    .boolean()
                    .not_null()
                    .default(true),
            )
            .col(
                ColumnDef::new(ProductColumn::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductTable).to_owned())
            .await
    }
}

#[derive(Debug)]
pub enum ProductColumn {
    Id,
    Name,
    Description,
    Price,
    Stock,
    Category,
    ImageUrl,
    IsActive,
    CreatedAt,
}

impl Iden for ProductColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "id",
                Self::Name => "name",
                Self::Description => "description",
                Self::Price => "price",
                Self::Stock => "stock",
                Self::Category => "category",
                Self::ImageUrl => "image_url",
                Self::IsActive => "is_active",
                Self::CreatedAt => "created_at",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct ProductTable;

impl Iden for ProductTable {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "products").unwrap();
    }
}
