use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_catalog_tables::Migration),
            Box::new(m20240101_000002_create_register_tables::Migration),
            Box::new(m20240101_000003_create_purchase_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Categories::Name)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Categories::Description)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Categories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Categories::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TransportCompanies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TransportCompanies::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(TransportCompanies::Name)
                                .string_len(200)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(TransportCompanies::ContactInfo)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(TransportCompanies::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransportCompanies::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::Name).string_len(200).not_null())
                        .col(
                            ColumnDef::new(Products::Description)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Products::CategoryId).integer().not_null())
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_category_id")
                                .from(Products::Table, Products::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_category_id")
                        .table(Products::Table)
                        .col(Products::CategoryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_name")
                        .table(Products::Table)
                        .col(Products::Name)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductTransportCompanies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductTransportCompanies::ProductId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductTransportCompanies::TransportCompanyId)
                                .integer()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(ProductTransportCompanies::ProductId)
                                .col(ProductTransportCompanies::TransportCompanyId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_transport_companies_product_id")
                                .from(
                                    ProductTransportCompanies::Table,
                                    ProductTransportCompanies::ProductId,
                                )
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_transport_companies_company_id")
                                .from(
                                    ProductTransportCompanies::Table,
                                    ProductTransportCompanies::TransportCompanyId,
                                )
                                .to(TransportCompanies::Table, TransportCompanies::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Prices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Prices::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Prices::ProductId).integer().not_null())
                        .col(ColumnDef::new(Prices::Value).decimal_len(10, 2).not_null())
                        .col(
                            ColumnDef::new(Prices::StartDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Prices::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Prices::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_prices_product_id")
                                .from(Prices::Table, Prices::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Current-price lookups scan one product's history by start date
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_prices_product_id_start_date")
                        .table(Prices::Table)
                        .col(Prices::ProductId)
                        .col(Prices::StartDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Prices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProductTransportCompanies::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TransportCompanies::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Categories {
        Table,
        Id,
        Name,
        Description,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum TransportCompanies {
        Table,
        Id,
        Name,
        ContactInfo,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Description,
        CategoryId,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ProductTransportCompanies {
        Table,
        ProductId,
        TransportCompanyId,
    }

    #[derive(DeriveIden)]
    enum Prices {
        Table,
        Id,
        ProductId,
        Value,
        StartDate,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_register_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_register_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PaymentMethods::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentMethods::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PaymentMethods::Name)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(PaymentMethods::Code)
                                .string_len(10)
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await?;

            // Both payment methods exist from day one
            let seed = Query::insert()
                .into_table(PaymentMethods::Table)
                .columns([PaymentMethods::Name, PaymentMethods::Code])
                .values_panic(["Наличные".into(), "cash".into()])
                .values_panic(["Безналичный расчет".into(), "card".into()])
                .to_owned();
            manager.exec_stmt(seed).await?;

            manager
                .create_table(
                    Table::create()
                        .table(Cashiers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Cashiers::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Cashiers::Name).string_len(150).not_null())
                        .col(
                            ColumnDef::new(Cashiers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Cashiers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Cashiers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CashRegisters::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CashRegisters::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(CashRegisters::Number)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(CashRegisters::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(CashRegisters::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashRegisters::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CashRegisterPaymentMethods::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CashRegisterPaymentMethods::CashRegisterId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashRegisterPaymentMethods::PaymentMethodId)
                                .integer()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(CashRegisterPaymentMethods::CashRegisterId)
                                .col(CashRegisterPaymentMethods::PaymentMethodId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cash_register_payment_methods_register_id")
                                .from(
                                    CashRegisterPaymentMethods::Table,
                                    CashRegisterPaymentMethods::CashRegisterId,
                                )
                                .to(CashRegisters::Table, CashRegisters::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cash_register_payment_methods_method_id")
                                .from(
                                    CashRegisterPaymentMethods::Table,
                                    CashRegisterPaymentMethods::PaymentMethodId,
                                )
                                .to(PaymentMethods::Table, PaymentMethods::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DiscountCards::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DiscountCards::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(DiscountCards::CardNumber)
                                .string_len(20)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(DiscountCards::DiscountPercent)
                                .decimal_len(5, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DiscountCards::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(DiscountCards::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DiscountCards::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DiscountCards::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CashRegisterPaymentMethods::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CashRegisters::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Cashiers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PaymentMethods {
        Table,
        Id,
        Name,
        Code,
    }

    #[derive(DeriveIden)]
    enum Cashiers {
        Table,
        Id,
        Name,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CashRegisters {
        Table,
        Id,
        Number,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CashRegisterPaymentMethods {
        Table,
        CashRegisterId,
        PaymentMethodId,
    }

    #[derive(DeriveIden)]
    enum DiscountCards {
        Table,
        Id,
        CardNumber,
        DiscountPercent,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_purchase_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_purchase_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Purchases::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Purchases::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Purchases::CashRegisterId).integer().not_null())
                        .col(ColumnDef::new(Purchases::CashierId).integer().null())
                        .col(ColumnDef::new(Purchases::DiscountCardId).integer().null())
                        .col(
                            ColumnDef::new(Purchases::PurchaseTime)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Purchases::Subtotal)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Purchases::DiscountAmount)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Purchases::FinalAmount)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Purchases::AmountPaidCash)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Purchases::AmountPaidCard)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Purchases::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Purchases::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchases_cash_register_id")
                                .from(Purchases::Table, Purchases::CashRegisterId)
                                .to(CashRegisters::Table, CashRegisters::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchases_cashier_id")
                                .from(Purchases::Table, Purchases::CashierId)
                                .to(Cashiers::Table, Cashiers::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchases_discount_card_id")
                                .from(Purchases::Table, Purchases::DiscountCardId)
                                .to(DiscountCards::Table, DiscountCards::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchases_purchase_time")
                        .table(Purchases::Table)
                        .col(Purchases::PurchaseTime)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchasePaymentMethods::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchasePaymentMethods::PurchaseId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchasePaymentMethods::PaymentMethodId)
                                .integer()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(PurchasePaymentMethods::PurchaseId)
                                .col(PurchasePaymentMethods::PaymentMethodId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_payment_methods_purchase_id")
                                .from(
                                    PurchasePaymentMethods::Table,
                                    PurchasePaymentMethods::PurchaseId,
                                )
                                .to(Purchases::Table, Purchases::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_payment_methods_method_id")
                                .from(
                                    PurchasePaymentMethods::Table,
                                    PurchasePaymentMethods::PaymentMethodId,
                                )
                                .to(PaymentMethods::Table, PaymentMethods::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PurchaseItems::PurchaseId).integer().not_null())
                        .col(ColumnDef::new(PurchaseItems::ProductId).integer().not_null())
                        .col(
                            ColumnDef::new(PurchaseItems::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(PurchaseItems::PriceAtPurchase)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseItems::LineTotal)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_items_purchase_id")
                                .from(PurchaseItems::Table, PurchaseItems::PurchaseId)
                                .to(Purchases::Table, Purchases::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_items_product_id")
                                .from(PurchaseItems::Table, PurchaseItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_purchase_items_purchase_product")
                        .table(PurchaseItems::Table)
                        .col(PurchaseItems::PurchaseId)
                        .col(PurchaseItems::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchasePaymentMethods::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Purchases::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Purchases {
        Table,
        Id,
        CashRegisterId,
        CashierId,
        DiscountCardId,
        PurchaseTime,
        Subtotal,
        DiscountAmount,
        FinalAmount,
        AmountPaidCash,
        AmountPaidCard,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PurchasePaymentMethods {
        Table,
        PurchaseId,
        PaymentMethodId,
    }

    #[derive(DeriveIden)]
    enum PurchaseItems {
        Table,
        Id,
        PurchaseId,
        ProductId,
        Quantity,
        PriceAtPurchase,
        LineTotal,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum CashRegisters {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Cashiers {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum DiscountCards {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum PaymentMethods {
        Table,
        Id,
    }
}
