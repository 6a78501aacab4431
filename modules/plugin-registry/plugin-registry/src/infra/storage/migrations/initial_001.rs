use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Plans::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Plans::PluginId).uuid().not_null())
                    .col(ColumnDef::new(Plans::Name).string().not_null())
                    .col(
                        ColumnDef::new(Plans::BillingPeriod)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Plans::IsFree).boolean().not_null())
                    .col(ColumnDef::new(Plans::HasTrial).boolean().not_null())
                    .col(ColumnDef::new(Plans::TrialDays).integer())
                    .col(ColumnDef::new(Plans::HasLimitations).boolean().not_null())
                    .col(ColumnDef::new(Plans::Limitations).json())
                    .col(ColumnDef::new(Plans::IsActive).boolean().not_null())
                    .col(
                        ColumnDef::new(Plans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Plans::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_plugin_subscription_plans_plugin")
                    .table(Plans::Table)
                    .col(Plans::PluginId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tenants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tenants::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tenants::PluginId).uuid().not_null())
                    .col(ColumnDef::new(Tenants::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Tenants::OrganizationId).uuid())
                    .col(ColumnDef::new(Tenants::Scope).string_len(16).not_null())
                    .col(ColumnDef::new(Tenants::Enabled).boolean().not_null())
                    .col(ColumnDef::new(Tenants::AutoInstall).boolean().not_null())
                    .col(
                        ColumnDef::new(Tenants::RequiresApproval)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tenants::IsMandatory).boolean().not_null())
                    .col(ColumnDef::new(Tenants::MaxInstallations).integer())
                    .col(ColumnDef::new(Tenants::MaxActiveUsers).integer())
                    .col(
                        ColumnDef::new(Tenants::CurrentInstallations)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tenants::CurrentActiveUsers)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tenants::TenantConfiguration).json())
                    .col(ColumnDef::new(Tenants::Preferences).json())
                    .col(ColumnDef::new(Tenants::AllowedRoleIds).json())
                    .col(ColumnDef::new(Tenants::AllowedUserIds).json())
                    .col(ColumnDef::new(Tenants::DeniedUserIds).json())
                    .col(ColumnDef::new(Tenants::ApprovedById).uuid())
                    .col(ColumnDef::new(Tenants::ApprovedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Tenants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tenants::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_plugin_tenants_tenant")
                    .table(Tenants::Table)
                    .col(Tenants::TenantId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscriptions::PluginId).uuid().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::PluginTenantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Subscriptions::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Subscriptions::OrganizationId).uuid())
                    .col(ColumnDef::new(Subscriptions::SubscriberId).uuid())
                    .col(ColumnDef::new(Subscriptions::PlanId).uuid())
                    .col(
                        ColumnDef::new(Subscriptions::Scope)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Subscriptions::EndDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Subscriptions::AutoRenew).boolean().not_null())
                    .col(ColumnDef::new(Subscriptions::PaymentMethod).string())
                    .col(ColumnDef::new(Subscriptions::Metadata).json())
                    .col(ColumnDef::new(Subscriptions::CancelledAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Subscriptions::CancellationReason).string())
                    .col(
                        ColumnDef::new(Subscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plugin_subscriptions_plugin_tenant")
                            .from(Subscriptions::Table, Subscriptions::PluginTenantId)
                            .to(Tenants::Table, Tenants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_plugin_subscriptions_plugin_tenant")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::PluginId)
                    .col(Subscriptions::TenantId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_plugin_subscriptions_subscriber")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::SubscriberId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tenants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Plans::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Plans {
    #[sea_orm(iden = "plugin_subscription_plans")]
    Table,
    Id,
    PluginId,
    Name,
    BillingPeriod,
    IsFree,
    HasTrial,
    TrialDays,
    HasLimitations,
    Limitations,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    #[sea_orm(iden = "plugin_tenants")]
    Table,
    Id,
    PluginId,
    TenantId,
    OrganizationId,
    Scope,
    Enabled,
    AutoInstall,
    RequiresApproval,
    IsMandatory,
    MaxInstallations,
    MaxActiveUsers,
    CurrentInstallations,
    CurrentActiveUsers,
    TenantConfiguration,
    Preferences,
    AllowedRoleIds,
    AllowedUserIds,
    DeniedUserIds,
    ApprovedById,
    ApprovedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Subscriptions {
    #[sea_orm(iden = "plugin_subscriptions")]
    Table,
    Id,
    PluginId,
    PluginTenantId,
    TenantId,
    OrganizationId,
    SubscriberId,
    PlanId,
    Scope,
    Status,
    StartDate,
    EndDate,
    AutoRenew,
    PaymentMethod,
    Metadata,
    CancelledAt,
    CancellationReason,
    CreatedAt,
    UpdatedAt,
}
