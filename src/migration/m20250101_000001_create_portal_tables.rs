use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Student::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Student::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Student::Email).string_len(120).not_null().unique_key())
                    .col(ColumnDef::new(Student::Name).string_len(80).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Company::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Company::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Company::Email).string_len(120).not_null().unique_key())
                    .col(ColumnDef::new(Company::Name).string_len(80).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JobPost::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobPost::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobPost::Title).string_len(120).not_null())
                    .col(ColumnDef::new(JobPost::Description).text().not_null())
                    .col(ColumnDef::new(JobPost::CompanyId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_post_company")
                            .from(JobPost::Table, JobPost::CompanyId)
                            .to(Company::Table, Company::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobPost::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Company::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Student::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Student {
    Table,
    Id,
    Email,
    Name,
}

#[derive(DeriveIden)]
enum Company {
    Table,
    Id,
    Email,
    Name,
}

#[derive(DeriveIden)]
enum JobPost {
    Table,
    Id,
    Title,
    Description,
    CompanyId,
}
