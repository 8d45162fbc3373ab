//! Record store: owns the database handle and performs registrations and
//! job postings. Opened once at startup, closed at shutdown.

use poem_openapi::Object;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm_migration::prelude::MigratorTrait;
use validator::Validate;

use crate::entities::{company, job_post, student};
use crate::error::{PortalError, Registry, Result};
use crate::migration::Migrator;

#[derive(Debug, Clone, Object, Validate)]
pub struct NewStudent {
    #[validate(email, length(max = 120))]
    pub email: String,
    #[validate(length(min = 1, max = 80))]
    pub name: String,
}

#[derive(Debug, Clone, Object, Validate)]
pub struct NewCompany {
    #[validate(email, length(max = 120))]
    pub email: String,
    #[validate(length(min = 1, max = 80))]
    pub name: String,
}

#[derive(Debug, Clone, Object, Validate)]
pub struct NewJobPost {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub company_id: i32,
}

#[derive(Debug, Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    /// Connects and brings the schema up to date.
    pub async fn open(url: &str) -> Result<Self> {
        let mut opts = ConnectOptions::new(url.to_owned());
        // every pooled connection to an in-memory sqlite db is a separate db
        if url.contains(":memory:") || url.contains("mode=memory") {
            opts.max_connections(1).min_connections(1);
        }
        Self::connect(opts).await
    }

    pub async fn connect(opts: ConnectOptions) -> Result<Self> {
        let db = Database::connect(opts).await?;
        Migrator::up(&db, None).await?;
        tracing::debug!("store opened, migrations applied");
        Ok(Self { db })
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn ping(&self) -> Result<()> {
        self.db.ping().await?;
        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        self.db.close().await?;
        tracing::info!("store closed");
        Ok(())
    }

    pub async fn register_student(&self, input: NewStudent) -> Result<student::Model> {
        input.validate()?;
        let txn = self.db.begin().await?;

        let taken = student::Entity::find()
            .filter(student::Column::Email.eq(input.email.as_str()))
            .one(&txn)
            .await?;
        if taken.is_some() {
            tracing::warn!(email = %input.email, "student already registered");
            return Err(PortalError::AlreadyRegistered(Registry::Student));
        }

        let created = student::ActiveModel {
            email: Set(input.email),
            name: Set(input.name),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| PortalError::from_insert(e, Some(Registry::Student), None))?;
        txn.commit().await?;

        tracing::info!(id = created.id, "student registered");
        Ok(created)
    }

    pub async fn register_company(&self, input: NewCompany) -> Result<company::Model> {
        input.validate()?;
        let txn = self.db.begin().await?;

        let taken = company::Entity::find()
            .filter(company::Column::Email.eq(input.email.as_str()))
            .one(&txn)
            .await?;
        if taken.is_some() {
            tracing::warn!(email = %input.email, "company already registered");
            return Err(PortalError::AlreadyRegistered(Registry::Company));
        }

        let created = company::ActiveModel {
            email: Set(input.email),
            name: Set(input.name),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| PortalError::from_insert(e, Some(Registry::Company), None))?;
        txn.commit().await?;

        tracing::info!(id = created.id, "company registered");
        Ok(created)
    }

    /// Inserts a job post after checking the owning company exists.
    pub async fn post_job(&self, input: NewJobPost) -> Result<job_post::Model> {
        input.validate()?;
        let txn = self.db.begin().await?;

        if company::Entity::find_by_id(input.company_id)
            .one(&txn)
            .await?
            .is_none()
        {
            tracing::warn!(company_id = input.company_id, "job posted for unknown company");
            return Err(PortalError::UnknownCompany(input.company_id));
        }

        let company_id = input.company_id;
        let created = job_post::ActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            company_id: Set(company_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| PortalError::from_insert(e, None, Some(company_id)))?;
        txn.commit().await?;

        tracing::info!(id = created.id, company_id, "job posted");
        Ok(created)
    }

    pub async fn companies(&self) -> Result<Vec<company::Model>> {
        Ok(company::Entity::find()
            .order_by_asc(company::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn students(&self) -> Result<Vec<student::Model>> {
        Ok(student::Entity::find()
            .order_by_asc(student::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn jobs(&self) -> Result<Vec<job_post::Model>> {
        Ok(job_post::Entity::find()
            .order_by_asc(job_post::Column::Id)
            .all(&self.db)
            .await?)
    }
}
