//! Read-only lookups over the record store. A miss is an empty result,
//! never an error.

use sea_orm::sea_query::LikeExpr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder};

use crate::entities::{company, job_post, student};
use crate::error::Result;
use crate::store::Store;

pub struct QueryService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> QueryService<'a> {
    pub fn new(store: &'a Store) -> Self {
        QueryService { db: store.conn() }
    }

    /// Exact, case-sensitive match with no trimming.
    pub async fn find_student_by_email(&self, email: &str) -> Result<Option<student::Model>> {
        if email.is_empty() {
            return Ok(None);
        }
        let found = student::Entity::find()
            .filter(student::Column::Email.eq(email))
            .one(self.db)
            .await?;
        tracing::debug!(found = found.is_some(), "student lookup by email");
        Ok(found)
    }

    /// Jobs whose title contains `fragment`, in posting order. Wildcards in
    /// the fragment are literal; case follows the store's LIKE collation
    /// (ASCII case-insensitive on sqlite, case-sensitive on postgres).
    pub async fn find_jobs_by_title_fragment(&self, fragment: &str) -> Result<Vec<job_post::Model>> {
        let pattern = format!("%{}%", escape_like(fragment));
        let jobs = job_post::Entity::find()
            .filter(job_post::Column::Title.like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)))
            .order_by_asc(job_post::Column::Id)
            .all(self.db)
            .await?;
        tracing::debug!(hits = jobs.len(), "job lookup by title fragment");
        Ok(jobs)
    }

    pub async fn jobs_of_company(&self, company_id: i32) -> Result<Vec<job_post::Model>> {
        let Some(owner) = company::Entity::find_by_id(company_id).one(self.db).await? else {
            return Ok(Vec::new());
        };
        Ok(owner
            .find_related(job_post::Entity)
            .order_by_asc(job_post::Column::Id)
            .all(self.db)
            .await?)
    }
}

// must not need quoting inside a SQL string literal on any backend
const LIKE_ESCAPE: char = '!';

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, LIKE_ESCAPE | '%' | '_') {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}
