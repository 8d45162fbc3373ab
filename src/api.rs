use std::path::PathBuf;
use std::sync::Arc;

use poem_openapi::{
    Multipart, Object, OpenApi,
    param::{Path, Query},
    payload::{Attachment, AttachmentType, Json},
    types::multipart::Upload,
};

use crate::entities::{company, job_post, student};
use crate::error::PortalError;
use crate::export;
use crate::matcher;
use crate::query::QueryService;
use crate::store::{NewCompany, NewJobPost, NewStudent, Store};
use crate::uploads::UploadDir;

pub struct AppState {
    pub store: Store,
    pub export_dir: PathBuf,
    pub uploads: UploadDir,
}

#[derive(Object)]
struct Student {
    id: i32,
    email: String,
    name: String,
}

impl From<student::Model> for Student {
    fn from(m: student::Model) -> Self {
        Student { id: m.id, email: m.email, name: m.name }
    }
}

#[derive(Object)]
struct Company {
    id: i32,
    email: String,
    name: String,
}

impl From<company::Model> for Company {
    fn from(m: company::Model) -> Self {
        Company { id: m.id, email: m.email, name: m.name }
    }
}

#[derive(Object)]
struct JobPost {
    id: i32,
    title: String,
    description: String,
    company_id: i32,
}

impl From<job_post::Model> for JobPost {
    fn from(m: job_post::Model) -> Self {
        JobPost {
            id: m.id,
            title: m.title,
            description: m.description,
            company_id: m.company_id,
        }
    }
}

#[derive(Object)]
struct Match {
    student_name: String,
    job_title: String,
}

#[derive(Object)]
struct ExportSummary {
    students_file: String,
    student_rows: u64,
    jobs_file: String,
    job_rows: u64,
}

#[derive(Object)]
struct StoredUpload {
    filename: String,
    size: u64,
}

#[derive(Multipart)]
struct UploadForm {
    file: Upload,
}

pub struct Api {
    state: Arc<AppState>,
}

impl Api {
    pub fn new(state: Arc<AppState>) -> Self {
        Api { state }
    }
}

#[OpenApi]
impl Api {
    /// 학생 등록
    #[oai(path = "/students", method = "post")]
    async fn register_student(&self, Json(input): Json<NewStudent>) -> poem::Result<Json<Student>> {
        let created = self.state.store.register_student(input).await?;
        Ok(Json(created.into()))
    }

    /// 기업 등록
    #[oai(path = "/companies", method = "post")]
    async fn register_company(&self, Json(input): Json<NewCompany>) -> poem::Result<Json<Company>> {
        let created = self.state.store.register_company(input).await?;
        Ok(Json(created.into()))
    }

    /// 기업 목록
    #[oai(path = "/companies", method = "get")]
    async fn list_companies(&self) -> poem::Result<Json<Vec<Company>>> {
        let rows = self.state.store.companies().await?;
        Ok(Json(rows.into_iter().map(Into::into).collect()))
    }

    /// 기업별 공고
    #[oai(path = "/companies/:id/jobs", method = "get")]
    async fn company_jobs(&self, Path(id): Path<i32>) -> poem::Result<Json<Vec<JobPost>>> {
        let rows = QueryService::new(&self.state.store).jobs_of_company(id).await?;
        Ok(Json(rows.into_iter().map(Into::into).collect()))
    }

    /// 공고 등록
    #[oai(path = "/jobs", method = "post")]
    async fn post_job(&self, Json(input): Json<NewJobPost>) -> poem::Result<Json<JobPost>> {
        let created = self.state.store.post_job(input).await?;
        Ok(Json(created.into()))
    }

    /// 이메일로 학생 조회 (0 또는 1건)
    #[oai(path = "/students/search", method = "get")]
    async fn search_students(
        &self,
        Query(email): Query<Option<String>>,
    ) -> poem::Result<Json<Vec<Student>>> {
        let email = email.unwrap_or_default();
        let found = QueryService::new(&self.state.store)
            .find_student_by_email(&email)
            .await?;
        Ok(Json(found.into_iter().map(Into::into).collect()))
    }

    /// 제목 일부로 공고 조회
    #[oai(path = "/jobs/search", method = "get")]
    async fn search_jobs(&self, Query(title): Query<Option<String>>) -> poem::Result<Json<Vec<JobPost>>> {
        let title = title.unwrap_or_default();
        let rows = QueryService::new(&self.state.store)
            .find_jobs_by_title_fragment(&title)
            .await?;
        Ok(Json(rows.into_iter().map(Into::into).collect()))
    }

    /// 매칭 결과
    #[oai(path = "/matches", method = "get")]
    async fn matches(&self) -> poem::Result<Json<Vec<Match>>> {
        let pairs = matcher::match_all(&self.state.store).await?;
        Ok(Json(
            pairs
                .into_iter()
                .map(|p| Match { student_name: p.student_name, job_title: p.job_title })
                .collect(),
        ))
    }

    /// CSV 내보내기
    #[oai(path = "/export", method = "post")]
    async fn export(&self) -> poem::Result<Json<ExportSummary>> {
        let report = export::export_all(&self.state.store, &self.state.export_dir).await?;
        Ok(Json(ExportSummary {
            students_file: report.students.display().to_string(),
            student_rows: report.student_rows as u64,
            jobs_file: report.jobs.display().to_string(),
            job_rows: report.job_rows as u64,
        }))
    }

    /// 이력서 업로드
    #[oai(path = "/uploads", method = "post")]
    async fn upload(&self, form: UploadForm) -> poem::Result<Json<StoredUpload>> {
        let filename = form
            .file
            .file_name()
            .map(ToString::to_string)
            .ok_or_else(|| PortalError::BadFileName(String::new()))?;
        let bytes = form.file.into_vec().await.map_err(PortalError::from)?;
        self.state.uploads.save(&filename, &bytes).await?;
        Ok(Json(StoredUpload { filename, size: bytes.len() as u64 }))
    }

    /// 업로드 파일 내려받기
    #[oai(path = "/uploads/:name", method = "get")]
    async fn download(&self, Path(name): Path<String>) -> poem::Result<Attachment<Vec<u8>>> {
        let bytes = self.state.uploads.load(&name).await?;
        Ok(Attachment::new(bytes)
            .attachment_type(AttachmentType::Attachment)
            .filename(name))
    }

    /// 헬스 체크
    #[oai(path = "/healthz", method = "get")]
    async fn healthz(&self) -> poem::Result<()> {
        self.state.store.ping().await?;
        tracing::debug!("service is healthy");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poem::{
        Route,
        http::StatusCode,
        test::{TestClient, TestForm, TestFormField},
    };
    use poem_openapi::OpenApiService;
    use serde_json::json;

    use crate::store::tests::memory_store;

    async fn client(dir: &std::path::Path) -> TestClient<Route> {
        let state = Arc::new(AppState {
            store: memory_store().await,
            export_dir: dir.to_path_buf(),
            uploads: UploadDir::new(dir.join("uploads")),
        });
        let api = OpenApiService::new(Api::new(state), "Job Match API", "1.0");
        TestClient::new(Route::new().nest("/api", api))
    }

    #[tokio::test]
    async fn register_then_query_and_match() {
        let dir = tempfile::tempdir().unwrap();
        let cli = client(dir.path()).await;

        let resp = cli
            .post("/api/students")
            .body_json(&json!({"email": "a@x.com", "name": "Ann"}))
            .send()
            .await;
        resp.assert_status_is_ok();

        let resp = cli
            .post("/api/companies")
            .body_json(&json!({"email": "hr@acme.com", "name": "Acme"}))
            .send()
            .await;
        resp.assert_status_is_ok();
        let company_id = resp.json().await.value().object().get("id").i64();

        let resp = cli
            .post("/api/jobs")
            .body_json(&json!({"title": "Dev", "description": "needs Python", "company_id": company_id}))
            .send()
            .await;
        resp.assert_status_is_ok();

        let resp = cli.get("/api/students/search").query("email", &"a@x.com").send().await;
        resp.assert_status_is_ok();
        let body = resp.json().await;
        let found = body.value().array();
        found.assert_len(1);
        found.get(0).object().get("name").assert_string("Ann");

        let resp = cli.get("/api/students/search").query("email", &"nobody@x.com").send().await;
        resp.assert_status_is_ok();
        resp.json().await.value().array().assert_len(0);

        let resp = cli.get("/api/matches").send().await;
        resp.assert_status_is_ok();
        let body = resp.json().await;
        let pairs = body.value().array();
        pairs.assert_len(1);
        pairs.get(0).object().get("student_name").assert_string("Ann");
        pairs.get(0).object().get("job_title").assert_string("Dev");
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let cli = client(dir.path()).await;
        let body = json!({"email": "a@x.com", "name": "Ann"});

        cli.post("/api/students").body_json(&body).send().await.assert_status_is_ok();
        let resp = cli.post("/api/students").body_json(&body).send().await;
        resp.assert_status(StatusCode::CONFLICT);
        resp.assert_text("Student already registered.").await;
    }

    #[tokio::test]
    async fn job_for_missing_company_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let cli = client(dir.path()).await;
        let resp = cli
            .post("/api/jobs")
            .body_json(&json!({"title": "Dev", "description": "Python", "company_id": 9}))
            .send()
            .await;
        resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn export_reports_row_counts() {
        let dir = tempfile::tempdir().unwrap();
        let cli = client(dir.path()).await;
        cli.post("/api/students")
            .body_json(&json!({"email": "a@x.com", "name": "Ann"}))
            .send()
            .await
            .assert_status_is_ok();

        let resp = cli.post("/api/export").send().await;
        resp.assert_status_is_ok();
        let body = resp.json().await;
        body.value().object().get("student_rows").assert_i64(1);
        body.value().object().get("job_rows").assert_i64(0);
        assert!(dir.path().join("students.csv").exists());
        assert!(dir.path().join("jobs.csv").exists());
    }

    #[tokio::test]
    async fn missing_upload_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cli = client(dir.path()).await;
        cli.get("/api/uploads/ghost.pdf")
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND);
        cli.get("/api/uploads/ghost.exe")
            .send()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    fn upload_form(filename: &str, bytes: &[u8]) -> TestForm {
        TestForm::new().field(
            TestFormField::bytes(bytes.to_vec())
                .name("file")
                .filename(filename),
        )
    }

    #[tokio::test]
    async fn upload_round_trips_by_original_name() {
        let dir = tempfile::tempdir().unwrap();
        let cli = client(dir.path()).await;

        let resp = cli
            .post("/api/uploads")
            .multipart(upload_form("resume.pdf", b"%PDF-1.4 fake"))
            .send()
            .await;
        resp.assert_status_is_ok();
        let body = resp.json().await;
        body.value().object().get("filename").assert_string("resume.pdf");
        body.value().object().get("size").assert_i64(13);
        assert!(dir.path().join("uploads").join("resume.pdf").exists());

        let resp = cli.get("/api/uploads/resume.pdf").send().await;
        resp.assert_status_is_ok();
        resp.assert_bytes(b"%PDF-1.4 fake").await;
    }

    #[tokio::test]
    async fn upload_with_disallowed_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cli = client(dir.path()).await;

        let resp = cli
            .post("/api/uploads")
            .multipart(upload_form("payload.exe", b"MZ"))
            .send()
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert!(!dir.path().join("uploads").join("payload.exe").exists());
    }

    #[tokio::test]
    async fn healthz_pings_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let cli = client(dir.path()).await;
        cli.get("/api/healthz").send().await.assert_status_is_ok();
    }
}
