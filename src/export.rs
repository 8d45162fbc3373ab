//! CSV snapshots of the student and job collections.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use csv::Writer;
use tempfile::NamedTempFile;

use crate::entities::{job_post, student};
use crate::error::{PortalError, Result};
use crate::store::Store;

pub const STUDENTS_FILE: &str = "students.csv";
pub const JOBS_FILE: &str = "jobs.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub students: PathBuf,
    pub student_rows: usize,
    pub jobs: PathBuf,
    pub job_rows: usize,
}

pub fn write_students<W: io::Write>(out: W, students: &[student::Model]) -> Result<()> {
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(["Name", "Email"])?;
    for s in students {
        wtr.write_record([&s.name, &s.email])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_jobs<W: io::Write>(out: W, jobs: &[job_post::Model]) -> Result<()> {
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(["Title", "Description"])?;
    for job in jobs {
        wtr.write_record([&job.title, &job.description])?;
    }
    wtr.flush()?;
    Ok(())
}

pub async fn export_students(store: &Store, dir: &Path) -> Result<(PathBuf, usize)> {
    let students = store.students().await?;
    let rows = students.len();
    let path = dir.join(STUDENTS_FILE);
    let target = path.clone();
    run_blocking(move || replace_file(&target, |f| write_students(f, &students))).await?;
    tracing::info!(path = %path.display(), rows, "exported students");
    Ok((path, rows))
}

pub async fn export_jobs(store: &Store, dir: &Path) -> Result<(PathBuf, usize)> {
    let jobs = store.jobs().await?;
    let rows = jobs.len();
    let path = dir.join(JOBS_FILE);
    let target = path.clone();
    run_blocking(move || replace_file(&target, |f| write_jobs(f, &jobs))).await?;
    tracing::info!(path = %path.display(), rows, "exported jobs");
    Ok((path, rows))
}

pub async fn export_all(store: &Store, dir: &Path) -> Result<ExportReport> {
    let (students, student_rows) = export_students(store, dir).await?;
    let (jobs, job_rows) = export_jobs(store, dir).await?;
    Ok(ExportReport {
        students,
        student_rows,
        jobs,
        job_rows,
    })
}

/// Writes into a uniquely named sibling temp file and persists it over
/// `path`, so a reader sees either the previous export or the complete new
/// one, and overlapping exports never share a temp file.
fn replace_file(path: &Path, write: impl FnOnce(&mut fs::File) -> Result<()>) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PortalError::Io(e.error))?;
    Ok(())
}

async fn run_blocking<T: Send + 'static>(
    job: impl FnOnce() -> Result<T> + Send + 'static,
) -> Result<T> {
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| PortalError::Io(io::Error::other(e)))?
}
