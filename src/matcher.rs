//! Keyword matcher pairing every student with every job whose description
//! mentions the keyword.

use crate::entities::{job_post, student};
use crate::error::Result;
use crate::store::Store;

pub const MATCH_KEYWORD: &str = "Python";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPair {
    pub student_name: String,
    pub job_title: String,
}

/// Full cross product in store order, students outer and jobs inner.
/// Containment is a plain case-sensitive substring test.
pub fn pair_by_keyword(
    students: &[student::Model],
    jobs: &[job_post::Model],
    keyword: &str,
) -> Vec<MatchPair> {
    let matching: Vec<&job_post::Model> = jobs
        .iter()
        .filter(|job| job.description.contains(keyword))
        .collect();

    let mut pairs = Vec::with_capacity(students.len() * matching.len());
    for s in students {
        for job in &matching {
            pairs.push(MatchPair {
                student_name: s.name.clone(),
                job_title: job.title.clone(),
            });
        }
    }
    pairs
}

pub async fn match_all(store: &Store) -> Result<Vec<MatchPair>> {
    let students = store.students().await?;
    let jobs = store.jobs().await?;
    let pairs = pair_by_keyword(&students, &jobs, MATCH_KEYWORD);
    tracing::debug!(
        students = students.len(),
        jobs = jobs.len(),
        pairs = pairs.len(),
        "computed matches"
    );
    Ok(pairs)
}
