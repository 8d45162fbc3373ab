pub mod company;
pub mod job_post;
pub mod student;
