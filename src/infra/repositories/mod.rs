pub mod rows;

pub mod sqlite_member_repo;
pub mod sqlite_occurrence_repo;

pub mod postgres_member_repo;
pub mod postgres_occurrence_repo;
