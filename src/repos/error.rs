/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    // unique constraint violated (e.g. accounts.external_subject)
    #[error("conflict")]
    Conflict,
    // foreign key points at a row that does not exist (e.g. unknown game)
    #[error("missing reference")]
    MissingReference,
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e {
            match dbe.code().as_deref() {
                Some("23505") => return RepoError::Conflict,
                Some("23503") => return RepoError::MissingReference,
                _ => {}
            }
        }
        RepoError::Db(e)
    }
}
