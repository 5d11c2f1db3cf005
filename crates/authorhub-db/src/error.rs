//! Database-specific error types and conversions.

use authorhub_core::error::AuthorHubError;
use surrealdb::IndexedResults;
use surrealdb_types::QueryError;

/// Prefix of the messages thrown by existence guards inside mutating
/// statements: `authorhub:not_found:<entity>:<id>`.
pub(crate) const NOT_FOUND_MARKER: &str = "authorhub:not_found:";

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Corrupt row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict on {entity}: {message}")]
    Conflict { entity: String, message: String },
}

/// Check every statement of a response against `entity`.
///
/// A failed transaction reports `NotExecuted` on the statements it
/// rolled back and the real cause on a later slot, so all failures are
/// collected and the most specific one decides the outcome.
pub(crate) fn check_response(
    entity: &str,
    mut response: IndexedResults,
) -> Result<IndexedResults, DbError> {
    let mut errors: Vec<_> = response.take_errors().into_iter().collect();
    if errors.is_empty() {
        return Ok(response);
    }
    errors.sort_by_key(|(index, _)| *index);
    Err(DbError::classify(
        entity,
        errors.into_iter().map(|(_, err)| err).collect(),
    ))
}

/// What a single store error says about the operation, most specific first.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Cause {
    Missing,
    Duplicate,
    Contended,
    Aborted,
    Other,
}

fn cause_of(err: &surrealdb::Error) -> Cause {
    if err.is_thrown() && err.message().contains(NOT_FOUND_MARKER) {
        return Cause::Missing;
    }
    // Unique index violations have no structured kind; the message is
    // the only thing that tells them apart from other internal errors.
    if err.is_already_exists() || err.message().contains("already contains") {
        return Cause::Duplicate;
    }
    match err.query_details() {
        Some(QueryError::TransactionConflict) => Cause::Contended,
        Some(QueryError::NotExecuted) => Cause::Aborted,
        _ => Cause::Other,
    }
}

impl DbError {
    /// Classify the failed statements of a query against `entity`.
    ///
    /// Guard failures carry [`NOT_FOUND_MARKER`]. Unique index
    /// violations, write conflicts and aborted transactions become
    /// conflicts. Anything else stays a raw store error.
    pub(crate) fn classify(entity: &str, errors: Vec<surrealdb::Error>) -> Self {
        let Some(err) = errors.into_iter().min_by_key(cause_of) else {
            return DbError::Decode(format!("empty failure for {entity}"));
        };

        match cause_of(&err) {
            Cause::Missing => match parse_not_found(err.message()) {
                Some((entity, id)) => DbError::NotFound { entity, id },
                None => DbError::Surreal(err),
            },
            Cause::Duplicate => DbError::Conflict {
                entity: entity.into(),
                message: index_name(err.message())
                    .map(|index| format!("unique index `{index}` violated"))
                    .unwrap_or_else(|| "unique constraint violated".into()),
            },
            Cause::Contended | Cause::Aborted => DbError::Conflict {
                entity: entity.into(),
                message: "concurrent modification".into(),
            },
            Cause::Other => DbError::Surreal(err),
        }
    }
}

/// Build the THROW message used by an existence guard.
pub(crate) fn not_found_marker(entity: &str, id: &str) -> String {
    format!("{NOT_FOUND_MARKER}{entity}:{id}")
}

fn parse_not_found(message: &str) -> Option<(String, String)> {
    let start = message.find(NOT_FOUND_MARKER)? + NOT_FOUND_MARKER.len();
    let tail: String = message[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':'))
        .collect();
    let (entity, id) = tail.split_once(':')?;
    Some((entity.to_string(), id.to_string()))
}

fn index_name(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let len = message[start..].find('`')?;
    Some(&message[start..start + len])
}

impl From<DbError> for AuthorHubError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AuthorHubError::NotFound { entity, id },
            DbError::Conflict { entity, message } => AuthorHubError::Conflict { entity, message },
            other => AuthorHubError::Internal(other.to_string()),
        }
    }
}
