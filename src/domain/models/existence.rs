use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::errors::TransportResult;

/// Answers "is an object already stored under this key?" for one category.
///
/// Any `Fn(&str) -> bool` closure is a predicate, so callers that already
/// know the answer synchronously can pass a plain function value.
#[async_trait]
pub trait ExistencePredicate: Send + Sync {
    async fn exists(&self, candidate_key: &str) -> TransportResult<bool>;
}

#[async_trait]
impl<F> ExistencePredicate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    async fn exists(&self, candidate_key: &str) -> TransportResult<bool> {
        Ok(self(candidate_key))
    }
}

/// A predicate that also reports keys known to be taken even though the
/// wrapped predicate has not seen them yet (e.g. a key another upload won
/// with a create-only write a moment ago).
pub struct WithTakenKeys<'a, P: ?Sized> {
    inner: &'a P,
    taken: &'a HashSet<String>,
}

impl<'a, P: ?Sized> WithTakenKeys<'a, P> {
    pub fn new(inner: &'a P, taken: &'a HashSet<String>) -> Self {
        Self { inner, taken }
    }
}

#[async_trait]
impl<P> ExistencePredicate for WithTakenKeys<'_, P>
where
    P: ExistencePredicate + ?Sized,
{
    async fn exists(&self, candidate_key: &str) -> TransportResult<bool> {
        if self.taken.contains(candidate_key) {
            return Ok(true);
        }
        self.inner.exists(candidate_key).await
    }
}
