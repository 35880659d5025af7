//! Tag and ingredient service, generic over the label kind.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{LabelCatalog, LabelPersistenceError, LabelRepository};
use crate::domain::{Error, Label, LabelKind, LabelName, User};

/// Implements [`LabelCatalog`] for one label kind over its repository.
pub struct LabelService<K, R> {
    repo: Arc<R>,
    kind: PhantomData<fn() -> K>,
}

impl<K, R> LabelService<K, R> {
    /// Create a new service over `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            kind: PhantomData,
        }
    }
}

impl<K, R> Clone for LabelService<K, R> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.repo))
    }
}

pub(crate) fn map_label_error<K: LabelKind>(error: LabelPersistenceError) -> Error {
    match error {
        LabelPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("{} repository unavailable: {message}", K::NOUN))
        }
        LabelPersistenceError::Query { message } => {
            Error::internal(format!("{} repository error: {message}", K::NOUN))
        }
    }
}

#[async_trait]
impl<K, R> LabelCatalog<K> for LabelService<K, R>
where
    K: LabelKind,
    R: LabelRepository<K>,
{
    async fn list(&self, actor: &User) -> Result<Vec<Label<K>>, Error> {
        self.repo
            .list_for_owner(actor.id())
            .await
            .map_err(map_label_error::<K>)
    }

    async fn create(&self, actor: &User, name: LabelName) -> Result<Label<K>, Error> {
        let label = self
            .repo
            .create(actor.id(), &name)
            .await
            .map_err(map_label_error::<K>)?;
        info!(kind = K::NOUN, id = %label.id(), owner = %actor.id(), "created label");
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rstest::rstest;

    use super::*;
    use crate::domain::{
        EmailAddress, ErrorCode, LabelId, TagKind, UserExtraFields, UserId, labels,
    };

    /// Repository stub that records inserts and can be switched offline.
    #[derive(Default)]
    struct StubLabels {
        rows: Mutex<Vec<Label<TagKind>>>,
        offline: bool,
    }

    #[async_trait]
    impl LabelRepository<TagKind> for StubLabels {
        async fn list_for_owner(
            &self,
            owner: UserId,
        ) -> Result<Vec<Label<TagKind>>, LabelPersistenceError> {
            if self.offline {
                return Err(LabelPersistenceError::connection("offline"));
            }
            let rows = self.rows.lock().expect("rows lock");
            let mut owned: Vec<_> = rows.iter().filter(|l| l.owner() == owner).cloned().collect();
            labels::sort_for_listing(&mut owned);
            Ok(owned)
        }

        async fn create(
            &self,
            owner: UserId,
            name: &LabelName,
        ) -> Result<Label<TagKind>, LabelPersistenceError> {
            let mut rows = self.rows.lock().expect("rows lock");
            let id = LabelId::new(i64::try_from(rows.len()).unwrap_or(i64::MAX) + 1);
            let label = Label::new(id, name.clone(), owner);
            rows.push(label.clone());
            Ok(label)
        }

        async fn find_owned(
            &self,
            _owner: UserId,
            _ids: &[LabelId<TagKind>],
        ) -> Result<Vec<Label<TagKind>>, LabelPersistenceError> {
            Ok(Vec::new())
        }
    }

    fn actor(id: i64) -> User {
        User::new(
            UserId::new(id),
            EmailAddress::parse(&format!("user{id}@example.com")).expect("email"),
            UserExtraFields::default(),
        )
    }

    fn name(raw: &str) -> LabelName {
        LabelName::new(raw).expect("name")
    }

    #[tokio::test]
    async fn list_only_returns_the_actors_labels() {
        let service: LabelService<TagKind, _> = LabelService::new(Arc::new(StubLabels::default()));
        let (alice, bob) = (actor(1), actor(2));
        service.create(&alice, name("Vegan")).await.expect("create");
        service.create(&alice, name("Dessert")).await.expect("create");
        service.create(&bob, name("Fruity")).await.expect("create");

        let listed = service.list(&alice).await.expect("list");
        let names: Vec<&str> = listed.iter().map(|l| l.name().as_ref()).collect();
        assert_eq!(names, vec!["Vegan", "Dessert"]);
    }

    #[tokio::test]
    async fn create_assigns_the_actor_as_owner() {
        let service: LabelService<TagKind, _> = LabelService::new(Arc::new(StubLabels::default()));
        let label = service.create(&actor(7), name("Spicy")).await.expect("create");
        assert_eq!(label.owner(), UserId::new(7));
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failures_map_to_service_unavailable() {
        let repo = StubLabels {
            offline: true,
            ..StubLabels::default()
        };
        let service: LabelService<TagKind, _> = LabelService::new(Arc::new(repo));
        let err = service.list(&actor(1)).await.expect_err("offline");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
