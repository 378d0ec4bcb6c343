//! Avatar generation and the loading state around it.
//!
//! Generation runs as a tokio task. When the request settles, successfully
//! or not, the same task re-reads the session's newest record and posts a
//! single [`AvatarEvent`] back to the UI thread, which applies it in
//! [`AvatarCoordinator::poll`]. Failures are only logged: the terminal keeps
//! showing whatever avatar it had.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::avatar_store::{AvatarRecord, AvatarStore};
use crate::error::GenerationError;
use crate::image_generator::ImageGenerator;
use crate::session::SessionId;

/// Request/response boundary to whatever creates and keeps avatars.
#[async_trait]
pub trait AvatarService: Send + Sync {
    async fn generate(&self, character_class: &str, session: &SessionId) -> Result<AvatarRecord, GenerationError>;

    /// All records for the session, oldest first.
    async fn avatars(&self, session: &SessionId) -> Result<Vec<AvatarRecord>, GenerationError>;
}

/// Source of portrait URLs.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn portrait_url(&self, character_class: &str) -> Result<String, GenerationError>;
}

#[async_trait]
impl ImageProvider for ImageGenerator {
    async fn portrait_url(&self, character_class: &str) -> Result<String, GenerationError> {
        self.generate(character_class).await
    }
}

/// Generates through an image provider and records results in an [`AvatarStore`].
pub struct GeneratingAvatarService<P> {
    provider: P,
    store: AvatarStore,
}

impl<P: ImageProvider> GeneratingAvatarService<P> {
    pub fn new(provider: P, store: AvatarStore) -> Self {
        Self { provider, store }
    }
}

#[async_trait]
impl<P: ImageProvider> AvatarService for GeneratingAvatarService<P> {
    async fn generate(&self, character_class: &str, session: &SessionId) -> Result<AvatarRecord, GenerationError> {
        if session.is_empty() {
            return Err(GenerationError::MissingSession);
        }

        let url = self.provider.portrait_url(character_class).await?;
        if url.is_empty() {
            return Err(GenerationError::EmptyUrl);
        }

        let record = AvatarRecord {
            url,
            session_id: session.as_str().to_string(),
            class_name: character_class.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        Ok(self.store.create(record).await?)
    }

    async fn avatars(&self, session: &SessionId) -> Result<Vec<AvatarRecord>, GenerationError> {
        Ok(self.store.find_by_session(session).await?)
    }
}

/// URL of the session's most recent avatar, if any.
pub async fn current_avatar_url(
    service: &dyn AvatarService,
    session: &SessionId,
) -> Result<Option<String>, GenerationError> {
    if session.is_empty() {
        return Ok(None);
    }

    let records = service.avatars(session).await?;
    Ok(records.into_iter().last().map(|r| r.url).filter(|url| !url.is_empty()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarSource {
    Placeholder,
    Url(String),
}

#[derive(Debug)]
pub enum AvatarEvent {
    Settled {
        outcome: Result<AvatarRecord, GenerationError>,
        refreshed: Result<Option<String>, GenerationError>,
    },
    Refreshed(Result<Option<String>, GenerationError>),
}

pub struct AvatarCoordinator {
    service: Arc<dyn AvatarService>,
    runtime: Handle,
    sender: mpsc::UnboundedSender<AvatarEvent>,
    receiver: mpsc::UnboundedReceiver<AvatarEvent>,
    in_flight: usize,
    current_url: Option<String>,
}

impl AvatarCoordinator {
    pub fn new(service: Arc<dyn AvatarService>, runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            service,
            runtime,
            sender,
            receiver,
            in_flight: 0,
            current_url: None,
        }
    }

    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Placeholder while loading; otherwise the current URL if there is one.
    pub fn avatar_source(&self) -> AvatarSource {
        match &self.current_url {
            Some(url) if !self.loading() => AvatarSource::Url(url.clone()),
            _ => AvatarSource::Placeholder,
        }
    }

    /// Start a generation request. Concurrent requests are not deduplicated.
    pub fn generate(&mut self, session: &SessionId, character_class: &str) -> JoinHandle<()> {
        self.in_flight += 1;

        let service = Arc::clone(&self.service);
        let sender = self.sender.clone();
        let session = session.clone();
        let character_class = character_class.to_string();

        self.runtime.spawn(async move {
            let outcome = service.generate(&character_class, &session).await;
            match &outcome {
                Ok(record) => tracing::info!("Avatar ready for class '{}': {}", character_class, record.url),
                Err(e) => tracing::warn!("Avatar generation for class '{}' failed: {}", character_class, e),
            }

            let refreshed = current_avatar_url(service.as_ref(), &session).await;
            let _ = sender.send(AvatarEvent::Settled { outcome, refreshed });
        })
    }

    /// Fetch the current avatar without generating.
    pub fn refresh(&self, session: &SessionId) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        let sender = self.sender.clone();
        let session = session.clone();

        self.runtime.spawn(async move {
            let refreshed = current_avatar_url(service.as_ref(), &session).await;
            let _ = sender.send(AvatarEvent::Refreshed(refreshed));
        })
    }

    /// Apply every event that has arrived. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.receiver.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next event and apply it.
    pub async fn next_event(&mut self) -> Option<()> {
        let event = self.receiver.recv().await?;
        self.apply(event);
        Some(())
    }

    fn apply(&mut self, event: AvatarEvent) {
        let refreshed = match event {
            AvatarEvent::Settled { refreshed, .. } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                refreshed
            }
            AvatarEvent::Refreshed(refreshed) => refreshed,
        };

        match refreshed {
            Ok(url) => self.current_url = url,
            Err(e) => tracing::warn!("Could not refresh current avatar: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeService;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    struct FixedProvider(&'static str);

    #[async_trait]
    impl ImageProvider for FixedProvider {
        async fn portrait_url(&self, _character_class: &str) -> Result<String, GenerationError> {
            Ok(self.0.to_string())
        }
    }

    fn session() -> SessionId {
        SessionId::new("s1")
    }

    #[tokio::test]
    async fn successful_generation_updates_url() {
        let service = Arc::new(FakeService::returning(Ok("https://img/new.png".to_string())));
        let mut coordinator = AvatarCoordinator::new(service.clone(), Handle::current());

        coordinator.generate(&session(), "wizard");
        assert!(coordinator.loading());
        assert_eq!(coordinator.avatar_source(), AvatarSource::Placeholder);

        coordinator.next_event().await;
        assert!(!coordinator.loading());
        assert_eq!(coordinator.current_url(), Some("https://img/new.png"));
        assert_eq!(coordinator.avatar_source(), AvatarSource::Url("https://img/new.png".to_string()));
        assert_eq!(service.calls.lock().unwrap()[0], ("wizard".to_string(), "s1".to_string()));
    }

    #[tokio::test]
    async fn empty_url_keeps_prior_avatar() {
        let service = Arc::new(FakeService::returning(Ok(String::new())).with_prior("https://img/old.png", "s1"));
        let mut coordinator = AvatarCoordinator::new(service.clone(), Handle::current());

        coordinator.refresh(&session());
        coordinator.next_event().await;
        assert_eq!(coordinator.current_url(), Some("https://img/old.png"));

        coordinator.generate(&session(), "rogue");
        coordinator.next_event().await;

        assert!(!coordinator.loading());
        assert_eq!(coordinator.current_url(), Some("https://img/old.png"));
        assert_eq!(service.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_settles_quietly() {
        let service = Arc::new(FakeService::returning(Err(GenerationError::Upstream("500".to_string()))));
        let mut coordinator = AvatarCoordinator::new(service, Handle::current());

        coordinator.generate(&session(), "bard");
        coordinator.next_event().await;

        assert!(!coordinator.loading());
        assert_eq!(coordinator.current_url(), None);
        assert_eq!(coordinator.avatar_source(), AvatarSource::Placeholder);
    }

    #[tokio::test]
    async fn placeholder_while_in_flight_even_with_url() {
        let gate = Arc::new(Notify::new());
        let mut service = FakeService::returning(Ok("https://img/next.png".to_string())).with_prior("https://img/old.png", "s1");
        service.gate = Some(gate.clone());
        let mut coordinator = AvatarCoordinator::new(Arc::new(service), Handle::current());

        coordinator.refresh(&session());
        coordinator.next_event().await;
        let handle = coordinator.generate(&session(), "monk");

        tokio::task::yield_now().await;
        assert_eq!(coordinator.poll(), 0);
        assert!(coordinator.loading());
        assert_eq!(coordinator.avatar_source(), AvatarSource::Placeholder);

        gate.notify_one();
        handle.await.unwrap();
        assert_eq!(coordinator.poll(), 1);
        assert_eq!(coordinator.avatar_source(), AvatarSource::Url("https://img/next.png".to_string()));
    }

    #[tokio::test]
    async fn concurrent_requests_keep_loading_until_all_settle() {
        let gate = Arc::new(Notify::new());
        let mut service = FakeService::returning(Ok("https://img/x.png".to_string()));
        service.gate = Some(gate.clone());
        let service = Arc::new(service);
        let mut coordinator = AvatarCoordinator::new(service.clone(), Handle::current());

        coordinator.generate(&session(), "wizard");
        coordinator.generate(&session(), "rogue");
        assert!(coordinator.loading());

        gate.notify_one();
        coordinator.next_event().await;
        assert!(coordinator.loading());
        assert_eq!(coordinator.current_url(), Some("https://img/x.png"));
        assert_eq!(coordinator.avatar_source(), AvatarSource::Placeholder);

        gate.notify_one();
        coordinator.next_event().await;
        assert!(!coordinator.loading());
        assert_eq!(coordinator.avatar_source(), AvatarSource::Url("https://img/x.png".to_string()));
        assert_eq!(service.calls.lock().unwrap().len(), 2);
        assert_eq!(service.records.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_session_has_no_avatar() {
        let service = FakeService::returning(Ok("https://img/x.png".to_string())).with_prior("https://img/old.png", "");
        assert_eq!(current_avatar_url(&service, &SessionId::default()).await, Ok(None));
    }

    #[tokio::test]
    async fn generating_service_rejects_empty_url_without_record() {
        let dir = TempDir::new().unwrap();
        let service = GeneratingAvatarService::new(FixedProvider(""), AvatarStore::new(dir.path().join("avatars.json")));

        assert_eq!(service.generate("wizard", &session()).await, Err(GenerationError::EmptyUrl));
        assert!(service.avatars(&session()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn generating_service_requires_session() {
        let dir = TempDir::new().unwrap();
        let service = GeneratingAvatarService::new(FixedProvider("https://img/a.png"), AvatarStore::new(dir.path().join("avatars.json")));

        assert_eq!(
            service.generate("wizard", &SessionId::default()).await,
            Err(GenerationError::MissingSession)
        );
    }

    #[tokio::test]
    async fn generating_service_records_newest_last() {
        let dir = TempDir::new().unwrap();
        let service = GeneratingAvatarService::new(FixedProvider("https://img/a.png"), AvatarStore::new(dir.path().join("avatars.json")));

        let record = service.generate("cleric", &session()).await.unwrap();
        assert_eq!(record.class_name, "cleric");
        assert_eq!(
            current_avatar_url(&service, &session()).await,
            Ok(Some("https://img/a.png".to_string()))
        );
    }
}
