//! Application bootstrap and the auth-change listener.
//!
//! [`CatalogApp::start`] fetches the item set, restores the session, loads
//! the matching user data, and spawns two tasks: a [`SessionWatcher`] that
//! turns provider-side session changes (expiry, refresh) into auth
//! transitions, and an [`AuthListener`] that reloads user data and
//! re-renders the catalog on every transition. Rendered views are published
//! on a `watch` channel for the display layer.

use std::sync::Arc;

use dorama_core::session::AuthUser;
use dorama_core::status::WatchStatus;
use dorama_core::types::DbId;
use dorama_db::{AuthProvider, FileStorage, LocalStorage, RemoteStore, SupabaseClient};
use dorama_events::{AppEvent, EventBus, EventEnvelope};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;

use crate::actors::ActorsService;
use crate::catalog::{CatalogManager, CatalogView};
use crate::config::ClientConfig;
use crate::error::LibraryError;
use crate::reviews::{ReviewForm, ReviewService, ReviewView, SubmitOutcome};
use crate::session::{AuthBridge, SessionWatcher};
use crate::theme::ThemeManager;
use crate::user_data::UserDataManager;

/// External boundaries the app runs against.
pub struct AppDeps {
    pub remote: Arc<dyn RemoteStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub storage: Arc<dyn LocalStorage>,
}

impl AppDeps {
    /// Supabase for both remote boundaries and a JSON file for local
    /// storage, which also keeps the session across restarts.
    pub fn from_config(config: &ClientConfig) -> Result<Self, LibraryError> {
        let supabase = config
            .supabase
            .clone()
            .ok_or_else(|| LibraryError::Config("SUPABASE_URL must be set".into()))?;
        let storage: Arc<dyn LocalStorage> =
            Arc::new(FileStorage::open(config.storage_path.clone()));
        let client = Arc::new(SupabaseClient::new(supabase).with_storage(Arc::clone(&storage)));
        Ok(Self {
            remote: client.clone(),
            auth: client,
            storage,
        })
    }
}

pub struct CatalogApp {
    bus: Arc<EventBus>,
    auth: Arc<AuthBridge>,
    user_data: Arc<UserDataManager>,
    catalog: Arc<Mutex<CatalogManager>>,
    reviews: ReviewService,
    actors: ActorsService,
    theme: ThemeManager,
    views: Arc<watch::Sender<CatalogView>>,
    listener: JoinHandle<()>,
    watcher: JoinHandle<()>,
}

impl std::fmt::Debug for CatalogApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogApp").finish_non_exhaustive()
    }
}

impl CatalogApp {
    /// Start the app.
    ///
    /// Fails only if the item set cannot be fetched; every other startup
    /// failure degrades to logged, empty state.
    pub async fn start(deps: AppDeps, config: &ClientConfig) -> Result<Self, LibraryError> {
        let bus = Arc::new(EventBus::default());
        let auth = Arc::new(
            AuthBridge::new(deps.auth, Arc::clone(&bus))
                .with_admin_emails(config.admin_emails.clone()),
        );

        let dramas = deps.remote.list_dramas().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to load the catalog");
            LibraryError::Initialization(e)
        })?;
        tracing::info!(count = dramas.len(), "Catalog loaded");

        let sessions = auth.sessions();
        let user = auth.init().await;
        let events = bus.subscribe();
        let user_data = Arc::new(UserDataManager::new(
            Arc::clone(&deps.remote),
            Arc::clone(&deps.storage),
        ));
        user_data.load_data(user.as_ref()).await;

        let mut catalog = CatalogManager::new(Arc::clone(&user_data))
            .with_page_size(config.page_size)
            .with_naming(config.images.clone());
        let (views, _) = watch::channel(catalog.set_items(dramas));
        let views = Arc::new(views);
        let catalog = Arc::new(Mutex::new(catalog));

        let listener = AuthListener {
            user_data: Arc::clone(&user_data),
            catalog: Arc::clone(&catalog),
            views: Arc::clone(&views),
        };
        let listener = tokio::spawn(listener.run(events));
        let watcher = tokio::spawn(SessionWatcher::new(Arc::clone(&auth)).run(sessions));

        Ok(Self {
            reviews: ReviewService::new(Arc::clone(&deps.remote), Arc::clone(&bus)),
            actors: ActorsService::new(Arc::clone(&deps.remote)),
            theme: ThemeManager::load(deps.storage),
            bus,
            auth,
            user_data,
            catalog,
            views,
            listener,
            watcher,
        })
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn auth(&self) -> &AuthBridge {
        &self.auth
    }

    pub fn user_data(&self) -> &UserDataManager {
        &self.user_data
    }

    pub fn actors(&self) -> &ActorsService {
        &self.actors
    }

    pub fn theme(&self) -> &ThemeManager {
        &self.theme
    }

    /// Receiver of every rendered catalog view.
    pub fn views(&self) -> watch::Receiver<CatalogView> {
        self.views.subscribe()
    }

    /// The last rendered view.
    pub fn view(&self) -> CatalogView {
        self.views.borrow().clone()
    }

    pub async fn select_filter(&self, label: &str) -> CatalogView {
        let view = self.catalog.lock().await.select_filter(label);
        self.publish(view)
    }

    pub async fn search(&self, input: &str) -> CatalogView {
        let view = self.catalog.lock().await.set_search(input);
        self.publish(view)
    }

    pub async fn next_page(&self) -> CatalogView {
        let view = self.catalog.lock().await.next_page();
        self.publish(view)
    }

    pub async fn previous_page(&self) -> CatalogView {
        let view = self.catalog.lock().await.previous_page();
        self.publish(view)
    }

    /// Toggle a favorite and re-render. Returns the new flag, or `None` for
    /// an unknown id.
    ///
    /// The catalog lock is not held across the write, so mutations on
    /// different items (or the same one) run independently.
    pub async fn toggle_favorite(&self, drama_id: DbId) -> Option<bool> {
        let drama = self.catalog.lock().await.find(drama_id).cloned()?;
        let favorite = self.user_data.toggle_favorite(&drama).await;
        let view = self.catalog.lock().await.favorites_changed();
        self.publish(view);
        Some(favorite)
    }

    /// Set or clear a status and re-render. Returns `false` for an unknown id.
    pub async fn set_status(&self, drama_id: DbId, status: Option<WatchStatus>) -> bool {
        let Some(drama) = self.catalog.lock().await.find(drama_id).cloned() else {
            return false;
        };
        self.user_data.set_status(&drama, status).await;
        let view = self.catalog.lock().await.view();
        self.publish(view);
        true
    }

    pub async fn list_reviews(&self, drama_id: DbId) -> Result<Vec<ReviewView>, LibraryError> {
        self.reviews.list(drama_id, self.auth.current_user().as_ref()).await
    }

    pub async fn submit_review(
        &self,
        drama_id: DbId,
        form: &mut ReviewForm,
    ) -> Result<SubmitOutcome, LibraryError> {
        let user = self.auth.current_user();
        self.reviews.submit(drama_id, user.as_ref(), form).await
    }

    /// Stop the session watcher and the auth listener.
    pub async fn shutdown(self) {
        self.watcher.abort();
        self.listener.abort();
        let _ = self.watcher.await;
        let _ = self.listener.await;
        tracing::info!("Catalog app stopped");
    }

    fn publish(&self, view: CatalogView) -> CatalogView {
        self.views.send_replace(view.clone());
        view
    }
}

/// Reacts to auth transitions: reload user data, reset to page 1, re-render.
pub struct AuthListener {
    user_data: Arc<UserDataManager>,
    catalog: Arc<Mutex<CatalogManager>>,
    views: Arc<watch::Sender<CatalogView>>,
}

impl AuthListener {
    /// Run until the bus is closed.
    pub async fn run(self, mut receiver: broadcast::Receiver<EventEnvelope>) {
        loop {
            match receiver.recv().await {
                Ok(envelope) => self.handle(envelope).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Auth listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, auth listener shutting down");
                    break;
                }
            }
        }
    }

    async fn handle(&self, envelope: EventEnvelope) {
        match envelope.event {
            AppEvent::AuthStateChanged { user } => self.on_auth_changed(user).await,
            AppEvent::ReviewsChanged { .. } => {}
        }
    }

    async fn on_auth_changed(&self, user: Option<AuthUser>) {
        self.user_data.load_data(user.as_ref()).await;
        let view = self.catalog.lock().await.reset_page();
        self.views.send_replace(view);
    }
}
