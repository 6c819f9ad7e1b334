//! Dashboard controller.
//!
//! Owns the fetched collections and everything the operator can do to them.
//! All activity is gated on the [`SessionGate`]: nothing is fetched, polled
//! or mutated unless the admin is signed in.
//!
//! Mutations follow one pattern: validate, confirm if destructive, call the
//! gateway, then on success patch the local collection, show a success
//! notification and re-fetch the affected collection. On failure the local
//! state is left untouched and exactly one error notification is shown.

mod confirm;
mod notifications;
mod refresh;
mod tabs;

pub use confirm::{AssumeNo, AssumeYes, ConfirmPrompt};
pub use notifications::{Notification, NotificationKind, Notifier};
pub use refresh::RefreshTask;
pub use tabs::{FileTabStore, MemoryTabStore, Tab, TabStore, TabStoreError};

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::NaiveDate;
use circuit_cart_core::{OrderId, OrderStatus, ProductId, UserId};
use tokio::sync::{Mutex, RwLock, watch};
use tracing::instrument;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, clear_sentry_user, set_sentry_user};
use crate::gateway::{Gateway, ImageUpload};
use crate::models::{
    FederatedCredential, Identity, InventoryItem, Order, OrderStatusUpdate, ProductDraft,
    UserProfile, ValidationError,
};
use crate::session::{AuthError, SessionGate};
use crate::view_model::DashboardStats;

/// Result of an action that may need the operator's confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The gateway call was made and succeeded.
    Applied,
    /// The operator declined; nothing was sent.
    Cancelled,
}

/// Which collections a refresh managed to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshSummary {
    pub inventory: bool,
    pub users: bool,
    pub orders: bool,
}

impl RefreshSummary {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.inventory && self.users && self.orders
    }
}

/// Local view of the store plus the operator's selections.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub inventory: Vec<InventoryItem>,
    pub users: Vec<UserProfile>,
    pub orders: Vec<Order>,
    pub active_tab: Tab,
    /// Customer whose cart is open.
    pub selected_user: Option<UserId>,
    /// Order whose manifest is open.
    pub selected_order: Option<OrderId>,
}

/// The admin dashboard.
///
/// Constructed behind an `Arc` because the background refresh task keeps a
/// weak reference back to it. Dropping the last `Arc` cancels the task.
pub struct Dashboard {
    gateway: Arc<dyn Gateway>,
    session: SessionGate,
    tabs: Box<dyn TabStore>,
    prompt: Box<dyn ConfirmPrompt>,
    notifier: Notifier,
    refresh_interval: Duration,
    state: RwLock<DashboardState>,
    refresh_task: Mutex<Option<RefreshTask>>,
    refreshes: watch::Sender<u64>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("session", &self.session)
            .field("refresh_interval", &self.refresh_interval)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn Gateway>,
        config: &DashboardConfig,
        tabs: Box<dyn TabStore>,
        prompt: Box<dyn ConfirmPrompt>,
    ) -> Arc<Self> {
        let (refreshes, _rx) = watch::channel(0);
        Arc::new(Self {
            gateway,
            session: SessionGate::new(config.admin_email.clone()),
            tabs,
            prompt,
            notifier: Notifier::new(config.notification_ttl),
            refresh_interval: config.refresh_interval,
            state: RwLock::new(DashboardState::default()),
            refresh_task: Mutex::new(None),
            refreshes,
        })
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Exchange a federated credential and authorize the result.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the provider refuses the credential or the
    /// identity is not the allow-listed admin.
    #[instrument(skip(self, credential), fields(provider = %credential.provider))]
    pub async fn sign_in(
        self: &Arc<Self>,
        credential: &FederatedCredential,
    ) -> Result<Identity, DashboardError> {
        let identity = match self.gateway.sign_in(credential).await {
            Ok(identity) => identity,
            Err(AuthError::Cancelled) => return Err(AuthError::Cancelled.into()),
            Err(e) => {
                self.notifier.error(format!("Sign-in failed: {e}"));
                return Err(e.into());
            }
        };
        self.authorize(Some(identity.clone())).await?;
        Ok(identity)
    }

    /// Apply an identity-provider callback.
    ///
    /// On entering `Authorized` the last tab is restored, a full refresh runs
    /// and the polling task starts. Any other outcome stops polling.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the identity is absent or not the admin.
    pub async fn authorize(self: &Arc<Self>, identity: Option<Identity>) -> Result<(), DashboardError> {
        if let Err(e) = self.session.evaluate(identity.clone()) {
            self.stop_refresh().await;
            if matches!(e, AuthError::NotAllowed { .. }) {
                self.notifier.error(format!("Access denied: {e}"));
            }
            return Err(e.into());
        }
        if let Some(identity) = &identity {
            set_sentry_user(identity);
        }

        let tab = self.tabs.load();
        self.state.write().await.active_tab = tab;
        tracing::info!(tab = %tab, "Restored active tab");

        self.refresh_all().await?;
        self.start_refresh().await;
        Ok(())
    }

    /// Leave the authorized state, stop polling and drop local data.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        self.session.sign_out();
        self.stop_refresh().await;
        self.gateway.sign_out().await;

        let mut state = self.state.write().await;
        let tab = state.active_tab;
        *state = DashboardState {
            active_tab: tab,
            ..DashboardState::default()
        };
        drop(state);

        clear_sentry_user();
    }

    #[must_use]
    pub const fn session(&self) -> &SessionGate {
        &self.session
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.session.is_authorized()
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    async fn start_refresh(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let task = RefreshTask::spawn(self.refresh_interval, self.session.subscribe(), move || {
            let weak = weak.clone();
            async move {
                let Some(dashboard) = weak.upgrade() else {
                    return false;
                };
                dashboard.refresh_all().await.is_ok()
            }
        });
        // Replacing an old task drops it, which aborts it.
        *self.refresh_task.lock().await = Some(task);
    }

    async fn stop_refresh(&self) {
        if let Some(task) = self.refresh_task.lock().await.take() {
            task.stop().await;
        }
    }

    /// Whether the polling task is running.
    pub async fn is_polling(&self) -> bool {
        self.refresh_task
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Fetch all three collections concurrently.
    ///
    /// Each successful fetch replaces its collection wholesale; a failed one
    /// is logged and leaves the previous collection displayed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthorized`] while unauthenticated.
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) -> Result<RefreshSummary, AuthError> {
        self.session.require_authorized()?;

        let (inventory, users, orders) = tokio::join!(
            self.reload_inventory(),
            self.reload_users(),
            self.reload_orders()
        );
        let summary = RefreshSummary {
            inventory: inventory.is_ok(),
            users: users.is_ok(),
            orders: orders.is_ok(),
        };

        self.refreshes.send_modify(|count| *count += 1);
        tracing::debug!(?summary, "Refresh finished");
        Ok(summary)
    }

    /// Re-fetch the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if unauthorized or the fetch fails.
    pub async fn refresh_inventory(&self) -> Result<(), DashboardError> {
        self.session.require_authorized()?;
        self.reload_inventory().await
    }

    /// Re-fetch customers and carts.
    ///
    /// # Errors
    ///
    /// Returns an error if unauthorized or the fetch fails.
    pub async fn refresh_users(&self) -> Result<(), DashboardError> {
        self.session.require_authorized()?;
        self.reload_users().await
    }

    /// Re-fetch orders.
    ///
    /// # Errors
    ///
    /// Returns an error if unauthorized or the fetch fails.
    pub async fn refresh_orders(&self) -> Result<(), DashboardError> {
        self.session.require_authorized()?;
        self.reload_orders().await
    }

    async fn reload_inventory(&self) -> Result<(), DashboardError> {
        match self.gateway.list_inventory().await {
            Ok(items) => {
                tracing::debug!(count = items.len(), "Inventory refreshed");
                self.state.write().await.inventory = items;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Inventory refresh failed, keeping previous list");
                Err(e.into())
            }
        }
    }

    async fn reload_users(&self) -> Result<(), DashboardError> {
        match self.gateway.list_users_with_carts().await {
            Ok(users) => {
                tracing::debug!(count = users.len(), "Customers refreshed");
                self.state.write().await.users = users;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Customer refresh failed, keeping previous list");
                Err(e.into())
            }
        }
    }

    async fn reload_orders(&self) -> Result<(), DashboardError> {
        match self.gateway.list_orders().await {
            Ok(orders) => {
                tracing::debug!(count = orders.len(), "Orders refreshed");
                self.state.write().await.orders = orders;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Order refresh failed, keeping previous list");
                Err(e.into())
            }
        }
    }

    /// Receiver bumped after every full refresh.
    #[must_use]
    pub fn subscribe_refreshes(&self) -> watch::Receiver<u64> {
        self.refreshes.subscribe()
    }

    // =========================================================================
    // Tabs and selections
    // =========================================================================

    pub async fn active_tab(&self) -> Tab {
        self.state.read().await.active_tab
    }

    /// Switch tabs and remember the choice for the next session.
    ///
    /// # Errors
    ///
    /// Returns [`TabStoreError`] if the choice could not be saved; the switch
    /// itself still happens.
    pub async fn select_tab(&self, tab: Tab) -> Result<(), DashboardError> {
        self.state.write().await.active_tab = tab;
        self.tabs.save(tab).map_err(|e| {
            let err = DashboardError::from(e);
            err.report("select_tab");
            err
        })
    }

    /// Open a customer's cart.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] if the customer is not listed.
    pub async fn inspect_cart(&self, user_id: &UserId) -> Result<UserProfile, DashboardError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .iter()
            .find(|user| &user.user_id == user_id)
            .cloned()
            .ok_or_else(|| DashboardError::NotFound(format!("customer {user_id}")))?;
        state.selected_user = Some(user_id.clone());
        Ok(user)
    }

    pub async fn close_cart(&self) {
        self.state.write().await.selected_user = None;
    }

    /// The open cart, as of the latest refresh.
    pub async fn selected_cart(&self) -> Option<UserProfile> {
        let state = self.state.read().await;
        let id = state.selected_user.as_ref()?;
        state.users.iter().find(|user| &user.user_id == id).cloned()
    }

    /// Open an order's manifest.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] if the order is not listed.
    pub async fn open_manifest(&self, order_id: &OrderId) -> Result<Order, DashboardError> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .iter()
            .find(|order| &order.id == order_id)
            .cloned()
            .ok_or_else(|| DashboardError::NotFound(format!("order {order_id}")))?;
        state.selected_order = Some(order_id.clone());
        Ok(order)
    }

    pub async fn close_manifest(&self) {
        self.state.write().await.selected_order = None;
    }

    /// The open manifest, as of the latest refresh.
    pub async fn selected_order(&self) -> Option<Order> {
        let state = self.state.read().await;
        let id = state.selected_order.as_ref()?;
        state.orders.iter().find(|order| &order.id == id).cloned()
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Headline figures, recomputed from the current collections.
    pub async fn stats(&self) -> DashboardStats {
        let state = self.state.read().await;
        DashboardStats::compute(&state.inventory, &state.users, &state.orders)
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn inventory(&self) -> Vec<InventoryItem> {
        self.state.read().await.inventory.clone()
    }

    pub async fn users(&self) -> Vec<UserProfile> {
        self.state.read().await.users.clone()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    // =========================================================================
    // Inventory mutations
    // =========================================================================

    /// Add a product from the operator form.
    ///
    /// The picked image is uploaded first. If the upload fails the manually
    /// entered URL is used; if there is none the product is still created,
    /// without a picture, and the operator is told so. A product submitted
    /// with no image at all is created without one as a normal success.
    ///
    /// # Errors
    ///
    /// Returns an error if unauthorized, the form is invalid, or the insert
    /// fails.
    #[instrument(skip(self, draft, image), fields(name = %draft.name))]
    pub async fn add_product(
        &self,
        draft: &ProductDraft,
        image: Option<ImageUpload>,
    ) -> Result<ProductId, DashboardError> {
        self.session.require_authorized()?;
        let mut item = draft
            .validate(String::new())
            .map_err(|e| self.fail("add_product", "Cannot add component", e.into()))?;

        let fallback = draft.image_url.trim();
        let mut image_missing = false;
        item.image = match image {
            Some(upload) => match self.gateway.upload_product_image(upload).await {
                Ok(url) => url.to_string(),
                Err(e) => {
                    tracing::warn!(error = %e, "Image upload failed, using manual URL if any");
                    image_missing = fallback.is_empty();
                    fallback.to_owned()
                }
            },
            None => fallback.to_owned(),
        };

        let id = self
            .gateway
            .insert_inventory_item(&item)
            .await
            .map_err(|e| self.fail("add_product", "Failed to add component", e.into()))?;

        let name = item.name.clone();
        self.state
            .write()
            .await
            .inventory
            .insert(0, InventoryItem::from_insert(id.clone(), item));
        tracing::info!(product_id = %id, "Component added");

        if image_missing {
            self.notifier
                .error(format!("{name} was added without an image"));
        } else {
            self.notifier.success(format!("{name} added to inventory"));
        }
        // Failures are logged inside; the local patch stands until the next tick.
        let _ = self.reload_inventory().await;
        Ok(id)
    }

    /// Delete a product after confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error if unauthorized, the product is not listed, or the
    /// delete fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn scrap_product(&self, id: &ProductId) -> Result<Outcome, DashboardError> {
        self.session.require_authorized()?;
        let name = self
            .state
            .read()
            .await
            .inventory
            .iter()
            .find(|item| &item.id == id)
            .map(|item| item.name.clone())
            .ok_or_else(|| DashboardError::NotFound(format!("product {id}")))
            .map_err(|e| self.fail("scrap_product", "Cannot scrap component", e))?;

        if !self.prompt.confirm(&format!("Scrap {name} from inventory?")) {
            return Ok(Outcome::Cancelled);
        }

        self.gateway
            .delete_inventory_item(id)
            .await
            .map_err(|e| self.fail("scrap_product", "Failed to scrap component", e.into()))?;

        self.state
            .write()
            .await
            .inventory
            .retain(|item| &item.id != id);
        tracing::info!(product_id = %id, "Component scrapped");
        self.notifier.success(format!("{name} scrapped"));
        // Failures are logged inside; the local patch stands until the next tick.
        let _ = self.reload_inventory().await;
        Ok(Outcome::Applied)
    }

    // =========================================================================
    // Order mutations
    // =========================================================================

    /// Set an order's status and delivery date from the manifest form.
    ///
    /// `raw_date` is the date field as typed; blank means no date. Moving to
    /// `rejected` asks for confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error if unauthorized, the order is not listed, the date is
    /// malformed, the transition leaves the lifecycle, or the update fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        raw_date: Option<&str>,
    ) -> Result<Outcome, DashboardError> {
        self.session.require_authorized()?;
        let update = OrderStatusUpdate::new(id.clone(), status, raw_date)
            .map_err(|e| self.fail("update_order_status", "Cannot update order", e.into()))?;
        self.submit_status(update).await
    }

    /// Confirm a pending order, optionally with a delivery date.
    ///
    /// # Errors
    ///
    /// See [`Dashboard::update_order_status`].
    pub async fn confirm_order(
        &self,
        id: &OrderId,
        raw_date: Option<&str>,
    ) -> Result<Outcome, DashboardError> {
        self.update_order_status(id, OrderStatus::Confirmed, raw_date)
            .await
    }

    /// Mark a confirmed order shipped, keeping its delivery date.
    ///
    /// # Errors
    ///
    /// See [`Dashboard::update_order_status`].
    pub async fn ship_order(&self, id: &OrderId) -> Result<Outcome, DashboardError> {
        self.advance_keeping_date(id, OrderStatus::Shipped).await
    }

    /// Mark a shipped order delivered, keeping its delivery date.
    ///
    /// # Errors
    ///
    /// See [`Dashboard::update_order_status`].
    pub async fn deliver_order(&self, id: &OrderId) -> Result<Outcome, DashboardError> {
        self.advance_keeping_date(id, OrderStatus::Delivered).await
    }

    /// Reject an order (status becomes `rejected`; the row is kept).
    ///
    /// # Errors
    ///
    /// See [`Dashboard::update_order_status`].
    pub async fn reject_order(&self, id: &OrderId) -> Result<Outcome, DashboardError> {
        self.update_order_status(id, OrderStatus::Rejected, None)
            .await
    }

    async fn advance_keeping_date(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Outcome, DashboardError> {
        self.session.require_authorized()?;
        let new_date: Option<NaiveDate> = self
            .state
            .read()
            .await
            .orders
            .iter()
            .find(|order| &order.id == id)
            .and_then(|order| order.delivery_date);
        self.submit_status(OrderStatusUpdate {
            target_id: id.clone(),
            new_status: status,
            new_date,
        })
        .await
    }

    async fn submit_status(&self, update: OrderStatusUpdate) -> Result<Outcome, DashboardError> {
        let id = update.target_id.clone();
        let current = self
            .state
            .read()
            .await
            .orders
            .iter()
            .find(|order| order.id == id)
            .map(|order| order.status)
            .ok_or_else(|| DashboardError::NotFound(format!("order {id}")))
            .map_err(|e| self.fail("update_order_status", "Cannot update order", e))?;

        if !current.can_transition_to(update.new_status) {
            let err = ValidationError::IllegalTransition {
                from: current,
                to: update.new_status,
            };
            return Err(self.fail("update_order_status", "Cannot update order", err.into()));
        }

        if update.new_status == OrderStatus::Rejected
            && !self.prompt.confirm(&format!("Reject order {id}?"))
        {
            return Ok(Outcome::Cancelled);
        }

        self.gateway
            .update_order_status(&update)
            .await
            .map_err(|e| self.fail("update_order_status", "Failed to update order", e.into()))?;

        if let Some(order) = self
            .state
            .write()
            .await
            .orders
            .iter_mut()
            .find(|order| order.id == id)
        {
            order.apply(&update);
        }
        tracing::info!(order_id = %id, status = %update.new_status, "Order updated");
        self.notifier
            .success(format!("Order {id} marked {}", update.new_status));
        // Failures are logged inside; the local patch stands until the next tick.
        let _ = self.reload_orders().await;
        Ok(Outcome::Applied)
    }

    /// Delete an order outright after confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error if unauthorized, the order is not listed, or the
    /// delete fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn purge_order(&self, id: &OrderId) -> Result<Outcome, DashboardError> {
        self.session.require_authorized()?;
        let listed = self
            .state
            .read()
            .await
            .orders
            .iter()
            .any(|order| &order.id == id);
        if !listed {
            return Err(self.fail(
                "purge_order",
                "Cannot delete order",
                DashboardError::NotFound(format!("order {id}")),
            ));
        }

        if !self
            .prompt
            .confirm(&format!("Permanently delete order {id}? This cannot be undone."))
        {
            return Ok(Outcome::Cancelled);
        }

        self.gateway
            .delete_order(id)
            .await
            .map_err(|e| self.fail("purge_order", "Failed to delete order", e.into()))?;

        let mut state = self.state.write().await;
        state.orders.retain(|order| &order.id != id);
        if state.selected_order.as_ref() == Some(id) {
            state.selected_order = None;
        }
        drop(state);

        tracing::info!(order_id = %id, "Order purged");
        self.notifier.success(format!("Order {id} deleted"));
        // Failures are logged inside; the local patch stands until the next tick.
        let _ = self.reload_orders().await;
        Ok(Outcome::Applied)
    }

    /// Report a failed action and show one error notification.
    fn fail(&self, action: &str, headline: &str, err: DashboardError) -> DashboardError {
        err.report(action);
        self.notifier.error(format!("{headline}: {err}"));
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use circuit_cart_core::Email;

    use super::*;
    use crate::gateway::InMemoryGateway;

    const ADMIN: &str = "owner@circuitcart.in";

    fn dashboard_with(
        gateway: Arc<InMemoryGateway>,
        prompt: Box<dyn ConfirmPrompt>,
    ) -> Arc<Dashboard> {
        let config = DashboardConfig::demo(Email::parse(ADMIN).unwrap()).unwrap();
        Dashboard::new(gateway, &config, Box::new(MemoryTabStore::new()), prompt)
    }

    async fn signed_in(gateway: Arc<InMemoryGateway>) -> Arc<Dashboard> {
        let dashboard = dashboard_with(gateway, Box::new(AssumeYes));
        dashboard
            .authorize(Some(Identity::with_email("g-1", ADMIN)))
            .await
            .unwrap();
        dashboard
    }

    #[tokio::test]
    async fn test_authorize_fetches_everything() {
        let gateway = Arc::new(InMemoryGateway::seeded());
        let dashboard = signed_in(Arc::clone(&gateway)).await;

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.inventory.len(), 5);
        assert_eq!(snapshot.users.len(), 3);
        assert_eq!(snapshot.orders.len(), 3);
        assert_eq!(gateway.read_calls(), 3);
        assert!(dashboard.is_polling().await);
    }

    #[tokio::test]
    async fn test_unauthorized_dashboard_does_nothing() {
        let gateway = Arc::new(InMemoryGateway::seeded());
        let dashboard = dashboard_with(Arc::clone(&gateway), Box::new(AssumeYes));

        let err = dashboard
            .authorize(Some(Identity::with_email("g-2", "someone@example.in")))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Auth(AuthError::NotAllowed { .. })));

        assert!(matches!(
            dashboard.refresh_all().await,
            Err(AuthError::NotAuthorized)
        ));
        assert!(dashboard.scrap_product(&ProductId::from("x")).await.is_err());
        assert_eq!(gateway.read_calls(), 0);
        assert_eq!(gateway.write_calls(), 0);
        assert!(!dashboard.is_polling().await);
    }

    #[tokio::test]
    async fn test_sign_out_stops_polling_and_clears_data() {
        let dashboard = signed_in(Arc::new(InMemoryGateway::seeded())).await;
        dashboard.sign_out().await;
        assert!(!dashboard.is_polling().await);
        assert!(dashboard.inventory().await.is_empty());
        assert!(!dashboard.is_authorized());
    }

    #[tokio::test]
    async fn test_declined_prompt_sends_nothing() {
        let gateway = Arc::new(InMemoryGateway::seeded());
        let dashboard = dashboard_with(Arc::clone(&gateway), Box::new(AssumeNo));
        dashboard
            .authorize(Some(Identity::with_email("g-1", ADMIN)))
            .await
            .unwrap();

        let id = dashboard.inventory().await[0].id.clone();
        assert_eq!(dashboard.scrap_product(&id).await.unwrap(), Outcome::Cancelled);
        assert_eq!(
            dashboard.purge_order(&OrderId::from("ord-1001")).await.unwrap(),
            Outcome::Cancelled
        );
        assert_eq!(
            dashboard.reject_order(&OrderId::from("ord-1001")).await.unwrap(),
            Outcome::Cancelled
        );
        assert_eq!(gateway.write_calls(), 0);
        assert_eq!(dashboard.inventory().await.len(), 5);
    }

    #[tokio::test]
    async fn test_illegal_transition_is_refused_locally() {
        let gateway = Arc::new(InMemoryGateway::seeded());
        let dashboard = signed_in(Arc::clone(&gateway)).await;

        // ord-1003 is delivered.
        let err = dashboard
            .ship_order(&OrderId::from("ord-1003"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Validation(ValidationError::IllegalTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Shipped
            })
        ));
        assert_eq!(gateway.write_calls(), 0);
        assert_eq!(dashboard.notifier().error_count(), 1);
    }

    #[tokio::test]
    async fn test_ship_keeps_delivery_date() {
        let gateway = Arc::new(InMemoryGateway::seeded());
        let dashboard = signed_in(Arc::clone(&gateway)).await;
        let id = OrderId::from("ord-1001");

        dashboard.confirm_order(&id, Some("2026-10-24")).await.unwrap();
        dashboard.ship_order(&id).await.unwrap();

        let update = gateway.last_status_update().unwrap();
        assert_eq!(update.new_status, OrderStatus::Shipped);
        assert_eq!(update.new_date, NaiveDate::from_ymd_opt(2026, 10, 24));
    }

    #[tokio::test]
    async fn test_selections_never_mutate() {
        let gateway = Arc::new(InMemoryGateway::seeded());
        let dashboard = signed_in(Arc::clone(&gateway)).await;

        let user = dashboard.inspect_cart(&UserId::from("u-asha")).await.unwrap();
        assert_eq!(user.cart_data.len(), 2);
        assert!(dashboard.selected_cart().await.is_some());
        dashboard.close_cart().await;
        assert!(dashboard.selected_cart().await.is_none());

        dashboard.open_manifest(&OrderId::from("ord-1002")).await.unwrap();
        dashboard.close_manifest().await;
        assert!(dashboard.selected_order().await.is_none());

        assert_eq!(gateway.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_upload_without_fallback_warns() {
        let gateway = Arc::new(InMemoryGateway::seeded());
        gateway.fail_uploads(true);
        let dashboard = signed_in(Arc::clone(&gateway)).await;

        let draft = ProductDraft {
            name: "HC-SR04 Ultrasonic Sensor".to_string(),
            category: "components".to_string(),
            price: "99".to_string(),
            stock: "50".to_string(),
            ..ProductDraft::default()
        };
        let upload = ImageUpload {
            file_name: "sr04.jpg".to_string(),
            bytes: vec![0xff, 0xd8],
        };
        let id = dashboard.add_product(&draft, Some(upload)).await.unwrap();

        let item = dashboard
            .inventory()
            .await
            .into_iter()
            .find(|item| item.id == id)
            .unwrap();
        assert_eq!(item.image, "");
        let notification = dashboard.notifier().current().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert!(notification.message.contains("without an image"));
    }

    #[tokio::test]
    async fn test_add_product_with_no_image_is_a_success() {
        let gateway = Arc::new(InMemoryGateway::seeded());
        let dashboard = signed_in(Arc::clone(&gateway)).await;

        let draft = ProductDraft {
            name: "Breadboard 830".to_string(),
            category: "components".to_string(),
            price: "120".to_string(),
            stock: "30".to_string(),
            ..ProductDraft::default()
        };
        let id = dashboard.add_product(&draft, None).await.unwrap();

        let item = dashboard
            .inventory()
            .await
            .into_iter()
            .find(|item| item.id == id)
            .unwrap();
        assert_eq!(item.image, "");
        assert_eq!(dashboard.notifier().error_count(), 0);
        assert_eq!(dashboard.notifier().success_count(), 1);
    }
}
