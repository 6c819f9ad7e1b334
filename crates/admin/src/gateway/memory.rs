//! In-process gateway for demo mode and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use circuit_cart_core::{Category, OrderId, OrderStatus, Price, ProductId, UserId};
use secrecy::ExposeSecret;
use url::Url;
use uuid::Uuid;

use super::{Gateway, GatewayError, ImageUpload};
use crate::models::{
    CustomerInfo, FederatedCredential, Identity, InventoryItem, LineItem, NewInventoryItem, Order,
    OrderStatusUpdate, UserProfile,
};
use crate::session::AuthError;

/// A customer profile as stored, before its cart is joined in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryProfile {
    pub user_id: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl MemoryProfile {
    #[must_use]
    pub fn new(user_id: impl Into<UserId>, email: &str, display_name: Option<&str>) -> Self {
        Self {
            user_id: user_id.into(),
            email: Some(email.to_owned()),
            display_name: display_name.map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredCart {
    lines: Vec<LineItem>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct MemoryStore {
    inventory: Vec<InventoryItem>,
    profiles: Vec<MemoryProfile>,
    carts: HashMap<UserId, StoredCart>,
    orders: Vec<Order>,
    last_status_update: Option<OrderStatusUpdate>,
}

/// Gateway backed by plain collections.
///
/// Honours the same contract as the REST backend (newest first, `NotFound`
/// for unknown ids, profiles joined with carts on read) and can be told to
/// fail reads, writes or uploads.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    store: Mutex<MemoryStore>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_uploads: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryGateway {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with a small electronics catalog, three customers and
    /// a handful of orders.
    #[must_use]
    pub fn seeded() -> Self {
        let gateway = Self::new();
        let now = Utc::now();
        let ago = |hours: i64| Some(now - TimeDelta::hours(hours));

        let catalog = [
            ("Arduino Uno R3", Category::Microcontrollers, 549, 24, "10", 72),
            ("ESP32 DevKit V1", Category::Microcontrollers, 370, 40, "", 48),
            ("Assorted Resistor Pack", Category::Components, 149, 120, "", 30),
            ("60W Soldering Iron", Category::Tools, 899, 8, "15", 20),
            ("Line Follower Robot Kit", Category::Kits, 1_499, 5, "", 6),
        ];
        for (name, category, price, stock, discount, hours) in catalog {
            gateway.insert_inventory(InventoryItem {
                id: ProductId::new(Uuid::new_v4().to_string()),
                name: name.to_owned(),
                category,
                price: Price::from_rupees(price),
                stock,
                image: String::new(),
                desc: String::new(),
                discount: (!discount.is_empty()).then(|| discount.to_owned()),
                created_at: ago(hours),
            });
        }

        gateway.insert_profile(
            MemoryProfile::new("u-asha", "asha@example.in", Some("Asha Rao")),
            vec![
                LineItem::new("ESP32 DevKit V1", Price::from_rupees(370), 2),
                LineItem::new("Assorted Resistor Pack", Price::from_rupees(149), 1),
            ],
        );
        gateway.insert_profile(
            MemoryProfile::new("u-vikram", "vikram@example.in", None),
            Vec::new(),
        );
        gateway.insert_profile(
            MemoryProfile::new("u-meera", "meera@example.in", Some("Meera")),
            vec![LineItem::new("60W Soldering Iron", Price::from_rupees(899), 1)],
        );

        let orders = [
            ("u-vikram", OrderStatus::Pending, 549, 2),
            ("u-asha", OrderStatus::Confirmed, 740, 26),
            ("u-meera", OrderStatus::Delivered, 1_499, 200),
        ];
        for (index, (user, status, total, hours)) in orders.into_iter().enumerate() {
            gateway.insert_order(Order {
                id: OrderId::new(format!("ord-{}", 1001 + index)),
                user_id: Some(UserId::from(user)),
                total: Some(Price::from_rupees(total)),
                status,
                delivery_date: None,
                created_at: ago(hours),
                items: vec![LineItem::new("Demo item", Price::from_rupees(total), 1)],
                customer_info: CustomerInfo {
                    name: Some(format!("Customer {user}")),
                    phone: Some("+91 98450 00000".to_string()),
                    address: Some("12 MG Road, Bengaluru".to_string()),
                    pincode: Some("560001".to_string()),
                    utr: Some(format!("UTR{}", 420_000 + index)),
                    receipt_url: None,
                },
            });
        }

        gateway
    }

    /// Add a catalog row as-is.
    pub fn insert_inventory(&self, item: InventoryItem) {
        let mut store = self.lock();
        store.inventory.push(item);
        sort_newest_first(&mut store.inventory, |item| item.created_at);
    }

    /// Add a customer and their cart. An empty cart stores no cart record.
    pub fn insert_profile(&self, profile: MemoryProfile, cart: Vec<LineItem>) {
        let mut store = self.lock();
        if !cart.is_empty() {
            store.carts.insert(
                profile.user_id.clone(),
                StoredCart {
                    lines: cart,
                    updated_at: Some(Utc::now()),
                },
            );
        }
        store.profiles.push(profile);
    }

    /// Add an order as-is.
    pub fn insert_order(&self, order: Order) {
        let mut store = self.lock();
        store.orders.push(order);
        sort_newest_first(&mut store.orders, |order| order.created_at);
    }

    /// Make every list call fail with [`GatewayError::Unavailable`].
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every mutation fail with [`GatewayError::Unavailable`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make image uploads fail with [`GatewayError::ImageUpload`].
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Number of list calls served so far, failed ones included.
    #[must_use]
    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of mutations attempted so far, failed ones included.
    #[must_use]
    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The last status update accepted by the store.
    #[must_use]
    pub fn last_status_update(&self) -> Option<OrderStatusUpdate> {
        self.lock().last_status_update.clone()
    }

    /// Current state of one order.
    #[must_use]
    pub fn order(&self, id: &OrderId) -> Option<Order> {
        self.lock().orders.iter().find(|o| &o.id == id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_read(&self) -> Result<MutexGuard<'_, MemoryStore>, GatewayError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("simulated read failure".to_string()));
        }
        Ok(self.lock())
    }

    fn begin_write(&self) -> Result<MutexGuard<'_, MemoryStore>, GatewayError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("simulated write failure".to_string()));
        }
        Ok(self.lock())
    }
}

fn sort_newest_first<T>(rows: &mut [T], created_at: impl Fn(&T) -> Option<DateTime<Utc>>) {
    rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn list_inventory(&self) -> Result<Vec<InventoryItem>, GatewayError> {
        Ok(self.begin_read()?.inventory.clone())
    }

    async fn insert_inventory_item(
        &self,
        item: &NewInventoryItem,
    ) -> Result<ProductId, GatewayError> {
        let mut store = self.begin_write()?;
        let id = ProductId::new(Uuid::new_v4().to_string());
        store
            .inventory
            .push(InventoryItem::from_insert(id.clone(), item.clone()));
        sort_newest_first(&mut store.inventory, |item| item.created_at);
        Ok(id)
    }

    async fn delete_inventory_item(&self, id: &ProductId) -> Result<(), GatewayError> {
        let mut store = self.begin_write()?;
        let before = store.inventory.len();
        store.inventory.retain(|item| &item.id != id);
        if store.inventory.len() == before {
            return Err(GatewayError::NotFound(format!("inventory row {id}")));
        }
        Ok(())
    }

    async fn list_users_with_carts(&self) -> Result<Vec<UserProfile>, GatewayError> {
        let store = self.begin_read()?;
        Ok(store
            .profiles
            .iter()
            .map(|profile| {
                let cart = store.carts.get(&profile.user_id);
                UserProfile {
                    user_id: profile.user_id.clone(),
                    email: profile.email.clone(),
                    display_name: profile.display_name.clone(),
                    cart_data: cart.map(|c| c.lines.clone()).unwrap_or_default(),
                    updated_at: cart.and_then(|c| c.updated_at),
                }
            })
            .collect())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, GatewayError> {
        Ok(self.begin_read()?.orders.clone())
    }

    async fn update_order_status(&self, update: &OrderStatusUpdate) -> Result<(), GatewayError> {
        let mut store = self.begin_write()?;
        let order = store
            .orders
            .iter_mut()
            .find(|order| order.id == update.target_id)
            .ok_or_else(|| GatewayError::NotFound(format!("order {}", update.target_id)))?;
        order.apply(update);
        store.last_status_update = Some(update.clone());
        Ok(())
    }

    async fn delete_order(&self, id: &OrderId) -> Result<(), GatewayError> {
        let mut store = self.begin_write()?;
        let before = store.orders.len();
        store.orders.retain(|order| &order.id != id);
        if store.orders.len() == before {
            return Err(GatewayError::NotFound(format!("order {id}")));
        }
        Ok(())
    }

    async fn upload_product_image(&self, image: ImageUpload) -> Result<Url, GatewayError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(GatewayError::ImageUpload(
                "simulated upload failure".to_string(),
            ));
        }
        let url = format!(
            "https://images.circuitcart.test/{}/{}",
            Uuid::new_v4().simple(),
            image.file_name
        );
        Url::parse(&url).map_err(|e| GatewayError::ImageUpload(e.to_string()))
    }

    /// Treats the id token as the email claim; a blank token is a cancelled
    /// popup.
    async fn sign_in(&self, credential: &FederatedCredential) -> Result<Identity, AuthError> {
        let email = credential.id_token.expose_secret().trim();
        if email.is_empty() {
            return Err(AuthError::Cancelled);
        }
        Ok(Identity::with_email(
            format!("{}-{}", credential.provider, Uuid::new_v4().simple()),
            email,
        ))
    }

    async fn sign_out(&self) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_item(name: &str) -> NewInventoryItem {
        NewInventoryItem {
            name: name.to_string(),
            category: Category::Components,
            price: Price::from_rupees(10),
            stock: 100,
            image: String::new(),
            desc: String::new(),
            discount: None,
        }
    }

    #[tokio::test]
    async fn test_inventory_newest_first() {
        let gateway = InMemoryGateway::seeded();
        let id = gateway
            .insert_inventory_item(&new_item("LED 5mm"))
            .await
            .unwrap();
        let items = gateway.list_inventory().await.unwrap();
        assert_eq!(items[0].id, id);
        assert!(
            items
                .windows(2)
                .all(|pair| pair[0].created_at >= pair[1].created_at)
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let gateway = InMemoryGateway::new();
        let err = gateway
            .delete_inventory_item(&ProductId::from("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
        let err = gateway.delete_order(&OrderId::from(1)).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_profile_without_cart_record_has_empty_cart() {
        let gateway = InMemoryGateway::new();
        gateway.insert_profile(MemoryProfile::new("u1", "a@b.in", None), Vec::new());
        let users = gateway.list_users_with_carts().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].cart_data.is_empty());
        assert!(users[0].updated_at.is_none());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let gateway = InMemoryGateway::seeded();
        gateway.fail_reads(true);
        assert!(matches!(
            gateway.list_orders().await,
            Err(GatewayError::Unavailable(_))
        ));
        gateway.fail_writes(true);
        assert!(gateway.insert_inventory_item(&new_item("x")).await.is_err());
        assert_eq!(gateway.read_calls(), 1);
        assert_eq!(gateway.write_calls(), 1);
    }

    #[tokio::test]
    async fn test_status_update_is_recorded() {
        let gateway = InMemoryGateway::seeded();
        let id = OrderId::from("ord-1001");
        let update = OrderStatusUpdate::new(id.clone(), OrderStatus::Confirmed, Some("")).unwrap();
        gateway.update_order_status(&update).await.unwrap();
        assert_eq!(gateway.last_status_update(), Some(update));
        assert_eq!(gateway.order(&id).unwrap().status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_fake_sign_in() {
        let gateway = InMemoryGateway::new();
        let identity = gateway
            .sign_in(&FederatedCredential::new("google", "owner@circuitcart.in"))
            .await
            .unwrap();
        assert_eq!(identity.email.as_deref(), Some("owner@circuitcart.in"));
        assert!(matches!(
            gateway.sign_in(&FederatedCredential::new("google", "")).await,
            Err(AuthError::Cancelled)
        ));
    }
}
