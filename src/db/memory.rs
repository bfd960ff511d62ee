use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use super::{CartStore, OrderStore, ProductStore, StoreResult, UserStore};
use crate::models::{Cart, LineItem, Order, Product, User};

/// In-process backend with the same query semantics as the Mongo filters.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    products: RwLock<HashMap<String, Product>>,
    carts: RwLock<HashMap<String, Cart>>,
    orders: RwLock<HashMap<String, Order>>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> StoreResult<()> {
        self.users.write().await.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn replace(&self, user: &User) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.write().await.remove(id))
    }

    async fn search(&self, query: &str, exclude_id: &str) -> StoreResult<Vec<User>> {
        let needle = query.to_lowercase();
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.id != exclude_id)
            .filter(|u| {
                contains_ci(&u.username, &needle)
                    || contains_ci(&u.email, &needle)
                    || contains_ci(&u.first_name, &needle)
                    || contains_ci(&u.last_name, &needle)
                    || u.gender.as_str() == query
            })
            .cloned()
            .collect())
    }

    async fn sample(&self, size: usize) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let all: Vec<&User> = users.values().collect();
        Ok(all
            .choose_multiple(&mut rand::thread_rng(), size)
            .map(|u| (*u).clone())
            .collect())
    }

    async fn recent(&self, limit: usize, exclude_id: &str) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let mut recent: Vec<User> = users
            .values()
            .filter(|u| u.id != exclude_id)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        Ok(recent)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert(&self, product: &Product) -> StoreResult<()> {
        self.products
            .write()
            .await
            .insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn replace(&self, product: &Product) -> StoreResult<bool> {
        let mut products = self.products.write().await;
        match products.get_mut(&product.id) {
            Some(stored) => {
                *stored = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.products.write().await.remove(id).is_some())
    }

    async fn all(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn latest(&self, limit: usize) -> StoreResult<Vec<Product>> {
        let mut products = self.all().await?;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products.truncate(limit);
        Ok(products)
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|p| p.in_stock && p.matches_query(query))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn insert(&self, cart: &Cart) -> StoreResult<()> {
        self.carts.write().await.insert(cart.id.clone(), cart.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Option<Cart>> {
        let carts = self.carts.read().await;
        Ok(carts.values().find(|c| c.user_id == user_id).cloned())
    }

    async fn find_owned(&self, cart_id: &str, user_id: &str) -> StoreResult<Option<Cart>> {
        let carts = self.carts.read().await;
        Ok(carts
            .get(cart_id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn increment_line(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<bool> {
        let mut carts = self.carts.write().await;
        let Some(cart) = carts.get_mut(cart_id) else {
            return Ok(false);
        };
        match cart.products.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => match line.quantity.checked_add(quantity) {
                Some(total) => {
                    line.quantity = total;
                    cart.updated_at = Utc::now();
                    Ok(true)
                }
                None => Ok(false),
            },
            None => Ok(false),
        }
    }

    async fn push_line(&self, cart_id: &str, line: &LineItem) -> StoreResult<bool> {
        let mut carts = self.carts.write().await;
        match carts.get_mut(cart_id) {
            Some(cart) => {
                cart.products.push(line.clone());
                cart.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn replace_lines(
        &self,
        cart_id: &str,
        user_id: &str,
        lines: &[LineItem],
    ) -> StoreResult<bool> {
        let mut carts = self.carts.write().await;
        match carts.get_mut(cart_id).filter(|c| c.user_id == user_id) {
            Some(cart) => {
                cart.products = lines.to_vec();
                cart.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_owned(&self, cart_id: &str, user_id: &str) -> StoreResult<Option<Cart>> {
        let mut carts = self.carts.write().await;
        if carts.get(cart_id).map_or(false, |c| c.user_id == user_id) {
            Ok(carts.remove(cart_id))
        } else {
            Ok(None)
        }
    }

    async fn latest(&self, limit: usize) -> StoreResult<Vec<Cart>> {
        let mut carts: Vec<Cart> = self.carts.read().await.values().cloned().collect();
        carts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        carts.truncate(limit);
        Ok(carts)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: &Order) -> StoreResult<()> {
        self.orders
            .write()
            .await
            .insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}
