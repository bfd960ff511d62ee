use std::sync::Arc;

use crate::config::Deadlines;
use crate::db::{OrderStore, ProductStore};
use crate::error::ApiError;
use crate::models::{CreateOrderRequest, LineItem, Order};

use super::within;

pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    deadlines: Deadlines,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        deadlines: Deadlines,
    ) -> Self {
        OrderService {
            orders,
            products,
            deadlines,
        }
    }

    /// Price every line against the current catalog and place the order.
    ///
    /// Nothing is written unless every product exists and is in stock. The
    /// requested status is ignored.
    pub async fn create_order(
        &self,
        user_id: &str,
        request: &CreateOrderRequest,
    ) -> Result<Order, ApiError> {
        let lines = request.validate()?;

        within(self.deadlines.standard, async {
            let amount = self.price(&lines).await?;
            let order = Order::new(user_id, lines, amount, &request.address);
            self.orders.insert(&order).await?;
            log::info!(
                "order {} placed by {} for {}",
                order.id,
                user_id,
                order.amount
            );
            Ok(order)
        })
        .await
    }

    pub async fn get_user_orders(&self, user_id: &str) -> Result<Vec<Order>, ApiError> {
        within(self.deadlines.standard, async {
            Ok(self.orders.find_by_user(user_id).await?)
        })
        .await
    }

    async fn price(&self, lines: &[LineItem]) -> Result<i64, ApiError> {
        let mut amount: i64 = 0;
        for line in lines {
            let product = self
                .products
                .find_by_id(&line.product_id)
                .await?
                .ok_or_else(|| {
                    ApiError::not_found(format!("product {} not found", line.product_id))
                })?;
            if !product.in_stock {
                return Err(ApiError::conflict(format!(
                    "product {} is out of stock",
                    product.title
                )));
            }
            amount = product
                .price
                .checked_mul(line.quantity)
                .and_then(|subtotal| amount.checked_add(subtotal))
                .ok_or_else(|| ApiError::validation("order amount is too large"))?;
        }
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{new_id, Product, ProductPayload, ORDER_INITIAL_STATUS};

    struct Fixture {
        service: OrderService,
        store: Arc<MemoryStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::default());
        Fixture {
            service: OrderService::new(store.clone(), store.clone(), Deadlines::default()),
            store,
        }
    }

    async fn product(store: &MemoryStore, title: &str, price: i64, in_stock: bool) -> Product {
        let product = Product::new(
            "admin",
            ProductPayload {
                title: title.into(),
                desc: "Cotton".into(),
                img: "shirt.png".into(),
                categories: Default::default(),
                size: ["M".to_string()].into(),
                color: Default::default(),
                price,
                in_stock,
            },
        );
        ProductStore::insert(store, &product).await.unwrap();
        product
    }

    fn request(lines: Vec<LineItem>) -> CreateOrderRequest {
        CreateOrderRequest {
            products: lines,
            address: "12 Main St".into(),
            status: Some("delivered".into()),
        }
    }

    fn line(product_id: &str, quantity: i64) -> LineItem {
        LineItem {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn amount_is_price_times_quantity_and_status_is_fixed() {
        let f = fixture();
        let shirt = product(&f.store, "Shirt", 20, true).await;

        let order = f
            .service
            .create_order("u1", &request(vec![line(&shirt.id, 2)]))
            .await
            .unwrap();

        assert_eq!(order.amount, 40);
        assert_eq!(order.status, ORDER_INITIAL_STATUS);
        assert_eq!(order.user_id, "u1");

        let listed = f.service.get_user_orders("u1").await.unwrap();
        assert_eq!(listed, vec![order]);
    }

    #[tokio::test]
    async fn amounts_sum_across_lines() {
        let f = fixture();
        let shirt = product(&f.store, "Shirt", 20, true).await;
        let hat = product(&f.store, "Hat", 7, true).await;

        let order = f
            .service
            .create_order("u1", &request(vec![line(&shirt.id, 1), line(&hat.id, 3)]))
            .await
            .unwrap();
        assert_eq!(order.amount, 41);
    }

    #[tokio::test]
    async fn out_of_stock_product_places_nothing() {
        let f = fixture();
        let shirt = product(&f.store, "Shirt", 20, true).await;
        let coat = product(&f.store, "Coat", 90, false).await;

        let err = f
            .service
            .create_order("u1", &request(vec![line(&shirt.id, 1), line(&coat.id, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(ref m) if m.contains("Coat")));
        assert!(f.service.get_user_orders("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_product_places_nothing() {
        let f = fixture();
        let err = f
            .service
            .create_order("u1", &request(vec![line(&new_id(), 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(OrderStore::find_by_user(&*f.store, "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn overflowing_amount_is_rejected() {
        let f = fixture();
        let gold = product(&f.store, "Gold", i64::MAX, true).await;
        let err = f
            .service
            .create_order("u1", &request(vec![line(&gold.id, 2)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
