use async_trait::async_trait;
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection, Database};
use serde::de::DeserializeOwned;

use super::{CartStore, OrderStore, ProductStore, StoreResult, UserStore};
use crate::models::{Cart, LineItem, Order, Product, User};

pub const USERS: &str = "users";
pub const PRODUCTS: &str = "products";
pub const CARTS: &str = "carts";
pub const ORDERS: &str = "orders";

/// Wraps the MongoDB handle. Every collection lives in one database whose
/// name is fixed at startup.
#[derive(Clone)]
pub struct MongoGateway {
    db: Database,
}

impl MongoGateway {
    pub async fn connect(database_url: &str, database_name: &str) -> StoreResult<Self> {
        let client_options = ClientOptions::parse(database_url).await?;
        let client = Client::with_options(client_options)?;
        let db = client.database(database_name);

        db.run_command(doc! { "ping": 1 }, None).await?;
        log::info!("connected to MongoDB database '{}'", database_name);

        Ok(MongoGateway { db })
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    fn products(&self) -> Collection<Product> {
        self.db.collection(PRODUCTS)
    }

    fn carts(&self) -> Collection<Cart> {
        self.db.collection(CARTS)
    }

    fn orders(&self) -> Collection<Order> {
        self.db.collection(ORDERS)
    }
}

fn case_insensitive(query: &str) -> Document {
    doc! { "$regex": regex::escape(query), "$options": "i" }
}

fn newest_first(limit: Option<usize>) -> FindOptions {
    FindOptions::builder()
        .sort(doc! { "createdAt": -1 })
        .limit(limit.map(|l| l as i64))
        .build()
}

fn now_bson() -> StoreResult<Bson> {
    Ok(bson::to_bson(&Utc::now())?)
}

async fn collect<T>(cursor: mongodb::Cursor<T>) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    Ok(cursor.try_collect().await?)
}

#[async_trait]
impl UserStore for MongoGateway {
    async fn insert(&self, user: &User) -> StoreResult<()> {
        self.users().insert_one(user, None).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users().find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users()
            .find_one(doc! { "username": username }, None)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users().find_one(doc! { "email": email }, None).await?)
    }

    async fn replace(&self, user: &User) -> StoreResult<bool> {
        let result = self
            .users()
            .replace_one(doc! { "_id": user.id.as_str() }, user, None)
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn delete(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users()
            .find_one_and_delete(doc! { "_id": id }, None)
            .await?)
    }

    async fn search(&self, query: &str, exclude_id: &str) -> StoreResult<Vec<User>> {
        let filter = doc! {
            "$and": [
                { "_id": { "$ne": exclude_id } },
                { "$or": [
                    { "username": case_insensitive(query) },
                    { "email": case_insensitive(query) },
                    { "firstName": case_insensitive(query) },
                    { "lastName": case_insensitive(query) },
                    { "gender": query },
                ] },
            ]
        };
        collect(self.users().find(filter, None).await?).await
    }

    async fn sample(&self, size: usize) -> StoreResult<Vec<User>> {
        let pipeline = vec![doc! { "$sample": { "size": size as i64 } }];
        let docs: Vec<Document> = collect(self.users().aggregate(pipeline, None).await?).await?;
        docs.into_iter()
            .map(|d| bson::from_document(d).map_err(Into::into))
            .collect()
    }

    async fn recent(&self, limit: usize, exclude_id: &str) -> StoreResult<Vec<User>> {
        let cursor = self
            .users()
            .find(doc! { "_id": { "$ne": exclude_id } }, newest_first(Some(limit)))
            .await?;
        collect(cursor).await
    }
}

#[async_trait]
impl ProductStore for MongoGateway {
    async fn insert(&self, product: &Product) -> StoreResult<()> {
        self.products().insert_one(product, None).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.products().find_one(doc! { "_id": id }, None).await?)
    }

    async fn replace(&self, product: &Product) -> StoreResult<bool> {
        let result = self
            .products()
            .replace_one(doc! { "_id": product.id.as_str() }, product, None)
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let result = self.products().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count == 1)
    }

    async fn all(&self) -> StoreResult<Vec<Product>> {
        collect(self.products().find(None, None).await?).await
    }

    async fn latest(&self, limit: usize) -> StoreResult<Vec<Product>> {
        collect(self.products().find(None, newest_first(Some(limit))).await?).await
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<Product>> {
        let mut any_of = vec![
            doc! { "title": case_insensitive(query) },
            doc! { "desc": case_insensitive(query) },
            doc! { "categories": query },
            doc! { "color": query },
            doc! { "size": query },
        ];
        if let Ok(price) = query.parse::<i64>() {
            any_of.push(doc! { "price": price });
        }

        let filter = doc! { "$and": [ { "inStock": true }, { "$or": any_of } ] };
        collect(self.products().find(filter, None).await?).await
    }
}

#[async_trait]
impl CartStore for MongoGateway {
    async fn insert(&self, cart: &Cart) -> StoreResult<()> {
        self.carts().insert_one(cart, None).await?;
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Option<Cart>> {
        Ok(self.carts().find_one(doc! { "userId": user_id }, None).await?)
    }

    async fn find_owned(&self, cart_id: &str, user_id: &str) -> StoreResult<Option<Cart>> {
        Ok(self
            .carts()
            .find_one(doc! { "_id": cart_id, "userId": user_id }, None)
            .await?)
    }

    async fn increment_line(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<bool> {
        let result = self
            .carts()
            .update_one(
                doc! { "_id": cart_id, "products.productId": product_id },
                doc! {
                    "$inc": { "products.$.quantity": quantity },
                    "$set": { "updatedAt": now_bson()? },
                },
                None,
            )
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn push_line(&self, cart_id: &str, line: &LineItem) -> StoreResult<bool> {
        let result = self
            .carts()
            .update_one(
                doc! { "_id": cart_id },
                doc! {
                    "$push": { "products": bson::to_bson(line)? },
                    "$set": { "updatedAt": now_bson()? },
                },
                None,
            )
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn replace_lines(
        &self,
        cart_id: &str,
        user_id: &str,
        lines: &[LineItem],
    ) -> StoreResult<bool> {
        let result = self
            .carts()
            .update_one(
                doc! { "_id": cart_id, "userId": user_id },
                doc! {
                    "$set": {
                        "products": bson::to_bson(lines)?,
                        "updatedAt": now_bson()?,
                    }
                },
                None,
            )
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn delete_owned(&self, cart_id: &str, user_id: &str) -> StoreResult<Option<Cart>> {
        Ok(self
            .carts()
            .find_one_and_delete(doc! { "_id": cart_id, "userId": user_id }, None)
            .await?)
    }

    async fn latest(&self, limit: usize) -> StoreResult<Vec<Cart>> {
        collect(self.carts().find(None, newest_first(Some(limit))).await?).await
    }
}

#[async_trait]
impl OrderStore for MongoGateway {
    async fn insert(&self, order: &Order) -> StoreResult<()> {
        self.orders().insert_one(order, None).await?;
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        let cursor = self
            .orders()
            .find(doc! { "userId": user_id }, newest_first(None))
            .await?;
        collect(cursor).await
    }
}
