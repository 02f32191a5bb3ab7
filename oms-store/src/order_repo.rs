use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oms_core::{BoxError, OrderRepository};
use oms_shared::{Delivery, Item, Order, Payment};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    order_uid: String,
    track_number: String,
    entry: String,
    delivery: i64,
    payment: String,
    locale: String,
    internal_signature: String,
    customer_id: String,
    delivery_service: String,
    shardkey: String,
    sm_id: i32,
    date_created: DateTime<Utc>,
    oof_shard: String,
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    transaction: String,
    request_id: String,
    currency: String,
    provider: String,
    amount: i64,
    payment_dt: i64,
    bank: String,
    delivery_cost: i64,
    goods_total: i64,
    custom_fee: i64,
}

#[derive(sqlx::FromRow)]
struct DeliveryRow {
    name: String,
    phone: String,
    zip: String,
    city: String,
    address: String,
    region: String,
    email: String,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    chrt_id: i64,
    track_number: String,
    price: i64,
    rid: String,
    name: String,
    sale: i32,
    size: String,
    total_price: i64,
    nm_id: i64,
    brand: String,
    status: i32,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            transaction: row.transaction,
            request_id: row.request_id,
            currency: row.currency,
            provider: row.provider,
            amount: row.amount,
            payment_dt: row.payment_dt,
            bank: row.bank,
            delivery_cost: row.delivery_cost,
            goods_total: row.goods_total,
            custom_fee: row.custom_fee,
        }
    }
}

impl From<DeliveryRow> for Delivery {
    fn from(row: DeliveryRow) -> Self {
        Delivery {
            name: row.name,
            phone: row.phone.into(),
            zip: row.zip,
            city: row.city,
            address: row.address,
            region: row.region,
            email: row.email.into(),
        }
    }
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            chrt_id: row.chrt_id,
            track_number: row.track_number,
            price: row.price,
            rid: row.rid,
            name: row.name,
            sale: row.sale,
            size: row.size,
            total_price: row.total_price,
            nm_id: row.nm_id,
            brand: row.brand,
            status: row.status,
        }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn save_order(&self, order: &Order) -> Result<(), BoxError> {
        let mut tx = self.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE order_uid = $1)")
            .bind(&order.order_uid)
            .fetch_one(&mut *tx)
            .await?;
        if exists {
            debug!(order_uid = %order.order_uid, "Order already stored, skipping");
            tx.rollback().await?;
            return Ok(());
        }

        let delivery = &order.delivery;

        // Customer: the first contact details seen for a customer are kept
        let inserted_user: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO users (customer_id, name, phone, email)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (customer_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&order.customer_id)
        .bind(&delivery.name)
        .bind(delivery.phone.expose())
        .bind(delivery.email.expose())
        .fetch_optional(&mut *tx)
        .await?;

        let user_id = match inserted_user {
            Some(id) => id,
            None => {
                sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE customer_id = $1")
                    .bind(&order.customer_id)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        let inserted_address: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO addresses (customer_id, zip, city, address, region)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (customer_id, zip, city, address, region) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&order.customer_id)
        .bind(&delivery.zip)
        .bind(&delivery.city)
        .bind(&delivery.address)
        .bind(&delivery.region)
        .fetch_optional(&mut *tx)
        .await?;

        let address_id = match inserted_address {
            Some(id) => id,
            None => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT id FROM addresses
                    WHERE customer_id = $1 AND zip = $2 AND city = $3 AND address = $4 AND region = $5
                    "#,
                )
                .bind(&order.customer_id)
                .bind(&delivery.zip)
                .bind(&delivery.city)
                .bind(&delivery.address)
                .bind(&delivery.region)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        sqlx::query(
            "INSERT INTO users_addresses (user_id, address_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(address_id)
        .execute(&mut *tx)
        .await?;

        let payment = &order.payment;
        sqlx::query(
            r#"
            INSERT INTO payments
                (transaction, request_id, currency, provider, amount, payment_dt, bank, delivery_cost, goods_total, custom_fee)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (transaction) DO NOTHING
            "#,
        )
        .bind(&payment.transaction)
        .bind(&payment.request_id)
        .bind(&payment.currency)
        .bind(&payment.provider)
        .bind(payment.amount)
        .bind(payment.payment_dt)
        .bind(&payment.bank)
        .bind(payment.delivery_cost)
        .bind(payment.goods_total)
        .bind(payment.custom_fee)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO orders
                (order_uid, track_number, entry, delivery, payment, locale, internal_signature,
                 customer_id, delivery_service, shardkey, sm_id, date_created, oof_shard)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&order.order_uid)
        .bind(&order.track_number)
        .bind(&order.entry)
        .bind(address_id)
        .bind(&payment.transaction)
        .bind(&order.locale)
        .bind(&order.internal_signature)
        .bind(&order.customer_id)
        .bind(&order.delivery_service)
        .bind(&order.shardkey)
        .bind(order.sm_id)
        .bind(order.date_created)
        .bind(&order.oof_shard)
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO items (nm_id, name, brand) VALUES ($1, $2, $3) ON CONFLICT (nm_id) DO NOTHING",
            )
            .bind(item.nm_id)
            .bind(&item.name)
            .bind(&item.brand)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO order_items
                    (order_uid, position, item_id, chrt_id, rid, track_number, price, sale, size, total_price, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(&order.order_uid)
            .bind(position as i32)
            .bind(item.nm_id)
            .bind(item.chrt_id)
            .bind(&item.rid)
            .bind(&item.track_number)
            .bind(item.price)
            .bind(item.sale)
            .bind(&item.size)
            .bind(item.total_price)
            .bind(item.status)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_order(&self, order_uid: &str) -> Result<Option<Order>, BoxError> {
        let mut tx = self.begin().await?;

        let order_row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT order_uid, track_number, entry, delivery, payment, locale, internal_signature,
                   customer_id, delivery_service, shardkey, sm_id, date_created, oof_shard
            FROM orders WHERE order_uid = $1
            "#,
        )
        .bind(order_uid)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = order_row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let payment: PaymentRow = sqlx::query_as(
            r#"
            SELECT transaction, request_id, currency, provider, amount, payment_dt, bank,
                   delivery_cost, goods_total, custom_fee
            FROM payments WHERE transaction = $1
            "#,
        )
        .bind(&row.payment)
        .fetch_one(&mut *tx)
        .await?;

        let delivery: DeliveryRow = sqlx::query_as(
            r#"
            SELECT u.name, u.phone, a.zip, a.city, a.address, a.region, u.email
            FROM addresses a
            JOIN users u ON u.customer_id = a.customer_id
            WHERE a.id = $1
            "#,
        )
        .bind(row.delivery)
        .fetch_one(&mut *tx)
        .await?;

        let items: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT oi.chrt_id, oi.track_number, oi.price, oi.rid, i.name, oi.sale, oi.size,
                   oi.total_price, i.nm_id, i.brand, oi.status
            FROM order_items oi
            JOIN items i ON i.nm_id = oi.item_id
            WHERE oi.order_uid = $1
            ORDER BY oi.position
            "#,
        )
        .bind(order_uid)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(Order {
            order_uid: row.order_uid,
            track_number: row.track_number,
            entry: row.entry,
            delivery: delivery.into(),
            payment: payment.into(),
            items: items.into_iter().map(Item::from).collect(),
            locale: row.locale,
            internal_signature: row.internal_signature,
            customer_id: row.customer_id,
            delivery_service: row.delivery_service,
            shardkey: row.shardkey,
            sm_id: row.sm_id,
            date_created: row.date_created,
            oof_shard: row.oof_shard,
        }))
    }

    async fn all_orders(&self) -> Result<Vec<Order>, BoxError> {
        let order_uids: Vec<String> =
            sqlx::query_scalar("SELECT order_uid FROM orders ORDER BY date_created")
                .fetch_all(&self.pool)
                .await?;

        let mut orders = Vec::with_capacity(order_uids.len());
        for order_uid in order_uids {
            if let Some(order) = self.get_order(&order_uid).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }
}
