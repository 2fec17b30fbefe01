//! Payments Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::domain::{
    orders::models::{OrderId, Payment, PaymentId},
    products::repository::{amount_to_i64, try_get_amount},
    users::UserId,
};

const CREATE_PAYMENT_SQL: &str = include_str!("../sql/create_payment.sql");
const GET_PAYMENT_FOR_ORDER_SQL: &str = include_str!("../sql/get_payment_for_order.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderId,
        user: UserId,
        amount: u64,
    ) -> Result<PaymentId, sqlx::Error> {
        let payment: i64 = query_scalar(CREATE_PAYMENT_SQL)
            .bind(order.into_i64())
            .bind(user.into_i64())
            .bind(amount_to_i64(amount, "amount")?)
            .fetch_one(&mut **tx)
            .await?;

        Ok(PaymentId::from_i64(payment))
    }

    pub(crate) async fn get_payment_for_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderId,
    ) -> Result<Payment, sqlx::Error> {
        query_as::<Postgres, Payment>(GET_PAYMENT_FOR_ORDER_SQL)
            .bind(order.into_i64())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Payment {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: PaymentId::from_i64(row.try_get("id")?),
            order: OrderId::from_i64(row.try_get("order_id")?),
            user: UserId::from_i64(row.try_get("user_id")?),
            amount: try_get_amount(row, "amount")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
