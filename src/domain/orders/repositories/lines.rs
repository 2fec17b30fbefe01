//! Order Lines Repository

use sqlx::{FromRow, Postgres, QueryBuilder, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    orders::models::{OrderId, OrderLine},
    products::models::ProductId,
};

const GET_ORDER_LINES_SQL: &str = include_str!("../sql/get_order_lines.sql");
const CREATE_ORDER_LINES_SQL: &str = "INSERT INTO order_lines (order_id, product_id, quantity) ";

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderLinesRepository;

impl PgOrderLinesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert all lines in a single statement, preserving their order.
    pub(crate) async fn create_order_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderId,
        lines: &[OrderLine],
    ) -> Result<u64, sqlx::Error> {
        if lines.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Postgres>::new(CREATE_ORDER_LINES_SQL);

        builder.push_values(lines, |mut row, line| {
            row.push_bind(order.into_i64())
                .push_bind(line.product.into_i64())
                .push_bind(i64::from(line.quantity));
        });

        let rows_affected = builder.build().execute(&mut **tx).await?.rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn get_order_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderId,
    ) -> Result<Vec<OrderLine>, sqlx::Error> {
        query_as::<Postgres, OrderLine>(GET_ORDER_LINES_SQL)
            .bind(order.into_i64())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity_i64: i64 = row.try_get("quantity")?;

        let quantity = u32::try_from(quantity_i64).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            product: ProductId::from_i64(row.try_get("product_id")?),
            quantity,
        })
    }
}
