//! Carts Repository

use sqlx::{Postgres, Transaction, query, query_scalar};

use crate::domain::{carts::models::CartId, users::UserId};

const GET_ACTIVE_CART_SQL: &str = include_str!("../sql/get_active_cart.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_active_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
    ) -> Result<Option<CartId>, sqlx::Error> {
        let cart: Option<i64> = query_scalar(GET_ACTIVE_CART_SQL)
            .bind(user.into_i64())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(cart.map(CartId::from_i64))
    }

    /// Returns the user's existing cart when one is already on file.
    pub(crate) async fn create_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
    ) -> Result<CartId, sqlx::Error> {
        let cart: i64 = query_scalar(CREATE_CART_SQL)
            .bind(user.into_i64())
            .fetch_one(&mut **tx)
            .await?;

        Ok(CartId::from_i64(cart))
    }

    pub(crate) async fn delete_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_SQL)
            .bind(cart.into_i64())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
