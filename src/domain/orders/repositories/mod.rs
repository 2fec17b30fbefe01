//! Order Repositories

mod lines;
mod orders;
mod payments;

pub(crate) use lines::PgOrderLinesRepository;
pub(crate) use orders::PgOrdersRepository;
pub(crate) use payments::PgPaymentsRepository;
