//! Row types shared by the pipeline and the dashboard

pub mod basket;
mod dimension;
mod order;

pub use basket::{Basket, ProductId};
pub use dimension::{
    Aisle, AisleId, Department, DepartmentId, Dimensions, Product, ProductPlacement,
};
pub use order::{EnrichedOrder, EvalSet, OrderId, OrderLine, RawOrder, UserId};
