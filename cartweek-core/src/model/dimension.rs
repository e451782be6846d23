//! Product hierarchy reference tables: product -> aisle -> department

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::basket::ProductId;

pub type AisleId = u32;
pub type DepartmentId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub product_name: String,
    pub aisle_id: AisleId,
    pub department_id: DepartmentId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aisle {
    pub aisle_id: AisleId,
    pub aisle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub department_id: DepartmentId,
    pub department: String,
}

/// Resolved aisle and department names of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductPlacement<'a> {
    pub aisle: &'a str,
    pub department: &'a str,
}

/// The three dimension tables indexed by id
#[derive(Debug, Clone, Default)]
pub struct Dimensions {
    products: HashMap<ProductId, Product>,
    aisles: HashMap<AisleId, String>,
    departments: HashMap<DepartmentId, String>,
}

impl Dimensions {
    pub fn new(products: Vec<Product>, aisles: Vec<Aisle>, departments: Vec<Department>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.product_id, p)).collect(),
            aisles: aisles.into_iter().map(|a| (a.aisle_id, a.aisle)).collect(),
            departments: departments
                .into_iter()
                .map(|d| (d.department_id, d.department))
                .collect(),
        }
    }

    /// Walk product -> aisle -> department. `None` when any link is missing.
    pub fn placement(&self, id: ProductId) -> Option<ProductPlacement<'_>> {
        let product = self.products.get(&id)?;
        Some(ProductPlacement {
            aisle: self.aisles.get(&product.aisle_id)?,
            department: self.departments.get(&product.department_id)?,
        })
    }
}
