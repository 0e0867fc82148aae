use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Alternatives, NutritionFacts, Product, ProductCategory};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub barcode: String,
    pub name: String,
    pub description: Option<String>,
    pub category: ProductCategory,
    pub price: i64,
    pub original_price: Option<i64>,
    pub unit: String,
    pub nutrition: Option<NutritionFacts>,
    pub min_stock_level: Option<i32>,
    pub max_stock_level: Option<i32>,
    pub alternatives: Option<Alternatives>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub price: Option<i64>,
    pub original_price: Option<i64>,
    pub unit: Option<String>,
    pub nutrition: Option<NutritionFacts>,
    pub min_stock_level: Option<i32>,
    pub max_stock_level: Option<i32>,
    pub alternatives: Option<Alternatives>,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}
