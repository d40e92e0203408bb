//! Read-only view of the static formulation table.

use axum::response::Json as ResponseJson;
use axum::routing::get;
use axum::Router;
use onefarmer_core::{Element, Product};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::state::AppState;

#[derive(Serialize, Debug, Clone)]
pub struct FormulationView {
    pub product: Product,
    pub name: &'static str,
    pub grade: &'static str,
    pub elements: BTreeMap<Element, f64>,
}

pub async fn list_formulations() -> ResponseJson<Vec<FormulationView>> {
    let table = Product::ALL
        .iter()
        .map(|product| {
            let f = product.formulation();
            FormulationView {
                product: *product,
                name: f.name,
                grade: f.grade,
                elements: f.element_map(),
            }
        })
        .collect();
    ResponseJson(table)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/formulations", get(list_formulations))
}
