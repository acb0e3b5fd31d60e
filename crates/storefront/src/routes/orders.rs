//! Order confirmation route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use shoko_core::OrderId;

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;
use crate::woo::StoreApiError;
use crate::woo::types::Order;

/// A confirmed order line.
#[derive(Clone)]
pub struct OrderLineView {
    pub name: String,
    pub variation_label: Option<String>,
    pub quantity: i64,
    pub line_total: String,
}

/// Order confirmation display data.
#[derive(Clone)]
pub struct OrderView {
    pub id: i64,
    pub status: &'static str,
    pub lines: Vec<OrderLineView>,
    pub total: String,
    pub customer_name: String,
    pub email: Option<String>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let lines = order
            .items
            .iter()
            .map(|item| OrderLineView {
                name: item.name.clone(),
                variation_label: (!item.variation.is_empty()).then(|| {
                    item.variation
                        .iter()
                        .map(|v| format!("{}: {}", v.name, v.value))
                        .collect::<Vec<_>>()
                        .join(", ")
                }),
                quantity: item.quantity,
                line_total: item.totals.line_total().format(),
            })
            .collect();

        Self {
            id: order.id.as_i64(),
            status: order.status.label(),
            lines,
            total: order.totals.total().format(),
            customer_name: format!(
                "{} {}",
                order.billing_address.first_name, order.billing_address.last_name
            )
            .trim()
            .to_owned(),
            email: order.billing_address.email.clone(),
        }
    }
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub order: OrderView,
}

/// Display the order confirmation page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<OrderShowTemplate> {
    let order = state
        .store()
        .order(OrderId::new(id))
        .await
        .map_err(|e| match e {
            StoreApiError::NotFound(_)
            | StoreApiError::Api {
                status: 404 | 403, ..
            } => AppError::NotFound(format!("order {id}")),
            other => AppError::from(other),
        })?;

    Ok(OrderShowTemplate {
        order: OrderView::from(&order),
    })
}
