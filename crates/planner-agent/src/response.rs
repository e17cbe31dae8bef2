use std::collections::HashMap;

use minijinja::{Environment, context};

const GENERIC: &str = "generic";

const TEMPLATES: &[(&str, &str)] = &[
  (
    "create_order",
    "Order created successfully! Your order #{{ results.create_order.order_id }} has been \
     confirmed and you will receive an email with the details.",
  ),
  (
    "check_stock",
    "{% if results.check_stock.available %}The product is available in stock \
     ({{ results.check_stock.quantity }} units).{% else %}The product is out of stock.{% endif %}",
  ),
  (
    "get_product_info",
    "Product information: {{ results.get_product_info.name }} \
     (SKU: {{ results.get_product_info.sku }}), price: ${{ results.get_product_info.price }}.",
  ),
  (
    "get_customer_info",
    "Customer information: {{ results.get_customer_info.name }} \
     (ID: {{ results.get_customer_info.customer_id }}).",
  ),
  (
    "calculate_total_price",
    "Total price: ${{ results.calculate_total_price.total }} \
     (subtotal ${{ results.calculate_total_price.subtotal }}, \
     taxes ${{ results.calculate_total_price.taxes }}).",
  ),
  (
    "send_confirmation",
    "Confirmation sent to {{ results.send_confirmation.recipient }}.",
  ),
  (GENERIC, "Request processed: {{ target }}"),
];

/// Renders the final answer for a run.
///
/// The template is chosen by target function. The generic template is used
/// when the target has no template of its own or produced no result.
pub struct Responder {
  env: Environment<'static>,
}

impl Responder {
  /// Responder with the built-in order-flow templates.
  pub fn new() -> Result<Self, minijinja::Error> {
    let mut env = Environment::new();
    for &(name, source) in TEMPLATES {
      env.add_template(name, source)?;
    }
    Ok(Self { env })
  }

  /// Register or replace the template for a target function.
  pub fn register(
    &mut self,
    target: &'static str,
    source: &'static str,
  ) -> Result<(), minijinja::Error> {
    self.env.add_template(target, source)
  }

  pub fn has_template(&self, target: &str) -> bool {
    self.env.get_template(target).is_ok()
  }

  pub fn render(
    &self,
    query: &str,
    target: &str,
    results: &HashMap<String, serde_json::Value>,
  ) -> Result<String, minijinja::Error> {
    let name = if results.contains_key(target) && self.has_template(target) {
      target
    } else {
      GENERIC
    };

    let template = self.env.get_template(name)?;
    template.render(context! { query, target, results })
  }
}
