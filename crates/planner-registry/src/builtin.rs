use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::RegistryError;
use crate::function::PlanFunction;

/// The simulated order-flow functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinFunction {
  GetCustomerInfo,
  GetProductInfo,
  CheckStock,
  CalculateTotalPrice,
  CreateOrder,
  SendConfirmation,
}

impl BuiltinFunction {
  pub const ALL: [BuiltinFunction; 6] = [
    Self::GetCustomerInfo,
    Self::GetProductInfo,
    Self::CheckStock,
    Self::CalculateTotalPrice,
    Self::CreateOrder,
    Self::SendConfirmation,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      Self::GetCustomerInfo => "get_customer_info",
      Self::GetProductInfo => "get_product_info",
      Self::CheckStock => "check_stock",
      Self::CalculateTotalPrice => "calculate_total_price",
      Self::CreateOrder => "create_order",
      Self::SendConfirmation => "send_confirmation",
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      Self::GetCustomerInfo => "Get customer information by ID or name",
      Self::GetProductInfo => "Get product information by SKU or name",
      Self::CheckStock => "Check stock availability for the product",
      Self::CalculateTotalPrice => "Calculate the total price including taxes and discounts",
      Self::CreateOrder => "Create a new order in the system",
      Self::SendConfirmation => "Send a confirmation email to the customer",
    }
  }

  fn payload(&self) -> serde_json::Value {
    match self {
      Self::GetCustomerInfo => json!({
        "customer_id": 12345,
        "name": "Jane Doe",
        "email": "jane@example.com"
      }),
      Self::GetProductInfo => json!({
        "sku": "LAP-2026",
        "name": "Gaming Laptop X1",
        "price": 1299.99
      }),
      Self::CheckStock => json!({ "available": true, "quantity": 15 }),
      Self::CalculateTotalPrice => json!({
        "subtotal": 1299.99,
        "taxes": 156.00,
        "total": 1455.99
      }),
      Self::CreateOrder => json!({
        "order_id": "ORD-78901",
        "status": "confirmed",
        "total": 1455.99
      }),
      Self::SendConfirmation => json!({ "sent": true, "recipient": "jane@example.com" }),
    }
  }
}

impl PlanFunction for BuiltinFunction {
  fn name(&self) -> &str {
    BuiltinFunction::name(self)
  }

  fn description(&self) -> &str {
    BuiltinFunction::description(self)
  }

  fn invoke(&self) -> serde_json::Value {
    let payload = self.payload();
    debug!(function = %self, payload = %payload, "builtin function invoked");
    payload
  }
}

impl FromStr for BuiltinFunction {
  type Err = RegistryError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|f| f.name() == s)
      .ok_or_else(|| RegistryError::UnknownFunction {
        name: s.to_string(),
      })
  }
}

impl fmt::Display for BuiltinFunction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_names_parse_back() {
    for function in BuiltinFunction::ALL {
      assert_eq!(function.name().parse::<BuiltinFunction>().unwrap(), function);
    }
  }

  #[test]
  fn test_unknown_name_is_rejected() {
    assert_eq!(
      "refund_order".parse::<BuiltinFunction>(),
      Err(RegistryError::UnknownFunction {
        name: "refund_order".to_string()
      })
    );
  }

  #[test]
  fn test_serde_name_matches_catalog_name() {
    for function in BuiltinFunction::ALL {
      let json = serde_json::to_value(function).unwrap();
      assert_eq!(json, function.name());
    }
  }

  #[test]
  fn test_create_order_payload() {
    let payload = BuiltinFunction::CreateOrder.invoke();
    assert_eq!(payload["order_id"], "ORD-78901");
    assert_eq!(payload["status"], "confirmed");
  }
}
