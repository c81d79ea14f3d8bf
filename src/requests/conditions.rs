//! Condition requests.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    policies::{Condition, ConditionOp, ValidationError, ValidationErrors},
    products::ProductId,
    requests::{collect, count, decimal, major, money},
};

/// A condition as sent by a policy form: a type name plus loosely typed parameters.
///
/// Accepted types, with their parameters:
///
/// - `BASKET_TOTAL_AT_LEAST` (alias `MIN_PRICE`): `minTotal`
/// - `PRODUCT_QUANTITY_AT_LEAST` (alias `MIN_ITEMS`): `productId`, `minQuantity`
/// - `CATEGORY_QUANTITY_AT_LEAST` (aliases `MIN_CATEGORY_ITEMS`, `PRODUCT_CATEGORY_CONTAINS`):
///   `category`, `minQuantity` (defaults to 1)
/// - `COMPOSITE`: `subConditions` joined by `logic` (`AND`, `OR` or `XOR`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountConditionRequest {
    /// Condition type name
    #[serde(rename = "type", alias = "conditionType")]
    pub condition_type: String,

    /// Type-specific parameters
    #[serde(default)]
    pub params: BTreeMap<String, Value>,

    /// Members of a composite condition
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_conditions: Vec<DiscountConditionRequest>,

    /// Logic joining a composite condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<String>,
}

impl DiscountConditionRequest {
    /// Build and validate the condition, pricing thresholds in `currency`.
    ///
    /// # Errors
    ///
    /// Returns every problem found, including [`ValidationError::UnknownConditionType`] and
    /// missing parameters.
    pub fn into_condition<'a>(
        &self,
        currency: &'a Currency,
    ) -> Result<Condition<'a>, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match self.condition_type.trim().to_ascii_uppercase().as_str() {
            "BASKET_TOTAL_AT_LEAST" | "MIN_PRICE" => {
                let min_total = self
                    .number("minTotal")
                    .and_then(|value| value.ok_or(ValidationError::MissingField("minTotal")))
                    .and_then(|value| money("minTotal", value, currency));

                match min_total {
                    Ok(min_total) => Condition::basket_total_at_least(min_total),
                    Err(error) => Err(error.into()),
                }
            }
            "PRODUCT_QUANTITY_AT_LEAST" | "MIN_ITEMS" => {
                let product = collect(self.text("productId"), &mut errors);
                let min_quantity = collect(self.min_quantity(None), &mut errors);

                match (product, min_quantity) {
                    (Some(product), Some(min_quantity)) => {
                        Condition::product_quantity_at_least(ProductId::from(product), min_quantity)
                    }
                    _ => Err(errors),
                }
            }
            "CATEGORY_QUANTITY_AT_LEAST" | "MIN_CATEGORY_ITEMS" | "PRODUCT_CATEGORY_CONTAINS" => {
                let category = collect(self.text("category"), &mut errors);
                let min_quantity = collect(self.min_quantity(Some(1)), &mut errors);

                match (category, min_quantity) {
                    (Some(category), Some(min_quantity)) => {
                        Condition::category_quantity_at_least(category, min_quantity)
                    }
                    _ => Err(errors),
                }
            }
            "COMPOSITE" => {
                let op = collect(self.logic_op(), &mut errors);

                let conditions: Vec<Condition<'a>> = self
                    .sub_conditions
                    .iter()
                    .filter_map(|sub| collect(sub.into_condition(currency), &mut errors))
                    .collect();

                match op {
                    Some(op) if errors.is_empty() => Condition::group(op, conditions),
                    _ => Err(errors),
                }
            }
            _ => Err(ValidationError::UnknownConditionType(self.condition_type.clone()).into()),
        }
    }

    fn param(&self, key: &'static str) -> Option<&Value> {
        self.params.get(key).filter(|value| !value.is_null())
    }

    fn number(&self, key: &'static str) -> Result<Option<Decimal>, ValidationError> {
        let Some(value) = self.param(key) else {
            return Ok(None);
        };

        value
            .as_f64()
            .ok_or_else(|| ValidationError::InvalidRange {
                field: key,
                expected: "a number",
                found: value.to_string(),
            })
            .and_then(|number| decimal(key, number))
            .map(Some)
    }

    fn text(&self, key: &'static str) -> Result<&str, ValidationError> {
        self.param(key)
            .and_then(Value::as_str)
            .ok_or(ValidationError::MissingField(key))
    }

    fn min_quantity(&self, default: Option<u32>) -> Result<u32, ValidationError> {
        match (self.number("minQuantity")?, default) {
            (Some(value), _) => count("minQuantity", value),
            (None, Some(default)) => Ok(default),
            (None, None) => Err(ValidationError::MissingField("minQuantity")),
        }
    }

    fn logic_op(&self) -> Result<ConditionOp, ValidationError> {
        let logic = self
            .logic
            .as_deref()
            .ok_or(ValidationError::MissingField("logic"))?;

        match logic.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(ConditionOp::All),
            "OR" => Ok(ConditionOp::Any),
            "XOR" => Ok(ConditionOp::ExactlyOne),
            _ => Err(ValidationError::UnknownPolicyType {
                kind: "condition logic",
                name: logic.to_string(),
            }),
        }
    }
}

impl From<&Condition<'_>> for DiscountConditionRequest {
    fn from(condition: &Condition<'_>) -> Self {
        let mut params = BTreeMap::new();

        let (condition_type, sub_conditions, logic) = match condition {
            Condition::BasketTotalAtLeast(min_total) => {
                params.insert("minTotal".to_string(), Value::from(major(min_total)));

                ("BASKET_TOTAL_AT_LEAST", Vec::new(), None)
            }
            Condition::ProductQuantityAtLeast {
                product,
                min_quantity,
            } => {
                params.insert("productId".to_string(), Value::from(product.as_str()));
                params.insert("minQuantity".to_string(), Value::from(*min_quantity));

                ("PRODUCT_QUANTITY_AT_LEAST", Vec::new(), None)
            }
            Condition::CategoryQuantityAtLeast {
                category,
                min_quantity,
            } => {
                params.insert("category".to_string(), Value::from(category.as_str()));
                params.insert("minQuantity".to_string(), Value::from(*min_quantity));

                ("CATEGORY_QUANTITY_AT_LEAST", Vec::new(), None)
            }
            Condition::Group { op, conditions } => {
                let logic = match op {
                    ConditionOp::All => "AND",
                    ConditionOp::Any => "OR",
                    ConditionOp::ExactlyOne => "XOR",
                };

                (
                    "COMPOSITE",
                    conditions.iter().map(Self::from).collect(),
                    Some(logic.to_string()),
                )
            }
        };

        Self {
            condition_type: condition_type.to_string(),
            params,
            sub_conditions,
            logic,
        }
    }
}
