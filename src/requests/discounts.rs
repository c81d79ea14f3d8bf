//! Discount requests.

use rust_decimal::prelude::ToPrimitive;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::{
    discounts::SimpleDiscount,
    policies::{
        Combination, DiscountKind, DiscountNode, ScopeKind, ValidationError, ValidationErrors,
    },
    requests::{collect, conditions::DiscountConditionRequest, decimal, major},
};

/// A discount policy as sent by a policy form.
///
/// `type` is one of `PERCENTAGE`, `FIXED`, `CONDITIONAL` or `COMPOSITE`. A conditional takes
/// its base from the first sub-discount, or failing that is a percentage discount built from
/// its own `scope`, `scopeId` and `value`. A composite merges its sub-discounts with
/// `combinationType`, `SUM` when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDiscountRequest {
    /// Discount type name
    #[serde(rename = "type", alias = "discountType")]
    pub discount_type: String,

    /// Scope type name; store-wide when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Product id or category name for product and category scopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,

    /// Percentage (0-100) or fixed amount in major units
    #[serde(default)]
    pub value: f64,

    /// Gate of a conditional discount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<DiscountConditionRequest>,

    /// Base of a conditional, or children of a composite
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_discounts: Vec<AddDiscountRequest>,

    /// Combination name of a composite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combination_type: Option<String>,
}

impl AddDiscountRequest {
    /// Build and validate the discount tree, pricing amounts in `currency`.
    ///
    /// # Errors
    ///
    /// Returns every problem found anywhere in the request tree.
    pub fn into_node<'a>(&self, currency: &'a Currency) -> Result<DiscountNode<'a>, ValidationErrors> {
        match self.discount_type.trim().to_ascii_uppercase().as_str() {
            "PERCENTAGE" => self.basic(DiscountKind::Percentage, currency),
            "FIXED" => self.basic(DiscountKind::Fixed, currency),
            "CONDITIONAL" => self.conditional(currency),
            "COMPOSITE" => self.composite(currency),
            _ => Err(ValidationError::UnknownPolicyType {
                kind: "discount",
                name: self.discount_type.clone(),
            }
            .into()),
        }
    }

    fn basic<'a>(
        &self,
        kind: DiscountKind,
        currency: &'a Currency,
    ) -> Result<DiscountNode<'a>, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let scope = match self.scope.as_deref() {
            Some(scope) => collect(scope.parse::<ScopeKind>(), &mut errors),
            None => Some(ScopeKind::Store),
        };

        let value = collect(decimal("value", self.value), &mut errors);

        match (scope, value) {
            (Some(scope), Some(value)) => {
                DiscountNode::from_parts(kind, scope, self.scope_id.as_deref(), value, currency)
            }
            _ => Err(errors),
        }
    }

    fn conditional<'a>(&self, currency: &'a Currency) -> Result<DiscountNode<'a>, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let base = match self.sub_discounts.first() {
            Some(base) => base.into_node(currency),
            None => self.basic(DiscountKind::Percentage, currency),
        };

        let base = collect(base, &mut errors);

        let condition = match &self.condition {
            Some(condition) => collect(condition.into_condition(currency), &mut errors),
            None => {
                errors.push(ValidationError::MissingField("condition"));
                None
            }
        };

        match (base, condition) {
            (Some(base), Some(condition)) => DiscountNode::conditional(base, condition),
            _ => Err(errors),
        }
    }

    fn composite<'a>(&self, currency: &'a Currency) -> Result<DiscountNode<'a>, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let combine = match self.combination_type.as_deref() {
            Some(combine) => collect(combine.parse::<Combination>(), &mut errors),
            None => Some(Combination::Sum),
        };

        let children: Vec<DiscountNode<'a>> = self
            .sub_discounts
            .iter()
            .filter_map(|child| collect(child.into_node(currency), &mut errors))
            .collect();

        match combine {
            Some(combine) if errors.is_empty() => DiscountNode::composite(children, combine),
            _ => Err(errors),
        }
    }
}

impl From<&DiscountNode<'_>> for AddDiscountRequest {
    fn from(node: &DiscountNode<'_>) -> Self {
        match node {
            DiscountNode::Basic { discount, scope } => {
                let (kind, value) = match discount {
                    SimpleDiscount::PercentageOff(percent) => {
                        (DiscountKind::Percentage, percent.to_f64().unwrap_or_default())
                    }
                    SimpleDiscount::AmountOff(amount) => (DiscountKind::Fixed, major(amount)),
                };

                Self {
                    discount_type: kind.as_str().to_string(),
                    scope: Some(scope.kind().as_str().to_string()),
                    scope_id: scope.target().map(str::to_string),
                    value,
                    ..Self::default()
                }
            }
            DiscountNode::Conditional { base, condition } => {
                let base = Self::from(base.as_ref());

                Self {
                    discount_type: node.type_as_str().to_string(),
                    scope: base.scope.clone(),
                    scope_id: base.scope_id.clone(),
                    value: base.value,
                    condition: Some(DiscountConditionRequest::from(condition)),
                    sub_discounts: vec![base],
                    combination_type: None,
                }
            }
            DiscountNode::Composite { children, combine } => Self {
                discount_type: node.type_as_str().to_string(),
                sub_discounts: children.iter().map(Self::from).collect(),
                combination_type: Some(combine.as_str().to_string()),
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::{
        Money,
        iso::{GBP, USD},
    };
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        policies::{Condition, Scope},
        products::ProductId,
    };

    use super::*;

    fn request(value: serde_json::Value) -> Result<AddDiscountRequest, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn basic_request_accepts_discount_type_alias() -> TestResult {
        let node = request(json!({
            "discountType": "fixed",
            "scope": "PRODUCT",
            "scopeId": "P1",
            "value": 5
        }))?
        .into_node(USD)?;

        assert_eq!(
            node,
            DiscountNode::fixed(
                Money::from_minor(500, USD),
                Scope::Product(ProductId::from("P1"))
            )?
        );

        Ok(())
    }

    #[test]
    fn conditional_takes_first_sub_discount_as_base() -> TestResult {
        let node = request(json!({
            "type": "CONDITIONAL",
            "scope": "STORE",
            "value": 99,
            "condition": { "type": "BASKET_TOTAL_AT_LEAST", "params": { "minTotal": 100 } },
            "subDiscounts": [{ "type": "PERCENTAGE", "scope": "CATEGORY", "scopeId": "books", "value": 10 }]
        }))?
        .into_node(GBP)?;

        assert_eq!(
            node,
            DiscountNode::conditional(
                DiscountNode::percentage(
                    Decimal::from(10),
                    Scope::Category("books".to_string())
                )?,
                Condition::basket_total_at_least(Money::from_minor(10_000, GBP))?
            )?
        );

        Ok(())
    }

    #[test]
    fn conditional_without_base_infers_percentage() -> TestResult {
        let node = request(json!({
            "type": "CONDITIONAL",
            "scope": "STORE",
            "value": 15,
            "condition": { "type": "MIN_ITEMS", "params": { "productId": "P1", "minQuantity": 2 } }
        }))?
        .into_node(GBP)?;

        let DiscountNode::Conditional { base, .. } = node else {
            panic!("expected a conditional discount");
        };

        assert_eq!(
            *base,
            DiscountNode::percentage(Decimal::from(15), Scope::Store)?
        );

        Ok(())
    }

    #[test]
    fn composite_collects_errors_from_every_child() -> TestResult {
        let result = request(json!({
            "type": "COMPOSITE",
            "combinationType": "MAXIMUM",
            "subDiscounts": [
                { "type": "PERCENTAGE", "scope": "PRODUCT", "value": 10 },
                { "type": "FIXED", "scope": "STORE", "value": -3 }
            ]
        }))?
        .into_node(GBP);

        let errors = result.err().unwrap_or_default();

        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&ValidationError::MissingScopeTarget {
            scope: ScopeKind::Product
        }));

        Ok(())
    }

    #[test]
    fn composite_defaults_to_sum() -> TestResult {
        let node = request(json!({
            "type": "COMPOSITE",
            "subDiscounts": [
                { "type": "PERCENTAGE", "value": 10 },
                { "type": "FIXED", "value": 2.5 }
            ]
        }))?
        .into_node(GBP)?;

        assert!(matches!(
            node,
            DiscountNode::Composite {
                combine: Combination::Sum,
                ..
            }
        ));

        Ok(())
    }

    #[test]
    fn unknown_discount_type_is_reported() -> TestResult {
        let result = request(json!({ "type": "COUPON", "value": 10 }))?.into_node(GBP);

        assert!(matches!(
            result.err().unwrap_or_default().iter().next(),
            Some(ValidationError::UnknownPolicyType { kind: "discount", .. })
        ));

        Ok(())
    }

    #[test]
    fn nodes_round_trip_through_requests() -> TestResult {
        let node = DiscountNode::composite(
            vec![
                DiscountNode::conditional(
                    DiscountNode::fixed(Money::from_minor(250, GBP), Scope::Store)?,
                    Condition::category_quantity_at_least("books", 3)?,
                )?,
                DiscountNode::percentage(Decimal::new(125, 1), Scope::Store)?,
            ],
            Combination::Maximum,
        )?;

        let request = AddDiscountRequest::from(&node);
        let json = serde_json::to_value(&request)?;

        assert_eq!(json.get("type"), Some(&json!("COMPOSITE")));
        assert_eq!(request.into_node(GBP)?, node);

        Ok(())
    }
}
