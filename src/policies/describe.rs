//! Policy Descriptions
//!
//! Every policy renders to a stable, human-readable summary. The same text is used as the
//! policy's identity when a store checks for duplicates, so it must only depend on the policy's
//! structure and the order of its parts.

use std::fmt;

use crate::{
    discounts::SimpleDiscount,
    policies::{
        conditions::{Condition, ConditionOp},
        node::{Combination, DiscountNode},
        purchase::PurchaseRule,
        scope::Scope,
    },
    pricing::format_money,
};

/// Canonical text rendering of a policy.
pub trait Describe {
    /// Render the canonical description.
    fn describe(&self) -> String;
}

impl Describe for DiscountNode<'_> {
    fn describe(&self) -> String {
        self.to_string()
    }
}

impl Describe for PurchaseRule<'_> {
    fn describe(&self) -> String {
        self.to_string()
    }
}

impl Describe for Condition<'_> {
    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SimpleDiscount<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleDiscount::PercentageOff(percent) => write!(f, "{}%", percent.normalize()),
            SimpleDiscount::AmountOff(amount) => f.write_str(&format_money(amount)),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Store => f.write_str("store-wide"),
            Scope::Product(id) => write!(f, "product {id}"),
            Scope::Category(name) => write!(f, "category {name}"),
        }
    }
}

impl fmt::Display for ConditionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConditionOp::All => "all of",
            ConditionOp::Any => "any of",
            ConditionOp::ExactlyOne => "exactly one of",
        })
    }
}

impl fmt::Display for Condition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::BasketTotalAtLeast(min_total) => {
                write!(f, "basket total at least {}", format_money(min_total))
            }
            Condition::ProductQuantityAtLeast {
                product,
                min_quantity,
            } => write!(f, "at least {min_quantity} of product {product}"),
            Condition::CategoryQuantityAtLeast {
                category,
                min_quantity,
            } => write!(f, "at least {min_quantity} from category {category}"),
            Condition::Group { op, conditions } => {
                write!(f, "{op} (")?;
                write_joined(f, conditions)?;
                f.write_str(")")
            }
        }
    }
}

/// Composites render as `Sum of {a, b}` with no trailing space after the closing brace.
impl fmt::Display for DiscountNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountNode::Basic { discount, scope } => write!(f, "{discount} off {scope}"),
            DiscountNode::Conditional { base, condition } => write!(f, "{base} if {condition}"),
            DiscountNode::Composite { children, combine } => {
                let label = match combine {
                    Combination::Sum => "Sum",
                    Combination::Maximum => "Max",
                };

                write!(f, "{label} of {{")?;
                write_joined(f, children)?;
                f.write_str("}")
            }
        }
    }
}

impl fmt::Display for PurchaseRule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseRule::MinItems(n) => write!(f, "at least {n} items"),
            PurchaseRule::MaxItems(n) => write!(f, "at most {n} items"),
            PurchaseRule::MinPrice(amount) => {
                write!(f, "basket total at least {}", format_money(amount))
            }
            PurchaseRule::Default => f.write_str("no restriction"),
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, parts: &[T]) -> fmt::Result {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }

        write!(f, "{part}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::products::ProductId;

    use super::*;

    #[test]
    fn basic_descriptions() -> TestResult {
        let percent = DiscountNode::percentage(Decimal::from(10), Scope::Store)?;
        let fractional = DiscountNode::percentage(
            Decimal::new(1250, 2),
            Scope::Category("books".to_string()),
        )?;
        let fixed = DiscountNode::fixed(
            Money::from_minor(500, USD),
            Scope::Product(ProductId::from("P1")),
        )?;

        assert_eq!(percent.describe(), "10% off store-wide");
        assert_eq!(fractional.describe(), "12.5% off category books");
        assert_eq!(fixed.describe(), "5.00$ off product P1");

        Ok(())
    }

    #[test]
    fn conditional_and_composite_descriptions() -> TestResult {
        let percent = DiscountNode::percentage(Decimal::from(10), Scope::Store)?;
        let condition = Condition::basket_total_at_least(Money::from_minor(10_000, USD))?;
        let gated = DiscountNode::conditional(percent.clone(), condition)?;

        assert_eq!(
            gated.describe(),
            "10% off store-wide if basket total at least 100.00$"
        );

        let composite =
            DiscountNode::composite(vec![percent, gated], Combination::Maximum)?;

        assert_eq!(
            composite.describe(),
            "Max of {10% off store-wide, 10% off store-wide if basket total at least 100.00$}"
        );

        Ok(())
    }

    #[test]
    fn child_order_is_significant() -> TestResult {
        let a = DiscountNode::percentage(Decimal::from(5), Scope::Store)?;
        let b = DiscountNode::percentage(Decimal::from(7), Scope::Store)?;

        let ab = DiscountNode::composite(vec![a.clone(), b.clone()], Combination::Sum)?;
        let ba = DiscountNode::composite(vec![b, a], Combination::Sum)?;

        assert_ne!(ab.describe(), ba.describe());

        Ok(())
    }

    #[test]
    fn condition_group_description() -> TestResult {
        let condition = Condition::group(
            ConditionOp::ExactlyOne,
            vec![
                Condition::product_quantity_at_least(ProductId::from("P1"), 2)?,
                Condition::category_quantity_at_least("toys", 3)?,
            ],
        )?;

        assert_eq!(
            condition.describe(),
            "exactly one of (at least 2 of product P1, at least 3 from category toys)"
        );

        Ok(())
    }

    #[test]
    fn purchase_rule_descriptions() -> TestResult {
        assert_eq!(PurchaseRule::min_items(2)?.describe(), "at least 2 items");
        assert_eq!(PurchaseRule::max_items(9)?.describe(), "at most 9 items");
        assert_eq!(
            PurchaseRule::min_price(Money::from_minor(5000, USD))?.describe(),
            "basket total at least 50.00$"
        );
        assert_eq!(PurchaseRule::Default.describe(), "no restriction");

        Ok(())
    }
}
