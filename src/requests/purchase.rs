//! Purchase rule requests.

use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::{
    policies::{PurchaseRule, PurchaseRuleKind, ValidationErrors},
    requests::{count, decimal, major, money},
};

/// A purchase rule as sent by a policy form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddPurchaseRuleRequest {
    /// `MINITEMS`, `MAXITEMS`, `MINPRICE` or `DEFAULT`
    #[serde(rename = "type")]
    pub rule_type: String,

    /// Item count, or price in major units
    #[serde(default)]
    pub value: f64,
}

impl AddPurchaseRuleRequest {
    /// Build and validate the rule, pricing amounts in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationErrors` for an unknown type or an out-of-range value.
    pub fn into_rule<'a>(
        &self,
        currency: &'a Currency,
    ) -> Result<PurchaseRule<'a>, ValidationErrors> {
        let kind = self.rule_type.parse::<PurchaseRuleKind>()?;

        if kind == PurchaseRuleKind::Default {
            return Ok(PurchaseRule::Default);
        }

        let value = decimal("value", self.value)?;

        match kind {
            PurchaseRuleKind::MinItems => PurchaseRule::min_items(count("value", value)?),
            PurchaseRuleKind::MaxItems => PurchaseRule::max_items(count("value", value)?),
            PurchaseRuleKind::MinPrice => PurchaseRule::min_price(money("value", value, currency)?),
            PurchaseRuleKind::Default => Ok(PurchaseRule::Default),
        }
    }
}

impl From<&PurchaseRule<'_>> for AddPurchaseRuleRequest {
    fn from(rule: &PurchaseRule<'_>) -> Self {
        let value = match rule {
            PurchaseRule::MinItems(n) | PurchaseRule::MaxItems(n) => f64::from(*n),
            PurchaseRule::MinPrice(amount) => major(amount),
            PurchaseRule::Default => 0.0,
        };

        Self {
            rule_type: rule.kind().as_str().to_string(),
            value,
        }
    }
}
