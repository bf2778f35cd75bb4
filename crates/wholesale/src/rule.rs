use serde::{Deserialize, Serialize};

use orderline_core::{DomainError, DomainResult, ProductId};
use orderline_orders::CartLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    MinOrderAmount,
    MinQuantity,
    Multiplicity,
}

/// One configured wholesale rule.
///
/// `product_id: None` scopes the rule to the whole order for
/// `MinOrderAmount`; for `MinQuantity`/`Multiplicity` it means the rule
/// applies to every line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WholesaleRule {
    pub rule_type: RuleType,
    pub product_id: Option<ProductId>,
    pub value: i64,
    pub is_active: bool,
}

impl WholesaleRule {
    fn applies_to(&self, line: &CartLine) -> bool {
        self.is_active
            && match self.product_id {
                Some(id) => id == line.product_id,
                None => true,
            }
    }
}

/// Validate proposed order lines against the active wholesale rules.
///
/// Evaluation order: all active order-level `MinOrderAmount` rules first,
/// then per line the `MinQuantity` and `Multiplicity` rules. The first
/// violated rule aborts with a `Validation` error carrying the rule and the
/// offending value; nothing is partially applied.
pub fn evaluate(rules: &[WholesaleRule], lines: &[CartLine]) -> DomainResult<()> {
    let order_total: i64 = lines.iter().map(|l| l.unit_price * l.quantity).sum();

    for rule in rules
        .iter()
        .filter(|r| r.is_active && r.rule_type == RuleType::MinOrderAmount)
    {
        if order_total < rule.value {
            let deficit = rule.value - order_total;
            return Err(DomainError::validation(format!(
                "wholesale order total {order_total} is below the minimum {} (short by {deficit})",
                rule.value
            )));
        }
    }

    for line in lines {
        for rule in rules.iter().filter(|r| r.applies_to(line)) {
            match rule.rule_type {
                RuleType::MinOrderAmount => {}
                RuleType::MinQuantity => {
                    if line.quantity < rule.value {
                        return Err(DomainError::validation(format!(
                            "product {} requires a minimum quantity of {}, got {}",
                            line.code, rule.value, line.quantity
                        )));
                    }
                }
                RuleType::Multiplicity => {
                    if rule.value > 0 && line.quantity % rule.value != 0 {
                        return Err(DomainError::validation(format!(
                            "product {} must be ordered in multiples of {}, got {}",
                            line.code, rule.value, line.quantity
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}
