//! Property tests for discount construction, evaluation and description.

use proptest::{prelude::*, sample::select, test_runner::TestCaseError};
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::USD};

use storefront_policy::prelude::*;

const CATEGORIES: [&str; 3] = ["books", "toys", "Books"];

fn product(index: u8) -> ProductId {
    ProductId::new(format!("P{index}"))
}

fn arb_scope() -> impl Strategy<Value = Scope> {
    prop_oneof![
        Just(Scope::Store),
        (0_u8..5).prop_map(|i| Scope::Product(product(i))),
        select(CATEGORIES.to_vec()).prop_map(|category| Scope::Category(category.to_string())),
    ]
}

fn arb_basic() -> impl Strategy<Value = DiscountNode<'static>> {
    prop_oneof![
        (1_i64..=10_000, arb_scope()).prop_filter_map("valid percentage", |(hundredths, scope)| {
            DiscountNode::percentage(Decimal::new(hundredths, 2), scope).ok()
        }),
        (1_i64..100_000, arb_scope()).prop_filter_map("valid fixed amount", |(minor, scope)| {
            DiscountNode::fixed(Money::from_minor(minor, USD), scope).ok()
        }),
    ]
}

fn arb_condition() -> impl Strategy<Value = Condition<'static>> {
    let leaf = prop_oneof![
        (1_i64..50_000).prop_filter_map("valid threshold", |minor| {
            Condition::basket_total_at_least(Money::from_minor(minor, USD)).ok()
        }),
        (0_u8..5, 1_u32..6).prop_filter_map("valid product count", |(i, n)| {
            Condition::product_quantity_at_least(product(i), n).ok()
        }),
        (select(CATEGORIES.to_vec()), 1_u32..6).prop_filter_map(
            "valid category count",
            |(category, n)| Condition::category_quantity_at_least(category, n).ok()
        ),
    ];

    leaf.prop_recursive(2, 8, 3, |inner| {
        (
            select(vec![ConditionOp::All, ConditionOp::Any, ConditionOp::ExactlyOne]),
            prop::collection::vec(inner, 1..4),
        )
            .prop_filter_map("valid group", |(op, conditions)| {
                Condition::group(op, conditions).ok()
            })
    })
}

fn arb_child() -> impl Strategy<Value = DiscountNode<'static>> {
    prop_oneof![
        arb_basic(),
        (arb_basic(), arb_condition()).prop_filter_map("valid conditional", |(base, condition)| {
            DiscountNode::conditional(base, condition).ok()
        }),
    ]
}

fn arb_children() -> impl Strategy<Value = Vec<DiscountNode<'static>>> {
    prop::collection::vec(arb_child(), 2..5).prop_filter("distinct children", |children| {
        let mut seen = FxHashSet::default();

        children.iter().all(|child| seen.insert(child.describe()))
    })
}

fn arb_combination() -> impl Strategy<Value = Combination> {
    prop_oneof![Just(Combination::Sum), Just(Combination::Maximum)]
}

fn arb_node() -> impl Strategy<Value = DiscountNode<'static>> {
    prop_oneof![
        arb_child(),
        (arb_children(), arb_combination()).prop_filter_map(
            "valid composite",
            |(children, combine)| DiscountNode::composite(children, combine).ok()
        ),
    ]
}

fn arb_basket() -> impl Strategy<Value = Basket<'static>> {
    prop::collection::btree_map(
        0_u8..5,
        (select(CATEGORIES.to_vec()), 1_u32..10, 1_i64..10_000),
        0..5,
    )
    .prop_filter_map("valid basket", |lines| {
        let lines: Vec<BasketLine<'static>> = lines
            .into_iter()
            .map(|(i, (category, quantity, minor))| {
                BasketLine::new(
                    product(i),
                    category,
                    StoreId::from("S1"),
                    quantity,
                    Money::from_minor(minor, USD),
                )
            })
            .collect();

        Basket::with_lines(lines, USD).ok()
    })
}

fn discount(node: &DiscountNode<'static>, basket: &Basket<'static>) -> Result<i64, TestCaseError> {
    compute_discount(node, basket)
        .map(|amount| amount.to_minor_units())
        .map_err(|error| TestCaseError::fail(error.to_string()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Anything the constructors build passes validation.
    #[test]
    fn constructed_nodes_validate(node in arb_node()) {
        prop_assert!(validate(&node).is_ok());
    }

    /// A full percentage discount takes exactly the eligible total.
    #[test]
    fn full_percentage_takes_eligible_total(scope in arb_scope(), basket in arb_basket()) {
        let node = DiscountNode::percentage(Decimal::ONE_HUNDRED, scope.clone())
            .map_err(|error| TestCaseError::fail(error.to_string()))?;

        prop_assert_eq!(
            discount(&node, &basket)?,
            basket.eligible_total(&scope).to_minor_units()
        );
    }

    /// Non-composite discounts are never negative and never exceed the basket subtotal.
    #[test]
    fn discounts_stay_within_the_subtotal(node in arb_child(), basket in arb_basket()) {
        let amount = discount(&node, &basket)?;

        prop_assert!(amount >= 0);
        prop_assert!(amount <= basket.subtotal().to_minor_units());
    }

    /// Composite discounts are never negative.
    #[test]
    fn composite_discounts_are_non_negative(node in arb_node(), basket in arb_basket()) {
        prop_assert!(discount(&node, &basket)? >= 0);
    }

    /// Summing children is never worth less than taking the best child.
    #[test]
    fn sum_is_at_least_maximum(
        children in arb_children(),
        basket in arb_basket(),
    ) {
        let sum = DiscountNode::composite(children.clone(), Combination::Sum)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let max = DiscountNode::composite(children.clone(), Combination::Maximum)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;

        let best = children
            .iter()
            .map(|child| discount(child, &basket))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .max()
            .unwrap_or_default();

        prop_assert!(discount(&sum, &basket)? >= discount(&max, &basket)?);
        prop_assert_eq!(discount(&max, &basket)?, best);
    }

    /// Descriptions are stable and unaffected by evaluation.
    #[test]
    fn description_is_idempotent(node in arb_node(), basket in arb_basket()) {
        let before = node.describe();

        discount(&node, &basket)?;

        prop_assert_eq!(&before, &node.describe());
        prop_assert_eq!(before, node.clone().describe());
    }

    /// Quotes always balance: total plus discount is the subtotal.
    #[test]
    fn quotes_balance(nodes in prop::collection::vec(arb_node(), 0..4), basket in arb_basket()) {
        let quote = quote(&nodes, &basket)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;

        prop_assert_eq!(
            quote.total.to_minor_units() + quote.discount.to_minor_units(),
            quote.subtotal.to_minor_units()
        );
        prop_assert!(quote.total.to_minor_units() >= 0);
        prop_assert_eq!(quote.applied.len(), nodes.len());
    }
}
