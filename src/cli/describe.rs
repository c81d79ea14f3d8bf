use std::io;

use clap::Args;
use storefront_policy::{
    policies::Describe,
    requests::{AddDiscountRequest, AddPurchaseRuleRequest},
};

use super::{FixtureArgs, table, write_out};

#[derive(Debug, Args)]
pub(crate) struct DescribeArgs {
    #[command(flatten)]
    fixture: FixtureArgs,

    /// Print the policies as request JSON instead of tables
    #[arg(long)]
    json: bool,
}

pub(crate) fn run(args: &DescribeArgs, out: &mut impl io::Write) -> Result<(), String> {
    let fixture = args.fixture.load()?;

    let policies = fixture
        .policies()
        .map_err(|error| format!("failed to build policies: {error}"))?;

    if args.json {
        let json = serde_json::json!({
            "store": policies.store(),
            "discounts": policies
                .discounts()
                .iter()
                .map(AddDiscountRequest::from)
                .collect::<Vec<_>>(),
            "purchaseRules": policies
                .purchase_rules()
                .iter()
                .map(AddPurchaseRuleRequest::from)
                .collect::<Vec<_>>(),
        });

        let json = serde_json::to_string_pretty(&json)
            .map_err(|error| format!("failed to serialize policies: {error}"))?;

        return write_out(out, &json);
    }

    let discounts = policies.discounts().iter().enumerate().map(|(i, node)| {
        [
            format!("#{}", i + 1),
            node.type_as_str().to_string(),
            node.describe(),
        ]
    });

    let rules = policies.purchase_rules().iter().enumerate().map(|(i, rule)| {
        [
            format!("#{}", i + 1),
            rule.kind().as_str().to_string(),
            rule.describe(),
        ]
    });

    write_out(
        out,
        &format!("store {} ({})", policies.store(), policies.currency().iso_alpha_code),
    )?;
    write_out(out, &table(&["", "Discount", "Description"], discounts).to_string())?;
    write_out(out, &table(&["", "Purchase Rule", "Description"], rules).to_string())
}
