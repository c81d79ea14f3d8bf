use std::io;

use clap::Args;
use storefront_policy::policies::catalog::{
    PolicyTypeInfo, combination_types, condition_types, discount_types, purchase_rule_types,
    target_types,
};

use super::{table, write_out};

#[derive(Debug, Args)]
pub(crate) struct TypesArgs {
    /// Print the catalogs as JSON
    #[arg(long)]
    json: bool,
}

const CATALOGS: [(&str, fn() -> &'static [PolicyTypeInfo]); 5] = [
    ("discounts", discount_types),
    ("targets", target_types),
    ("combinations", combination_types),
    ("conditions", condition_types),
    ("purchase_rules", purchase_rule_types),
];

pub(crate) fn run(args: &TypesArgs, out: &mut impl io::Write) -> Result<(), String> {
    if args.json {
        let catalogs: serde_json::Map<String, serde_json::Value> = CATALOGS
            .iter()
            .map(|(name, types)| {
                serde_json::to_value(types()).map(|value| ((*name).to_string(), value))
            })
            .collect::<Result<_, _>>()
            .map_err(|error| format!("failed to serialize catalogs: {error}"))?;

        let json = serde_json::to_string_pretty(&catalogs)
            .map_err(|error| format!("failed to serialize catalogs: {error}"))?;

        return write_out(out, &json);
    }

    for (name, types) in CATALOGS {
        let rows = types().iter().map(|info| {
            [
                info.value.to_string(),
                info.label.to_string(),
                info.description.to_string(),
            ]
        });

        write_out(out, name)?;
        write_out(out, &table(&["Value", "Label", "Description"], rows).to_string())?;
    }

    Ok(())
}
