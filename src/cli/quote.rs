use std::io;

use clap::Args;
use storefront_policy::{
    pricing::format_money,
    store::{InMemoryPolicyRepository, PolicyError, PolicyService},
};
use tabled::settings::{Alignment, object::Columns};

use super::{FixtureArgs, table, write_out};

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    #[command(flatten)]
    fixture: FixtureArgs,
}

pub(crate) async fn run(args: &QuoteArgs, out: &mut impl io::Write) -> Result<(), String> {
    let fixture = args.fixture.load()?;

    let policies = fixture
        .policies()
        .map_err(|error| format!("failed to build policies: {error}"))?;

    let snapshot = fixture
        .snapshot()
        .map_err(|error| format!("failed to build basket: {error}"))?;

    let repository = InMemoryPolicyRepository::new();
    repository.insert(policies).await;

    let service = PolicyService::new(repository, fixture.catalog());

    let quote = match service.checkout(fixture.store(), &snapshot).await {
        Ok(quote) => quote,
        Err(PolicyError::Rejected { violations }) => {
            write_out(out, "checkout rejected, the basket breaks:")?;

            for violation in &violations {
                write_out(out, &format!("  - {violation}"))?;
            }

            return Err(format!("{} purchase rule(s) not met", violations.len()));
        }
        Err(error) => return Err(format!("failed to price basket: {error}")),
    };

    let rows = quote
        .applied
        .iter()
        .map(|applied| [applied.description.clone(), format_money(&applied.amount)])
        .chain([
            ["Subtotal".to_string(), format_money(&quote.subtotal)],
            ["Discount".to_string(), format_money(&quote.discount)],
            ["Total".to_string(), format_money(&quote.total)],
        ]);

    let mut table = table(&["Policy", "Amount"], rows);
    table.modify(Columns::new(1..2), Alignment::right());

    write_out(out, &table.to_string())
}
