//! Cross-referencing an aggregate line from an item.
//!
//! An admin fee computed as 5% of Total Operating Expenses depends on an
//! aggregate produced by summing *other* items — the engine resolves it
//! through an aggregate snapshot instead of flagging a cycle. A true cycle
//! (two fees referencing each other) fails loudly with the offending
//! names.

use chrono::NaiveDate;
use proforma_engine::core::item::ItemId;
use proforma_engine::core::property::Property;
use proforma_engine::core::settings::AnalysisSettings;
use proforma_engine::core::timeline::Timeline;
use proforma_engine::engine::aggregator::AggregateKey;
use proforma_engine::items::expense::{ExpenseBasis, ExpenseItem};
use proforma_engine::items::lease::LeaseItem;
use proforma_engine::scenario::{AssetType, Scenario};
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  proforma-engine: Aggregate Cross-Reference  ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

    // --- Scenario 1: admin fee over the expense aggregate ---
    println!("━━━ Admin fee at 5% of Total Operating Expenses ━━━\n");

    let mut scenario = Scenario::new(
        "Admin fee",
        AssetType::Office,
        Timeline::new(start, 12),
        AnalysisSettings::default(),
        Property::new("Single Tenant", dec!(10_000)),
    );
    scenario.add_item(LeaseItem::new("Tenant", dec!(10_000), dec!(30), start, 60));
    scenario.add_item(ExpenseItem::new(
        "Base Operating Expenses",
        ExpenseBasis::AnnualPerSquareFoot(dec!(8)),
    ));
    scenario.add_item(ExpenseItem::new(
        "Admin Fee",
        ExpenseBasis::PercentOfAggregate {
            aggregate: AggregateKey::TotalOperatingExpenses,
            pct: dec!(0.05),
        },
    ));

    let output = scenario.execute().expect("aggregate references never cycle");
    println!(
        "Total operating expenses (month 1): {}",
        output
            .summary
            .value_at(AggregateKey::TotalOperatingExpenses, start)
            .round_dp(2)
    );
    println!("  = base $6,666.67 + admin fee $333.33\n");

    // --- Scenario 2: a genuine same-pass cycle fails loudly ---
    println!("━━━ Two fees referencing each other ━━━\n");

    let mut cyclic = Scenario::new(
        "Cyclic",
        AssetType::Office,
        Timeline::new(start, 12),
        AnalysisSettings::default(),
        Property::new("Single Tenant", dec!(10_000)),
    );
    let x_id = ItemId::new();
    let y_id = ItemId::new();
    cyclic.add_item(ExpenseItem::with_id(
        x_id,
        "Mutual Fee X",
        ExpenseBasis::PercentOfItem {
            item: y_id,
            pct: dec!(0.10),
        },
    ));
    cyclic.add_item(ExpenseItem::with_id(
        y_id,
        "Mutual Fee Y",
        ExpenseBasis::PercentOfItem {
            item: x_id,
            pct: dec!(0.10),
        },
    ));

    match cyclic.execute() {
        Err(err) => println!("Failed as designed: {err}"),
        Ok(_) => println!("unexpected success"),
    }
}
