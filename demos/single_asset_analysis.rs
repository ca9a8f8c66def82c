//! Full analysis of a small multi-tenant office asset.
//!
//! Demonstrates the whole pipeline: leases with a net recovery, an
//! operating expense pool, sequential vacancy and collection losses, and
//! the canonical summary lines.

use chrono::NaiveDate;
use proforma_engine::core::item::RecoveryState;
use proforma_engine::core::property::Property;
use proforma_engine::core::settings::AnalysisSettings;
use proforma_engine::core::timeline::Timeline;
use proforma_engine::engine::aggregator::AggregateKey;
use proforma_engine::items::expense::{ExpenseBasis, ExpenseItem};
use proforma_engine::items::lease::LeaseItem;
use proforma_engine::items::loss::{CollectionLossItem, GeneralVacancyLossItem};
use proforma_engine::scenario::{recoverable_expense_pool, AssetType, Scenario};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  proforma-engine: Single Asset Analysis      ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let timeline = Timeline::new(start, 12);

    // 20,000 sq ft building, two tenants, 2,000 sq ft vacant.
    let property = Property::new("100 Main Street", dec!(20_000));

    let mut scenario = Scenario::new(
        "100 Main Street — underwriting",
        AssetType::Office,
        timeline.clone(),
        AnalysisSettings::default(),
        property,
    );

    scenario.add_item(LeaseItem::new("Tenant A", dec!(10_000), dec!(30), start, 60));
    let tenant_b =
        scenario.add_item(LeaseItem::new("Tenant B", dec!(8_000), dec!(28), start, 60));
    scenario.add_item(ExpenseItem::new(
        "Operating Expenses",
        ExpenseBasis::AnnualPerSquareFoot(dec!(8)),
    ));
    scenario.add_item(GeneralVacancyLossItem::new("General Vacancy", dec!(0.03)));
    scenario.add_item(CollectionLossItem::new("Collection Loss", dec!(0.01)));

    // Tenant B is on a net lease: 100% recovery of its pro-rata share of
    // the $8/sf operating pool.
    let pool = recoverable_expense_pool(&timeline, dec!(20_000), dec!(8), Decimal::ZERO);
    scenario.set_recovery_state(
        tenant_b,
        RecoveryState {
            pro_rata_share: dec!(8_000) / dec!(20_000),
            recovery_pct: Decimal::ONE,
            expense_pool: pool,
        },
    );

    let output = scenario.execute().expect("analysis runs");

    println!("{}", output.summary);

    println!("━━━ First Month ━━━\n");
    for key in [
        AggregateKey::PotentialGrossRevenue,
        AggregateKey::GeneralVacancyLoss,
        AggregateKey::CollectionLoss,
        AggregateKey::ExpenseReimbursements,
        AggregateKey::TotalOperatingExpenses,
        AggregateKey::NetOperatingIncome,
    ] {
        println!(
            "  {:<28} {:>14}",
            key.as_str(),
            output.summary.value_at(key, start).round_dp(2)
        );
    }

    println!("\n━━━ Drill-down ({} records) ━━━\n", output.detail.len());
    for record in &output.detail {
        println!(
            "  {:<12} {:<16} -> {:<28} total {:>14}",
            record.item.name,
            record.component.as_deref().unwrap_or("(series)"),
            record
                .target
                .map(|k| k.as_str())
                .unwrap_or("(detail only)"),
            record.series.total().round_dp(2)
        );
    }
}
