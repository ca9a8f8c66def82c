use chrono::NaiveDate;
use proforma_engine::core::item::{
    CalculationPass, Category, ComputableItem, ItemId, ItemValue, RecoveryState, Reference,
    Subcategory,
};
use proforma_engine::core::property::Property;
use proforma_engine::core::series::CashFlowSeries;
use proforma_engine::core::settings::AnalysisSettings;
use proforma_engine::core::timeline::Timeline;
use proforma_engine::engine::aggregator::AggregateKey;
use proforma_engine::engine::context::ContextView;
use proforma_engine::engine::error::EngineError;
use proforma_engine::items::expense::{ExpenseBasis, ExpenseItem};
use proforma_engine::items::lease::LeaseItem;
use proforma_engine::items::loss::{CollectionLossItem, GeneralVacancyLossItem};
use proforma_engine::scenario::{recoverable_expense_pool, AssetType, Scenario};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

fn r2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

fn scenario(property: Property, months: usize) -> Scenario {
    Scenario::new(
        "test",
        AssetType::Office,
        Timeline::new(d(2026, 1), months),
        AnalysisSettings::default(),
        property,
    )
}

/// Single 5,000 sq ft office lease at $30/sf/yr, gross, three months,
/// no expenses and no losses.
#[test]
fn single_gross_lease() {
    let mut s = scenario(Property::new("Single", dec!(5_000)), 3);
    s.add_item(LeaseItem::new("Suite 100", dec!(5_000), dec!(30), d(2026, 1), 60));

    let output = s.execute().unwrap();
    for period in [d(2026, 1), d(2026, 2), d(2026, 3)] {
        assert_eq!(
            output.summary.value_at(AggregateKey::PotentialGrossRevenue, period),
            dec!(12_500)
        );
        assert_eq!(
            output.summary.value_at(AggregateKey::NetOperatingIncome, period),
            dec!(12_500)
        );
    }
}

/// Same lease plus an $8/sf/yr operating expense, still gross (no
/// recovery): NOI drops by the expense.
#[test]
fn gross_lease_with_operating_expense() {
    let mut s = scenario(Property::new("Single", dec!(5_000)), 3);
    s.add_item(LeaseItem::new("Suite 100", dec!(5_000), dec!(30), d(2026, 1), 60));
    s.add_item(ExpenseItem::new(
        "Operating Expenses",
        ExpenseBasis::AnnualPerSquareFoot(dec!(8)),
    ));

    let output = s.execute().unwrap();
    assert_eq!(
        r2(output.summary.value_at(AggregateKey::TotalOperatingExpenses, d(2026, 1))),
        dec!(3_333.33)
    );
    assert_eq!(
        r2(output.summary.value_at(AggregateKey::NetOperatingIncome, d(2026, 1))),
        dec!(9_166.67)
    );
}

fn two_tenant_scenario(months: usize) -> Scenario {
    // 20,000 sq ft building: 10,000 @ $30 gross, 8,000 @ $28 net with
    // 100% recovery on a shared $8/sf/yr expense pool, 2,000 vacant.
    let mut s = scenario(Property::new("Two Tenant", dec!(20_000)), months);
    s.add_item(LeaseItem::new("Tenant A", dec!(10_000), dec!(30), d(2026, 1), 60));
    let tenant_b = s.add_item(LeaseItem::new("Tenant B", dec!(8_000), dec!(28), d(2026, 1), 60));
    s.add_item(ExpenseItem::new(
        "Operating Expenses",
        ExpenseBasis::AnnualPerSquareFoot(dec!(8)),
    ));
    let pool = recoverable_expense_pool(s.timeline(), dec!(20_000), dec!(8), Decimal::ZERO);
    s.set_recovery_state(
        tenant_b,
        RecoveryState {
            pro_rata_share: dec!(8_000) / dec!(20_000),
            recovery_pct: Decimal::ONE,
            expense_pool: pool,
        },
    );
    s
}

/// Two tenants with a net recovery: reimbursements offset part of the
/// shared expense pool.
#[test]
fn two_tenants_with_net_recovery() {
    let output = two_tenant_scenario(3).execute().unwrap();
    let jan = d(2026, 1);

    assert_eq!(
        r2(output.summary.value_at(AggregateKey::PotentialGrossRevenue, jan)),
        dec!(43_666.67)
    );
    assert_eq!(
        r2(output.summary.value_at(AggregateKey::TotalOperatingExpenses, jan)),
        dec!(13_333.33)
    );
    assert_eq!(
        r2(output.summary.value_at(AggregateKey::ExpenseReimbursements, jan)),
        dec!(5_333.33)
    );
    assert_eq!(
        r2(output.summary.value_at(AggregateKey::NetOperatingIncome, jan)),
        dec!(35_666.67)
    );
}

/// Sequential losses: 3% general vacancy on PGR, then 1% collection loss
/// on the remainder.
#[test]
fn sequential_vacancy_and_collection_losses() {
    let mut s = two_tenant_scenario(3);
    s.add_item(GeneralVacancyLossItem::new("General Vacancy", dec!(0.03)));
    s.add_item(CollectionLossItem::new("Collection Loss", dec!(0.01)));

    let output = s.execute().unwrap();
    let jan = d(2026, 1);

    assert_eq!(
        r2(output.summary.value_at(AggregateKey::GeneralVacancyLoss, jan)),
        dec!(1_310.00)
    );
    assert_eq!(
        r2(output.summary.value_at(AggregateKey::CollectionLoss, jan)),
        dec!(423.57)
    );
    assert_eq!(
        r2(output.summary.value_at(AggregateKey::NetOperatingIncome, jan)),
        dec!(33_933.10)
    );
}

/// An admin fee expensed as 5% of Total Operating Expenses resolves
/// through an aggregate snapshot — summing *other* items is not a cycle.
#[test]
fn admin_fee_on_aggregate_is_not_a_cycle() {
    let mut s = scenario(Property::new("Single", dec!(10_000)), 3);
    s.add_item(LeaseItem::new("Suite 100", dec!(10_000), dec!(30), d(2026, 1), 60));
    s.add_item(ExpenseItem::new(
        "Base Operating Expenses",
        ExpenseBasis::AnnualPerSquareFoot(dec!(8)),
    ));
    s.add_item(ExpenseItem::new(
        "Admin Fee",
        ExpenseBasis::PercentOfAggregate {
            aggregate: AggregateKey::TotalOperatingExpenses,
            pct: dec!(0.05),
        },
    ));

    let output = s.execute().unwrap();
    let jan = d(2026, 1);
    assert_eq!(
        r2(output.summary.value_at(AggregateKey::TotalOperatingExpenses, jan)),
        dec!(7_000.00)
    );
}

/// A same-pass fee chain assembled in the wrong order: the resolver must
/// execute the dependency first regardless of assembly order.
#[test]
fn fee_chain_resolves_out_of_assembly_order() {
    let mut s = scenario(Property::new("Single", dec!(10_000)), 3);
    let lease_id = s.add_item(LeaseItem::new("Tenant", dec!(10_000), dec!(30), d(2026, 1), 60));

    // Base fee: 2% of the lease's collections (cross-pass read, no edge).
    let base_fee = ExpenseItem::new(
        "Management Fee",
        ExpenseBasis::PercentOfItem {
            item: lease_id,
            pct: dec!(0.02),
        },
    );
    let base_fee_id = base_fee.id();
    // Override fee: 10% of the management fee (same-pass edge). Assembled
    // FIRST, so only the dependency graph can order it correctly.
    s.add_item(ExpenseItem::new(
        "Override Fee",
        ExpenseBasis::PercentOfItem {
            item: base_fee_id,
            pct: dec!(0.10),
        },
    ));
    s.add_item(base_fee);

    let output = s.execute().unwrap();
    let jan = d(2026, 1);
    // Lease $25,000/mo; management 2% = $500; override 10% of that = $50.
    assert_eq!(
        r2(output.summary.value_at(AggregateKey::TotalOperatingExpenses, jan)),
        dec!(550.00)
    );
}

/// A rolling lease driven through the projection capability: revenue
/// continues past the initial expiration at the renewal terms.
#[test]
fn rollover_lease_projects_past_expiration() {
    use proforma_engine::items::rollover::{
        ExpirationDisposition, RolloverLeaseItem, RolloverPolicy,
    };

    let mut s = scenario(Property::new("Single", dec!(1_000)), 12);
    s.add_item(RolloverLeaseItem::new(
        // $1,000/month, expires after June 2026.
        LeaseItem::new("Suite 100", dec!(1_000), dec!(12), d(2026, 1), 6),
        RolloverPolicy {
            disposition: ExpirationDisposition::ReleaseAtMarket,
            renewal_probability: dec!(0.6),
            market_rent_psf: dec!(18),
            renewal_term_months: 12,
            downtime_months: 2,
        },
    ));

    let output = s.execute().unwrap();
    // Initial term.
    assert_eq!(
        output.summary.value_at(AggregateKey::PotentialGrossRevenue, d(2026, 6)),
        dec!(1_000)
    );
    // Weighted downtime, then full market rent.
    assert_eq!(
        r2(output.summary.value_at(AggregateKey::PotentialGrossRevenue, d(2026, 7))),
        dec!(900.00)
    );
    assert_eq!(
        output.summary.value_at(AggregateKey::PotentialGrossRevenue, d(2026, 9)),
        dec!(1_500)
    );
    // The downtime diagnostic is detail-only: present in the drill-down,
    // absent from every aggregate.
    assert!(output
        .detail
        .iter()
        .any(|r| r.component.as_deref() == Some("turnover_downtime_loss")
            && r.target.is_none()));
}

/// A deliberately self-referential lease-like item: the resolver must fail
/// naming it, and the run must produce no summary.
struct CyclicLease {
    id: ItemId,
}

impl ComputableItem for CyclicLease {
    fn id(&self) -> ItemId {
        self.id
    }
    fn name(&self) -> &str {
        "Cyclic Lease"
    }
    fn category(&self) -> Category {
        Category::Revenue
    }
    fn subcategory(&self) -> Subcategory {
        Subcategory::Lease
    }
    fn reference(&self) -> Reference {
        Reference::Item(self.id)
    }
    fn calculation_pass(&self) -> CalculationPass {
        CalculationPass::DependentValues
    }
    fn evaluate(&self, ctx: &ContextView<'_>) -> Result<ItemValue, EngineError> {
        Ok(ItemValue::Series(CashFlowSeries::zero(ctx.timeline())))
    }
}

#[test]
fn self_referential_lease_fails_with_its_name() {
    let mut s = scenario(Property::new("Broken", dec!(5_000)), 3);
    s.add_item(CyclicLease { id: ItemId::new() });

    let err = s.execute().unwrap_err();
    match err {
        EngineError::DependencyCycle { items } => {
            assert_eq!(items, vec!["Cyclic Lease".to_string()]);
        }
        other => panic!("expected dependency cycle, got {other}"),
    }
}

/// The detail record reconciles with the summary: summing routed detail
/// series per line reproduces every routed aggregate exactly.
#[test]
fn detail_reconciles_with_summary() {
    let mut s = two_tenant_scenario(3);
    s.add_item(GeneralVacancyLossItem::new("General Vacancy", dec!(0.03)));
    let output = s.execute().unwrap();
    let timeline = output.summary.timeline().clone();

    for key in [
        AggregateKey::PotentialGrossRevenue,
        AggregateKey::ExpenseReimbursements,
        AggregateKey::TotalOperatingExpenses,
        AggregateKey::GeneralVacancyLoss,
    ] {
        let mut rebuilt = CashFlowSeries::zero(&timeline);
        for record in output.detail.iter().filter(|r| r.target == Some(key)) {
            rebuilt.add_assign_series(&record.series.reindexed(&timeline));
        }
        for period in timeline.periods() {
            assert_eq!(
                rebuilt.value_at(*period),
                output.summary.value_at(key, *period),
                "line {key} diverges at {period}"
            );
        }
    }
}

/// The NOI identity holds: NOI = EGI - Total Operating Expenses, and EGI
/// reflects revenue net of losses and abatement plus reimbursements.
#[test]
fn noi_identity() {
    let mut s = two_tenant_scenario(6);
    s.add_item(GeneralVacancyLossItem::new("General Vacancy", dec!(0.03)));
    s.add_item(CollectionLossItem::new("Collection Loss", dec!(0.01)));
    let output = s.execute().unwrap();

    for period in output.summary.timeline().periods() {
        let egi = output.summary.value_at(AggregateKey::PotentialGrossRevenue, *period)
            - output.summary.value_at(AggregateKey::GeneralVacancyLoss, *period)
            - output.summary.value_at(AggregateKey::CollectionLoss, *period)
            - output.summary.value_at(AggregateKey::RentalAbatement, *period)
            + output.summary.value_at(AggregateKey::MiscellaneousIncome, *period)
            + output.summary.value_at(AggregateKey::ExpenseReimbursements, *period);
        assert_eq!(
            output.summary.value_at(AggregateKey::TotalEffectiveGrossIncome, *period),
            egi
        );
        assert_eq!(
            output.summary.value_at(AggregateKey::NetOperatingIncome, *period),
            egi - output.summary.value_at(AggregateKey::TotalOperatingExpenses, *period)
        );
    }
}

/// Analysis output survives a JSON round trip with stable line names.
#[test]
fn output_serializes_with_stable_names() {
    let output = two_tenant_scenario(3).execute().unwrap();
    let json = serde_json::to_string_pretty(&output).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert!(parsed["summary"]["lines"]["net_operating_income"].is_object());
    assert!(parsed["detail"].as_array().map(|a| !a.is_empty()).unwrap_or(false));
}

/// A property with zero net rentable area still analyzes: the occupancy
/// series is identically zero and nothing divides by zero.
#[test]
fn zero_net_rentable_area_is_not_an_error() {
    let mut s = scenario(Property::new("Land", Decimal::ZERO), 3);
    s.add_item(LeaseItem::new("Ground Lease", dec!(5_000), dec!(30), d(2026, 1), 60));
    let output = s.execute().unwrap();
    assert_eq!(
        output.summary.value_at(AggregateKey::PotentialGrossRevenue, d(2026, 1)),
        dec!(12_500)
    );
}

/// An empty model set is a valid no-op: all-zero summary, empty detail.
#[test]
fn empty_model_set_yields_zero_summary() {
    let s = scenario(Property::new("Empty", dec!(10_000)), 3);
    let output = s.execute().unwrap();
    assert!(output.detail.is_empty());
    for key in AggregateKey::ALL {
        assert_eq!(output.summary.total(key), Decimal::ZERO);
    }
}
