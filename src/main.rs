//! proforma-engine CLI
//!
//! Run property cash flow projections from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a property from a JSON file
//! proforma-engine analyze --input property.json
//!
//! # Output as JSON
//! proforma-engine analyze --input property.json --format json
//!
//! # Generate a random property for testing
//! proforma-engine generate --spaces 5
//!
//! # Batch stress run over a random portfolio
//! proforma-engine stress --properties 20 --spaces 5
//! ```

use chrono::NaiveDate;
use proforma_engine::core::property::Property;
use proforma_engine::core::settings::AnalysisSettings;
use proforma_engine::core::timeline::Timeline;
use proforma_engine::engine::aggregator::AggregateKey;
use proforma_engine::scenario::registry::ScenarioRegistry;
use proforma_engine::scenario::AssetType;
use proforma_engine::simulation::stress_test::{
    generate_random_portfolio, run_batch, PortfolioConfig,
};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"proforma-engine — time-phased cash flow projections for real-estate underwriting

USAGE:
    proforma-engine <COMMAND> [OPTIONS]

COMMANDS:
    analyze     Run a full analysis on a property input file
    generate    Generate a random property input file (for testing)
    stress      Run a batch analysis over a random portfolio
    help        Show this message

OPTIONS (analyze):
    --input <FILE>      Path to JSON property input
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --spaces <N>        Number of rent-roll spaces (default: 5)
    --months <N>        Analysis length in months (default: 60)
    --output <FILE>     Write to file instead of stdout

OPTIONS (stress):
    --properties <N>    Number of properties (default: 10)
    --spaces <N>        Spaces per property (default: 5)

EXAMPLES:
    proforma-engine analyze --input property.json
    proforma-engine analyze --input property.json --format json
    proforma-engine generate --spaces 8 --output property.json
    proforma-engine stress --properties 25 --spaces 6"#
    );
}

/// JSON schema for the analysis input file.
#[derive(serde::Deserialize)]
struct AnalysisInput {
    property: Property,
    #[serde(default)]
    settings: AnalysisSettings,
    timeline: TimelineInput,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct TimelineInput {
    start: NaiveDate,
    months: usize,
}

/// JSON output schema mirroring the input, used by `generate`.
#[derive(serde::Serialize)]
struct GeneratedInput<'a> {
    property: &'a Property,
    settings: &'a AnalysisSettings,
    timeline: TimelineInput,
}

fn load_input(path: &str) -> AnalysisInput {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "property": {{
    "name": "100 Main Street",
    "net_rentable_area": "20000",
    "spaces": [
      {{ "name": "Suite 100", "area": "10000", "annual_rent_psf": "30",
         "lease_start": "2026-01-01", "lease_term_months": 60 }}
    ]
  }},
  "settings": {{ "market_rent_growth_pct": "0.03", "expense_inflation_pct": "0.025",
                "operating_expense_psf": "8" }},
  "timeline": {{ "start": "2026-01-01", "months": 60 }}
}}"#
        );
        process::exit(1);
    })
}

fn cmd_analyze(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let input = load_input(&path);
    let timeline = Timeline::new(input.timeline.start, input.timeline.months);
    let registry = ScenarioRegistry::with_defaults();
    let builder = registry
        .get(AssetType::Office)
        .expect("office builder is registered by default");
    let scenario = builder.build(input.property, timeline, input.settings);

    let output = scenario.execute().unwrap_or_else(|e| {
        eprintln!("Analysis failed: {}", e);
        process::exit(1);
    });

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("{}", output.summary);
        println!(
            "First-month NOI: {}",
            output
                .summary
                .value_at(AggregateKey::NetOperatingIncome, output.summary.timeline().start())
                .round_dp(2)
        );
    }
}

fn cmd_generate(args: &[String]) {
    let mut spaces = 5usize;
    let mut months = 60usize;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--spaces" => {
                i += 1;
                spaces = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--spaces requires a number");
                    process::exit(1);
                });
            }
            "--months" => {
                i += 1;
                months = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--months requires a number");
                    process::exit(1);
                });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let timeline = Timeline::new(
        NaiveDate::from_ymd_opt(2026, 1, 1).expect("fixed generation start date"),
        months,
    );
    let config = PortfolioConfig {
        property_count: 1,
        spaces_per_property: spaces,
        ..Default::default()
    };
    let portfolio = generate_random_portfolio(&config, &timeline);
    let settings = AnalysisSettings::default()
        .with_operating_expense_psf(rust_decimal::Decimal::from(8))
        .with_general_vacancy(rust_decimal::Decimal::new(3, 2))
        .with_collection_loss(rust_decimal::Decimal::new(1, 2));

    let generated = GeneratedInput {
        property: &portfolio[0],
        settings: &settings,
        timeline: TimelineInput {
            start: timeline.start(),
            months,
        },
    };
    let json = serde_json::to_string_pretty(&generated).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated property with {} spaces over {} months → {}",
            spaces, months, path
        );
    } else {
        println!("{}", json);
    }
}

fn cmd_stress(args: &[String]) {
    let mut properties = 10usize;
    let mut spaces = 5usize;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--properties" => {
                i += 1;
                properties = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--properties requires a number");
                    process::exit(1);
                });
            }
            "--spaces" => {
                i += 1;
                spaces = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--spaces requires a number");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let timeline = Timeline::new(
        NaiveDate::from_ymd_opt(2026, 1, 1).expect("fixed stress start date"),
        60,
    );
    let config = PortfolioConfig {
        property_count: properties,
        spaces_per_property: spaces,
        ..Default::default()
    };
    let portfolio = generate_random_portfolio(&config, &timeline);
    let registry = ScenarioRegistry::with_defaults();
    let settings = AnalysisSettings::default()
        .with_operating_expense_psf(rust_decimal::Decimal::from(8));

    let results = run_batch(&portfolio, &timeline, &settings, &registry).unwrap_or_else(|e| {
        eprintln!("Batch run failed: {}", e);
        process::exit(1);
    });

    println!("{:<12} {:>18} {:>18} {:>18}", "PROPERTY", "PGR", "NOI", "UCF");
    for result in &results {
        println!(
            "{:<12} {:>18} {:>18} {:>18}",
            result.property_name,
            result.potential_gross_revenue.round_dp(0),
            result.net_operating_income.round_dp(0),
            result.unlevered_cash_flow.round_dp(0)
        );
    }
    println!("\nAnalyzed {} properties.", results.len());
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "analyze" => cmd_analyze(rest),
        "generate" => cmd_generate(rest),
        "stress" => cmd_stress(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
