use std::process::Command;

use anyhow::{Context, Result};
use clap::Parser;

use webharness::config::Workers;
use webharness::{report, Config, HarnessError, RunLogger};

/// Run the UI test suite with dated reporting
#[derive(Parser)]
#[command(name = "webharness")]
#[command(about = "Run browser UI tests with dated HTML/Allure reports", long_about = None)]
struct Cli {
    /// Test markers to run (substring filter, e.g. smoke, regression)
    #[arg(short, long)]
    markers: Option<String>,

    /// Run tests in parallel
    #[arg(short, long)]
    parallel: bool,

    /// Browser to use
    #[arg(short, long, default_value = "chrome")]
    browser: String,
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            eprintln!("Error running tests: {:#}", err);
            let code = err
                .downcast_ref::<HarnessError>()
                .map(HarnessError::exit_code)
                .unwrap_or(1);
            std::process::exit(code);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let run_started = std::time::Instant::now();
    let logger = RunLogger::init("logs")?;
    let config = Config::load("local")?;

    let report_path = report::dated_report_path("reports")?;
    let metadata = report::RunMetadata::for_report_path(&report_path, "local", cli.browser.clone());

    logger.configuration(&format!(
        "browser={} markers={} parallel={}",
        cli.browser,
        cli.markers.as_deref().unwrap_or("all"),
        cli.parallel
    ));

    println!("Starting test execution...");
    println!("Date: {}", metadata.date);
    println!("Time: {}", metadata.timestamp);
    println!("Report Path: {}", report_path.display());
    println!("Browser: {}", cli.browser);
    println!("Markers: {}", cli.markers.as_deref().unwrap_or("All tests"));
    println!("{}", "-".repeat(50));

    let mut cmd = Command::new("cargo");
    cmd.arg("test");

    // Marker expressions map onto cargo's test-name substring filter
    if let Some(markers) = &cli.markers {
        cmd.arg(markers);
    }

    cmd.arg("--");
    if cli.parallel {
        if let Workers::Count(workers) = config.parallel_workers() {
            cmd.arg(format!("--test-threads={}", workers));
        }
        // "auto" leaves the thread count to the test harness
    } else {
        cmd.arg("--test-threads=1");
    }

    cmd.env("TEST_ENV", &metadata.environment)
        .env("BROWSER", &cli.browser)
        .env("REPORT_PATH", &report_path);

    let status = cmd.status().context("Failed to spawn test process")?;
    let exit_code = status.code().unwrap_or(1);

    println!("{}", "-".repeat(50));
    println!("Test execution completed!");
    if config.html_reports_enabled() {
        let html_path = report::write_html_report(&report_path, &metadata, exit_code)?;
        println!("HTML Report: {}", html_path.display());
    }
    if config.allure_reports_enabled() {
        println!(
            "Allure Results: {}",
            report_path.join("allure-results").display()
        );
    }

    let summary_path = report::write_summary_file(&report_path, &metadata, exit_code)?;
    logger.performance("test run", run_started.elapsed());
    println!("Summary: {}", summary_path.display());

    Ok(exit_code)
}
