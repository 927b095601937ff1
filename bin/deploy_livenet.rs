//! Deploy the peg engine to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000
//!
//! Collateral configuration (comma separated, same order in every list):
//!   PEG_COLLATERAL_TOKENS=hash-...,hash-...
//!   PEG_COLLATERAL_FEEDS=hash-...,hash-...
//!   PEG_COLLATERAL_DECIMALS=18,8
//!   PEG_FEED_TIMEOUT_SECONDS=3600
//!
//! Optional:
//!   PEG_DEPLOYMENT_REPORT=deployment.json

use std::str::FromStr;

use odra::host::Deployer;
use odra::prelude::*;
use serde::Serialize;

use peg_engine_contracts::engine::{IssuanceEngine, IssuanceEngineInitArgs};
use peg_engine_contracts::stablecoin::{PegUsd, PegUsdInitArgs};
use peg_engine_contracts::types::CollateralAsset;

const DEFAULT_FEED_TIMEOUT_SECONDS: u64 = 3600;
const DEFAULT_REPORT_PATH: &str = "deployment.json";

/// Deployment parameters read from the environment
struct DeployConfig {
    payment_amount: u64,
    collateral: Vec<CollateralAsset>,
    feed_timeout_seconds: u64,
    report_path: String,
}

impl DeployConfig {
    fn from_env() -> Result<Self, String> {
        let payment_amount = std::env::var("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(200_000_000_000);

        let tokens: Vec<Address> = parse_list("PEG_COLLATERAL_TOKENS")?;
        let feeds: Vec<Address> = parse_list("PEG_COLLATERAL_FEEDS")?;
        let decimals: Vec<u8> = parse_list("PEG_COLLATERAL_DECIMALS")?;
        if tokens.len() != feeds.len() || tokens.len() != decimals.len() {
            return Err(format!(
                "collateral lists differ in length: {} tokens, {} feeds, {} decimals",
                tokens.len(),
                feeds.len(),
                decimals.len()
            ));
        }

        let collateral = tokens
            .into_iter()
            .zip(feeds)
            .zip(decimals)
            .map(|((token, price_feed), decimals)| CollateralAsset { token, price_feed, decimals })
            .collect();

        let feed_timeout_seconds = match std::env::var("PEG_FEED_TIMEOUT_SECONDS") {
            Ok(v) => v
                .parse()
                .map_err(|_| format!("PEG_FEED_TIMEOUT_SECONDS is not a number: {v}"))?,
            Err(_) => DEFAULT_FEED_TIMEOUT_SECONDS,
        };

        let report_path = std::env::var("PEG_DEPLOYMENT_REPORT")
            .unwrap_or_else(|_| DEFAULT_REPORT_PATH.to_string());

        Ok(Self { payment_amount, collateral, feed_timeout_seconds, report_path })
    }
}

/// Parse a comma separated environment variable; unset means empty
fn parse_list<T: FromStr>(name: &str) -> Result<Vec<T>, String> {
    let raw = match std::env::var(name) {
        Ok(raw) => raw,
        Err(_) => return Ok(Vec::new()),
    };
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse().map_err(|_| format!("{name}: cannot parse `{item}`")))
        .collect()
}

#[derive(Serialize)]
struct CollateralReport {
    token: String,
    price_feed: String,
    decimals: u8,
}

#[derive(Serialize)]
struct DeploymentReport {
    deployer: String,
    synthetic_token: String,
    engine: String,
    feed_timeout_seconds: u64,
    collateral: Vec<CollateralReport>,
}

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();

    println!("=== Peg Engine Livenet Deployment ===");
    println!();

    let config = match DeployConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            println!("Invalid configuration: {error}");
            std::process::exit(1);
        }
    };
    if config.collateral.is_empty() {
        println!("Warning: no collateral configured, register it later with register_collateral");
    }

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();
    env.set_gas(config.payment_amount);

    let deployer = env.caller();
    println!("Deployer: {:?}", deployer);
    println!();

    // ==================== Phase 1: Contracts ====================
    println!("=== Phase 1: Deploying Contracts ===");
    println!();

    println!("Deploying PegUsd (Synthetic Token)...");
    let mut pusd = PegUsd::deploy(&env, PegUsdInitArgs { admin: deployer });
    let pusd_addr = pusd.address().clone();
    println!("PegUsd deployed at: {:?}", pusd_addr);

    println!("Deploying IssuanceEngine...");
    let mut engine = IssuanceEngine::deploy(
        &env,
        IssuanceEngineInitArgs {
            admin: deployer,
            synthetic_token: pusd_addr,
            collateral: config.collateral.clone(),
        },
    );
    let engine_addr = engine.address().clone();
    println!("IssuanceEngine deployed at: {:?}", engine_addr);

    println!();

    // ==================== Phase 2: Wiring ====================
    println!("=== Phase 2: Cross-contract Configuration ===");
    println!();

    println!("Granting IssuanceEngine mint/burn authority on PegUsd...");
    pusd.add_minter(engine_addr);
    println!("Done.");

    for asset in &config.collateral {
        println!(
            "Setting feed timeout {}s for {:?}...",
            config.feed_timeout_seconds, asset.price_feed
        );
        engine.set_feed_timeout(asset.price_feed, config.feed_timeout_seconds);
        println!("Done.");
    }

    println!();
    println!("=== Deployment Complete ===");
    println!();
    println!("Contract Addresses:");
    println!("  PegUsd:          {:?}", pusd_addr);
    println!("  IssuanceEngine:  {:?}", engine_addr);

    let report = DeploymentReport {
        deployer: format!("{:?}", deployer),
        synthetic_token: format!("{:?}", pusd_addr),
        engine: format!("{:?}", engine_addr),
        feed_timeout_seconds: config.feed_timeout_seconds,
        collateral: config
            .collateral
            .iter()
            .map(|asset| CollateralReport {
                token: format!("{:?}", asset.token),
                price_feed: format!("{:?}", asset.price_feed),
                decimals: asset.decimals,
            })
            .collect(),
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => match std::fs::write(&config.report_path, json) {
            Ok(()) => println!("Report written to {}", config.report_path),
            Err(error) => println!("Could not write report: {error}"),
        },
        Err(error) => println!("Could not serialize report: {error}"),
    }
}
