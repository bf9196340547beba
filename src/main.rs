//! Transaction engine simulator.
//!
//! Runs one deposit or withdrawal flow end to end against the in-memory
//! custodial backend and prints the outcome as JSON.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI args + config file
//!        │
//!        ▼
//!   ┌──────────────┐     ┌─────────────────┐     ┌──────────────────────┐
//!   │EngineRegistry│────▶│TransactionProc. │────▶│ CustodialWalletMgr   │
//!   │  bind()      │     │ stage machine   │     │ (in-memory)          │
//!   └──────────────┘     └───────┬─────────┘     └──────────┬───────────┘
//!                                │ post_execute             │
//!                                ▼                          │
//!                         ┌──────────────┐   charge polls   │
//!                         │    Poller    │◀─────────────────┘
//!                         │ cancel token │
//!                         └──────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use tx_engine::accounts::{Account, FiatAccount, LinkedBankAccount};
use tx_engine::banking::{BankPartner, ConfiguredCallbackProvider, LinkedBank};
use tx_engine::config::loader::load_config;
use tx_engine::custodial::{InMemoryCustodialManager, TransferLimits};
use tx_engine::engine::{AssetAction, EngineContext, FlowOutcome, ValidationState};
use tx_engine::money::{Currency, Money};
use tx_engine::observability::logging::init_logging;
use tx_engine::{CancelToken, EngineConfig, EngineRegistry, TransactionProcessor};

#[derive(Parser)]
#[command(name = "tx-engine")]
#[command(about = "Simulate a wallet transaction flow against an in-memory custodian", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct FlowArgs {
    /// Fiat currency code of the bank and custodial account
    #[arg(long, default_value = "GBP")]
    currency: String,

    /// Amount to move, in major units
    #[arg(long)]
    amount: String,

    /// Minimum transfer limit
    #[arg(long, default_value = "10")]
    min: String,

    /// Maximum transfer limit; unbounded when omitted
    #[arg(long)]
    max: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Deposit from a linked bank into the custodial fiat account
    Deposit {
        #[command(flatten)]
        flow: FlowArgs,

        /// Charge polls before the bank exposes an authorisation URL
        #[arg(long, default_value_t = 1)]
        authorise_after: u32,
    },
    /// Withdraw from the custodial fiat account to the linked bank
    Withdraw {
        #[command(flatten)]
        flow: FlowArgs,

        /// Custodial balance available to withdraw
        #[arg(long, default_value = "1000")]
        balance: String,

        /// Flat withdrawal fee
        #[arg(long, default_value = "0")]
        fee: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    init_logging(&config.observability);

    tracing::info!(
        max_attempts = config.poll.max_attempts,
        interval_ms = config.poll.interval_ms,
        submission_secs = config.timeouts.submission_secs,
        "Configuration loaded"
    );

    let (flow, action, manager, balance) = match cli.command {
        Commands::Deposit { flow, authorise_after } => {
            let manager = InMemoryCustodialManager::new().authorise_after(authorise_after);
            (flow, AssetAction::FiatDeposit, manager, None)
        }
        Commands::Withdraw { flow, balance, fee } => {
            let currency = Currency::new(&flow.currency)?;
            let manager = InMemoryCustodialManager::new().with_withdrawal_fee(Money::parse(&fee, &currency)?);
            (flow, AssetAction::Withdraw, manager, Some(Money::parse(&balance, &currency)?))
        }
    };

    let currency = Currency::new(&flow.currency)?;
    let limits = TransferLimits {
        min: Money::parse(&flow.min, &currency)?,
        max: flow.max.as_deref().map(|m| Money::parse(m, &currency)).transpose()?,
    };
    let manager = manager.with_limits(&currency, limits).with_linked_bank(LinkedBank {
        id: "sim-bank".into(),
        name: "Simulated Bank".into(),
        account_number: "****0001".into(),
        account_type: "Checking".into(),
        currency: currency.clone(),
        partner: BankPartner::Yapily,
    });

    let bank = Account::LinkedBank(LinkedBankAccount {
        id: "sim-bank".into(),
        label: "Simulated Bank".into(),
        account_number: "****0001".into(),
        account_type: "Checking".into(),
        currency: currency.clone(),
    });
    let fiat = Account::Fiat(FiatAccount {
        label: format!("{} Account", currency),
        currency: currency.clone(),
        balance: balance.unwrap_or_else(|| Money::zero(&currency)),
    });
    let (source, target) = match action {
        AssetAction::Withdraw => (fiat, bank),
        _ => (bank, fiat),
    };

    let ctx = EngineContext::from_config(
        &config,
        Arc::new(manager),
        Arc::new(ConfiguredCallbackProvider::new(&config.banking)?),
        currency.clone(),
    );
    let registry = EngineRegistry::with_defaults(ctx);
    let engine = registry.bind(source, target, action)?;

    let mut processor = TransactionProcessor::start(engine).await?;
    processor.update_amount(Money::parse(&flow.amount, &currency)?).await?;
    let state = processor.validate().await?;
    if state != ValidationState::CanExecute {
        let report = json!({
            "stage": processor.stage(),
            "validation_state": state,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    processor.build_confirmations().await?;

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let outcome = processor.execute("", &cancel).await;
    let report = match outcome {
        Ok(FlowOutcome::Succeeded(result)) => json!({
            "stage": processor.stage(),
            "confirmations": processor.pending().confirmations,
            "result": result,
        }),
        Ok(FlowOutcome::AwaitingApproval { result, approval }) => json!({
            "stage": processor.stage(),
            "confirmations": processor.pending().confirmations,
            "result": result,
            "approval": approval,
        }),
        Err(e) => json!({
            "stage": processor.stage(),
            "error": e.to_string(),
        }),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
