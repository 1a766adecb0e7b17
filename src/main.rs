//! Proof-of-work ledger CLI
//!
//! Every command builds its chains in memory, so each run starts from a
//! fresh genesis block.

use clap::{Parser, Subcommand, ValueEnum};
use pow_ledger::cli;
use pow_ledger::core::ChainConfig;
use pow_ledger::mining::MiningPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ledger")]
#[command(version)]
#[command(about = "A minimal proof-of-work ledger", long_about = None)]
struct Cli {
    /// JSON file with chain settings; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Mining difficulty (leading zero hex characters)
    #[arg(short, long, global = true)]
    difficulty: Option<usize>,

    /// Chain identifier length
    #[arg(long, global = true)]
    id_length: Option<usize>,

    /// How the miner reads the pool during a search
    #[arg(long, value_enum, global = true)]
    policy: Option<PolicyArg>,

    /// Custom chain identifier
    #[arg(long, global = true)]
    chain_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Live,
    Snapshot,
}

impl From<PolicyArg> for MiningPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Live => MiningPolicy::LiveRead,
            PolicyArg::Snapshot => MiningPolicy::Snapshot,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a chain and show its genesis block
    Init,

    /// Submit transactions and mine blocks
    Mine {
        /// Number of blocks to mine
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,

        /// Transaction as sender:recipient:message (repeatable)
        #[arg(short, long = "tx")]
        txs: Vec<String>,
    },

    /// Build two chains and resolve the fork between them
    Fork {
        /// Blocks to mine on the local chain
        #[arg(long, default_value = "1")]
        local: u32,

        /// Blocks to mine on the remote chain
        #[arg(long, default_value = "2")]
        remote: u32,
    },

    /// Print the canonical JSON export of a chain
    Export {
        /// Blocks to mine before exporting
        #[arg(short, long, default_value = "1")]
        blocks: u32,
    },

    /// Validate a peer record and print its address
    Peer {
        #[arg(long)]
        host: String,

        #[arg(short, long)]
        port: u16,

        /// Use https in the address
        #[arg(long)]
        tls: bool,
    },

    /// Mine while a second thread submits transactions
    Race {
        /// Transactions to submit during the search
        #[arg(short, long, default_value = "20")]
        submissions: u32,
    },

    /// Mine one block and list committed transactions
    Verify {
        /// Transaction as sender:recipient:message (repeatable)
        #[arg(short, long = "tx")]
        txs: Vec<String>,
    },
}

impl Cli {
    fn chain_config(&self) -> Result<ChainConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => ChainConfig::from_json_file(path)?,
            None => ChainConfig::default(),
        };

        if let Some(target) = self.difficulty {
            config.target = target;
        }
        if let Some(id_length) = self.id_length {
            config.id_length = id_length;
        }
        if let Some(policy) = self.policy {
            config.mining_policy = policy.into();
        }

        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.chain_config()?;
    let chain_id = cli.chain_id.as_deref();

    match &cli.command {
        Commands::Init => cli::cmd_init(config, chain_id)?,
        Commands::Mine { count, txs } => cli::cmd_mine(config, chain_id, *count, txs)?,
        Commands::Fork { local, remote } => cli::cmd_fork(config, *local, *remote)?,
        Commands::Export { blocks } => cli::cmd_export(config, chain_id, *blocks)?,
        Commands::Peer { host, port, tls } => cli::cmd_peer(host, *port, *tls)?,
        Commands::Race { submissions } => cli::cmd_race(config, *submissions)?,
        Commands::Verify { txs } => cli::cmd_verify(config, txs)?,
    }

    Ok(())
}
