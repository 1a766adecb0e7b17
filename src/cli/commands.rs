//! CLI commands for the ledger
//!
//! Chains live only for the duration of one command; nothing is written to
//! disk.

use crate::core::{Block, Blockchain, ChainConfig, Transaction};
use crate::crypto::Canonical;
use crate::network::Peer;
use crate::node::SharedLedger;
use log::warn;
use std::thread;
use std::time::Duration;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Parse a `sender:recipient:message` transaction spec
pub fn parse_tx_spec(spec: &str) -> CliResult<Transaction> {
    let mut parts = spec.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(sender), Some(recipient), Some(message)) => {
            Ok(Transaction::new_now(recipient, sender, message)?)
        }
        _ => Err(format!("expected sender:recipient:message, got {:?}", spec).into()),
    }
}

fn short(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}

fn print_block(height: usize, block: &Block) -> CliResult<()> {
    println!("   #{} | {} | nonce {}", height, short(&block.hash()?), block.nonce());
    for tx in block.transactions() {
        println!(
            "   │  └─ {} -> {}: {}",
            tx.sender(),
            tx.recipient(),
            tx.message()
        );
    }
    Ok(())
}

fn build_chain(config: ChainConfig, chain_id: Option<&str>) -> CliResult<Blockchain> {
    let chain = match chain_id {
        Some(id) => Blockchain::with_identifier(config, id)?,
        None => Blockchain::new(config)?,
    };
    Ok(chain)
}

fn mine_blocks(chain: &mut Blockchain, count: u32) -> CliResult<()> {
    for _ in 0..count {
        chain.mine_new_block_and_apply()?;
    }
    Ok(())
}

/// Create a chain and show its genesis block
pub fn cmd_init(config: ChainConfig, chain_id: Option<&str>) -> CliResult<()> {
    let chain = build_chain(config, chain_id)?;

    println!("✅ Chain created!");
    println!("   🆔 Chain ID: {}", chain.chain_id());
    println!("   🔧 Target: {} leading zeros", config.target);
    println!("   ⛏️  Mining policy: {:?}", config.mining_policy);
    if let Some(genesis) = chain.last_block() {
        println!("   🧱 Genesis hash: {}", genesis.hash()?);
        println!("   🔢 Genesis nonce: {}", genesis.nonce());
    }

    Ok(())
}

/// Submit transactions and mine blocks
pub fn cmd_mine(
    config: ChainConfig,
    chain_id: Option<&str>,
    count: u32,
    tx_specs: &[String],
) -> CliResult<()> {
    let mut chain = build_chain(config, chain_id)?;

    for spec in tx_specs {
        chain.add_transaction(parse_tx_spec(spec)?)?;
    }

    println!(
        "⛏️  Mining {} block(s) on chain {} ({} pending)",
        count,
        chain.chain_id(),
        chain.transaction_pool().len()
    );

    for _ in 0..count {
        let height = chain.blocks().len();
        let block = chain.mine_new_block_and_apply()?;
        print_block(height, block)?;
    }

    cmd_chain_info(&chain)
}

/// Build two competing chains and resolve between them
pub fn cmd_fork(config: ChainConfig, local: u32, remote: u32) -> CliResult<()> {
    let mut local_chain = Blockchain::new(config)?;
    let mut remote_chain = Blockchain::new(config)?;
    mine_blocks(&mut local_chain, local)?;
    mine_blocks(&mut remote_chain, remote)?;

    println!("🔀 Resolving forks");
    println!(
        "   Local  {}: {} blocks",
        local_chain.chain_id(),
        local_chain.blocks().len()
    );
    println!(
        "   Remote {}: {} blocks",
        remote_chain.chain_id(),
        remote_chain.blocks().len()
    );

    if local_chain.resolve_chain(&remote_chain) {
        println!("✅ Local chain replaced by the remote chain");
    } else {
        println!("ℹ️  Local chain kept");
    }
    println!("   Local now has {} blocks", local_chain.blocks().len());

    Ok(())
}

/// Print the canonical export of a chain
pub fn cmd_export(config: ChainConfig, chain_id: Option<&str>, blocks: u32) -> CliResult<()> {
    let mut chain = build_chain(config, chain_id)?;
    mine_blocks(&mut chain, blocks)?;
    println!("{}", chain.json_string()?);
    Ok(())
}

/// Validate a peer and print its address
pub fn cmd_peer(host: &str, port: u16, tls: bool) -> CliResult<()> {
    match Peer::new(host, port) {
        Ok(peer) => {
            println!("✅ Valid peer");
            println!("   Address: {}", peer.address(tls));
            println!("   Record: {}", peer.json_string()?);
        }
        Err(_) => {
            println!("❌ Invalid peer {}:{}", host, port);
            println!("   Host must be localhost or a dotted quad, port at least 1000");
        }
    }
    Ok(())
}

/// Mine while another thread keeps submitting transactions
pub fn cmd_race(config: ChainConfig, submissions: u32) -> CliResult<()> {
    let ledger = SharedLedger::new(Blockchain::new(config)?);

    let submitter = {
        let ledger = ledger.clone();
        thread::spawn(move || {
            for i in 0..submissions {
                let submitted = Transaction::new_now("bob", "alice", &format!("payment-{i}"))
                    .and_then(|tx| ledger.submit(tx));
                if let Err(e) = submitted {
                    warn!("Submission {} failed: {}", i, e);
                }
                thread::sleep(Duration::from_millis(2));
            }
        })
    };

    let (block, stats) = ledger.mine_and_commit()?;
    submitter
        .join()
        .map_err(|_| "submitter thread panicked".to_string())?;

    let chain = ledger.read();
    println!("🏁 Mined while {} transactions were submitted", submissions);
    println!("   ├─ Policy: {:?}", config.mining_policy);
    println!("   ├─ Attempts: {}", stats.hash_attempts);
    println!("   ├─ Pool refreshes: {}", stats.pool_refreshes);
    println!("   ├─ In block: {}", block.tx_count().saturating_sub(1));
    println!("   └─ Still pending: {}", chain.transaction_pool().len());

    Ok(())
}

/// Mine a short chain and list its committed transactions
pub fn cmd_verify(config: ChainConfig, tx_specs: &[String]) -> CliResult<()> {
    let mut chain = Blockchain::new(config)?;
    for spec in tx_specs {
        chain.add_transaction(parse_tx_spec(spec)?)?;
    }
    chain.mine_new_block_and_apply()?;

    println!("📜 Verified transactions:");
    for tx in chain.verified_transactions() {
        println!("   └─ {} -> {}: {}", tx.sender(), tx.recipient(), tx.message());
    }

    if chain.is_valid() {
        println!("✅ Chain is valid");
    } else {
        println!("❌ Chain validation FAILED");
    }

    Ok(())
}

/// Display blockchain info
pub fn cmd_chain_info(chain: &Blockchain) -> CliResult<()> {
    let stats = chain.stats();

    println!("⛓️  Chain Info");
    println!("   ├─ Height: {}", stats.height);
    println!("   ├─ Total blocks: {}", stats.total_blocks);
    println!("   ├─ Total transactions: {}", stats.total_transactions);
    println!("   ├─ Pending transactions: {}", stats.pending_transactions);
    println!("   ├─ Target: {}", stats.target);
    println!("   ├─ Valid: {}", chain.is_valid());
    println!("   └─ Latest hash: {}...", short(&stats.latest_hash));

    Ok(())
}
