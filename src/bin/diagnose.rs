//! Diagnostic tool - Check configuration before resolving pools
//!
//! Run with: cargo run --bin diagnose

use std::env;

fn main() {
    println!("🔍 VIXVIEW DIAGNOSTIC CHECK\n");

    // Load .env
    dotenvy::dotenv().ok();

    println!("═══════════════════════════════════════════════════");
    println!("               REQUIRED SETTINGS                    ");
    println!("═══════════════════════════════════════════════════\n");

    let required = [
        ("RPC_URL", "JSON-RPC endpoint for view calls"),
        ("VIX_CONTRACT_ADDRESS", "Pair data contract (getVixData)"),
        ("MARKET_DATA_URL", "Market data API base URL"),
        ("NETWORK", "Network slug used by the market data API"),
    ];

    let mut missing = Vec::new();
    for (key, desc) in required {
        match env::var(key) {
            Ok(value) if !value.trim().is_empty() => {
                println!("  ✅ {}: {}", key, shorten(&value));
            }
            _ => {
                println!("  ❌ {}: NOT SET", key);
                missing.push(key);
            }
        }
        println!("    └─ {}\n", desc);
    }

    println!("═══════════════════════════════════════════════════");
    println!("               OPTIONAL SETTINGS                    ");
    println!("═══════════════════════════════════════════════════\n");

    let optional = [
        ("CHAIN_ID", "11155111", "Chain the wallets are connected to"),
        ("EXPLORER_URL", "https://sepolia.etherscan.io", "Token link base"),
        ("REQUEST_TIMEOUT_SECS", "10", "Timeout per network call"),
        ("DISPLAY_DECIMALS", "6", "Fractional digits shown for prices"),
        ("WALLET_ADDRESSES", "(none)", "Connected wallets, comma-separated"),
    ];

    for (key, default, desc) in optional {
        let value = env::var(key).unwrap_or_else(|_| default.to_string());
        let marker = if env::var(key).is_err() { "(default)" } else { "(from .env)" };
        println!("  {}: {} {}", key, shorten(&value), marker);
        println!("    └─ {}\n", desc);
    }

    println!("═══════════════════════════════════════════════════");
    println!("                     STATUS                         ");
    println!("═══════════════════════════════════════════════════\n");

    if missing.is_empty() {
        println!("  ✅ Ready to resolve pools");
    } else {
        println!("  ⚠️  Missing required settings: {}", missing.join(", "));
        println!("     vixview will refuse to start until they are set.");
    }

    if env::var("WALLET_ADDRESSES").is_err() {
        println!("\n  ⏳ No wallet configured: resolutions will wait for --wallet");
    }

    println!("\n✅ Diagnostic complete!\n");
}

fn shorten(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 50 {
        let head: String = chars[..30].iter().collect();
        let tail: String = chars[chars.len() - 15..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        value.to_string()
    }
}
