//! Programmable JSON-RPC node for driving `RpcChainClient` over real HTTP.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{TxHash, B256};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use onchain_answer::chain::ChainConfig;

use super::{ACCOUNT, CONTRACT};

pub const CHAIN_ID: u64 = 31337;
pub const GWEI: u128 = 1_000_000_000;

struct NodeState {
    block_number: u64,
    /// Blocks mined after each `eth_blockNumber` answer.
    blocks_per_poll: u64,
    gas_price: u128,
    receipt: Option<Value>,
    /// Receipt polls answered with `null` before `receipt` shows up.
    pending_polls: u32,
    fail_receipts: bool,
    calls: HashMap<String, u32>,
}

enum Reply {
    Result(Value),
    Error(&'static str),
    /// Never answer, like a node that stopped responding.
    Hang,
}

/// A node answering `eth_chainId`, `eth_blockNumber`, `eth_gasPrice` and
/// `eth_getTransactionReceipt`. Any other method hangs.
#[derive(Clone)]
pub struct RpcNode {
    state: Arc<Mutex<NodeState>>,
    url: String,
}

impl RpcNode {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(NodeState {
            block_number: 10,
            blocks_per_poll: 0,
            gas_price: GWEI,
            receipt: None,
            pending_polls: 0,
            fail_receipts: false,
            calls: HashMap::new(),
        }));

        let node = Self { state, url };
        let server = node.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        let server = server.clone();
                        tokio::spawn(async move { server.serve(socket).await });
                    }
                    Err(_) => break,
                }
            }
        });
        node
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Chain config pointing at this node with fast polling.
    pub fn config(&self) -> ChainConfig {
        ChainConfig {
            rpc_url: self.url.clone(),
            chain_id: CHAIN_ID,
            rpc_timeout_secs: 1,
            confirmation_blocks: 1,
            poll_interval_ms: 5,
            max_poll_interval_ms: 20,
            max_gas_price_gwei: 500,
            ..ChainConfig::default()
        }
    }

    pub fn set_gas_price(&self, wei: u128) {
        self.state.lock().unwrap().gas_price = wei;
    }

    pub fn set_block_number(&self, block: u64) {
        self.state.lock().unwrap().block_number = block;
    }

    pub fn mine_per_poll(&self, blocks: u64) {
        self.state.lock().unwrap().blocks_per_poll = blocks;
    }

    /// Serve `receipt` after `polls` receipt queries that find nothing.
    pub fn include_after(&self, polls: u32, receipt: Value) {
        let mut state = self.state.lock().unwrap();
        state.pending_polls = polls;
        state.receipt = Some(receipt);
    }

    pub fn fail_receipts(&self) {
        self.state.lock().unwrap().fail_receipts = true;
    }

    /// How many times `method` was called.
    pub fn calls(&self, method: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    fn reply(&self, method: &str) -> Reply {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(method.to_string()).or_default() += 1;

        match method {
            "eth_chainId" => Reply::Result(quantity(u128::from(CHAIN_ID))),
            "eth_blockNumber" => {
                let block = state.block_number;
                state.block_number += state.blocks_per_poll;
                Reply::Result(quantity(u128::from(block)))
            }
            "eth_gasPrice" => Reply::Result(quantity(state.gas_price)),
            "eth_getTransactionReceipt" => {
                if state.fail_receipts {
                    Reply::Error("header not found")
                } else if state.pending_polls > 0 {
                    state.pending_polls -= 1;
                    Reply::Result(Value::Null)
                } else {
                    Reply::Result(state.receipt.clone().unwrap_or(Value::Null))
                }
            }
            _ => Reply::Hang,
        }
    }

    async fn serve(&self, mut socket: TcpStream) {
        let Some(body) = read_body(&mut socket).await else {
            return;
        };
        let Ok(request) = serde_json::from_slice::<Value>(&body) else {
            return;
        };
        let id = request["id"].clone();
        let method = request["method"].as_str().unwrap_or_default().to_string();

        let response = match self.reply(&method) {
            Reply::Result(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Reply::Error(message) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32000, "message": message },
            }),
            Reply::Hang => {
                std::future::pending::<()>().await;
                return;
            }
        };

        let body = response.to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    }
}

/// A mined receipt for `tx_hash` in `block`.
pub fn receipt(tx_hash: TxHash, block: u64, success: bool) -> Value {
    let status = if success { "0x1" } else { "0x0" };
    json!({
        "type": "0x2",
        "status": status,
        "cumulativeGasUsed": "0x5208",
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": B256::with_last_byte(0xbb),
        "blockNumber": quantity(u128::from(block)),
        "gasUsed": "0x5208",
        "effectiveGasPrice": quantity(GWEI),
        "from": ACCOUNT,
        "to": CONTRACT,
        "contractAddress": null,
    })
}

fn quantity(value: u128) -> Value {
    Value::String(format!("{:#x}", value))
}

/// Read one HTTP request and return its body.
async fn read_body(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Some(buf[header_end..header_end + length].to_vec())
}
