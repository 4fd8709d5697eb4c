//! Shared utilities for integration tests.

#![allow(dead_code)]

use alloy::dyn_abi::DynSolValue;
use alloy::hex;
use alloy::primitives::{keccak256, Address};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use lottery_deployer::config::{validate_config, CommandKind, LotteryConfig, WorkflowConfig};
use lottery_deployer::toolchain::Solc;

/// Anvil's first two dev accounts.
pub const DEV_KEY_0: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const DEV_KEY_1: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

/// Nothing listens on the discard port.
pub const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:9";

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn contract_source() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("contracts/Lottery.sol")
}

/// Write a stand-in for `solc` that copies the fixture artifacts to `-o`.
///
/// Each invocation appends its arguments as one line to [`solc_args_log`].
pub fn write_fake_solc(dir: &Path) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
echo "$@" >> "{log}"
kind=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    --abi) kind=abi ;;
    --bin) kind=bin ;;
    -o) shift; out="$1" ;;
  esac
  shift
done
mkdir -p "$out"
cp "{fixtures}/Lottery.$kind" "$out/Lottery.$kind"
"#,
        fixtures = fixtures_dir().display(),
        log = solc_args_log(dir).display()
    );
    let path = dir.join("fake-solc.sh");
    std::fs::write(&path, script).unwrap();
    path
}

/// Argument lines recorded by the script from [`write_fake_solc`].
pub fn solc_args_log(dir: &Path) -> PathBuf {
    dir.join("solc-args.log")
}

/// Make `script` directly executable so it can stand in as `toolchain.solc`.
#[cfg(unix)]
pub fn make_executable(script: &Path) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(script, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Write a stand-in for `solc` that always fails.
pub fn write_failing_solc(dir: &Path) -> PathBuf {
    let path = dir.join("broken-solc.sh");
    std::fs::write(
        &path,
        "#!/bin/sh\necho 'Error: Expected pragma, import directive or contract' >&2\nexit 1\n",
    )
    .unwrap();
    path
}

/// Run `script` through `sh` so it needs no exec bit.
pub fn solc_script(script: &Path) -> Solc {
    Solc::new("sh").with_leading_args([script.as_os_str().to_owned()])
}

/// Copy the fixture artifacts into `build_dir`.
pub fn install_artifacts(build_dir: &Path) {
    std::fs::create_dir_all(build_dir).unwrap();
    for ext in ["abi", "bin"] {
        let name = format!("Lottery.{}", ext);
        std::fs::copy(fixtures_dir().join(&name), build_dir.join(&name)).unwrap();
    }
}

/// Configuration with every path inside `dir`.
pub fn lottery_config(dir: &Path, endpoint: &str) -> LotteryConfig {
    let mut config = LotteryConfig::default();
    config.network.endpoint = endpoint.to_string();
    config.network.rpc_timeout_secs = 5;
    config.contract.source = contract_source().display().to_string();
    config.contract.build_dir = dir.join("build").display().to_string();
    config.contract.binding_out = dir.join("bindings/lottery.rs").display().to_string();
    config.lottery.mined_timeout_secs = 30;
    config.lottery.poll_interval_ms = 100;
    config
}

pub fn resolve(config: &LotteryConfig, command: CommandKind) -> WorkflowConfig {
    validate_config(config, command).unwrap()
}

/// ABI-encode a single address return value.
pub fn encode_address(address: Address) -> String {
    hex::encode_prefixed(DynSolValue::Tuple(vec![DynSolValue::Address(address)]).abi_encode_params())
}

/// ABI-encode an `address[]` return value.
pub fn encode_addresses(addresses: &[Address]) -> String {
    let items = addresses.iter().copied().map(DynSolValue::Address).collect();
    hex::encode_prefixed(DynSolValue::Tuple(vec![DynSolValue::Array(items)]).abi_encode_params())
}

/// Four-byte selector of an `eth_call`, from either `input` or `data`.
pub fn call_selector(params: &Value) -> String {
    let tx = &params[0];
    let data = tx["input"].as_str().or_else(|| tx["data"].as_str()).unwrap_or_default();
    data.chars().take(10).collect()
}

/// Start a JSON-RPC node stand-in on an ephemeral port.
///
/// `handler` maps `(method, params)` to the `result` field.
pub async fn start_mock_node<F>(handler: F) -> SocketAddr
where
    F: Fn(&str, &Value) -> Value + Send + Sync + 'static,
{
    start_fallible_mock_node(move |method, params| Ok(handler(method, params))).await
}

/// Like [`start_mock_node`], but `Err` becomes the JSON-RPC `error` object.
pub async fn start_fallible_mock_node<F>(handler: F) -> SocketAddr
where
    F: Fn(&str, &Value) -> Result<Value, Value> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let Some(body) = read_request(&mut socket).await else {
                            return;
                        };
                        let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                        let method = request["method"].as_str().unwrap_or_default().to_string();
                        let response = match handler(&method, &request["params"]) {
                            Ok(result) => json!({
                                "jsonrpc": "2.0",
                                "id": request["id"].clone(),
                                "result": result,
                            }),
                            Err(error) => json!({
                                "jsonrpc": "2.0",
                                "id": request["id"].clone(),
                                "error": error,
                            }),
                        }
                        .to_string();
                        let http = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(http.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Error object a node returns when `eth_call` hits a `require`.
pub fn execution_reverted() -> Value {
    json!({ "code": 3, "message": "execution reverted", "data": "0x" })
}

/// Hash a node would report for a raw transaction sent with `eth_sendRawTransaction`.
pub fn raw_transaction_hash(params: &Value) -> String {
    let raw = params[0].as_str().unwrap_or_default();
    let bytes = hex::decode(raw).unwrap_or_default();
    keccak256(bytes).to_string()
}

/// Successful EIP-1559 receipt for `params[0]`, mined in block 1.
pub fn mined_receipt(params: &Value, from: Address, contract_address: Address) -> Value {
    json!({
        "type": "0x2",
        "status": "0x1",
        "cumulativeGasUsed": "0x2dc6c0",
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "transactionHash": params[0].clone(),
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "11".repeat(32)),
        "blockNumber": "0x1",
        "gasUsed": "0x2dc6c0",
        "effectiveGasPrice": "0x3b9aca00",
        "from": from.to_string(),
        "to": null,
        "contractAddress": contract_address.to_string(),
    })
}

/// `eth_feeHistory` answer with a 1 gwei base fee.
pub fn fee_history() -> Value {
    json!({
        "oldestBlock": "0x1",
        "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"],
        "gasUsedRatio": [0.5],
        "reward": [["0x3b9aca00"]],
    })
}

async fn read_request(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let start = end + 4;
        while buf.len() < start + len {
            let n = socket.read(&mut chunk).await.ok()?;
            if n == 0 {
                return None;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        return Some(buf[start..start + len].to_vec());
    }
}
