//! Typed proxy over a deployed `Lottery` contract.

use alloy::contract::{ContractInstance, Interface};
use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::eips::BlockId;
use alloy::json_abi::JsonAbi;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use std::future::IntoFuture;
use tokio::time::timeout;

use crate::blockchain::transaction::{wait_mined, WaitPolicy};
use crate::blockchain::{BlockchainError, ChainClient, SigningAuthority, SubmittedTx};
use crate::contract::{ContractError, ContractResult};
use crate::toolchain::CompiledArtifact;

/// Fixed entry stake: 12 finney.
pub const ENTRY_VALUE_WEI: u64 = 12_000_000_000_000_000;

/// Methods every Lottery ABI must resolve.
pub const LOTTERY_METHODS: [&str; 4] = ["enter", "getPlayers", "manager", "pickWinner"];

/// Creation transaction that has been submitted but not yet mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDeployment {
    /// Address derived from the sender and the creation nonce.
    pub address: Address,
    pub tx_hash: TxHash,
}

/// Lottery contract bound to an address and a chain client.
#[derive(Clone)]
pub struct LotteryContract {
    reader: ContractInstance<DynProvider>,
    interface: Interface,
    client: ChainClient,
    /// Run `eth_call` before each state-changing submission.
    simulate: bool,
}

impl LotteryContract {
    /// Bind to an existing deployment.
    ///
    /// Fails if the ABI does not resolve every method in [`LOTTERY_METHODS`].
    pub fn at(address: Address, client: &ChainClient, abi: &JsonAbi) -> ContractResult<Self> {
        ensure_lottery_abi(abi)?;
        let interface = Interface::new(abi.clone());
        let reader = ContractInstance::new(address, client.provider().clone(), interface.clone());
        Ok(Self {
            reader,
            interface,
            client: client.clone(),
            simulate: true,
        })
    }

    /// Turn the pre-submission simulation on or off.
    pub fn with_simulation(mut self, enabled: bool) -> Self {
        self.simulate = enabled;
        self
    }

    pub fn address(&self) -> Address {
        *self.reader.address()
    }

    /// Submit the creation transaction for `artifact`.
    ///
    /// Uses the authority's template for nonce, value and gas limit; a missing
    /// nonce is fetched from the pending pool, a missing gas limit is estimated
    /// by the provider. The returned address is only usable after
    /// [`LotteryContract::wait_deployed`] succeeds.
    pub async fn deploy(
        authority: &SigningAuthority,
        client: &ChainClient,
        artifact: &CompiledArtifact,
        constructor_args: &[DynSolValue],
    ) -> ContractResult<PendingDeployment> {
        let mut code = artifact.bytecode.to_vec();
        match &artifact.abi.constructor {
            Some(constructor) => {
                let encoded = constructor
                    .abi_encode_input(constructor_args)
                    .map_err(|e| ContractError::Encode(e.to_string()))?;
                code.extend_from_slice(&encoded);
            }
            None if !constructor_args.is_empty() => {
                return Err(ContractError::Encode(format!(
                    "{} has no constructor but {} arguments were given",
                    artifact.name,
                    constructor_args.len()
                )));
            }
            None => {}
        }

        let from = authority.address();
        let opts = authority.opts().clone();
        let nonce = match opts.nonce {
            Some(nonce) => nonce,
            None => client.pending_nonce(from).await?,
        };

        let mut request = TransactionRequest::default()
            .with_from(from)
            .with_deploy_code(code)
            .with_nonce(nonce)
            .with_value(opts.value);
        if let Some(gas_limit) = opts.gas_limit {
            request.set_gas_limit(gas_limit);
        }

        let provider = client.signing_provider(authority);
        let pending = bounded(client, "constructor", provider.send_transaction(request)).await?;

        let deployment = PendingDeployment {
            address: from.create(nonce),
            tx_hash: *pending.tx_hash(),
        };
        tracing::info!(
            contract = %artifact.name,
            address = %deployment.address,
            tx_hash = %deployment.tx_hash,
            nonce,
            "Deployment submitted"
        );
        Ok(deployment)
    }

    /// Block until the creation transaction is mined and code exists at the address.
    pub async fn wait_deployed(
        client: &ChainClient,
        deployment: &PendingDeployment,
        policy: WaitPolicy,
    ) -> ContractResult<Address> {
        let receipt = wait_mined(client, deployment.tx_hash, policy).await?;
        let address = receipt
            .contract_address
            .ok_or(BlockchainError::MissingContractAddress(deployment.tx_hash))?;

        if address != deployment.address {
            tracing::warn!(
                predicted = %deployment.address,
                actual = %address,
                "Deployed address differs from prediction"
            );
        }

        let code = client.code_at(address).await?;
        if code.is_empty() {
            return Err(BlockchainError::NoCode(address).into());
        }

        tracing::info!(address = %address, block_number = ?receipt.block_number, "Contract deployed");
        Ok(address)
    }

    /// Read-only call against the latest block.
    pub async fn call(&self, method: &str, args: &[DynSolValue]) -> ContractResult<Vec<DynSolValue>> {
        let builder = self
            .reader
            .function(method, args)
            .map_err(|e| ContractError::call(method, e))?;
        bounded(&self.client, method, builder.call()).await
    }

    /// Submit a state-changing call signed by `authority`.
    ///
    /// The caller must have prepared the authority's template (nonce, value,
    /// gas limit). No gas estimation happens here.
    pub async fn transact(
        &self,
        authority: &SigningAuthority,
        method: &str,
        args: &[DynSolValue],
    ) -> ContractResult<SubmittedTx> {
        let provider = self.client.signing_provider(authority);
        let writer = ContractInstance::new(self.address(), provider, self.interface.clone());
        let opts = authority.opts();

        let mut builder = writer
            .function(method, args)
            .map_err(|e| ContractError::call(method, e))?
            .from(authority.address())
            .value(opts.value);
        if let Some(nonce) = opts.nonce {
            builder = builder.nonce(nonce);
        }
        if let Some(gas_limit) = opts.gas_limit {
            builder = builder.gas(gas_limit);
        }

        if self.simulate {
            // Pending state, so earlier unmined submissions are visible.
            bounded(&self.client, method, builder.call().block(BlockId::pending())).await?;
        }

        let pending = bounded(&self.client, method, builder.send()).await?;
        let submitted = SubmittedTx::from(*pending.tx_hash());
        tracing::info!(
            method,
            contract = %self.address(),
            tx_hash = %submitted.hash,
            "Transaction submitted"
        );
        Ok(submitted)
    }

    /// `manager()`: the account that deployed the contract.
    pub async fn manager(&self) -> ContractResult<Address> {
        let output = self.call("manager", &[]).await?;
        single_address("manager", &output)
    }

    /// `getPlayers()`: everyone who entered the current round.
    pub async fn get_players(&self) -> ContractResult<Vec<Address>> {
        let output = self.call("getPlayers", &[]).await?;
        let players = output
            .first()
            .and_then(DynSolValue::as_array)
            .ok_or_else(|| unexpected("getPlayers", "expected address[]"))?;
        players
            .iter()
            .map(|player| {
                player
                    .as_address()
                    .ok_or_else(|| unexpected("getPlayers", "array element is not an address"))
            })
            .collect()
    }

    /// `players(index)`: one entry of the players array.
    pub async fn player(&self, index: U256) -> ContractResult<Address> {
        let output = self.call("players", &[DynSolValue::Uint(index, 256)]).await?;
        single_address("players", &output)
    }

    /// `enter()`: stake the template's value into the current round.
    pub async fn enter(&self, authority: &SigningAuthority) -> ContractResult<SubmittedTx> {
        self.transact(authority, "enter", &[]).await
    }

    /// `pickWinner()`: pay the pot to a pseudo-random player (manager only).
    pub async fn pick_winner(&self, authority: &SigningAuthority) -> ContractResult<SubmittedTx> {
        self.transact(authority, "pickWinner", &[]).await
    }
}

impl std::fmt::Debug for LotteryContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LotteryContract")
            .field("address", &self.address())
            .field("client", &self.client)
            .field("simulate", &self.simulate)
            .finish()
    }
}

/// Check that `abi` encodes every Lottery method.
pub fn ensure_lottery_abi(abi: &JsonAbi) -> ContractResult<()> {
    let interface = Interface::new(abi.clone());
    for method in LOTTERY_METHODS {
        interface
            .encode_input(method, &[])
            .map_err(|e| ContractError::call(method, e))?;
    }
    Ok(())
}

/// Await an RPC-backed future under the client's request timeout.
async fn bounded<F, T, E>(client: &ChainClient, method: &str, call: F) -> ContractResult<T>
where
    F: IntoFuture<Output = Result<T, E>>,
    E: Into<alloy::contract::Error>,
{
    match timeout(client.rpc_timeout(), call.into_future()).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ContractError::call(method, e.into())),
        Err(_) => Err(BlockchainError::Timeout(client.rpc_timeout().as_secs()).into()),
    }
}

fn single_address(method: &str, output: &[DynSolValue]) -> ContractResult<Address> {
    output
        .first()
        .and_then(DynSolValue::as_address)
        .ok_or_else(|| unexpected(method, "expected a single address"))
}

fn unexpected(method: &str, detail: &str) -> ContractError {
    ContractError::UnexpectedOutput {
        method: method.to_string(),
        detail: detail.to_string(),
    }
}
