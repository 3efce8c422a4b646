//! Hand-rolled collaborator fakes shared by the unit tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use alloy_primitives::{Address as EvmAddress, Bytes, TxHash, B256, U256};
use async_trait::async_trait;
use bitcoin::{blockdata::constants::genesis_block, Block, Network, Transaction, Txid};
use flyover_bridge_primitives::quote::PeginQuote;

use crate::providers::{
    BitcoinDataProvider, CallOptions, ChainClient, ProviderError, QuoteSigner, Receipt,
    RegisterPegInArgs, SettlementContract,
};

/// Chain client whose receipts follow one fixed mode.
pub(crate) struct MockChainClient {
    mode: ReceiptMode,
}

enum ReceiptMode {
    Success,
    Reverted,
    Never,
}

impl MockChainClient {
    pub(crate) fn mining_success() -> Self {
        Self {
            mode: ReceiptMode::Success,
        }
    }

    pub(crate) fn mining_reverted() -> Self {
        Self {
            mode: ReceiptMode::Reverted,
        }
    }

    pub(crate) fn never_mines() -> Self {
        Self {
            mode: ReceiptMode::Never,
        }
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn block_height(&self) -> Result<u64, ProviderError> {
        Ok(4_500_000)
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(31)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<Receipt>, ProviderError> {
        match self.mode {
            ReceiptMode::Success => Ok(Some(Receipt {
                tx_hash,
                status: true,
                block_number: 4_500_001,
                gas_used: 60_000,
            })),
            ReceiptMode::Reverted => Ok(Some(Receipt {
                tx_hash,
                status: false,
                block_number: 4_500_001,
                gas_used: 60_000,
            })),
            ReceiptMode::Never => Ok(None),
        }
    }
}

/// Settlement contract fake with scripted results and call counters.
#[derive(Default)]
pub(crate) struct MockContract {
    pub(crate) call_for_user_calls: AtomicUsize,
    pub(crate) register_peg_in_calls: AtomicUsize,
    pub(crate) dry_run_calls: AtomicUsize,
    pub(crate) balance: U256,
    pub(crate) active_script: Vec<u8>,
    pub(crate) dry_run_error: Option<ProviderError>,
    pub(crate) fed_keys: Vec<String>,
    pub(crate) fed_address: String,
    pub(crate) fed_creation_height: i64,
    /// Fails this many leading federation reads with a transient error.
    pub(crate) flaky_reads: AtomicUsize,
    pub(crate) last_call_options: Mutex<Option<CallOptions>>,
}

impl MockContract {
    fn flaky(&self) -> Result<(), ProviderError> {
        let remaining = self.flaky_reads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.flaky_reads.store(remaining - 1, Ordering::SeqCst);
            Err(ProviderError::Rpc("node hiccup".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SettlementContract for MockContract {
    async fn call_for_user(
        &self,
        opts: CallOptions,
        _quote: &PeginQuote,
    ) -> Result<TxHash, ProviderError> {
        self.call_for_user_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call_options.lock().unwrap() = Some(opts);
        Ok(B256::repeat_byte(0x11))
    }

    async fn register_peg_in(
        &self,
        opts: CallOptions,
        _args: &RegisterPegInArgs,
    ) -> Result<TxHash, ProviderError> {
        self.register_peg_in_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call_options.lock().unwrap() = Some(opts);
        Ok(B256::repeat_byte(0x22))
    }

    async fn register_peg_in_static(
        &self,
        _args: &RegisterPegInArgs,
    ) -> Result<(), ProviderError> {
        self.dry_run_calls.fetch_add(1, Ordering::SeqCst);
        match &self.dry_run_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn hash_quote(&self, _quote: &PeginQuote) -> Result<B256, ProviderError> {
        Ok(B256::repeat_byte(0x42))
    }

    async fn active_redeem_script(&self) -> Result<Vec<u8>, ProviderError> {
        Ok(self.active_script.clone())
    }

    async fn provider_balance(&self, _provider: EvmAddress) -> Result<U256, ProviderError> {
        Ok(self.balance)
    }

    async fn federation_size(&self) -> Result<u32, ProviderError> {
        self.flaky()?;
        Ok(self.fed_keys.len() as u32)
    }

    async fn federation_threshold(&self) -> Result<u32, ProviderError> {
        self.flaky()?;
        Ok(self.fed_keys.len() as u32 / 2 + 1)
    }

    async fn federator_public_key(&self, index: u32) -> Result<Vec<u8>, ProviderError> {
        self.flaky()?;
        let key = self
            .fed_keys
            .get(index as usize)
            .ok_or_else(|| ProviderError::Rpc(format!("no federator at {index}")))?;
        hex::decode(key).map_err(|err| ProviderError::Rpc(err.to_string()))
    }

    async fn federation_address(&self) -> Result<String, ProviderError> {
        self.flaky()?;
        Ok(self.fed_address.clone())
    }

    async fn active_federation_creation_block_height(&self) -> Result<i64, ProviderError> {
        self.flaky()?;
        Ok(self.fed_creation_height)
    }
}

/// Bitcoin data provider over one in-memory block.
pub(crate) struct MockBtcProvider {
    pub(crate) block: Block,
    pub(crate) height: u64,
}

impl MockBtcProvider {
    /// The mainnet genesis block as the deposit's containing block.
    pub(crate) fn with_genesis() -> Self {
        Self {
            block: genesis_block(Network::Bitcoin),
            height: 0,
        }
    }

    pub(crate) fn deposit_txid(&self) -> Txid {
        self.block.txdata[0].compute_txid()
    }
}

#[async_trait]
impl BitcoinDataProvider for MockBtcProvider {
    async fn raw_transaction(&self, txid: Txid) -> Result<Transaction, ProviderError> {
        self.block
            .txdata
            .iter()
            .find(|tx| tx.compute_txid() == txid)
            .cloned()
            .ok_or_else(|| ProviderError::Rpc(format!("unknown transaction {txid}")))
    }

    async fn block_containing(&self, txid: Txid) -> Result<(Block, u64), ProviderError> {
        if self.block.txdata.iter().any(|tx| tx.compute_txid() == txid) {
            Ok((self.block.clone(), self.height))
        } else {
            Err(ProviderError::Rpc(format!("unknown transaction {txid}")))
        }
    }

    fn network(&self) -> Network {
        Network::Bitcoin
    }
}

/// Signer with a fixed address and a canned signature.
pub(crate) struct MockSigner;

#[async_trait]
impl QuoteSigner for MockSigner {
    async fn sign_hash(&self, _digest: &B256) -> Result<Bytes, ProviderError> {
        Ok(Bytes::from(vec![0x99; 65]))
    }

    async fn sign_transaction(
        &self,
        tx: Bytes,
        _chain_id: u64,
    ) -> Result<Bytes, ProviderError> {
        Ok(tx)
    }

    fn address(&self) -> EvmAddress {
        EvmAddress::repeat_byte(0x77)
    }
}

/// A plausible accepted quote for watcher tests.
pub(crate) fn quote_fixture() -> PeginQuote {
    PeginQuote {
        fed_btc_address: "3EDhHutH7XnsotnZaTfRr9CwnnGsNNrhCL".to_string(),
        lbc_address: "0x2ff74F841b95E000625b3A77fed03714874C4fEa"
            .parse()
            .unwrap(),
        lp_rsk_address: EvmAddress::repeat_byte(0x77),
        btc_refund_address: "17VZNX1SN5NtKa8UQFxwQbFeFc3iqRYhem".to_string(),
        rsk_refund_address: "0xa554d96413FF72E93437C4072438302C38350EE3"
            .parse()
            .unwrap(),
        lp_btc_address: "17VZNX1SN5NtKa8UQFxwQbFeFc3iqRYhem".to_string(),
        call_fee: U256::from(100_000_000_000_000u64),
        penalty_fee: U256::from(10_000_000_000_000u64),
        contract_address: "0xa554d96413FF72E93437C4072438302C38350EE3"
            .parse()
            .unwrap(),
        data: Bytes::new(),
        gas_limit: 46_000,
        nonce: 8_373_381,
        value: U256::from(600_000_000_000_000_000u64),
        agreement_timestamp: 1_661_788_800,
        time_for_deposit: 3_600,
        lp_call_time: 3_600,
        confirmations: 2,
        call_on_register: false,
    }
}

/// Federation member keys matching the primitives fixed-vector set.
pub(crate) fn federation_key_hexes() -> Vec<String> {
    vec![
        "02cd53fc53a07f211641a677d250f6de99caf620e8e77071e811a28b3bcddf0be1".to_string(),
        "0362634ab57dae9cb373a5d536e66a8c4f67468bbcfb063809bab643072d78a124".to_string(),
        "03c5946b3fbae03a654237da863c9ed534e0878657175b132b8ca630f245df04db".to_string(),
    ]
}
