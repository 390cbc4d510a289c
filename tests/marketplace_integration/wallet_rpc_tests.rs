//! Wallet balance flows against a mock Solana JSON-RPC endpoint.

use super::helpers::{PAYER, build_api, caller};
use kaam_connect::callable::dto::{BalancesView, ConnectWalletPayload, WalletView};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn balance_response(lamports: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": { "context": { "slot": 7 }, "value": lamports },
    }))
}

async fn mount_balances(server: &MockServer, payer_lamports: u64) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "getBalance",
            "params": [PAYER, { "commitment": "confirmed" }],
        })))
        .respond_with(balance_response(payer_lamports))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .respond_with(balance_response(0))
        .with_priority(10)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn connected_wallet_reports_chain_balance() -> eyre::Result<()> {
    let server = MockServer::start().await;
    mount_balances(&server, 1_500_000_000).await;
    let (_, api) = build_api(&server.uri())?;
    let ctx = caller("amara")?;
    api.dispatch("signIn", &ctx, json!({ "role": "diaspora" }))
        .await
        .map_err(|err| eyre::eyre!("{err}"))?;

    let connected: WalletView = serde_json::from_value(
        api.dispatch("connectExternalWallet", &ctx, json!({ "pubkey": PAYER }))
            .await
            .map_err(|err| eyre::eyre!("{err}"))?,
    )?;

    eyre::ensure!(!connected.is_native, "external wallet reported as native");
    eyre::ensure!(connected.pubkey == PAYER, "pubkey mismatch");
    eyre::ensure!(connected.balance == 1.5, "balance was {}", connected.balance);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_balances_lists_native_and_external_wallets() -> eyre::Result<()> {
    let server = MockServer::start().await;
    mount_balances(&server, 250_000_000).await;
    let (_, api) = build_api(&server.uri())?;
    let ctx = caller("kofi")?;

    let native = api
        .generate_wallet(&ctx)
        .await
        .map_err(|err| eyre::eyre!("{err}"))?;
    api.connect_external_wallet(
        &ctx,
        &ConnectWalletPayload {
            pubkey: PAYER.to_owned(),
        },
    )
    .await
    .map_err(|err| eyre::eyre!("{err}"))?;

    let balances: BalancesView = serde_json::from_value(
        api.dispatch("fetchBalances", &ctx, Value::Null)
            .await
            .map_err(|err| eyre::eyre!("{err}"))?,
    )?;

    let stored_native = balances
        .native_wallet
        .ok_or_else(|| eyre::eyre!("native wallet missing"))?;
    eyre::ensure!(stored_native.pubkey == native.pubkey, "native wallet changed");
    eyre::ensure!(stored_native.passphrase.is_none(), "passphrase leaked");
    eyre::ensure!(stored_native.balance == 0.0, "native balance {}", stored_native.balance);
    let [external] = balances.external_wallets.as_slice() else {
        return Err(eyre::eyre!(
            "expected one external wallet, found {}",
            balances.external_wallets.len()
        ));
    };
    eyre::ensure!(external.balance == 0.25, "external balance {}", external.balance);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_endpoint_reports_zero_balances() -> eyre::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let (_, api) = build_api(&server.uri())?;
    let ctx = caller("esi")?;
    api.dispatch("signIn", &ctx, Value::Null)
        .await
        .map_err(|err| eyre::eyre!("{err}"))?;

    let connected = api
        .connect_external_wallet(
            &ctx,
            &ConnectWalletPayload {
                pubkey: PAYER.to_owned(),
            },
        )
        .await
        .map_err(|err| eyre::eyre!("{err}"))?;

    eyre::ensure!(connected.balance == 0.0, "balance was {}", connected.balance);
    Ok(())
}
