use super::{CountSource, SourceError};
use crate::config::TokenHoldersConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use tracing::debug;

const PAGE_LIMIT: u32 = 1000;

/// Distinct owners of non-empty token accounts for a mint, paged through
/// the `getTokenAccounts` JSON-RPC method.
#[derive(Debug, Clone)]
pub struct TokenHolders {
    client: Client,
    rpc_url: String,
    api_key: String,
    mint: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<TokenAccountsPage>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct TokenAccountsPage {
    #[serde(default)]
    token_accounts: Vec<TokenAccount>,
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenAccount {
    owner: Option<String>,
}

impl TokenHolders {
    pub fn new(config: &TokenHoldersConfig) -> Self {
        Self {
            client: Client::new(),
            rpc_url: config.rpc_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            mint: config.mint.clone(),
        }
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<TokenAccountsPage, SourceError> {
        let mut params = json!({
            "mint": self.mint,
            "limit": PAGE_LIMIT,
            "options": { "showZeroBalance": false },
        });
        if let (Some(cursor), Some(object)) = (cursor, params.as_object_mut()) {
            object.insert("cursor".to_owned(), json!(cursor));
        }

        let response = self
            .client
            .post(format!("{}/", self.rpc_url))
            .query(&[("api-key", self.api_key.as_str())])
            .json(&json!({
                "jsonrpc": "2.0",
                "id": "get-holders",
                "method": "getTokenAccounts",
                "params": params,
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<RpcResponse>()
            .await?;

        page_from_response(response)
    }
}

#[async_trait::async_trait]
impl CountSource for TokenHolders {
    async fn fetch_count(&self) -> Result<u64, SourceError> {
        let mut owners = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0_u32;

        loop {
            let page = self.fetch_page(cursor.as_deref()).await?;
            pages += 1;
            collect_owners(&page, &mut owners);

            match page.cursor {
                Some(next) if !page.token_accounts.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        debug!(pages, holders = owners.len(), "token accounts paged");
        Ok(u64::try_from(owners.len()).unwrap_or(u64::MAX))
    }
}

fn page_from_response(response: RpcResponse) -> Result<TokenAccountsPage, SourceError> {
    if let Some(error) = response.error {
        return Err(SourceError::Rpc(error.message));
    }
    Ok(response.result.unwrap_or_default())
}

fn collect_owners(page: &TokenAccountsPage, owners: &mut HashSet<String>) {
    owners.extend(
        page.token_accounts
            .iter()
            .filter_map(|account| account.owner.as_deref())
            .filter(|owner| !owner.is_empty())
            .map(str::to_owned),
    );
}
