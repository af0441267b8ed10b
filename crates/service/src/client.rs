//! Omie HTTP transport and the generic paged fetch loop.
//!
//! The transport is a trait so the fetch loop and the sync jobs can be
//! exercised against a mock. The real client POSTs the Omie RPC
//! envelope (`{ call, app_key, app_secret, param: [...] }`), enforces a
//! per-request timeout, and retries transient failures with exponential
//! backoff. Client errors (4xx) and Omie fault envelopes are never
//! retried.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use lastro_core::omie::resource::{extract_items, extract_total_pages};
use lastro_core::omie::{ExtractionPath, OmieResource};
use lastro_shared::config::OmieConfig;

/// Error types for ERP calls.
#[derive(Debug, thiserror::Error)]
pub enum OmieError {
    /// Network-level transport failure.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status with the response body attached.
    #[error("Omie returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Omie fault envelope (business-level error, not retried).
    #[error("Omie fault {code}: {message}")]
    Fault {
        /// Omie fault code.
        code: String,
        /// Omie fault message.
        message: String,
    },

    /// Response could not be interpreted.
    #[error("unparseable response from {endpoint}: {reason}")]
    InvalidResponse {
        /// Endpoint that answered.
        endpoint: String,
        /// What went wrong.
        reason: String,
    },
}

/// Remote-procedure transport to the Omie API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OmieTransport: Send + Sync {
    /// Invokes one remote call and returns the parsed JSON response.
    async fn call(
        &self,
        endpoint: &str,
        call_name: &str,
        param: Value,
    ) -> Result<Value, OmieError>;
}

/// Reqwest-backed Omie client.
pub struct OmieClient {
    http: reqwest::Client,
    base_url: String,
    app_key: String,
    app_secret: String,
    max_retries: u32,
}

impl OmieClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &OmieConfig) -> Result<Self, OmieError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_key: config.app_key.clone(),
            app_secret: config.app_secret.clone(),
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl OmieTransport for OmieClient {
    async fn call(
        &self,
        endpoint: &str,
        call_name: &str,
        param: Value,
    ) -> Result<Value, OmieError> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let envelope = json!({
            "call": call_name,
            "app_key": self.app_key,
            "app_secret": self.app_secret,
            "param": [param],
        });

        let mut attempt = 0u32;
        let mut delay = Duration::from_secs(1);

        loop {
            let response = match self.http.post(&url).json(&envelope).send().await {
                Ok(response) => response,
                Err(err) if attempt < self.max_retries && (err.is_timeout() || err.is_connect()) => {
                    attempt += 1;
                    warn!(
                        endpoint,
                        call_name,
                        attempt,
                        max = self.max_retries,
                        error = %err,
                        "transient transport error, retrying after {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let status = response.status();
            let body = response.text().await?;

            // Omie wraps business errors in a fault envelope, often with
            // a 500 status; those are terminal regardless of status.
            if let Ok(value) = serde_json::from_str::<Value>(&body) {
                if let Some(message) = value.get("faultstring").and_then(Value::as_str) {
                    return Err(OmieError::Fault {
                        code: value
                            .get("faultcode")
                            .and_then(Value::as_str)
                            .unwrap_or("UNKNOWN")
                            .to_string(),
                        message: message.to_string(),
                    });
                }
                if status.is_success() {
                    return Ok(value);
                }
            } else if status.is_success() {
                return Err(OmieError::InvalidResponse {
                    endpoint: endpoint.to_string(),
                    reason: "body is not JSON".to_string(),
                });
            }

            if status.is_server_error() && attempt < self.max_retries {
                attempt += 1;
                warn!(
                    endpoint,
                    call_name,
                    attempt,
                    max = self.max_retries,
                    status = status.as_u16(),
                    "server error, retrying after {delay:?}"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }

            return Err(OmieError::Status {
                status: status.as_u16(),
                body,
            });
        }
    }
}

/// Result of a paged fetch: every item across pages, plus the number of
/// pages actually fetched.
#[derive(Debug, Clone)]
pub struct PagedFetch {
    /// Concatenated items from every fetched page.
    pub items: Vec<Value>,
    /// Pages fetched (zero when the first page was empty).
    pub pages: u32,
}

/// Fetches every page of a listing call.
///
/// Increments the resource's page parameter until the server-reported
/// total page count is reached or `page_cap` is hit. The first page
/// failing to parse fails the whole fetch; a first page with no result
/// array is zero pages, not an error.
///
/// # Errors
///
/// Returns an error if a call fails or the first response is not a JSON
/// object.
pub async fn fetch_all_pages(
    transport: &dyn OmieTransport,
    resource: OmieResource,
    base_params: Map<String, Value>,
    page_cap: u32,
) -> Result<PagedFetch, OmieError> {
    let mut items: Vec<Value> = Vec::new();
    let mut pages_fetched = 0u32;
    let mut total_pages: Option<u32> = None;
    let mut page = 1u32;

    loop {
        if page > page_cap {
            warn!(resource = %resource, page_cap, "page cap reached, stopping fetch");
            break;
        }

        let mut param = base_params.clone();
        param.insert(resource.page_param().to_string(), json!(page));

        let response = transport
            .call(resource.endpoint(), resource.call_name(), Value::Object(param))
            .await?;

        if !response.is_object() {
            return Err(OmieError::InvalidResponse {
                endpoint: resource.endpoint().to_string(),
                reason: "expected a JSON object".to_string(),
            });
        }

        match extract_items(resource, &response) {
            None => {
                // Can mean "no data" or an unrecognized shape; the
                // distinction is not observable, so it is logged.
                debug!(resource = %resource, page, "response carries no result array");
                break;
            }
            Some((page_items, path)) => {
                if let ExtractionPath::Heuristic(field) = &path {
                    warn!(
                        resource = %resource,
                        field = %field,
                        "result array located by heuristic, declare this shape"
                    );
                }
                if page_items.is_empty() {
                    break;
                }
                items.extend(page_items.iter().cloned());
                pages_fetched += 1;
            }
        }

        if total_pages.is_none() {
            total_pages = extract_total_pages(&response);
        }
        match total_pages {
            Some(total) if page < total => page += 1,
            // No reported total: a single page is all there is.
            _ => break,
        }
    }

    Ok(PagedFetch {
        items,
        pages: pages_fetched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::{always, eq};
    use serde_json::json;

    fn page_response(page: u32, total: u32, codes: &[&str]) -> Value {
        let items: Vec<Value> = codes.iter().map(|code| json!({"codigo": code})).collect();
        json!({
            "pagina": page,
            "total_de_paginas": total,
            "categoria_cadastro": items,
        })
    }

    #[tokio::test]
    async fn test_fetch_concatenates_pages_until_reported_total() {
        let mut transport = MockOmieTransport::new();
        transport
            .expect_call()
            .with(eq("geral/categorias/"), eq("ListarCategorias"), always())
            .times(3)
            .returning(|_, _, param| {
                let page = param.get("pagina").and_then(Value::as_u64).unwrap_or(0);
                let codes: Vec<&str> = match page {
                    1 => vec!["1.01", "1.02"],
                    2 => vec!["2.01"],
                    _ => vec!["3.01"],
                };
                Ok(page_response(u32::try_from(page).unwrap_or(0), 3, &codes))
            });

        let result = fetch_all_pages(
            &transport,
            OmieResource::Categories,
            Map::new(),
            200,
        )
        .await
        .unwrap();

        assert_eq!(result.pages, 3);
        assert_eq!(result.items.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_respects_page_cap() {
        let mut transport = MockOmieTransport::new();
        transport
            .expect_call()
            .times(2)
            .returning(|_, _, param| {
                let page = param.get("pagina").and_then(Value::as_u64).unwrap_or(0);
                Ok(page_response(
                    u32::try_from(page).unwrap_or(0),
                    50,
                    &["x"],
                ))
            });

        let result = fetch_all_pages(&transport, OmieResource::Categories, Map::new(), 2)
            .await
            .unwrap();

        assert_eq!(result.pages, 2);
        assert_eq!(result.items.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_empty_first_page_is_zero_pages() {
        let mut transport = MockOmieTransport::new();
        transport
            .expect_call()
            .times(1)
            .returning(|_, _, _| Ok(page_response(1, 0, &[])));

        let result = fetch_all_pages(&transport, OmieResource::Categories, Map::new(), 200)
            .await
            .unwrap();

        assert_eq!(result.pages, 0);
        assert!(result.items.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_missing_array_is_zero_pages() {
        let mut transport = MockOmieTransport::new();
        transport
            .expect_call()
            .times(1)
            .returning(|_, _, _| Ok(json!({"pagina": 1, "total_de_paginas": 0})));

        let result = fetch_all_pages(&transport, OmieResource::Categories, Map::new(), 200)
            .await
            .unwrap();

        assert_eq!(result.pages, 0);
    }

    #[tokio::test]
    async fn test_fetch_non_object_first_page_fails_fast() {
        let mut transport = MockOmieTransport::new();
        transport
            .expect_call()
            .times(1)
            .returning(|_, _, _| Ok(json!([1, 2, 3])));

        let err = fetch_all_pages(&transport, OmieResource::Categories, Map::new(), 200)
            .await
            .unwrap_err();

        assert!(matches!(err, OmieError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_transport_error_propagates() {
        let mut transport = MockOmieTransport::new();
        transport.expect_call().times(1).returning(|_, _, _| {
            Err(OmieError::Status {
                status: 401,
                body: "invalid app_key".to_string(),
            })
        });

        let err = fetch_all_pages(&transport, OmieResource::Movements, Map::new(), 200)
            .await
            .unwrap_err();

        assert!(matches!(err, OmieError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_fetch_heuristic_shape_still_extracts() {
        let mut transport = MockOmieTransport::new();
        transport.expect_call().times(1).returning(|_, _, _| {
            Ok(json!({
                "nPagina": 1,
                "nTotPaginas": 1,
                "registros_financeiros": [{"nCodMovCC": 1}],
            }))
        });

        let result = fetch_all_pages(&transport, OmieResource::Movements, Map::new(), 200)
            .await
            .unwrap();

        assert_eq!(result.pages, 1);
        assert_eq!(result.items.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_single_page_when_total_missing() {
        let mut transport = MockOmieTransport::new();
        transport.expect_call().times(1).returning(|_, _, _| {
            Ok(json!({"categoria_cadastro": [{"codigo": "1.01"}]}))
        });

        let result = fetch_all_pages(&transport, OmieResource::Categories, Map::new(), 200)
            .await
            .unwrap();

        assert_eq!(result.pages, 1);
        assert_eq!(result.items.len(), 1);
    }
}
