//! Omie resource catalog and response-shape adapters.
//!
//! Each listing endpoint wraps its result array in a different field
//! (`categoria_cadastro`, `clientes_cadastro`, ...) and names its paging
//! parameters differently (`pagina` vs `nPagina`). Instead of sniffing
//! response shapes at runtime, every resource declares its shape here and
//! extraction is selected by resource identity. A generic probe over the
//! known field list, and finally a first-array heuristic, remain as
//! fallbacks; callers are told which path was taken so the heuristic can
//! be logged.

use serde_json::Value;

/// Array fields known to carry listing results across Omie endpoints.
const KNOWN_ITEM_FIELDS: &[&str] = &[
    "categoria_cadastro",
    "clientes_cadastro",
    "cadastro",
    "conta_pagar_cadastro",
    "movimentos",
    "lista",
];

/// Fields known to carry the server-reported total page count.
const KNOWN_TOTAL_PAGES_FIELDS: &[&str] = &["total_de_paginas", "nTotPaginas"];

/// An Omie listing resource synchronized by this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OmieResource {
    /// Chart-of-accounts categories (`geral/categorias`).
    Categories,
    /// Clients and suppliers (`geral/clientes`).
    Clients,
    /// Projects (`geral/projetos`).
    Projects,
    /// Accounts-payable titles (`financas/contapagar`).
    AccountsPayable,
    /// Cash-flow ledger movements (`financas/mf`).
    Movements,
}

impl OmieResource {
    /// Every resource, in orchestrator sync order.
    pub const ALL: [Self; 5] = [
        Self::Categories,
        Self::Clients,
        Self::Projects,
        Self::AccountsPayable,
        Self::Movements,
    ];

    /// Endpoint path relative to the API base URL.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Categories => "geral/categorias/",
            Self::Clients => "geral/clientes/",
            Self::Projects => "geral/projetos/",
            Self::AccountsPayable => "financas/contapagar/",
            Self::Movements => "financas/mf/",
        }
    }

    /// Remote procedure name for the listing call.
    #[must_use]
    pub const fn call_name(self) -> &'static str {
        match self {
            Self::Categories => "ListarCategorias",
            Self::Clients => "ListarClientes",
            Self::Projects => "ListarProjetos",
            Self::AccountsPayable => "ListarContasPagar",
            Self::Movements => "ListarMovimentos",
        }
    }

    /// Name of the page-number parameter.
    #[must_use]
    pub const fn page_param(self) -> &'static str {
        match self {
            Self::Movements => "nPagina",
            _ => "pagina",
        }
    }

    /// Name of the records-per-page parameter.
    #[must_use]
    pub const fn per_page_param(self) -> &'static str {
        match self {
            Self::Movements => "nRegPorPagina",
            _ => "registros_por_pagina",
        }
    }

    /// Field carrying the result array in this endpoint's responses.
    #[must_use]
    pub const fn items_field(self) -> &'static str {
        match self {
            Self::Categories => "categoria_cadastro",
            Self::Clients => "clientes_cadastro",
            Self::Projects => "cadastro",
            Self::AccountsPayable => "conta_pagar_cadastro",
            Self::Movements => "movimentos",
        }
    }

    /// Checkpoint source name for this resource.
    #[must_use]
    pub const fn checkpoint_source(self) -> &'static str {
        match self {
            Self::Categories => "omie_categories",
            Self::Clients => "omie_parties",
            Self::Projects => "omie_projects",
            Self::AccountsPayable => "omie_payables",
            Self::Movements => "omie_mf_movements",
        }
    }

    /// Fallback fetch-window size when no checkpoint exists.
    #[must_use]
    pub const fn default_lookback_days(self) -> i64 {
        match self {
            Self::Categories | Self::Clients | Self::Projects => 30,
            Self::AccountsPayable => 15,
            Self::Movements => 7,
        }
    }

    /// Whether the endpoint honors a server-side since-date filter.
    ///
    /// The catalog endpoints either ignore the filter or misbehave with
    /// it, so their jobs always perform a full fetch.
    #[must_use]
    pub const fn supports_since_filter(self) -> bool {
        matches!(self, Self::AccountsPayable | Self::Movements)
    }

    /// Parameter name of the since-date filter, where supported.
    #[must_use]
    pub const fn since_param(self) -> Option<&'static str> {
        match self {
            Self::AccountsPayable => Some("filtrar_por_data_de"),
            Self::Movements => Some("dDtRegDe"),
            _ => None,
        }
    }

    /// Upsert batch size for this resource.
    #[must_use]
    pub const fn batch_size(self) -> usize {
        match self {
            Self::Categories | Self::Clients | Self::Projects => 200,
            Self::AccountsPayable => 300,
            Self::Movements => 500,
        }
    }

    /// Stable lowercase name used by the CLI and in step reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Clients => "parties",
            Self::Projects => "projects",
            Self::AccountsPayable => "payables",
            Self::Movements => "movements",
        }
    }
}

impl std::fmt::Display for OmieResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for OmieResource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "categories" => Ok(Self::Categories),
            "parties" | "clients" => Ok(Self::Clients),
            "projects" => Ok(Self::Projects),
            "payables" | "accounts-payable" => Ok(Self::AccountsPayable),
            "movements" => Ok(Self::Movements),
            other => Err(format!("unknown resource: {other}")),
        }
    }
}

/// How the result array was located in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionPath {
    /// The resource's declared field was present.
    Declared,
    /// Found under another known field name.
    KnownField(&'static str),
    /// Last resort: first array-valued field in the response.
    Heuristic(String),
}

/// Extracts the result array from a listing response.
///
/// Probes the resource's declared field, then every known field name,
/// and finally falls back to the first array-valued field found. Returns
/// the path taken alongside the items so callers can log heuristic hits.
/// `None` means the response carries no array at all (zero pages).
#[must_use]
pub fn extract_items(resource: OmieResource, response: &Value) -> Option<(&Vec<Value>, ExtractionPath)> {
    if let Some(items) = response.get(resource.items_field()).and_then(Value::as_array) {
        return Some((items, ExtractionPath::Declared));
    }

    for field in KNOWN_ITEM_FIELDS {
        if let Some(items) = response.get(field).and_then(Value::as_array) {
            return Some((items, ExtractionPath::KnownField(field)));
        }
    }

    response.as_object().and_then(|map| {
        map.iter().find_map(|(key, value)| {
            value
                .as_array()
                .map(|items| (items, ExtractionPath::Heuristic(key.clone())))
        })
    })
}

/// Extracts the server-reported total page count, when present.
#[must_use]
pub fn extract_total_pages(response: &Value) -> Option<u32> {
    KNOWN_TOTAL_PAGES_FIELDS.iter().find_map(|field| {
        response
            .get(field)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_items_declared_field() {
        let response = json!({
            "pagina": 1,
            "total_de_paginas": 3,
            "categoria_cadastro": [{"codigo": "1.01"}, {"codigo": "1.02"}]
        });

        let (items, path) = extract_items(OmieResource::Categories, &response).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(path, ExtractionPath::Declared);
    }

    #[test]
    fn test_extract_items_known_field_fallback() {
        // Movements response answered with the generic "cadastro" envelope.
        let response = json!({
            "nPagina": 1,
            "cadastro": [{"nCodMovCC": 7}]
        });

        let (items, path) = extract_items(OmieResource::Movements, &response).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(path, ExtractionPath::KnownField("cadastro"));
    }

    #[test]
    fn test_extract_items_heuristic_fallback() {
        let response = json!({
            "pagina": 1,
            "registros": [{"codigo": "x"}]
        });

        let (items, path) = extract_items(OmieResource::Projects, &response).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(path, ExtractionPath::Heuristic("registros".to_string()));
    }

    #[test]
    fn test_extract_items_no_array() {
        let response = json!({"pagina": 1, "total_de_paginas": 0});
        assert!(extract_items(OmieResource::Categories, &response).is_none());
    }

    #[test]
    fn test_extract_total_pages_variants() {
        assert_eq!(
            extract_total_pages(&json!({"total_de_paginas": 4})),
            Some(4)
        );
        assert_eq!(extract_total_pages(&json!({"nTotPaginas": 9})), Some(9));
        assert_eq!(extract_total_pages(&json!({"outro": 1})), None);
    }

    #[test]
    fn test_resource_round_trip_names() {
        for resource in OmieResource::ALL {
            let parsed: OmieResource = resource.name().parse().unwrap();
            assert_eq!(parsed, resource);
        }
        assert!("invoices".parse::<OmieResource>().is_err());
    }
}
