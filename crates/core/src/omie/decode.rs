//! Tolerant typed decoders for raw ERP records.
//!
//! Omie's field names vary by endpoint generation (`codigo` vs
//! `nCodProj`, `data_vencimento` vs `dDtVenc`). Every logical attribute
//! declares the full set of accepted spellings as a `const` table, so the
//! compatibility surface is enumerable and testable instead of being
//! scattered across call sites. Movements additionally nest most fields
//! under a `detalhes`/`resumo` envelope, which is probed after the top
//! level.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use super::record::{CategoryRecord, MovementRecord, PartyRecord, PayableRecord, ProjectRecord};

// ============================================================================
// Field compatibility tables (old spelling -> new spelling, in probe order)
// ============================================================================

const CATEGORY_CODE_FIELDS: &[&str] = &["codigo", "cCodCateg", "codigo_categoria"];
const CATEGORY_DESCRIPTION_FIELDS: &[&str] = &["descricao", "cDescricao", "descricao_padrao"];
const CATEGORY_PARENT_FIELDS: &[&str] = &["categoria_superior", "cCodCategSup"];

const PARTY_CODE_FIELDS: &[&str] = &["codigo_cliente_omie", "nCodCliente", "codigo_cliente"];
const PARTY_NAME_FIELDS: &[&str] = &["razao_social", "cRazaoSocial", "nome_fantasia"];
const PARTY_DOCUMENT_FIELDS: &[&str] = &["cnpj_cpf", "cCnpjCpf", "cpf_cnpj"];
const PARTY_EMAIL_FIELDS: &[&str] = &["email", "cEmail"];
const PARTY_CITY_FIELDS: &[&str] = &["cidade", "cCidade"];
const PARTY_STATE_FIELDS: &[&str] = &["estado", "cUF", "uf"];

const PROJECT_INTERNAL_CODE_FIELDS: &[&str] = &["codigo", "nCodProj"];
const PROJECT_CODE_FIELDS: &[&str] = &["codInt", "cCodInt", "codigo_integracao"];
const PROJECT_NAME_FIELDS: &[&str] = &["nome", "cNome", "nome_projeto"];
const PROJECT_INACTIVE_FIELDS: &[&str] = &["inativo", "cInativo"];

const PAYABLE_TITLE_CODE_FIELDS: &[&str] = &["codigo_lancamento_omie", "nCodTitulo"];
const PAYABLE_CLIENT_FIELDS: &[&str] = &["codigo_cliente_fornecedor", "nCodCliente"];
const PAYABLE_PROJECT_FIELDS: &[&str] = &["codigo_projeto", "nCodProjeto", "cCodProjeto"];
const PAYABLE_CATEGORY_FIELDS: &[&str] = &["codigo_categoria", "cCodCateg"];
const PAYABLE_AMOUNT_FIELDS: &[&str] = &["valor_documento", "nValorTitulo"];
const PAYABLE_DUE_FIELDS: &[&str] = &["data_vencimento", "dDtVenc"];
const PAYABLE_PAYMENT_FIELDS: &[&str] = &["data_pagamento", "dDtPagamento"];
const PAYABLE_STATUS_FIELDS: &[&str] = &["status_titulo", "cStatus"];

const MOVEMENT_COD_MOV_CC_FIELDS: &[&str] = &["nCodMovCC", "cod_mov_cc"];
const MOVEMENT_ENTRY_TYPE_FIELDS: &[&str] = &["cTipo", "cTpLancamento", "tipo"];
const MOVEMENT_NATURE_FIELDS: &[&str] = &["cNatureza", "natureza"];
const MOVEMENT_CLIENT_FIELDS: &[&str] = &["nCodCliente", "codigo_cliente_fornecedor"];
const MOVEMENT_PROJECT_FIELDS: &[&str] = &["cCodProjeto", "nCodProjeto", "codigo_projeto"];
const MOVEMENT_CATEGORY_FIELDS: &[&str] = &["cCodCateg", "codigo_categoria"];
const MOVEMENT_AMOUNT_FIELDS: &[&str] = &["nValorMovCC", "nValorTitulo", "valor_documento"];
const MOVEMENT_ISSUE_FIELDS: &[&str] = &["dDtEmissao", "data_emissao"];
const MOVEMENT_DUE_FIELDS: &[&str] = &["dDtVenc", "data_vencimento"];
const MOVEMENT_PAYMENT_FIELDS: &[&str] = &["dDtPagamento", "data_pagamento"];
const MOVEMENT_STATUS_FIELDS: &[&str] = &["cStatus", "status_titulo"];
const MOVEMENT_DESCRIPTION_FIELDS: &[&str] = &["cObs", "observacao", "descricao"];
const MOVEMENT_TITLE_ID_FIELDS: &[&str] = &["nCodTitulo", "codigo_lancamento_omie"];
const MOVEMENT_MOVEMENT_ID_FIELDS: &[&str] = &["nCodMovCCRepet", "nCodMovimento"];
const MOVEMENT_SETTLEMENT_ID_FIELDS: &[&str] = &["nCodBaixa", "codigo_baixa"];
const MOVEMENT_DOC_NUMBER_FIELDS: &[&str] = &["cNumDocto", "numero_documento"];

/// Nested envelopes probed after the top level on movement records.
const MOVEMENT_SECTIONS: &[&str] = &["detalhes", "resumo"];

// ============================================================================
// Field pickers
// ============================================================================

fn pick<'a>(record: &'a Value, fields: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .find_map(|field| record.get(field).filter(|v| !v.is_null()))
}

/// Like [`pick`], but also probes the movement `detalhes`/`resumo`
/// envelopes after the top level.
fn pick_nested<'a>(record: &'a Value, fields: &[&str]) -> Option<&'a Value> {
    pick(record, fields).or_else(|| {
        MOVEMENT_SECTIONS
            .iter()
            .filter_map(|section| record.get(section))
            .find_map(|section| pick(section, fields))
    })
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        // serde_json renders numbers losslessly; parsing the rendered
        // form avoids binary float conversion error.
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

fn value_as_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(text, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            text.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

fn pick_string(record: &Value, fields: &[&str]) -> Option<String> {
    pick_nested(record, fields).and_then(value_as_string)
}

fn pick_i64(record: &Value, fields: &[&str]) -> Option<i64> {
    pick_nested(record, fields).and_then(value_as_i64)
}

fn pick_decimal(record: &Value, fields: &[&str]) -> Option<Decimal> {
    pick_nested(record, fields).and_then(value_as_decimal)
}

fn pick_date(record: &Value, fields: &[&str]) -> Option<NaiveDate> {
    pick_nested(record, fields).and_then(value_as_date)
}

// ============================================================================
// Decoders
// ============================================================================

/// Decodes a category record; `None` when no non-empty code is present.
#[must_use]
pub fn decode_category(record: &Value) -> Option<CategoryRecord> {
    let code = pick_string(record, CATEGORY_CODE_FIELDS)?;
    Some(CategoryRecord {
        code,
        description: pick_string(record, CATEGORY_DESCRIPTION_FIELDS).unwrap_or_default(),
        parent_code: pick_string(record, CATEGORY_PARENT_FIELDS),
    })
}

/// Decodes a party record; `None` when no party code is present.
#[must_use]
pub fn decode_party(record: &Value) -> Option<PartyRecord> {
    let code = pick_i64(record, PARTY_CODE_FIELDS)?;
    Some(PartyRecord {
        code,
        name: pick_string(record, PARTY_NAME_FIELDS).unwrap_or_default(),
        cpf_cnpj: pick_string(record, PARTY_DOCUMENT_FIELDS),
        email: pick_string(record, PARTY_EMAIL_FIELDS),
        city: pick_string(record, PARTY_CITY_FIELDS),
        state: pick_string(record, PARTY_STATE_FIELDS),
    })
}

/// Decodes a project record; `None` when no internal code is present.
#[must_use]
pub fn decode_project(record: &Value) -> Option<ProjectRecord> {
    let internal_code = pick_i64(record, PROJECT_INTERNAL_CODE_FIELDS)?;
    let inactive = pick_string(record, PROJECT_INACTIVE_FIELDS)
        .is_some_and(|flag| flag.eq_ignore_ascii_case("s"));
    Some(ProjectRecord {
        internal_code,
        code: pick_string(record, PROJECT_CODE_FIELDS),
        name: pick_string(record, PROJECT_NAME_FIELDS).unwrap_or_default(),
        active: !inactive,
    })
}

/// Decodes an accounts-payable record; `None` when no title code is
/// present.
#[must_use]
pub fn decode_payable(record: &Value) -> Option<PayableRecord> {
    let title_code = pick_i64(record, PAYABLE_TITLE_CODE_FIELDS)?;
    Some(PayableRecord {
        title_code,
        client_code: pick_i64(record, PAYABLE_CLIENT_FIELDS),
        project_code: pick_i64(record, PAYABLE_PROJECT_FIELDS),
        category_code: pick_string(record, PAYABLE_CATEGORY_FIELDS),
        amount: pick_decimal(record, PAYABLE_AMOUNT_FIELDS)
            .map(|amount| amount.abs())
            .unwrap_or_default(),
        due_date: pick_date(record, PAYABLE_DUE_FIELDS),
        payment_date: pick_date(record, PAYABLE_PAYMENT_FIELDS),
        status: pick_string(record, PAYABLE_STATUS_FIELDS),
        raw: record.clone(),
    })
}

/// Decodes a movement record.
///
/// The primary key is `cod_mov_cc`; when the ERP omits it, the composite
/// `mf_key` becomes the key, provided at least one of its id components
/// is present. Records yielding neither are dropped (`None`).
///
/// Amounts are canonicalized to non-negative magnitudes here; a missing
/// or non-numeric amount defaults to zero with
/// `zero_amount_defaulted = true` so the compromise stays auditable.
#[must_use]
pub fn decode_movement(record: &Value) -> Option<MovementRecord> {
    let cod_mov_cc = pick_i64(record, MOVEMENT_COD_MOV_CC_FIELDS);
    let entry_type = pick_string(record, MOVEMENT_ENTRY_TYPE_FIELDS);

    let title_id = pick_i64(record, MOVEMENT_TITLE_ID_FIELDS);
    let movement_id = pick_i64(record, MOVEMENT_MOVEMENT_ID_FIELDS);
    let settlement_id = pick_i64(record, MOVEMENT_SETTLEMENT_ID_FIELDS);
    let doc_number = pick_string(record, MOVEMENT_DOC_NUMBER_FIELDS);

    let mf_key = composite_key(
        entry_type.as_deref(),
        title_id,
        movement_id,
        settlement_id,
        doc_number.as_deref(),
    );

    let has_composite_ids =
        title_id.is_some() || movement_id.is_some() || settlement_id.is_some();
    let key = match cod_mov_cc {
        Some(id) => id.to_string(),
        None if has_composite_ids => mf_key.clone(),
        None => return None,
    };

    let raw_amount = pick_decimal(record, MOVEMENT_AMOUNT_FIELDS);
    let zero_amount_defaulted = raw_amount.is_none();

    Some(MovementRecord {
        key,
        cod_mov_cc,
        mf_key,
        entry_type,
        nature: pick_string(record, MOVEMENT_NATURE_FIELDS).map(|n| n.to_lowercase()),
        client_code: pick_i64(record, MOVEMENT_CLIENT_FIELDS),
        project_code: pick_i64(record, MOVEMENT_PROJECT_FIELDS),
        category_code: pick_string(record, MOVEMENT_CATEGORY_FIELDS),
        amount: raw_amount.map(|amount| amount.abs()).unwrap_or_default(),
        issue_date: pick_date(record, MOVEMENT_ISSUE_FIELDS),
        due_date: pick_date(record, MOVEMENT_DUE_FIELDS),
        payment_date: pick_date(record, MOVEMENT_PAYMENT_FIELDS),
        status: pick_string(record, MOVEMENT_STATUS_FIELDS),
        description: pick_string(record, MOVEMENT_DESCRIPTION_FIELDS),
        raw: record.clone(),
        zero_amount_defaulted,
    })
}

fn composite_key(
    entry_type: Option<&str>,
    title_id: Option<i64>,
    movement_id: Option<i64>,
    settlement_id: Option<i64>,
    doc_number: Option<&str>,
) -> String {
    let render = |id: Option<i64>| id.map(|v| v.to_string()).unwrap_or_default();
    format!(
        "{}:{}:{}:{}:{}",
        entry_type.unwrap_or_default(),
        render(title_id),
        render(movement_id),
        render(settlement_id),
        doc_number.unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_decode_movement_nested_detalhes() {
        let record = json!({
            "nCodMovCC": 9_001_234,
            "detalhes": {
                "cTipo": "PAG",
                "cNatureza": "P",
                "nCodCliente": 4455,
                "cCodProjeto": 77,
                "cCodCateg": "2.01.03",
                "nValorMovCC": -1500.75,
                "dDtEmissao": "02/03/2025",
                "dDtPagamento": "10/03/2025",
                "cStatus": "LIQUIDADO",
                "cNumDocto": "NF-123"
            }
        });

        let movement = decode_movement(&record).unwrap();
        assert_eq!(movement.key, "9001234");
        assert_eq!(movement.cod_mov_cc, Some(9_001_234));
        assert_eq!(movement.nature.as_deref(), Some("p"));
        assert_eq!(movement.client_code, Some(4455));
        assert_eq!(movement.project_code, Some(77));
        assert_eq!(movement.category_code.as_deref(), Some("2.01.03"));
        // Magnitude canonicalization: sign is carried by nature alone.
        assert_eq!(movement.amount, dec!(1500.75));
        assert!(!movement.zero_amount_defaulted);
        assert_eq!(
            movement.issue_date,
            NaiveDate::from_ymd_opt(2025, 3, 2)
        );
        assert_eq!(
            movement.payment_date,
            NaiveDate::from_ymd_opt(2025, 3, 10)
        );
    }

    #[test]
    fn test_decode_movement_composite_fallback_key() {
        let record = json!({
            "detalhes": {
                "cTipo": "REC",
                "nCodTitulo": 555,
                "nCodBaixa": 42,
                "cNumDocto": "DOC-9",
                "nValorTitulo": "250,50"
            }
        });

        let movement = decode_movement(&record).unwrap();
        assert_eq!(movement.key, "REC:555::42:DOC-9");
        assert_eq!(movement.mf_key, "REC:555::42:DOC-9");
        assert_eq!(movement.cod_mov_cc, None);
        assert_eq!(movement.amount, dec!(250.50));
    }

    #[test]
    fn test_decode_movement_dropped_without_any_key() {
        let record = json!({
            "detalhes": {"cTipo": "REC", "cNumDocto": "DOC-9"}
        });
        assert!(decode_movement(&record).is_none());
    }

    #[test]
    fn test_decode_movement_amount_default_is_audited() {
        let record = json!({
            "nCodMovCC": 1,
            "detalhes": {"cTipo": "PAG", "nValorMovCC": "n/a"}
        });

        let movement = decode_movement(&record).unwrap();
        assert_eq!(movement.amount, Decimal::ZERO);
        assert!(movement.zero_amount_defaulted);
    }

    #[test]
    fn test_decode_movement_mf_key_kept_alongside_erp_id() {
        let record = json!({
            "nCodMovCC": 10,
            "detalhes": {"cTipo": "PAG", "nCodTitulo": 3}
        });

        let movement = decode_movement(&record).unwrap();
        assert_eq!(movement.key, "10");
        assert_eq!(movement.mf_key, "PAG:3:::");
    }

    #[rstest]
    #[case(json!("05/02/2025"), Some((2025, 2, 5)))]
    #[case(json!("2025-02-05"), Some((2025, 2, 5)))]
    #[case(json!("2025-02-05T10:30:00Z"), Some((2025, 2, 5)))]
    #[case(json!(""), None)]
    #[case(json!("not a date"), None)]
    fn test_date_parsing(#[case] value: Value, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        assert_eq!(value_as_date(&value), expected);
    }

    #[test]
    fn test_decode_party_spelling_variants() {
        let old_style = json!({
            "codigo_cliente_omie": 4455,
            "razao_social": "Construtora Alfa LTDA",
            "cnpj_cpf": "12.345.678/0001-90",
            "cidade": "SAO PAULO",
            "estado": "SP"
        });
        let new_style = json!({
            "nCodCliente": 4455,
            "cRazaoSocial": "Construtora Alfa LTDA",
            "cCnpjCpf": "12.345.678/0001-90",
            "cUF": "SP"
        });

        let a = decode_party(&old_style).unwrap();
        let b = decode_party(&new_style).unwrap();
        assert_eq!(a.code, b.code);
        assert_eq!(a.name, b.name);
        assert_eq!(a.cpf_cnpj, b.cpf_cnpj);
        assert_eq!(a.state, b.state);
    }

    #[test]
    fn test_decode_project_inactive_flag() {
        let active = json!({"codigo": 77, "nome": "Residencial Aurora", "inativo": "N"});
        let inactive = json!({"codigo": 78, "nome": "Edificio Horizonte", "inativo": "S"});

        assert!(decode_project(&active).unwrap().active);
        assert!(!decode_project(&inactive).unwrap().active);
    }

    #[test]
    fn test_decode_category_and_missing_code_dropped() {
        let record = json!({"codigo": "1.04.02", "descricao": "Aporte de capital"});
        let category = decode_category(&record).unwrap();
        assert_eq!(category.code, "1.04.02");
        assert_eq!(category.description, "Aporte de capital");

        assert!(decode_category(&json!({"descricao": "orphan"})).is_none());
    }

    #[test]
    fn test_decode_payable() {
        let record = json!({
            "codigo_lancamento_omie": 321,
            "codigo_cliente_fornecedor": 4455,
            "codigo_projeto": 77,
            "codigo_categoria": "3.01",
            "valor_documento": 1000.0,
            "data_vencimento": "15/04/2025",
            "status_titulo": "A PAGAR"
        });

        let payable = decode_payable(&record).unwrap();
        assert_eq!(payable.title_code, 321);
        assert_eq!(payable.amount, dec!(1000));
        assert_eq!(payable.due_date, NaiveDate::from_ymd_opt(2025, 4, 15));
        assert_eq!(payable.latest_date(), NaiveDate::from_ymd_opt(2025, 4, 15));
    }
}
