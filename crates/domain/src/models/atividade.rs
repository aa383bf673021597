//! Atividade domain model, lifecycle status and payloads.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of an activity.
///
/// OPEN -> CLOSED happens automatically when capacity is reached; CANCELED is
/// an explicit creator decision. No transition ever returns to OPEN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusAtividade {
    Open,
    Closed,
    Canceled,
}

impl StatusAtividade {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusAtividade::Open => "OPEN",
            StatusAtividade::Closed => "CLOSED",
            StatusAtividade::Canceled => "CANCELED",
        }
    }

    /// Parses the database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(StatusAtividade::Open),
            "CLOSED" => Some(StatusAtividade::Closed),
            "CANCELED" => Some(StatusAtividade::Canceled),
            _ => None,
        }
    }
}

/// A scheduled, located, capacity-bounded sports activity.
///
/// `latitude`/`longitude` are resolved from the CEP exactly once, at
/// creation. `capacidade` only matters while `sem_limite` is false.
#[derive(Debug, Clone)]
pub struct Atividade {
    pub id: Uuid,
    pub criador_id: Uuid,
    pub criador_nome: String,
    pub modalidade_id: i64,
    pub modalidade_nome: String,
    pub titulo: String,
    pub observacoes: Option<String>,
    pub data: NaiveDate,
    pub horario: NaiveTime,
    pub cep: String,
    pub uf: String,
    pub street: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacidade: Option<i32>,
    pub sem_limite: bool,
    pub status: StatusAtividade,
    pub participantes_count: i64,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

/// Creation payload. Status is never accepted from the client; new
/// activities always start OPEN.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAtividadeRequest {
    #[validate(length(min = 2, max = 50, message = "campo fora do tamanho permitido"))]
    pub titulo: String,

    #[validate(length(max = 500, message = "campo fora do tamanho permitido"))]
    pub observacoes: Option<String>,

    #[validate(custom(function = "shared::validation::validate_not_past_date"))]
    pub data: NaiveDate,

    pub horario: NaiveTime,

    #[validate(custom(function = "shared::validation::validate_cep"))]
    pub cep: String,

    #[validate(custom(function = "shared::validation::validate_uf"))]
    pub uf: String,

    #[validate(length(min = 2, max = 120, message = "campo fora do tamanho permitido"))]
    pub street: String,

    pub capacidade: Option<i32>,

    #[validate(length(min = 1, message = "campo Obrigatorio"))]
    pub modalidade: String,

    #[serde(default)]
    pub sem_limite: bool,
}

impl CreateAtividadeRequest {
    /// A bounded activity needs a positive capacity; an unlimited one
    /// ignores the field entirely.
    pub fn capacidade_valida(&self) -> bool {
        self.sem_limite || matches!(self.capacidade, Some(c) if c > 0)
    }
}

/// Partial update payload; absent fields stay untouched.
///
/// `status` only accepts CLOSED or CANCELED; reopening is rejected by the
/// service. CEP changes never re-resolve coordinates.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAtividadeRequest {
    #[validate(length(min = 2, max = 50, message = "campo fora do tamanho permitido"))]
    pub titulo: Option<String>,

    #[validate(length(max = 500, message = "campo fora do tamanho permitido"))]
    pub observacoes: Option<String>,

    #[validate(custom(function = "shared::validation::validate_not_past_date"))]
    pub data: Option<NaiveDate>,

    pub horario: Option<NaiveTime>,

    #[validate(custom(function = "shared::validation::validate_cep"))]
    pub cep: Option<String>,

    #[validate(custom(function = "shared::validation::validate_uf"))]
    pub uf: Option<String>,

    #[validate(length(min = 2, max = 120, message = "campo fora do tamanho permitido"))]
    pub street: Option<String>,

    pub capacidade: Option<i32>,

    pub sem_limite: Option<bool>,

    pub status: Option<StatusAtividade>,
}

impl UpdateAtividadeRequest {
    /// Copies the present fields onto `atividade`.
    ///
    /// `status` is left to the service, which enforces the transition rules.
    pub fn merge_into(&self, atividade: &mut Atividade) {
        if let Some(titulo) = &self.titulo {
            atividade.titulo = titulo.clone();
        }
        if let Some(observacoes) = &self.observacoes {
            atividade.observacoes = Some(observacoes.clone());
        }
        if let Some(data) = self.data {
            atividade.data = data;
        }
        if let Some(horario) = self.horario {
            atividade.horario = horario;
        }
        if let Some(cep) = &self.cep {
            atividade.cep = shared::validation::normalize_cep(cep);
        }
        if let Some(uf) = &self.uf {
            atividade.uf = shared::validation::normalize_uf(uf);
        }
        if let Some(street) = &self.street {
            atividade.street = street.clone();
        }
        if let Some(capacidade) = self.capacidade {
            atividade.capacidade = Some(capacidade);
        }
        if let Some(sem_limite) = self.sem_limite {
            atividade.sem_limite = sem_limite;
        }
    }
}

/// Public activity representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtividadeResponse {
    pub id: Uuid,
    pub titulo: String,
    pub observacoes: Option<String>,
    pub data: NaiveDate,
    pub horario: NaiveTime,
    pub cep: String,
    pub uf: String,
    pub street: String,
    pub status: StatusAtividade,
    pub capacidade: Option<i32>,
    pub sem_limite: bool,
    pub criador_id: Uuid,
    pub criador_nome: String,
    pub modalidade_nome: String,
    pub participantes_count: i64,
}

impl From<Atividade> for AtividadeResponse {
    fn from(a: Atividade) -> Self {
        Self {
            id: a.id,
            titulo: a.titulo,
            observacoes: a.observacoes,
            data: a.data,
            horario: a.horario,
            cep: a.cep,
            uf: a.uf,
            street: a.street,
            status: a.status,
            capacidade: a.capacidade,
            sem_limite: a.sem_limite,
            criador_id: a.criador_id,
            criador_nome: a.criador_nome,
            modalidade_nome: a.modalidade_nome,
            participantes_count: a.participantes_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_atividade() -> Atividade {
        Atividade {
            id: Uuid::new_v4(),
            criador_id: Uuid::new_v4(),
            criador_nome: "Ana Souza".to_string(),
            modalidade_id: 1,
            modalidade_nome: "FUTEBOL".to_string(),
            titulo: "Pelada de sábado".to_string(),
            observacoes: None,
            data: Utc::now().date_naive().succ_opt().unwrap(),
            horario: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            cep: "01001000".to_string(),
            uf: "SP".to_string(),
            street: "Praça da Sé, 100".to_string(),
            latitude: -23.5505,
            longitude: -46.6333,
            capacidade: Some(10),
            sem_limite: false,
            status: StatusAtividade::Open,
            participantes_count: 1,
            criado_em: Utc::now(),
            atualizado_em: Utc::now(),
        }
    }

    fn valid_create_json() -> String {
        let tomorrow = Utc::now().date_naive().succ_opt().unwrap();
        format!(
            r#"{{
                "titulo": "Pelada de sábado",
                "data": "{}",
                "horario": "09:30:00",
                "cep": "01001-000",
                "uf": "SP",
                "street": "Praça da Sé, 100",
                "capacidade": 10,
                "modalidade": "FUTEBOL",
                "semLimite": false
            }}"#,
            tomorrow
        )
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            StatusAtividade::Open,
            StatusAtividade::Closed,
            StatusAtividade::Canceled,
        ] {
            assert_eq!(StatusAtividade::from_str(status.as_str()), Some(status));
        }
        assert_eq!(StatusAtividade::from_str("PAUSED"), None);
    }

    #[test]
    fn test_status_serde_uppercase() {
        assert_eq!(
            serde_json::to_string(&StatusAtividade::Canceled).unwrap(),
            "\"CANCELED\""
        );
        let parsed: StatusAtividade = serde_json::from_str("\"OPEN\"").unwrap();
        assert_eq!(parsed, StatusAtividade::Open);
    }

    #[test]
    fn test_create_request_valid() {
        let request: CreateAtividadeRequest =
            serde_json::from_str(&valid_create_json()).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_capacidade_valida_requires_capacity_when_limited() {
        let mut request: CreateAtividadeRequest =
            serde_json::from_str(&valid_create_json()).unwrap();
        assert!(request.capacidade_valida());

        request.capacidade = None;
        assert!(!request.capacidade_valida());

        request.capacidade = Some(0);
        assert!(!request.capacidade_valida());

        request.sem_limite = true;
        assert!(request.capacidade_valida());
    }

    #[test]
    fn test_create_request_rejects_past_date() {
        let mut request: CreateAtividadeRequest =
            serde_json::from_str(&valid_create_json()).unwrap();
        request.data = Utc::now().date_naive().pred_opt().unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_merge_changes_only_titulo() {
        let mut atividade = sample_atividade();
        let original = atividade.clone();

        let update = UpdateAtividadeRequest {
            titulo: Some("Pelada de domingo".to_string()),
            ..Default::default()
        };
        update.merge_into(&mut atividade);

        assert_eq!(atividade.titulo, "Pelada de domingo");
        assert_eq!(atividade.observacoes, original.observacoes);
        assert_eq!(atividade.data, original.data);
        assert_eq!(atividade.horario, original.horario);
        assert_eq!(atividade.cep, original.cep);
        assert_eq!(atividade.uf, original.uf);
        assert_eq!(atividade.street, original.street);
        assert_eq!(atividade.capacidade, original.capacidade);
        assert_eq!(atividade.sem_limite, original.sem_limite);
        assert_eq!(atividade.status, original.status);
        assert_eq!(atividade.latitude, original.latitude);
        assert_eq!(atividade.longitude, original.longitude);
    }

    #[test]
    fn test_merge_never_touches_coordinates_or_status() {
        let mut atividade = sample_atividade();

        let update = UpdateAtividadeRequest {
            cep: Some("20040-020".to_string()),
            status: Some(StatusAtividade::Canceled),
            ..Default::default()
        };
        update.merge_into(&mut atividade);

        // Address text changes; the geocoded point and status do not.
        assert_eq!(atividade.cep, "20040020");
        assert_eq!(atividade.latitude, -23.5505);
        assert_eq!(atividade.longitude, -46.6333);
        assert_eq!(atividade.status, StatusAtividade::Open);
    }

    #[test]
    fn test_update_request_all_fields_optional() {
        let update: UpdateAtividadeRequest = serde_json::from_str("{}").unwrap();
        assert!(update.validate().is_ok());
        assert!(update.titulo.is_none());
        assert!(update.status.is_none());
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = AtividadeResponse::from(sample_atividade());
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"criadorNome\":\"Ana Souza\""));
        assert!(json.contains("\"semLimite\":false"));
        assert!(json.contains("\"participantesCount\":1"));
        assert!(json.contains("\"modalidadeNome\":\"FUTEBOL\""));
        // The geocoded point stays internal
        assert!(!json.contains("latitude"));
    }
}
