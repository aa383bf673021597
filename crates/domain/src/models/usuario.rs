//! User domain model, registration/update payloads and responses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Gender options offered at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Genero {
    Masculino,
    Feminino,
    Outro,
}

impl Genero {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Genero::Masculino => "MASCULINO",
            Genero::Feminino => "FEMININO",
            Genero::Outro => "OUTRO",
        }
    }

    /// Parses the database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "MASCULINO" => Some(Genero::Masculino),
            "FEMININO" => Some(Genero::Feminino),
            "OUTRO" => Some(Genero::Outro),
            _ => None,
        }
    }
}

/// A registered user.
///
/// `email` and `username` are stored lowercase; `cep` as bare digits; `uf`
/// uppercase. `password_hash` only ever holds an Argon2 PHC string.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub genero: Genero,
    pub username: String,
    pub email: String,
    pub data_nascimento: NaiveDate,
    pub password_hash: String,
    pub phone: String,
    pub cep: String,
    pub uf: String,
    pub street: String,
    pub modalidades: Vec<String>,
    pub data_cadastro: DateTime<Utc>,
}

/// Authentication principal, decoupled from the domain entity.
///
/// Carries exactly what the auth layer needs to check credentials and stamp
/// tokens; handlers never see the password hash through `User` responses.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub authorities: Vec<String>,
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[validate(length(min = 2, max = 100, message = "campo fora do tamanho permitido"))]
    pub name: String,

    pub genero: Genero,

    #[validate(length(min = 2, max = 50, message = "campo fora do tamanho permitido"))]
    pub username: String,

    #[validate(email(message = "email inválido"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_past_date"))]
    pub data_nascimento: NaiveDate,

    #[validate(length(min = 8, message = "A senha precisa ter no minimo 8 caracteres"))]
    pub password: String,

    #[validate(length(min = 1, message = "campo Obrigatorio"))]
    pub phone: String,

    #[validate(custom(function = "shared::validation::validate_cep"))]
    pub cep: String,

    #[validate(custom(function = "shared::validation::validate_uf"))]
    pub uf: String,

    #[validate(length(min = 2, max = 120, message = "campo fora do tamanho permitido"))]
    pub street: String,

    #[validate(length(min = 1, message = "informe ao menos uma modalidade"))]
    #[validate(custom(function = "validate_unique_nomes"))]
    pub modalidades_nomes: Vec<String>,
}

/// Rejects duplicated modalidade names (compared case-insensitively).
fn validate_unique_nomes(nomes: &[String]) -> Result<(), validator::ValidationError> {
    let mut seen = std::collections::HashSet::new();
    for nome in nomes {
        if !seen.insert(nome.to_uppercase()) {
            let mut err = validator::ValidationError::new("nomes_duplicados");
            err.message = Some("A lista não pode conter modalidades duplicadas".into());
            return Err(err);
        }
    }
    Ok(())
}

/// Partial profile update; absent fields stay untouched.
///
/// Exception: `modalidades_nomes`, when present (even empty), fully replaces
/// the stored set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 100, message = "Nome fora do tamanho permitido"))]
    pub name: Option<String>,

    pub genero: Option<Genero>,

    #[validate(custom(function = "shared::validation::validate_past_date"))]
    pub data_nascimento: Option<NaiveDate>,

    #[validate(length(min = 8, message = "A senha deve ter no mínimo 8 caracteres"))]
    pub password: Option<String>,

    pub phone: Option<String>,

    #[validate(custom(function = "shared::validation::validate_cep"))]
    pub cep: Option<String>,

    #[validate(custom(function = "shared::validation::validate_uf"))]
    pub uf: Option<String>,

    #[validate(length(min = 2, max = 120, message = "campo fora do tamanho permitido"))]
    pub street: Option<String>,

    #[validate(custom(function = "validate_unique_nomes"))]
    pub modalidades_nomes: Option<Vec<String>>,
}

impl UpdateUserRequest {
    /// Copies the present fields onto `user`.
    ///
    /// Password and modalidades are deliberately not handled here: the
    /// password needs re-hashing and the modalidade list needs existence
    /// checks, both the service's job.
    pub fn merge_into(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(genero) = self.genero {
            user.genero = genero;
        }
        if let Some(data_nascimento) = self.data_nascimento {
            user.data_nascimento = data_nascimento;
        }
        if let Some(phone) = &self.phone {
            user.phone = phone.clone();
        }
        if let Some(cep) = &self.cep {
            user.cep = shared::validation::normalize_cep(cep);
        }
        if let Some(uf) = &self.uf {
            user.uf = shared::validation::normalize_uf(uf);
        }
        if let Some(street) = &self.street {
            user.street = street.clone();
        }
    }

    /// True when the payload carries a password worth re-hashing.
    pub fn has_new_password(&self) -> bool {
        self.password
            .as_deref()
            .map(|p| !p.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Public user representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    pub genero: Genero,
    pub phone: String,
    pub modalidades: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            username: user.username,
            genero: user.genero,
            phone: user.phone,
            modalidades: user.modalidades,
        }
    }
}

impl From<&User> for Credential {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            authorities: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ana Souza".to_string(),
            genero: Genero::Feminino,
            username: "anasouza".to_string(),
            email: "ana@example.com".to_string(),
            data_nascimento: NaiveDate::from_ymd_opt(1995, 3, 14).unwrap(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            phone: "11988887777".to_string(),
            cep: "01001000".to_string(),
            uf: "SP".to_string(),
            street: "Praça da Sé, 100".to_string(),
            modalidades: vec!["FUTEBOL".to_string()],
            data_cadastro: Utc::now(),
        }
    }

    #[test]
    fn test_genero_roundtrip() {
        for genero in [Genero::Masculino, Genero::Feminino, Genero::Outro] {
            assert_eq!(Genero::from_str(genero.as_str()), Some(genero));
        }
        assert_eq!(Genero::from_str("INDEFINIDO"), None);
    }

    #[test]
    fn test_genero_serde_uppercase() {
        assert_eq!(
            serde_json::to_string(&Genero::Masculino).unwrap(),
            "\"MASCULINO\""
        );
        let parsed: Genero = serde_json::from_str("\"OUTRO\"").unwrap();
        assert_eq!(parsed, Genero::Outro);
    }

    #[test]
    fn test_register_request_deserializes_camel_case() {
        let json = r#"{
            "name": "Ana Souza",
            "genero": "FEMININO",
            "username": "anasouza",
            "email": "ana@example.com",
            "dataNascimento": "1995-03-14",
            "password": "senha-forte",
            "phone": "11988887777",
            "cep": "01001-000",
            "uf": "SP",
            "street": "Praça da Sé, 100",
            "modalidadesNomes": ["FUTEBOL", "VOLEI"]
        }"#;

        let request: RegisterUserRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.modalidades_nomes.len(), 2);
    }

    #[test]
    fn test_register_request_rejects_short_password() {
        let json = r#"{
            "name": "Ana Souza",
            "genero": "FEMININO",
            "username": "anasouza",
            "email": "ana@example.com",
            "dataNascimento": "1995-03-14",
            "password": "curta",
            "phone": "11988887777",
            "cep": "01001-000",
            "uf": "SP",
            "street": "Praça da Sé, 100",
            "modalidadesNomes": ["FUTEBOL"]
        }"#;

        let request: RegisterUserRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_rejects_duplicate_modalidades() {
        let json = r#"{
            "name": "Ana Souza",
            "genero": "FEMININO",
            "username": "anasouza",
            "email": "ana@example.com",
            "dataNascimento": "1995-03-14",
            "password": "senha-forte",
            "phone": "11988887777",
            "cep": "01001-000",
            "uf": "SP",
            "street": "Praça da Sé, 100",
            "modalidadesNomes": ["FUTEBOL", "futebol"]
        }"#;

        let request: RegisterUserRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_merge_only_touches_present_fields() {
        let mut user = sample_user();
        let original = user.clone();

        let update = UpdateUserRequest {
            name: Some("Ana S. Lima".to_string()),
            ..Default::default()
        };
        update.merge_into(&mut user);

        assert_eq!(user.name, "Ana S. Lima");
        assert_eq!(user.genero, original.genero);
        assert_eq!(user.email, original.email);
        assert_eq!(user.username, original.username);
        assert_eq!(user.phone, original.phone);
        assert_eq!(user.cep, original.cep);
        assert_eq!(user.uf, original.uf);
        assert_eq!(user.street, original.street);
        assert_eq!(user.password_hash, original.password_hash);
        assert_eq!(user.modalidades, original.modalidades);
    }

    #[test]
    fn test_merge_normalizes_cep_and_uf() {
        let mut user = sample_user();
        let update = UpdateUserRequest {
            cep: Some("20040-020".to_string()),
            uf: Some("rj".to_string()),
            ..Default::default()
        };
        update.merge_into(&mut user);

        assert_eq!(user.cep, "20040020");
        assert_eq!(user.uf, "RJ");
    }

    #[test]
    fn test_has_new_password() {
        let blank = UpdateUserRequest {
            password: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!blank.has_new_password());

        let absent = UpdateUserRequest::default();
        assert!(!absent.has_new_password());

        let present = UpdateUserRequest {
            password: Some("nova-senha-123".to_string()),
            ..Default::default()
        };
        assert!(present.has_new_password());
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        let user = sample_user();
        let response = UserResponse::from(user);
        let json = serde_json::to_string(&response).unwrap();

        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(json.contains("\"username\":\"anasouza\""));
    }

    #[test]
    fn test_credential_from_user() {
        let user = sample_user();
        let credential = Credential::from(&user);

        assert_eq!(credential.id, user.id);
        assert_eq!(credential.email, user.email);
        assert_eq!(credential.password_hash, user.password_hash);
        assert!(credential.authorities.is_empty());
    }
}
