//! Subscription decision rules.
//!
//! The checks run in a fixed order and the first failure wins. The caller is
//! responsible for running this under a row lock on the activity so the
//! count it passes in cannot be raced past capacity.

use thiserror::Error;

use crate::models::StatusAtividade;

/// Why a subscription was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InscricaoError {
    #[error("Esta atividade não está aberta para inscrições")]
    NaoAberta,

    #[error("Você já está inscrito nesta atividade")]
    JaInscrito,

    #[error("Esta atividade já atingiu a capacidade máxima de participantes")]
    CapacidadeAtingida,
}

/// Outcome of an accepted subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InscricaoDecision {
    /// The new participant fills the last slot: the activity must move to
    /// CLOSED in the same transaction.
    pub fechar: bool,
}

/// Decides whether a user may join an activity.
///
/// Check order: open status, then duplicate subscription, then capacity.
/// `participantes` is the current count before this subscription.
pub fn avaliar_inscricao(
    status: StatusAtividade,
    ja_inscrito: bool,
    sem_limite: bool,
    capacidade: Option<i32>,
    participantes: i64,
) -> Result<InscricaoDecision, InscricaoError> {
    if status != StatusAtividade::Open {
        return Err(InscricaoError::NaoAberta);
    }

    if ja_inscrito {
        return Err(InscricaoError::JaInscrito);
    }

    if !sem_limite {
        let capacidade = i64::from(capacidade.unwrap_or(0));
        if participantes >= capacidade {
            return Err(InscricaoError::CapacidadeAtingida);
        }
        return Ok(InscricaoDecision {
            fechar: participantes + 1 == capacidade,
        });
    }

    Ok(InscricaoDecision { fechar: false })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_open_with_headroom() {
        let decision =
            avaliar_inscricao(StatusAtividade::Open, false, false, Some(10), 3).unwrap();
        assert!(!decision.fechar);
    }

    #[test]
    fn test_last_slot_closes_activity() {
        // capacity 2, creator already in: the second participant closes it
        let decision =
            avaliar_inscricao(StatusAtividade::Open, false, false, Some(2), 1).unwrap();
        assert!(decision.fechar);
    }

    #[test]
    fn test_close_happens_exactly_at_capacity_never_before() {
        let early = avaliar_inscricao(StatusAtividade::Open, false, false, Some(3), 1).unwrap();
        assert!(!early.fechar);

        let exact = avaliar_inscricao(StatusAtividade::Open, false, false, Some(3), 2).unwrap();
        assert!(exact.fechar);
    }

    #[test]
    fn test_full_activity_rejects() {
        let result = avaliar_inscricao(StatusAtividade::Open, false, false, Some(2), 2);
        assert_eq!(result, Err(InscricaoError::CapacidadeAtingida));
    }

    #[test]
    fn test_closed_rejects_even_with_headroom() {
        let result = avaliar_inscricao(StatusAtividade::Closed, false, false, Some(10), 1);
        assert_eq!(result, Err(InscricaoError::NaoAberta));
    }

    #[test]
    fn test_canceled_rejects_even_unlimited() {
        let result = avaliar_inscricao(StatusAtividade::Canceled, false, true, None, 0);
        assert_eq!(result, Err(InscricaoError::NaoAberta));
    }

    #[test]
    fn test_duplicate_subscription_rejects() {
        let result = avaliar_inscricao(StatusAtividade::Open, true, false, Some(10), 3);
        assert_eq!(result, Err(InscricaoError::JaInscrito));
    }

    #[test]
    fn test_status_check_wins_over_duplicate_check() {
        // First failure wins: a participant of a closed activity sees NaoAberta
        let result = avaliar_inscricao(StatusAtividade::Closed, true, false, Some(10), 3);
        assert_eq!(result, Err(InscricaoError::NaoAberta));
    }

    #[test]
    fn test_duplicate_check_wins_over_capacity_check() {
        let result = avaliar_inscricao(StatusAtividade::Open, true, false, Some(2), 2);
        assert_eq!(result, Err(InscricaoError::JaInscrito));
    }

    #[test]
    fn test_unlimited_never_closes() {
        let decision =
            avaliar_inscricao(StatusAtividade::Open, false, true, None, 5000).unwrap();
        assert!(!decision.fechar);

        // capacidade present but irrelevant when sem_limite
        let decision =
            avaliar_inscricao(StatusAtividade::Open, false, true, Some(2), 2).unwrap();
        assert!(!decision.fechar);
    }

    #[test]
    fn test_missing_capacity_on_limited_activity_rejects() {
        // a limited activity with no capacity set admits nobody
        let result = avaliar_inscricao(StatusAtividade::Open, false, false, None, 0);
        assert_eq!(result, Err(InscricaoError::CapacidadeAtingida));
    }
}
