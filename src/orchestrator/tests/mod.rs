use super::test_helpers::*;
use super::*;
use crate::error::{Error, ProcessError, ResolutionError, ValidationError};
use crate::options::{ChannelContent, ListLimit};
use crate::types::{JobKind, OutputStream, Phase};
use std::path::PathBuf;


#[test]
fn test_new_orchestrator_is_idle() {
    let mut config = Config::default();
    config.tools.search_path = false;
    let orchestrator = Orchestrator::new(config);
    assert_eq!(orchestrator.state(), OrchestratorState::Idle);
    assert_eq!(orchestrator.program(), std::path::Path::new(crate::config::YTDLP_PROGRAM));
}

#[test]
fn test_job_ids_are_shared_and_increasing() {
    let orchestrator = Orchestrator::new(Config::default());
    let first = orchestrator.next_id();
    let clone = orchestrator.clone();
    let second = clone.next_id();
    assert_eq!(first, JobId(1));
    assert_eq!(second, JobId(2));
}

#[test]
fn test_set_state_only_broadcasts_changes() {
    let orchestrator = Orchestrator::new(Config::default());
    let mut rx = orchestrator.subscribe();

    orchestrator.set_state(OrchestratorState::Idle);
    orchestrator.set_state(OrchestratorState::Running);
    orchestrator.set_state(OrchestratorState::Running);

    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![Event::StateChanged {
            state: OrchestratorState::Running
        }]
    );
    assert_eq!(*orchestrator.watch_state().borrow(), OrchestratorState::Running);
}

#[tokio::test]
async fn test_cancel_without_job_returns_false() {
    let orchestrator = Orchestrator::new(Config::default());
    assert!(!orchestrator.cancel().await);
    assert_eq!(orchestrator.active_job().await, None);
}
