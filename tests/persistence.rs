//! Save and restore agents through the file repositories.

mod common;

use std::{fs, path::Path, sync::Arc};

use common::{greedy_parameters, seeded_agent, state};
use sarsamouse::{
    Action, AgentConfig, AgentRepository, App, InMemoryRepository, JsonRepository,
    MsgPackRepository, SarsaAgent, SavedSarsaAgent, sarsa::SaveMetadata,
};
use tempfile::TempDir;

fn trained_agent() -> SarsaAgent {
    let mut agent = seeded_agent(greedy_parameters(), 17);
    let a = Action::new(3);
    agent.update(&state(0), a, &state(1), a, 0.0);
    agent.update(&state(1), a, &state(2), Action::new(4), -1.0);
    agent.update(&state(2), Action::new(4), &state(0), a, 0.1 + 0.2);
    agent.decay(3).unwrap();
    agent
}

fn assert_restored(repository: Arc<dyn AgentRepository + Send + Sync>, path: &Path) {
    let app = App::with_repository(repository);
    let agent = trained_agent();
    app.save_agent(&agent, path).unwrap();

    let restored = app.load_or_create(AgentConfig::new(), path).unwrap();

    assert_eq!(restored.table(), agent.table());
    assert_eq!(restored.cumulative_episodes(), 3);
    assert_eq!(restored.alpha(), agent.alpha());
    assert_eq!(restored.epsilon(), agent.epsilon());
    assert_eq!(restored.update_count(), 3);
    assert_eq!(restored.encoder(), agent.encoder());
}

#[test]
fn test_json_round_trip_is_exact() {
    let temp_dir = TempDir::new().unwrap();
    assert_restored(
        Arc::new(JsonRepository::new()),
        &temp_dir.path().join("mouse.json"),
    );
}

#[test]
fn test_msgpack_round_trip_is_exact() {
    let temp_dir = TempDir::new().unwrap();
    assert_restored(
        Arc::new(MsgPackRepository::new()),
        &temp_dir.path().join("mouse.msgpack"),
    );
}

#[test]
fn test_in_memory_round_trip() {
    assert_restored(
        Arc::new(InMemoryRepository::new()),
        Path::new("agents/mouse"),
    );
}

#[test]
fn test_save_leaves_no_temporary_files() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mouse.json");
    let app = App::with_repository(Arc::new(JsonRepository::new()));
    let agent = trained_agent();

    app.save_agent(&agent, &path).unwrap();
    app.save_agent(&agent, &path).unwrap();

    let names: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("mouse.json")]);
}

#[test]
fn test_missing_file_starts_fresh() {
    let temp_dir = TempDir::new().unwrap();
    let app = App::with_repository(Arc::new(JsonRepository::new()));

    let agent = app
        .load_or_create(AgentConfig::new(), &temp_dir.path().join("absent.json"))
        .unwrap();

    assert!(agent.table().is_empty());
    assert_eq!(agent.cumulative_episodes(), 0);
}

#[test]
fn test_record_with_missing_fields_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mouse.json");
    fs::write(&path, r#"{"version": 1, "parameters": {"alpha": 0.5}}"#).unwrap();
    let app = App::with_repository(Arc::new(JsonRepository::new()));

    let agent = app.load_or_create(AgentConfig::new(), &path).unwrap();

    assert!(agent.table().is_empty());
    assert_eq!(agent.alpha(), 1.0);
    assert_eq!(agent.epsilon(), 1.0);
    assert_eq!(agent.update_count(), 0);
}

#[test]
fn test_garbage_file_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mouse.msgpack");
    fs::write(&path, b"\x93not msgpack at all").unwrap();
    let app = App::with_repository(Arc::new(MsgPackRepository::new()));

    let agent = app.load_or_create(AgentConfig::new(), &path).unwrap();

    assert!(agent.table().is_empty());
}

#[test]
fn test_invalid_record_is_rejected_as_a_whole() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mouse.json");
    let record = SavedSarsaAgent::from_agent(&trained_agent(), SaveMetadata::default());
    let mut value = serde_json::to_value(&record).unwrap();
    value["table"]["action_keys"][0] = serde_json::json!(99);
    fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

    let repository = JsonRepository::new();
    let loaded = repository.load(&path).unwrap();
    let err = loaded
        .to_agent(sarsamouse::RateSchedule::default(), None)
        .unwrap_err();
    assert_eq!(err.kind(), "schema");

    let app = App::with_repository(Arc::new(repository));
    let agent = app.load_or_create(AgentConfig::new(), &path).unwrap();
    assert!(agent.table().is_empty());
}

#[test]
fn test_resumed_training_continues_episode_count() {
    let repository = InMemoryRepository::new();
    let path = Path::new("mouse");
    let mut agent = trained_agent();
    agent.decay(5).unwrap();
    agent.save(&repository, path).unwrap();

    let mut resumed = seeded_agent(greedy_parameters(), 17);
    assert!(resumed.load_or_keep(&repository, path));
    assert_eq!(resumed.cumulative_episodes(), 5);

    resumed.decay(2).unwrap();
    assert_eq!(resumed.cumulative_episodes(), 7);
    // power law with exponent 0.2 at n = 7
    assert!((resumed.epsilon() - 7f64.powf(-0.2)).abs() < 1e-12);
}
