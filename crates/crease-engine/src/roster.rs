use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crease_types::{PlayerId, TeamId};

use crate::error::{EngineError, EngineResult};

/// Read boundary onto team rosters, owned by roster management.
pub trait RosterProvider: Send + Sync {
    /// Number of registered players, or `None` when the roster is unavailable.
    fn team_size(&self, team: &TeamId) -> Option<u32>;

    fn is_team_member(&self, team: &TeamId, player: &PlayerId) -> bool;

    /// Display name used in result text.
    fn team_name(&self, team: &TeamId) -> Option<String>;
}

impl<T: RosterProvider + ?Sized> RosterProvider for Arc<T> {
    fn team_size(&self, team: &TeamId) -> Option<u32> {
        (**self).team_size(team)
    }

    fn is_team_member(&self, team: &TeamId, player: &PlayerId) -> bool {
        (**self).is_team_member(team, player)
    }

    fn team_name(&self, team: &TeamId) -> Option<String> {
        (**self).team_name(team)
    }
}

/// Team membership captured for one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSnapshot {
    pub id: TeamId,
    pub name: String,
    pub players: Vec<PlayerId>,
}

impl TeamSnapshot {
    /// A team of `size` freshly generated players.
    pub fn generated(name: impl Into<String>, size: usize) -> Self {
        Self {
            id: TeamId::new(),
            name: name.into(),
            players: (0..size).map(|_| PlayerId::new()).collect(),
        }
    }
}

/// In-memory roster for tests, the CLI, and the HTTP adapter.
#[derive(Default)]
pub struct InMemoryRoster {
    teams: RwLock<HashMap<TeamId, TeamSnapshot>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a team snapshot.
    pub fn register(&self, team: TeamSnapshot) -> EngineResult<()> {
        self.teams
            .write()
            .map_err(|_| EngineError::invariant("roster lock poisoned"))?
            .insert(team.id, team);
        Ok(())
    }

    pub fn team(&self, team: &TeamId) -> Option<TeamSnapshot> {
        self.teams.read().ok()?.get(team).cloned()
    }
}

impl RosterProvider for InMemoryRoster {
    fn team_size(&self, team: &TeamId) -> Option<u32> {
        self.team(team).map(|t| t.players.len() as u32)
    }

    fn is_team_member(&self, team: &TeamId, player: &PlayerId) -> bool {
        self.teams
            .read()
            .map(|teams| teams.get(team).is_some_and(|t| t.players.contains(player)))
            .unwrap_or(false)
    }

    fn team_name(&self, team: &TeamId) -> Option<String> {
        self.team(team).map(|t| t.name)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::error::ErrorKind;

    use super::*;

    #[test]
    fn registered_team_answers_queries() {
        let roster = InMemoryRoster::new();
        let team = TeamSnapshot::generated("Harbour CC", 11);
        let player = team.players[3];
        let id = team.id;
        roster.register(team).unwrap();

        assert_eq!(roster.team_size(&id), Some(11));
        assert!(roster.is_team_member(&id, &player));
        assert!(!roster.is_team_member(&id, &PlayerId::new()));
        assert_eq!(roster.team_name(&id).as_deref(), Some("Harbour CC"));
    }

    #[test]
    fn unknown_team_is_unavailable() {
        let roster = InMemoryRoster::new();
        let id = TeamId::new();
        assert_eq!(roster.team_size(&id), None);
        assert_eq!(roster.team_name(&id), None);
    }

    #[test]
    fn arc_roster_delegates() {
        let roster = Arc::new(InMemoryRoster::new());
        let team = TeamSnapshot::generated("Ridge XI", 9);
        let id = team.id;
        roster.register(team).unwrap();
        let shared: Arc<InMemoryRoster> = Arc::clone(&roster);
        assert_eq!(RosterProvider::team_size(&shared, &id), Some(9));
    }

    #[test]
    fn poisoned_roster_rejects_registration() {
        let roster = Arc::new(InMemoryRoster::new());
        let shared = Arc::clone(&roster);
        let _ = thread::spawn(move || {
            let _guard = shared.teams.write().unwrap();
            panic!("poison the roster lock");
        })
        .join();

        let err = roster
            .register(TeamSnapshot::generated("Ridge XI", 9))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert_eq!(err.to_string(), "invariant violation: roster lock poisoned");
    }
}
