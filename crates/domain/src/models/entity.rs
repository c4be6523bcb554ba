//! Route context entities.

use std::fmt;

use super::{Game, Player, Team};

/// The concrete entity a request is about. Paths are built per variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteEntity {
    Player(Player),
    Team(Team),
    Game(Game),
}

impl RouteEntity {
    pub fn kind(&self) -> &'static str {
        match self {
            RouteEntity::Player(_) => "player",
            RouteEntity::Team(_) => "team",
            RouteEntity::Game(_) => "game",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            RouteEntity::Player(p) => p.id,
            RouteEntity::Team(t) => t.id,
            RouteEntity::Game(g) => g.id,
        }
    }

    /// Path for an action on this entity, e.g. `/game/12/show`.
    pub fn path(&self, action: &str) -> String {
        format!("/{}/{}/{}", self.kind(), self.id(), action)
    }
}

impl fmt::Display for RouteEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteEntity::Player(p) => write!(f, "{}", p.name),
            RouteEntity::Team(t) => write!(f, "{}", t.name),
            RouteEntity::Game(g) => write!(f, "{}", g.description),
        }
    }
}
