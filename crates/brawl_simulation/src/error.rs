//! Ошибки симуляции.
//!
//! Gameplay guards (action вне cooldown, удар по лежачему) — тихие no-op и сюда не попадают.
//! Здесь только ошибки конфигурации: без обоих игроков бой не имеет смысла.

use std::path::PathBuf;

use thiserror::Error;

use crate::components::Side;

#[derive(Debug, Error)]
pub enum BrawlError {
    #[error("player {0:?} is missing from the world")]
    MissingPlayer(Side),

    #[error("more than one player spawned for side {0:?}")]
    DuplicatePlayer(Side),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown entity class '{0}' in level description")]
    UnknownEntityClass(String),

    #[error("entity id '{0}' is already taken")]
    DuplicateEntityId(String),
}
