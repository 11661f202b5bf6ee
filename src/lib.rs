pub mod board;
pub mod config;
pub mod engine;
pub mod resolver;
pub mod terminal;

pub use board::{Board, Cell, Position, SquareGrid};
pub use config::{ConfigError, GameConfig};
pub use engine::{Direction, FollowUp, Game, GameEvent, GameModel, GameObserver};
pub use resolver::{ActionToken, MoveOrder, merge};
