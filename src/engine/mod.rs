use rand::{Rng, seq::IndexedRandom as _};

use crate::{
    board::{Board, Cell, Position},
    config::{ConfigError, GameConfig},
    resolver::{self, MoveOrder},
};

pub mod queue;

pub use queue::{Clock, ManualClock, MoveCompletion, MoveQueue, SystemClock};

/// A direction to swipe the tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Board positions of line `index`, ordered so that tiles travel toward the first one.
    pub fn line(self, dimension: usize, index: usize) -> Vec<Position> {
        (0..dimension)
            .map(|i| match self {
                Direction::Up => Position::new(i, index),
                Direction::Down => Position::new(dimension - i - 1, index),
                Direction::Left => Position::new(index, i),
                Direction::Right => Position::new(index, dimension - i - 1),
            })
            .collect()
    }
}

/// Receiver of everything the model does to the board.
///
/// Called synchronously, in emission order, from within [`GameModel`] methods.
/// Implementations only get values, never the model itself.
pub trait GameObserver {
    fn score_changed(&mut self, _score: u64) {}
    fn highest_score_changed(&mut self, _score: u64) {}
    fn tile_inserted(&mut self, _at: Position, _value: u32) {}
    fn single_tile_moved(&mut self, _from: Position, _to: Position, _value: u32) {}
    fn two_tiles_moved(&mut self, _from: (Position, Position), _to: Position, _value: u32) {}
}

impl GameObserver for () {}

impl<O: GameObserver + ?Sized> GameObserver for &mut O {
    fn score_changed(&mut self, score: u64) {
        (**self).score_changed(score)
    }

    fn highest_score_changed(&mut self, score: u64) {
        (**self).highest_score_changed(score)
    }

    fn tile_inserted(&mut self, at: Position, value: u32) {
        (**self).tile_inserted(at, value)
    }

    fn single_tile_moved(&mut self, from: Position, to: Position, value: u32) {
        (**self).single_tile_moved(from, to, value)
    }

    fn two_tiles_moved(&mut self, from: (Position, Position), to: Position, value: u32) {
        (**self).two_tiles_moved(from, to, value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ScoreChanged(u64),
    HighestScoreChanged(u64),
    TileInserted {
        at: Position,
        value: u32,
    },
    SingleTileMoved {
        from: Position,
        to: Position,
        value: u32,
    },
    TwoTilesMoved {
        from: (Position, Position),
        to: Position,
        value: u32,
    },
}

/// Records every notification as a [`GameEvent`].
impl GameObserver for Vec<GameEvent> {
    fn score_changed(&mut self, score: u64) {
        self.push(GameEvent::ScoreChanged(score));
    }

    fn highest_score_changed(&mut self, score: u64) {
        self.push(GameEvent::HighestScoreChanged(score));
    }

    fn tile_inserted(&mut self, at: Position, value: u32) {
        self.push(GameEvent::TileInserted { at, value });
    }

    fn single_tile_moved(&mut self, from: Position, to: Position, value: u32) {
        self.push(GameEvent::SingleTileMoved { from, to, value });
    }

    fn two_tiles_moved(&mut self, from: (Position, Position), to: Position, value: u32) {
        self.push(GameEvent::TwoTilesMoved { from, to, value });
    }
}

/// What happened after the board settled from an effective move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// A tile reached the threshold; no tile was inserted.
    Won(Position),
    Lost,
    Continue,
}

/// Board, score and rules of a single game.
#[derive(Debug)]
pub struct GameModel<O> {
    board: Board,
    threshold: u32,
    score: u64,
    highest_score: u64,
    observer: O,
}

impl<O: GameObserver> GameModel<O> {
    pub fn new(config: &GameConfig, observer: O) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            board: Board::empty(config.dimension),
            threshold: config.threshold,
            score: 0,
            highest_score: config.initial_highest_score,
            observer,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn dimension(&self) -> usize {
        self.board.dimension()
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn highest_score(&self) -> u64 {
        self.highest_score
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    fn add_score(&mut self, points: u32) {
        self.score += u64::from(points);
        self.observer.score_changed(self.score);

        if self.score > self.highest_score {
            self.highest_score = self.score;
            self.observer.highest_score_changed(self.highest_score);
        }
    }

    /// Slide and merge every line toward `direction`. Returns whether any tile moved.
    pub fn perform_move(&mut self, direction: Direction) -> bool {
        let dimension = self.dimension();
        let mut changed = false;

        for index in 0..dimension {
            let coords = direction.line(dimension, index);
            let line: Vec<Cell> = coords.iter().map(|&pos| self.board[pos]).collect();

            let orders = resolver::merge(&line);
            changed |= !orders.is_empty();

            for order in orders {
                self.apply(&coords, order);
            }
        }

        log::debug!(
            "move {direction:?}: changed={changed} score={}",
            self.score
        );
        changed
    }

    fn apply(&mut self, coords: &[Position], order: MoveOrder) {
        match order {
            MoveOrder::Single {
                source,
                destination,
                value,
                was_merge,
            } => {
                let (from, to) = (coords[source], coords[destination]);
                if was_merge {
                    self.add_score(value);
                }

                self.board[from] = Cell::Empty;
                self.board[to] = Cell::Tile(value);
                log::trace!("tile {value} {from} -> {to}");
                self.observer.single_tile_moved(from, to, value);
            }
            MoveOrder::Double {
                first,
                second,
                destination,
                value,
            } => {
                let from = (coords[first], coords[second]);
                let to = coords[destination];
                self.add_score(value);

                self.board[from.0] = Cell::Empty;
                self.board[from.1] = Cell::Empty;
                self.board[to] = Cell::Tile(value);
                log::trace!("tiles {} + {} -> {to} = {value}", from.0, from.1);
                self.observer.two_tiles_moved(from, to, value);
            }
        }
    }

    /// Place a tile at `at` if that cell is empty. Returns whether the tile was placed.
    pub fn insert_tile(&mut self, at: Position, value: u32) -> bool {
        debug_assert!(value.is_power_of_two(), "tile value {value} is not a power of two");

        if !self.board[at].is_empty() {
            return false;
        }

        self.board[at] = Cell::Tile(value);
        log::debug!("inserted {value} at {at}");
        self.observer.tile_inserted(at, value);
        true
    }

    /// Place a tile on a uniformly chosen empty cell. Returns `None` if the board is full.
    pub fn insert_tile_at_random_location<R: Rng + ?Sized>(
        &mut self,
        value: u32,
        rng: &mut R,
    ) -> Option<Position> {
        let at = *self.board.empty_positions().choose(rng)?;
        self.insert_tile(at, value);
        Some(at)
    }

    /// The game is lost once the board is full and no two neighbours share a value.
    pub fn user_has_lost(&self) -> bool {
        if !self.board.is_full() {
            return false;
        }

        // Equality is symmetric, so looking right and down covers every pair.
        let last = self.dimension() - 1;
        let mergeable = self.board.iter().any(|(pos, cell)| {
            (pos.row < last && self.board[Position::new(pos.row + 1, pos.col)] == *cell)
                || (pos.col < last && self.board[Position::new(pos.row, pos.col + 1)] == *cell)
        });

        if !mergeable {
            log::debug!("no moves left");
        }
        !mergeable
    }

    /// First tile, in row-major order, whose value reaches the threshold.
    pub fn user_has_won(&self) -> Option<Position> {
        self.board
            .iter()
            .find(|(_, cell)| cell.value().is_some_and(|v| v >= self.threshold))
            .map(|(pos, _)| pos)
    }

    /// Check for victory, otherwise spawn a 2 (or a 4, one time in ten) and check for defeat.
    pub fn follow_up<R: Rng + ?Sized>(&mut self, rng: &mut R) -> FollowUp {
        if let Some(at) = self.user_has_won() {
            log::debug!("won with {} at {at}", self.board[at]);
            return FollowUp::Won(at);
        }

        let value = if rng.random_ratio(1, 10) { 4 } else { 2 };
        self.insert_tile_at_random_location(value, rng);

        if self.user_has_lost() {
            FollowUp::Lost
        } else {
            FollowUp::Continue
        }
    }

    /// Empty the board and zero the score. The highest score is kept.
    pub fn reset(&mut self) {
        self.board.fill(Cell::Empty);
        self.score = 0;
        self.observer.score_changed(0);
        log::debug!("board reset");
    }
}

/// A [`GameModel`] fed through a [`MoveQueue`].
#[derive(Debug)]
pub struct Game<O, C = SystemClock> {
    model: GameModel<O>,
    queue: MoveQueue<C>,
}

impl<O: GameObserver> Game<O, SystemClock> {
    pub fn new(config: &GameConfig, observer: O) -> Result<Self, ConfigError> {
        Self::with_clock(config, observer, SystemClock)
    }
}

impl<O: GameObserver, C: Clock> Game<O, C> {
    pub fn with_clock(config: &GameConfig, observer: O, clock: C) -> Result<Self, ConfigError> {
        Self::with_queue(config, observer, MoveQueue::new(clock))
    }

    pub fn with_queue(
        config: &GameConfig,
        observer: O,
        queue: MoveQueue<C>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            model: GameModel::new(config, observer)?,
            queue,
        })
    }

    pub fn model(&self) -> &GameModel<O> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut GameModel<O> {
        &mut self.model
    }

    pub fn queue(&self) -> &MoveQueue<C> {
        &self.queue
    }

    /// Request a move. If no delay is pending, queued moves run right away and their
    /// completions are returned; otherwise they wait for [`Game::poll`].
    pub fn queue_move(&mut self, direction: Direction) -> Vec<MoveCompletion> {
        if !self.queue.push(direction) {
            return Vec::new();
        }

        self.queue.drain(|d| self.model.perform_move(d))
    }

    /// Run pending moves whose delay has elapsed.
    pub fn poll(&mut self) -> Vec<MoveCompletion> {
        if self.queue.is_empty() {
            return Vec::new();
        }

        self.queue.drain(|d| self.model.perform_move(d))
    }

    /// Reset the model and drop every pending move.
    pub fn reset(&mut self) {
        self.model.reset();
        self.queue.clear();
    }

    /// Reset, then seed the board with two 2s.
    pub fn new_game<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.reset();
        self.model.insert_tile_at_random_location(2, rng);
        self.model.insert_tile_at_random_location(2, rng);
    }
}
