use std::{
    cell::Cell,
    collections::VecDeque,
    rc::Rc,
    time::{Duration, Instant},
};

use super::Direction;

/// Requests beyond this many pending moves are dropped.
pub const MAX_QUEUED_MOVES: usize = 100;

/// Minimum time between two board-changing moves, so animations can catch up.
pub const MOVE_DELAY: Duration = Duration::from_millis(200);

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock(Rc<Cell<Instant>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(Instant::now())))
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.0.get()
    }
}

/// Outcome of one queued move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCompletion {
    pub direction: Direction,
    pub changed: bool,
}

/// Pending move requests gated by a delay timer.
///
/// At most one board-changing move runs per delay interval. Moves that change nothing
/// complete immediately and do not restart the timer.
#[derive(Debug)]
pub struct MoveQueue<C = SystemClock> {
    pending: VecDeque<Direction>,
    capacity: usize,
    delay: Duration,
    deadline: Option<Instant>,
    clock: C,
}

impl<C: Clock> MoveQueue<C> {
    pub fn new(clock: C) -> Self {
        Self::with_limits(clock, MAX_QUEUED_MOVES, MOVE_DELAY)
    }

    pub fn with_limits(clock: C, capacity: usize, delay: Duration) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            capacity,
            delay,
            deadline: None,
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Whether the delay timer is still running.
    pub fn is_waiting(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| self.clock.now() < deadline)
    }

    /// When the running timer expires, if one is running. An expired timer reports `None`.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.filter(|_| self.is_waiting())
    }

    /// Enqueue a request. Returns `false` if the queue is full and the request was dropped.
    pub fn push(&mut self, direction: Direction) -> bool {
        if self.pending.len() >= self.capacity {
            log::debug!("move queue full, dropping {direction:?}");
            return false;
        }

        self.pending.push_back(direction);
        true
    }

    /// Run queued moves through `perform` until one of them changes the board, then
    /// restart the timer. Does nothing while the timer is running.
    pub fn drain<F>(&mut self, mut perform: F) -> Vec<MoveCompletion>
    where
        F: FnMut(Direction) -> bool,
    {
        if self.is_waiting() {
            return Vec::new();
        }

        self.deadline = None;
        let mut completions = Vec::new();

        while let Some(direction) = self.pending.pop_front() {
            let changed = perform(direction);
            completions.push(MoveCompletion { direction, changed });

            if changed {
                self.deadline = Some(self.clock.now() + self.delay);
                break;
            }
        }

        completions
    }

    /// Drop all pending requests and stop the timer.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadline = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn queue() -> (MoveQueue<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (MoveQueue::new(clock.clone()), clock)
    }

    #[test]
    fn test_idle_drain_runs_immediately() {
        let (mut queue, _) = queue();
        assert!(queue.push(Direction::Left));

        let completions = queue.drain(|_| true);
        assert_eq!(completions, vec![MoveCompletion {
            direction: Direction::Left,
            changed: true
        }]);
        assert!(queue.is_waiting());
    }

    #[test]
    fn test_one_effective_move_per_interval() {
        let (mut queue, clock) = queue();
        queue.push(Direction::Up);
        queue.push(Direction::Down);

        let mut performed = Vec::new();
        queue.drain(|d| {
            performed.push(d);
            true
        });
        assert_eq!(performed, vec![Direction::Up]);
        assert_eq!(queue.len(), 1);

        clock.advance(MOVE_DELAY / 2);
        assert!(queue.drain(|_| true).is_empty());
        assert_eq!(queue.len(), 1);

        clock.advance(MOVE_DELAY / 2);
        assert!(!queue.is_waiting());
        let completions = queue.drain(|_| true);
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].direction, Direction::Down);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_noop_moves_do_not_consume_delay() {
        let (mut queue, _) = queue();
        queue.push(Direction::Left);
        queue.push(Direction::Left);
        queue.push(Direction::Right);
        queue.push(Direction::Up);

        let completions = queue.drain(|d| d == Direction::Right);
        assert_eq!(completions, vec![
            MoveCompletion {
                direction: Direction::Left,
                changed: false
            },
            MoveCompletion {
                direction: Direction::Left,
                changed: false
            },
            MoveCompletion {
                direction: Direction::Right,
                changed: true
            },
        ]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_all_noops_leave_timer_idle() {
        let (mut queue, _) = queue();
        queue.push(Direction::Left);
        queue.push(Direction::Up);

        let completions = queue.drain(|_| false);
        assert_eq!(completions.len(), 2);
        assert!(completions.iter().all(|c| !c.changed));
        assert!(!queue.is_waiting());
        assert_eq!(queue.deadline(), None);
    }

    #[test]
    fn test_deadline_expires() {
        let (mut queue, clock) = queue();
        queue.push(Direction::Left);
        queue.drain(|_| true);
        assert!(queue.deadline().is_some());

        clock.advance(MOVE_DELAY * 10);
        assert!(!queue.is_waiting());
        assert_eq!(queue.deadline(), None);
    }

    #[test]
    fn test_overflow_drops() {
        let clock = ManualClock::new();
        let mut queue = MoveQueue::with_limits(clock, 3, MOVE_DELAY);

        for _ in 0..3 {
            assert!(queue.push(Direction::Down));
        }
        assert!(!queue.push(Direction::Up));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_default_capacity() {
        let (mut queue, _) = queue();
        let accepted = (0..MAX_QUEUED_MOVES + 10)
            .filter(|_| queue.push(Direction::Left))
            .count();
        assert_eq!(accepted, MAX_QUEUED_MOVES);
    }

    #[test]
    fn test_clear_stops_timer() {
        let (mut queue, _) = queue();
        queue.push(Direction::Up);
        queue.push(Direction::Up);
        queue.drain(|_| true);
        assert!(queue.is_waiting());

        queue.clear();
        assert!(queue.is_empty());
        assert!(!queue.is_waiting());
    }
}
