use crossterm::{
    QueueableCommand,
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use rand::Rng;
use std::{
    io::{self, Write},
    time::Duration,
};

use crate::{
    board::{Cell, Position},
    engine::{Clock, Direction, FollowUp, Game, GameObserver, MoveCompletion, MoveQueue},
};

const IDLE_POLL: Duration = Duration::from_millis(250);

/// Status line fed by the model notifications.
#[derive(Debug, Default)]
pub struct Hud {
    message: String,
    new_highest: bool,
}

impl GameObserver for Hud {
    fn highest_score_changed(&mut self, _score: u64) {
        self.new_highest = true;
    }

    fn tile_inserted(&mut self, at: Position, value: u32) {
        self.message = format!("{value} appeared at {at}");
    }

    fn two_tiles_moved(&mut self, _from: (Position, Position), to: Position, value: u32) {
        self.message = format!("merged {value} at {to}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Playing,
    Won(Position),
    Lost,
}

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w' | 'k') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s' | 'j') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a' | 'h') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d' | 'l') => Some(Direction::Right),
        _ => None,
    }
}

/// Play in the alternate screen until the user quits. Returns the highest score reached.
pub fn play(game: &mut Game<Hud>, rng: &mut impl Rng) -> io::Result<u64> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let result = run_loop(&mut stdout, game, rng);

    execute!(stdout, LeaveAlternateScreen, Show)?;
    disable_raw_mode()?;

    result.map(|()| game.model().highest_score())
}

fn run_loop(stdout: &mut io::Stdout, game: &mut Game<Hud>, rng: &mut impl Rng) -> io::Result<()> {
    let mut state = State::Playing;
    game.new_game(rng);

    loop {
        draw(stdout, game, state)?;

        let timeout = poll_timeout(game.queue());

        let mut completions: Vec<MoveCompletion> = Vec::new();

        if event::poll(timeout)? {
            if let Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) = event::read()?
            {
                match code {
                    KeyCode::Esc | KeyCode::Char('q') => break,
                    KeyCode::Char('r') => {
                        game.new_game(rng);
                        game.model_mut().observer_mut().message = "new game".into();
                        state = State::Playing;
                    }
                    code => {
                        if let (State::Playing, Some(direction)) = (state, direction_for(code)) {
                            completions.extend(game.queue_move(direction));
                        }
                    }
                }
            }
        }

        completions.extend(game.poll());

        for completion in completions {
            if !completion.changed || state != State::Playing {
                continue;
            }

            state = match game.model_mut().follow_up(rng) {
                FollowUp::Won(at) => State::Won(at),
                FollowUp::Lost => State::Lost,
                FollowUp::Continue => State::Playing,
            };
        }
    }

    Ok(())
}

/// How long to wait for input: until the move delay ends if moves are pending, otherwise idle.
fn poll_timeout<C: Clock>(queue: &MoveQueue<C>) -> Duration {
    match queue.deadline() {
        Some(deadline) if !queue.is_empty() => {
            deadline.saturating_duration_since(queue.clock().now())
        }
        _ => IDLE_POLL,
    }
}

fn draw(stdout: &mut io::Stdout, game: &Game<Hud>, state: State) -> io::Result<()> {
    let model = game.model();
    let board = model.board();
    let width = model.threshold().to_string().len().max(4);

    stdout.queue(Clear(ClearType::All))?;
    stdout.queue(MoveTo(0, 0))?;

    let highest_marker = if model.observer().new_highest { " *" } else { "" };
    stdout.queue(Print(format!(
        "score {}   best {}{highest_marker}\r\n\r\n",
        model.score(),
        model.highest_score()
    )))?;

    for (row, cells) in board.rows().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            let winning = matches!(state, State::Won(at) if at == Position::new(row, col));

            if winning {
                stdout.queue(SetBackgroundColor(Color::DarkGreen))?;
            }

            stdout
                .queue(SetForegroundColor(get_color(*cell)))?
                .queue(Print(format!("{cell:>width$}")))?
                .queue(SetBackgroundColor(Color::Reset))?
                .queue(Print(' '))?
                .queue(ResetColor)?;
        }

        stdout.queue(Print("\r\n"))?;
    }

    let footer = match state {
        State::Playing => model.observer().message.clone(),
        State::Won(_) => "You won! (r: new game, q: quit)".to_string(),
        State::Lost => "You lost... (r: new game, q: quit)".to_string(),
    };

    stdout
        .queue(Print(format!("\r\n{footer}\r\n")))?
        .queue(Print("arrows/wasd: move  r: new game  q: quit\r\n"))?;

    stdout.flush()
}

fn get_color(cell: Cell) -> Color {
    match cell.value() {
        None => Color::DarkGrey,
        Some(2..=64) => Color::White,
        Some(128..=1024) => Color::Yellow,
        Some(_) => Color::Red,
    }
}
