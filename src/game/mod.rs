//! Optional stratagem game subsystem (`--features game-mode`).
//!
//! A side mode that reuses the gesture classifier: the player enters
//! four-direction sequences to deploy stratagems, each with its own
//! cooldown. Compiled out of SafeWalk production firmware entirely — the
//! pairing/alert core has no knowledge of this module.

use log::info;

use crate::sensors::Direction;

/// Inputs per stratagem sequence.
pub const SEQUENCE_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stratagem {
    Bomb,
    Turret,
    Mine,
}

impl Stratagem {
    pub const COUNT: usize = 3;

    const fn index(self) -> usize {
        match self {
            Self::Bomb => 0,
            Self::Turret => 1,
            Self::Mine => 2,
        }
    }
}

/// Input sequences, one per stratagem.
pub const STRATAGEM_SEQUENCES: [(Stratagem, [Direction; SEQUENCE_LEN]); Stratagem::COUNT] = [
    (
        Stratagem::Bomb,
        [Direction::Up, Direction::Down, Direction::Up, Direction::Down],
    ),
    (
        Stratagem::Turret,
        [Direction::Left, Direction::Right, Direction::Left, Direction::Right],
    ),
    (
        Stratagem::Mine,
        [Direction::Down, Direction::Down, Direction::Left, Direction::Up],
    ),
];

/// Per-stratagem redeploy cooldowns (milliseconds).
pub const COOLDOWNS_MS: [u32; Stratagem::COUNT] = [5_000, 10_000, 15_000];

/// Joystick sample (only the confirm button matters to this FSM; the axes
/// are carried for the deploy-direction overlay).
#[derive(Debug, Clone, Copy, Default)]
pub struct JoystickInput {
    pub x: i16,
    pub y: i16,
    pub button_pressed: bool,
}

/// Game phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Init,
    InputWait,
    InputCalc,
    Deploy(Stratagem),
    DeployConfirmed(Stratagem),
    GameOver,
    GameWin,
}

/// Match a full input queue against the stratagem table.
pub fn check_strats(inputs: &[Direction; SEQUENCE_LEN]) -> Option<Stratagem> {
    STRATAGEM_SEQUENCES
        .iter()
        .find(|(_, seq)| seq == inputs)
        .map(|&(strat, _)| strat)
}

pub struct GameFsm {
    phase: GamePhase,
    queue: heapless::Vec<Direction, SEQUENCE_LEN>,
    deployed_at_ms: [Option<u32>; Stratagem::COUNT],
}

impl GameFsm {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Init,
            queue: heapless::Vec::new(),
            deployed_at_ms: [None; Stratagem::COUNT],
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn queued(&self) -> &[Direction] {
        &self.queue
    }

    fn on_cooldown(&self, strat: Stratagem, now_ms: u32) -> bool {
        match self.deployed_at_ms[strat.index()] {
            Some(at) => now_ms.wrapping_sub(at) < COOLDOWNS_MS[strat.index()],
            None => false,
        }
    }

    /// Advance the game one tick.
    ///
    /// `gesture` is an edge-detected classifier output (`None` = no new
    /// input this tick). Terminal flags win over everything else.
    pub fn update(
        &mut self,
        gesture: Direction,
        joystick: JoystickInput,
        started: bool,
        dead: bool,
        won: bool,
        now_ms: u32,
    ) {
        if dead {
            self.phase = GamePhase::GameOver;
            return;
        }
        if won {
            self.phase = GamePhase::GameWin;
            return;
        }

        match self.phase {
            GamePhase::Init => {
                if started {
                    self.queue.clear();
                    self.phase = GamePhase::InputWait;
                }
            }

            GamePhase::InputWait => {
                if gesture != Direction::None {
                    // Queue is sized to SEQUENCE_LEN; transition below
                    // fires before it can overflow.
                    let _ = self.queue.push(gesture);
                    if self.queue.is_full() {
                        self.phase = GamePhase::InputCalc;
                    }
                }
            }

            GamePhase::InputCalc => {
                let mut inputs = [Direction::None; SEQUENCE_LEN];
                inputs.copy_from_slice(&self.queue);
                match check_strats(&inputs) {
                    Some(strat) if !self.on_cooldown(strat, now_ms) => {
                        info!("game: sequence matched {:?}", strat);
                        self.phase = GamePhase::Deploy(strat);
                    }
                    Some(strat) => {
                        info!("game: {:?} still on cooldown", strat);
                        self.queue.clear();
                        self.phase = GamePhase::InputWait;
                    }
                    None => {
                        self.queue.clear();
                        self.phase = GamePhase::InputWait;
                    }
                }
            }

            GamePhase::Deploy(strat) => {
                if joystick.button_pressed {
                    self.deployed_at_ms[strat.index()] = Some(now_ms);
                    self.phase = GamePhase::DeployConfirmed(strat);
                }
            }

            GamePhase::DeployConfirmed(_) => {
                self.queue.clear();
                self.phase = GamePhase::InputWait;
            }

            GamePhase::GameOver | GamePhase::GameWin => {}
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────
