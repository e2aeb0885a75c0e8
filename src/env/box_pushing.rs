use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ActionSpace, Env, EnvError, GridWorld, StepResult};

/// `(agent_x, agent_y, box_x, box_y)`, where x is the row and y the column.
pub type BoxState = (usize, usize, usize, usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    pub fn label(&self) -> &'static str {
        match self {
            Move::Up => "UP",
            Move::Down => "DOWN",
            Move::Left => "LEFT",
            Move::Right => "RIGHT",
        }
    }

    /// Cell reached when moving from `(row, col)`, `None` when it falls off the grid.
    pub fn apply(
        &self,
        (row, col): (usize, usize),
        nrow: usize,
        ncol: usize,
    ) -> Option<(usize, usize)> {
        match self {
            Move::Up => row.checked_sub(1).map(|r| (r, col)),
            Move::Down => (row + 1 < nrow).then_some((row + 1, col)),
            Move::Left => col.checked_sub(1).map(|c| (row, c)),
            Move::Right => (col + 1 < ncol).then_some((row, col + 1)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoxPushingEnv {
    ready: bool,
    nrow: usize,
    ncol: usize,
    start_agent: (usize, usize),
    start_box: (usize, usize),
    goal: (usize, usize),
    agent_pos: (usize, usize),
    box_pos: (usize, usize),
    max_steps: u64,
    curr_step: u64,
    random_start: bool,
    rng: StdRng,
}

impl BoxPushingEnv {
    pub const STEP_REWARD: f64 = -1.0;
    pub const GOAL_REWARD: f64 = 10.0;

    /// Agent in the top-left corner, box one cell diagonally away from it and the
    /// goal in the bottom-right corner.
    pub fn new(nrow: usize, ncol: usize, max_steps: u64, seed: u64) -> Result<Self, EnvError> {
        Self::with_layout(
            nrow,
            ncol,
            (0, 0),
            (1, 1),
            (nrow.saturating_sub(1), ncol.saturating_sub(1)),
            max_steps,
            seed,
        )
    }

    pub fn with_layout(
        nrow: usize,
        ncol: usize,
        agent: (usize, usize),
        box_pos: (usize, usize),
        goal: (usize, usize),
        max_steps: u64,
        seed: u64,
    ) -> Result<Self, EnvError> {
        if nrow < 2 || ncol < 2 {
            return Err(EnvError::Failure(format!(
                "grid of {}x{} is too small to push a box",
                nrow, ncol
            )));
        }
        let inside = |(r, c): (usize, usize)| r < nrow && c < ncol;
        if !inside(agent) || !inside(box_pos) || !inside(goal) {
            return Err(EnvError::Failure(
                "agent, box and goal must lie inside the grid".to_string(),
            ));
        }
        if agent == box_pos || box_pos == goal {
            return Err(EnvError::Failure(
                "the box must start apart from the agent and the goal".to_string(),
            ));
        }
        if max_steps == 0 {
            return Err(EnvError::Failure("max_steps must be positive".to_string()));
        }
        Ok(Self {
            ready: false,
            nrow,
            ncol,
            start_agent: agent,
            start_box: box_pos,
            goal,
            agent_pos: agent,
            box_pos,
            max_steps,
            curr_step: 0,
            random_start: false,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Place the agent on a random free cell at every reset.
    pub fn with_random_start(mut self, random_start: bool) -> Self {
        self.random_start = random_start;
        self
    }

    pub fn goal(&self) -> (usize, usize) {
        self.goal
    }

    fn state(&self) -> BoxState {
        (
            self.agent_pos.0,
            self.agent_pos.1,
            self.box_pos.0,
            self.box_pos.1,
        )
    }

    fn random_free_cell(&mut self) -> (usize, usize) {
        loop {
            let cell = (
                self.rng.gen_range(0..self.nrow),
                self.rng.gen_range(0..self.ncol),
            );
            if cell != self.start_box && cell != self.goal {
                return cell;
            }
        }
    }
}

impl Env<BoxState, Move> for BoxPushingEnv {
    fn reset(&mut self) -> BoxState {
        self.agent_pos = if self.random_start {
            self.random_free_cell()
        } else {
            self.start_agent
        };
        self.box_pos = self.start_box;
        self.curr_step = 0;
        self.ready = true;
        self.state()
    }

    fn step(&mut self, action: Move) -> StepResult<BoxState> {
        if !self.ready {
            return Err(EnvError::NotReady);
        }
        self.curr_step += 1;

        if let Some(target) = action.apply(self.agent_pos, self.nrow, self.ncol) {
            if target == self.box_pos {
                // a box against the wall blocks the agent as well
                if let Some(box_target) = action.apply(self.box_pos, self.nrow, self.ncol) {
                    self.box_pos = box_target;
                    self.agent_pos = target;
                }
            } else {
                self.agent_pos = target;
            }
        }

        let solved = self.box_pos == self.goal;
        let reward = if solved {
            Self::GOAL_REWARD
        } else {
            Self::STEP_REWARD
        };
        let done = solved || self.curr_step >= self.max_steps;
        if done {
            self.ready = false;
        }
        Ok((self.state(), reward, done))
    }

    fn action_space(&self) -> ActionSpace<Move> {
        ActionSpace::new(Move::ALL.to_vec())
    }

    fn render(&self) -> String {
        let mut rows: Vec<String> = Vec::with_capacity(self.nrow);
        for row in 0..self.nrow {
            let line: String = (0..self.ncol)
                .map(|col| {
                    let cell = (row, col);
                    if cell == self.agent_pos {
                        'A'
                    } else if cell == self.box_pos && cell == self.goal {
                        '*'
                    } else if cell == self.box_pos {
                        'B'
                    } else if cell == self.goal {
                        'G'
                    } else {
                        '.'
                    }
                })
                .collect();
            rows.push(line);
        }
        rows.join("\n")
    }
}

impl GridWorld<BoxState> for BoxPushingEnv {
    fn world_height(&self) -> usize {
        self.nrow
    }

    fn world_width(&self) -> usize {
        self.ncol
    }

    fn states(&self) -> Vec<BoxState> {
        let mut states = Vec::with_capacity(self.nrow * self.ncol * self.nrow * self.ncol);
        for agent_x in 0..self.nrow {
            for agent_y in 0..self.ncol {
                for box_x in 0..self.nrow {
                    for box_y in 0..self.ncol {
                        states.push((agent_x, agent_y, box_x, box_y));
                    }
                }
            }
        }
        states
    }
}
