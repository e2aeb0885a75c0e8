use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use plotters::style::{BLUE, RED};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use box_pushing_qlearning::action_selection::{EnumEpsilonSchedule, LinearDecay};
use box_pushing_qlearning::env::{BoxPushingEnv, BoxState, Env, GridWorld, Move};
use box_pushing_qlearning::plot::plot_moving_average;
use box_pushing_qlearning::utils::moving_average;
use box_pushing_qlearning::{AgentConfig, QLearningAgent, Result, TerminalBootstrap};

extern crate structopt;

use structopt::StructOpt;

/// Train a Q-learning agent to push a box onto the goal cell
#[derive(StructOpt, Debug)]
#[structopt(name = "RLRust - BoxPushing")]
struct Cli {
    /// Number of episodes for the training
    #[structopt(long = "n_episodes", short = "n", default_value = "5000")]
    n_episodes: usize,

    /// Number of greedy episodes run after training
    #[structopt(long = "eval_episodes", default_value = "10")]
    eval_episodes: usize,

    /// Maximum number of steps per episode
    #[structopt(long = "max_steps", default_value = "100")]
    max_steps: u64,

    /// Number of rows of the grid
    #[structopt(long = "height", default_value = "4")]
    height: usize,

    /// Number of columns of the grid
    #[structopt(long = "width", default_value = "4")]
    width: usize,

    /// Learning rate of the RL agent
    #[structopt(long = "learning_rate", default_value = "0.1")]
    learning_rate: f64,

    /// Discount factor to be used on the temporal difference calculation
    #[structopt(long = "discount_factor", default_value = "0.99")]
    discount_factor: f64,

    /// Initial value for the exploration ratio
    #[structopt(long = "epsilon", default_value = "0.1")]
    epsilon: f64,

    /// Value subtracted from the exploration ratio after each episode
    #[structopt(long = "epsilon_decay", default_value = "0.0")]
    epsilon_decay: f64,

    /// Final value for the exploration ratio
    #[structopt(long = "final_epsilon", default_value = "0.0")]
    final_epsilon: f64,

    /// Pre-populate the Q table with every grid state
    #[structopt(long = "eager")]
    eager: bool,

    /// Do not bootstrap from the next state on terminal transitions
    #[structopt(long = "terminal_zero")]
    terminal_zero: bool,

    /// Start every episode from a random cell
    #[structopt(long = "random_start")]
    random_start: bool,

    /// Moving average window to be used on the visualization of results
    #[structopt(long = "moving_average_window", default_value = "100")]
    moving_average_window: usize,

    /// Write the training reward curve to this PNG file
    #[structopt(long = "plot", parse(from_os_str))]
    plot: Option<PathBuf>,

    /// Show example of episode
    #[structopt(long = "show_example")]
    show_example: bool,

    /// Draw a progress bar while training
    #[structopt(long = "progress")]
    progress: bool,

    /// Seed for reproducibility
    #[structopt(long = "seed", default_value = "42")]
    seed: u64,
}

fn run(cli: Cli) -> Result<()> {
    let mut env = BoxPushingEnv::new(cli.height, cli.width, cli.max_steps, cli.seed)?
        .with_random_start(cli.random_start);

    let schedule: EnumEpsilonSchedule = if cli.epsilon_decay > 0.0 {
        LinearDecay::new(cli.epsilon_decay, cli.final_epsilon).into()
    } else {
        EnumEpsilonSchedule::default()
    };
    let config = AgentConfig::default()
        .with_learning_rate(cli.learning_rate)
        .with_discount_factor(cli.discount_factor)
        .with_epsilon(cli.epsilon)
        .with_epsilon_schedule(schedule)
        .with_terminal_bootstrap(if cli.terminal_zero {
            TerminalBootstrap::Zero
        } else {
            TerminalBootstrap::Bootstrap
        })
        .with_seed(cli.seed)
        .with_progress(cli.progress);

    let mut agent: QLearningAgent<BoxState, Move> = if cli.eager {
        QLearningAgent::with_eager_states(config, env.action_space(), &env)?
    } else {
        QLearningAgent::new(config, env.action_space())?
    };

    let now: Instant = Instant::now();
    let rewards = agent.learn(&mut env, cli.n_episodes)?;
    info!(elapsed = ?now.elapsed(), "training done");

    let (eval_rewards, eval_lengths) = agent.evaluate(&mut env, cli.eval_episodes)?;
    let n_eval = eval_rewards.len().max(1) as f64;
    info!(
        mean_reward = eval_rewards.iter().sum::<f64>() / n_eval,
        mean_length = eval_lengths.iter().sum::<u64>() as f64 / n_eval,
        "greedy evaluation"
    );

    println!("State values (max over box positions):");
    println!(
        "{}",
        agent.render_value_grid(env.world_height(), env.world_width())
    );

    let start = env.reset();
    println!(
        "Greedy action at start {:?}: {}",
        start,
        agent.policy_at(&start)?.label()
    );

    if cli.show_example {
        println!("{}", agent.example(&mut env)?);
    }

    if let Some(path) = cli.plot.as_ref() {
        let ma_reward = moving_average(cli.moving_average_window, &rewards);
        let ma_length = moving_average(
            cli.moving_average_window,
            &agent
                .episode_lengths()
                .iter()
                .map(|x| *x as f64)
                .collect::<Vec<f64>>(),
        );
        plot_moving_average(
            &[ma_reward, ma_length],
            &[BLUE, RED],
            &["Episode reward", "Episode length"],
            "Q-learning on BoxPushing",
            path,
        )?;
        info!(path = %path.display(), "reward curve written");
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "box_pushing=info,box_pushing_qlearning=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli: Cli = Cli::from_args();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
