use box_pushing_qlearning::action_selection::ExponentialDecay;
use box_pushing_qlearning::env::{BoxPushingEnv, BoxState, Env, EnvError, GridWorld, Move};
use box_pushing_qlearning::{AgentConfig, AgentError, QLearningAgent, TerminalBootstrap};

fn config() -> AgentConfig {
    AgentConfig::default()
        .with_learning_rate(0.5)
        .with_discount_factor(0.95)
        .with_epsilon(0.3)
        .with_epsilon_schedule(ExponentialDecay::new(0.998, 0.05))
        .with_terminal_bootstrap(TerminalBootstrap::Zero)
        .with_seed(42)
}

#[test]
fn agent_learns_to_push_the_box_to_the_goal() {
    let mut env = BoxPushingEnv::new(3, 3, 50, 42).unwrap();
    let mut agent: QLearningAgent<BoxState, Move> =
        QLearningAgent::new(config(), env.action_space()).unwrap();

    let rewards = agent.learn(&mut env, 3000).unwrap();
    assert_eq!(rewards.len(), 3000);

    let first: f64 = rewards[..200].iter().sum::<f64>() / 200.0;
    let last: f64 = rewards[rewards.len() - 200..].iter().sum::<f64>() / 200.0;
    assert!(last > first, "first {} last {}", first, last);

    let (eval_rewards, eval_lengths) = agent.evaluate(&mut env, 5).unwrap();
    for (reward, length) in eval_rewards.iter().zip(eval_lengths.iter()) {
        assert!(
            *reward > 0.0,
            "greedy episode failed with reward {}",
            reward
        );
        assert!(*length < 11);
    }
}

#[test]
fn eager_and_lazy_agents_train_identically() {
    let mut lazy_env = BoxPushingEnv::new(3, 3, 30, 7).unwrap();
    let mut eager_env = BoxPushingEnv::new(3, 3, 30, 7).unwrap();
    let mut lazy: QLearningAgent<BoxState, Move> =
        QLearningAgent::new(config(), lazy_env.action_space()).unwrap();
    let mut eager: QLearningAgent<BoxState, Move> =
        QLearningAgent::with_eager_states(config(), eager_env.action_space(), &eager_env).unwrap();
    assert_eq!(eager.q_table().len(), 81);

    let lazy_rewards = lazy.learn(&mut lazy_env, 200).unwrap();
    let eager_rewards = eager.learn(&mut eager_env, 200).unwrap();
    assert_eq!(lazy_rewards, eager_rewards);

    for state in eager_env.states() {
        assert_eq!(lazy.value_of(&state), eager.value_of(&state));
        assert_eq!(
            lazy.policy_at(&state).unwrap(),
            eager.policy_at(&state).unwrap()
        );
    }
}

#[test]
fn value_grid_has_one_row_per_grid_row() {
    let mut env = BoxPushingEnv::new(3, 4, 40, 1).unwrap();
    let mut agent: QLearningAgent<BoxState, Move> =
        QLearningAgent::new(config(), env.action_space()).unwrap();
    agent.learn(&mut env, 50).unwrap();

    let rendered = agent.render_value_grid(env.world_height(), env.world_width());
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in lines {
        assert_eq!(line.split(" | ").count(), 4);
    }
}

#[test]
fn stepping_a_finished_episode_surfaces_the_environment_error() {
    /// Forgets to restart itself after the first episode.
    struct LazyReset {
        inner: BoxPushingEnv,
        resets: usize,
    }

    impl Env<BoxState, Move> for LazyReset {
        fn reset(&mut self) -> BoxState {
            self.resets += 1;
            if self.resets == 1 {
                self.inner.reset()
            } else {
                (0, 0, 1, 1)
            }
        }

        fn step(&mut self, action: Move) -> Result<(BoxState, f64, bool), EnvError> {
            self.inner.step(action)
        }

        fn action_space(&self) -> box_pushing_qlearning::env::ActionSpace<Move> {
            self.inner.action_space()
        }

        fn render(&self) -> String {
            self.inner.render()
        }
    }

    let mut env = LazyReset {
        inner: BoxPushingEnv::new(3, 3, 5, 3).unwrap(),
        resets: 0,
    };
    let mut agent: QLearningAgent<BoxState, Move> =
        QLearningAgent::new(config(), env.action_space()).unwrap();
    let result = agent.learn(&mut env, 3);
    assert!(matches!(result, Err(AgentError::Env(EnvError::NotReady))));
    assert_eq!(agent.reward_history().len(), 1);
}
