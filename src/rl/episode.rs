//! One episode of agent/environment interaction

use super::agent::QAgent;
use super::environment::SnakeEnvironment;
use crate::error::Result;
use crate::game::TerminationReason;
use crate::render::{Flow, Renderer};

/// Result of running one episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeOutcome {
    /// Food eaten
    pub score: u32,
    /// Steps taken in this episode
    pub steps: usize,
    /// Why the game ended; `None` if the step budget ran out or it was aborted
    pub reason: Option<TerminationReason>,
    /// Stopped by the renderer or a cancellation request; nothing was learned
    pub aborted: bool,
    /// Total shaped reward (0 when not learning)
    pub total_reward: f64,
}

/// Play one episode
///
/// Each step: ask the renderer whether to go on, encode the current
/// observation, pick an action, step the environment, record the pair and
/// render the result. The episode ends when the game terminates, when
/// `step_budget` steps have been taken, or when the renderer aborts.
///
/// When `learn` is set the agent is updated from the trajectory of a
/// completed episode. Otherwise the trajectory is left in the agent until the
/// next episode starts. An aborted episode is always discarded.
pub fn run_episode<R: Renderer + ?Sized>(
    env: &mut SnakeEnvironment,
    agent: &mut QAgent,
    renderer: &mut R,
    step_budget: Option<usize>,
    learn: bool,
) -> Result<EpisodeOutcome> {
    let mut obs = env.reset();
    agent.reset();

    let mut steps = 0;
    let mut reason = None;
    let mut aborted = false;

    loop {
        if renderer.poll()? == Flow::Abort {
            aborted = true;
            break;
        }
        if step_budget.is_some_and(|budget| steps >= budget) {
            break;
        }

        let state = agent.encode(&obs);
        let action = agent.select_action(&state.key);
        let (next_obs, done, why) = env.step(action)?;
        agent.record(state, action)?;
        steps += 1;
        obs = next_obs;

        if renderer.render(&obs)? == Flow::Abort {
            aborted = true;
            break;
        }
        if done {
            reason = why;
            break;
        }
    }

    let score = obs.score();
    let total_reward = if aborted {
        agent.reset();
        0.0
    } else if learn {
        agent.update(reason)
    } else {
        0.0
    };

    if !aborted {
        renderer.end_episode(score);
    }

    Ok(EpisodeOutcome {
        score,
        steps,
        reason: if aborted { None } else { reason },
        aborted,
        total_reward,
    })
}
