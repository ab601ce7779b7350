//! Iterative path integrator with Russian roulette.

use lumen_core::{Color, Environment};
use lumen_math::{Ray, Seed};

use crate::renderer::RenderConfig;
use crate::resolver::SceneTracer;

/// Seed lane for the roulette draw. Lanes 0..=2 belong to materials.
const ROULETTE_LANE: u32 = 3;

/// Where a path is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    /// Still scattering
    Bouncing,
    /// Left the scene and picked up environment radiance
    Escaped,
    /// Absorbed, stopped by roulette, hit a light, or out of bounces
    Terminated,
}

/// Result of integrating one path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathOutcome {
    /// Unscaled single-sample radiance estimate
    pub radiance: Color,
    pub state: PathState,
    /// Number of surface hits along the path
    pub bounces: u32,
}

/// Integrate radiance arriving along `ray`.
///
/// Each bounce draws its random numbers from `seed.with_bounce(bounce)`, so
/// the result is a pure function of the inputs.
pub fn trace_path(
    tracer: &dyn SceneTracer,
    environment: &dyn Environment,
    mut ray: Ray,
    seed: Seed,
    config: &RenderConfig,
) -> PathOutcome {
    let mut throughput = Color::ONE;
    let mut radiance = Color::ZERO;
    let mut state = PathState::Bouncing;
    let mut bounce = 0;

    while state == PathState::Bouncing {
        if bounce >= config.max_bounces {
            state = PathState::Terminated;
            break;
        }
        let seed = seed.with_bounce(bounce);

        let Some(response) = tracer.trace(&ray, &seed) else {
            let env = environment.lookup(ray.direction.normalize_or_zero());
            radiance += throughput * env.truncate() * env.w * config.exposure;
            state = PathState::Escaped;
            break;
        };
        bounce += 1;

        radiance += throughput * response.emission;
        let Some(next) = response.scattered else {
            state = PathState::Terminated;
            break;
        };

        throughput *= response.diffuse;
        if throughput.max_element() <= 0.0 {
            state = PathState::Terminated;
            break;
        }

        if seed.bounce > config.min_bounces {
            let p = throughput.max_element().min(1.0);
            if seed.rand(ROULETTE_LANE) > p {
                state = PathState::Terminated;
                break;
            }
            throughput /= p;
        }

        ray = next;
    }

    PathOutcome {
        radiance,
        state,
        bounces: bounce,
    }
}

/// Radiance estimate for one sample; see [`trace_path`].
pub fn radiance(
    tracer: &dyn SceneTracer,
    environment: &dyn Environment,
    ray: Ray,
    seed: Seed,
    config: &RenderConfig,
) -> Color {
    trace_path(tracer, environment, ray, seed, config).radiance
}
