use bevy::log::info;
use bevy::prelude::*;
use bits_helpers::RibbitMessageHandler;
use bits_helpers::restart::restart;
use ribbit_bits::{BitDuration, BitResult};

use crate::GameState;
use crate::puzzle::PuzzleController;

#[derive(Default, Clone, Copy)]
pub struct Jigsaw;

impl RibbitMessageHandler for Jigsaw {
    fn restart(world: &mut World) {
        info!("Restarting Jigsaw");

        world.resource_scope(|world, mut controller: Mut<'_, PuzzleController>| {
            let mut next_state = world.resource_mut::<NextState<GameState>>();
            restart(&mut *controller, &mut next_state);
        });
    }

    fn end(world: &mut World) -> BitResult {
        info!("Ending Jigsaw");

        if world.resource::<PuzzleController>().is_complete() {
            BitResult::Success
        } else {
            BitResult::Failure
        }
    }

    fn duration(_world: &mut World) -> BitDuration {
        BitDuration::max_duration()
    }
}
