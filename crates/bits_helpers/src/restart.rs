use bevy::prelude::*;
use bevy::state::state::FreelyMutableState;

/// Pressing a button carrying this restarts the bit.
#[derive(Component)]
pub struct RestartButton;

/// Entities that only live for one round. Despawned by [`cleanup_marked_entities`].
#[derive(Component)]
pub struct CleanupMarker;

/// Round state that can be put back to its initial value in place.
pub trait Restartable: Resource {
    type State: States + FreelyMutableState;

    fn reset(&mut self);
    fn initial_state() -> Self::State;
}

pub fn restart<T: Restartable>(restartable: &mut T, next_state: &mut NextState<T::State>) {
    restartable.reset();
    next_state.set(T::initial_state());
}

pub fn handle_restart<T: Restartable>(
    mut next_state: ResMut<NextState<T::State>>,
    mut restartable: ResMut<T>,
    interaction_query: Query<&Interaction, (Changed<Interaction>, With<RestartButton>)>,
) {
    if interaction_query
        .iter()
        .any(|interaction| *interaction == Interaction::Pressed)
    {
        info!("Restart button pressed");
        restart(&mut *restartable, &mut next_state);
    }
}

pub fn cleanup_marked_entities(mut commands: Commands, query: Query<Entity, With<CleanupMarker>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
