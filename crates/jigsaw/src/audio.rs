use bevy::prelude::*;
use bevy_asset_loader::prelude::*;
use bevy_kira_audio::prelude::*;
use leafwing_input_manager::prelude::ActionState;

use crate::input::Action;
use crate::puzzle::PuzzleEvent;

const VOLUME_STEP: f32 = 0.1;
/// Anything quieter is treated as silence.
const MIN_DECIBELS: f32 = -60.0;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Default, States)]
enum AudioState {
    #[default]
    Loading,
    Loaded,
    /// Loading failed, the game runs silently.
    Unavailable,
}

#[derive(AssetCollection, Resource)]
struct AudioAssets {
    #[asset(path = "audio/pickup.ogg")]
    pickup: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/snap.ogg")]
    snap: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/music.ogg")]
    music: Handle<bevy_kira_audio::prelude::AudioSource>,
}

#[derive(Resource)]
struct MusicChannel;

/// Background music volume in `0.0..=1.0` and the mute switch.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct MusicSettings {
    volume: f32,
    muted: bool,
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self {
            volume: 0.5,
            muted: false,
        }
    }
}

impl MusicSettings {
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    pub const fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn decibels(&self) -> f32 {
        if self.volume <= 0.0 {
            return MIN_DECIBELS;
        }
        (20.0 * self.volume.log10()).max(MIN_DECIBELS)
    }
}

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(AudioPlugin)
            .add_audio_channel::<MusicChannel>()
            .init_resource::<MusicSettings>()
            .init_state::<AudioState>()
            .add_loading_state(
                LoadingState::new(AudioState::Loading)
                    .continue_to_state(AudioState::Loaded)
                    .on_failure_continue_to_state(AudioState::Unavailable)
                    .load_collection::<AudioAssets>(),
            )
            .add_systems(OnEnter(AudioState::Loaded), start_music)
            .add_systems(OnEnter(AudioState::Unavailable), audio_unavailable)
            .add_systems(Update, music_actions)
            .add_systems(
                Update,
                (
                    puzzle_audio,
                    apply_music_settings.run_if(resource_changed::<MusicSettings>),
                )
                    .run_if(in_state(AudioState::Loaded)),
            );
    }
}

fn audio_unavailable() {
    warn!("Audio assets failed to load, continuing without sound");
}

fn start_music(
    audio_assets: Res<AudioAssets>,
    music: Res<AudioChannel<MusicChannel>>,
    settings: Res<MusicSettings>,
) {
    music.play(audio_assets.music.clone_weak()).looped();
    music.set_volume(settings.decibels());
    if settings.is_muted() {
        music.pause();
    }
}

fn puzzle_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut puzzle_events: EventReader<PuzzleEvent>,
) {
    // auto-solve snaps every piece in one frame, one sound is enough
    let (mut picked, mut snapped) = (false, false);
    for event in puzzle_events.read() {
        match event {
            PuzzleEvent::PiecePicked(_) => picked = true,
            PuzzleEvent::PieceSnapped(_) => snapped = true,
            PuzzleEvent::PieceDropped(_) | PuzzleEvent::Completed => {}
        }
    }
    if picked {
        audio.play(audio_assets.pickup.clone_weak());
    }
    if snapped {
        audio.play(audio_assets.snap.clone_weak());
    }
}

fn music_actions(
    mut settings: ResMut<MusicSettings>,
    action_query: Query<&ActionState<Action>>,
) {
    let Ok(action_state) = action_query.get_single() else {
        return;
    };
    if action_state.just_pressed(&Action::ToggleMute) {
        settings.toggle_mute();
    }
    if action_state.just_pressed(&Action::VolumeUp) {
        let volume = settings.volume() + VOLUME_STEP;
        settings.set_volume(volume);
    }
    if action_state.just_pressed(&Action::VolumeDown) {
        let volume = settings.volume() - VOLUME_STEP;
        settings.set_volume(volume);
    }
}

fn apply_music_settings(music: Res<AudioChannel<MusicChannel>>, settings: Res<MusicSettings>) {
    info!(
        "Music volume {:.1}{}",
        settings.volume(),
        if settings.is_muted() { " (muted)" } else { "" }
    );
    music.set_volume(settings.decibels());
    if settings.is_muted() {
        music.pause();
    } else {
        music.resume();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_stays_in_range() {
        let mut settings = MusicSettings::default();
        settings.set_volume(1.7);
        assert_eq!(settings.volume(), 1.0);
        settings.set_volume(-0.3);
        assert_eq!(settings.volume(), 0.0);
    }

    #[test]
    fn full_volume_is_unity_gain() {
        let mut settings = MusicSettings::default();
        settings.set_volume(1.0);
        assert!(settings.decibels().abs() < 1e-6);
    }

    #[test]
    fn silence_is_floored() {
        let mut settings = MusicSettings::default();
        settings.set_volume(0.0);
        assert_eq!(settings.decibels(), MIN_DECIBELS);
        settings.set_volume(0.5);
        assert!(settings.decibels() < 0.0 && settings.decibels() > MIN_DECIBELS);
    }

    #[test]
    fn mute_keeps_the_volume() {
        let mut settings = MusicSettings::default();
        settings.toggle_mute();
        assert!(settings.is_muted());
        assert_eq!(settings.volume(), 0.5);
        settings.toggle_mute();
        assert!(!settings.is_muted());
    }
}
