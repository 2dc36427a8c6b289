#![allow(
    clippy::allow_attributes,
    reason = "allow attributes are needed for wasm"
)]

use bevy::asset::{AssetMetaCheck, AssetMode, AssetPlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::render::settings::{Backends, PowerPreference, RenderCreation, WgpuSettings, WgpuSettingsPriority};
use bevy::render::RenderPlugin;
use bevy::window::{PresentMode, WindowMode, WindowResolution};

#[cfg(target_arch = "wasm32")]
use crate::RibbitCommunicationPlugin;
use crate::RibbitMessageHandler;

// typical smartphone screen ratio (9:16)
pub const WINDOW_WIDTH: f32 = 360.0;
pub const WINDOW_HEIGHT: f32 = 640.0;

/// Log filter shared by every bit. The bit's own crate logs at debug level.
const LOG_FILTER: &str = "wgpu=error,naga=warn,bevy_render=warn";

// Creates a Bevy app with the settings every bit needs to run inside Ribbit.
#[allow(unused_variables, reason = "bit_version is used in wasm")]
#[allow(clippy::extra_unused_type_parameters)]
pub fn get_default_app<T: RibbitMessageHandler>(bit_name: &str, bit_version: &str) -> App {
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(asset_plugin(bit_name, bit_version))
            .set(window_plugin(bit_name))
            .set(render_plugin())
            .set(log_plugin(bit_name)),
    );

    // Keeps mobile devices from rendering frames nobody asked for.
    // https://github.com/aevyrie/bevy_framepace
    app.add_plugins(bevy_framepace::FramepacePlugin);

    app.insert_resource(ClearColor(Color::BLACK));

    #[cfg(target_arch = "wasm32")]
    app.add_plugins(RibbitCommunicationPlugin::<T>::default());

    app
}

#[allow(unused_variables, reason = "bit_name and bit_version are used in wasm")]
fn asset_plugin(bit_name: &str, bit_version: &str) -> AssetPlugin {
    AssetPlugin {
        mode: AssetMode::Unprocessed,

        #[cfg(not(target_arch = "wasm32"))]
        file_path: "assets".to_string(),
        #[cfg(target_arch = "wasm32")]
        file_path: format!("bits/{bit_name}-{bit_version}/assets"),
        processed_file_path: "imported_assets/Default".to_string(),
        watch_for_changes_override: None,
        meta_check: AssetMetaCheck::Never,
    }
}

fn window_plugin(bit_name: &str) -> WindowPlugin {
    WindowPlugin {
        primary_window: Some(Window {
            title: bit_name.to_string(),
            present_mode: PresentMode::Fifo,
            resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            canvas: Some("#bit".into()),
            fit_canvas_to_parent: true,
            mode: WindowMode::Windowed,
            // Leaves browser shortcuts like F5 or Ctrl+R alone.
            prevent_default_event_handling: false,
            ..default()
        }),
        ..default()
    }
}

fn render_plugin() -> RenderPlugin {
    RenderPlugin {
        render_creation: RenderCreation::Automatic(WgpuSettings {
            backends: Some(Backends::BROWSER_WEBGPU | Backends::GL),
            power_preference: PowerPreference::HighPerformance,
            priority: WgpuSettingsPriority::Functionality,
            ..default()
        }),
        ..default()
    }
}

fn log_plugin(bit_name: &str) -> LogPlugin {
    LogPlugin {
        filter: format!("{LOG_FILTER},{bit_name}=debug"),
        ..default()
    }
}
